//! Turn-synchronization state machine.
//!
//! [`SessionState::reduce`] is a pure transition: it consumes one
//! [`SessionEvent`] and returns the effects the runtime has to perform. Every
//! call and timer is tagged with the session generation that issued it, and
//! a reset moves to a new generation, so anything still in flight from before
//! the reset is dropped when it comes back.

use shared::{domain::PlayerTurn, protocol::GameStateSnapshot};
use tracing::{debug, error, info, warn};

use crate::{
    config::ControllerSettings,
    controller::events::{Effect, RenderOp, SessionEvent},
    error::TransportError,
    ports::Emphasis,
    transport::{Action, ActionKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Loading,
    AwaitingUserMove,
    OpponentThinking,
    GameOver,
    Faulted,
}

pub struct SessionState {
    settings: ControllerSettings,
    phase: ControllerPhase,
    generation: u64,
    bootstrapped: bool,
    snapshot: Option<GameStateSnapshot>,
    outstanding: Option<ActionKind>,
    opponent_timer_armed: bool,
    navigation_scheduled: bool,
}

impl SessionState {
    pub fn new(settings: ControllerSettings) -> Self {
        Self {
            settings,
            phase: ControllerPhase::Loading,
            generation: 0,
            bootstrapped: false,
            snapshot: None,
            outstanding: None,
            opponent_timer_armed: false,
            navigation_scheduled: false,
        }
    }

    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn snapshot(&self) -> Option<&GameStateSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn outstanding(&self) -> Option<ActionKind> {
        self.outstanding
    }

    pub fn reduce(&mut self, event: SessionEvent) -> Vec<Effect> {
        match event {
            SessionEvent::Bootstrap => self.on_bootstrap(),
            SessionEvent::Submit(word) => self.on_submit(word),
            SessionEvent::Reset => self.on_reset(),
            SessionEvent::Response {
                generation,
                action,
                outcome,
            } => self.on_response(generation, action, outcome),
            SessionEvent::OpponentTimerElapsed { generation } => self.on_opponent_timer(generation),
            SessionEvent::NavigationTimerElapsed { generation } => {
                self.on_navigation_timer(generation)
            }
        }
    }

    fn on_bootstrap(&mut self) -> Vec<Effect> {
        if self.bootstrapped {
            debug!("session already bootstrapped; ignoring");
            return Vec::new();
        }
        self.bootstrapped = true;
        self.phase = ControllerPhase::Loading;
        self.issue(Action::Bootstrap)
    }

    fn on_submit(&mut self, word: String) -> Vec<Effect> {
        if self.phase != ControllerPhase::AwaitingUserMove || self.outstanding.is_some() {
            debug!(phase = ?self.phase, "input disabled; ignoring submit");
            return Vec::new();
        }
        self.issue(Action::SubmitMove { word })
    }

    fn on_reset(&mut self) -> Vec<Effect> {
        self.generation = self.generation.wrapping_add(1);
        info!(generation = self.generation, from = ?self.phase, "resetting session");
        self.bootstrapped = true;
        self.phase = ControllerPhase::Loading;
        self.snapshot = None;
        self.opponent_timer_armed = false;
        self.navigation_scheduled = false;
        self.issue(Action::Reset)
    }

    fn on_response(
        &mut self,
        generation: u64,
        action: ActionKind,
        outcome: Result<GameStateSnapshot, TransportError>,
    ) -> Vec<Effect> {
        if generation != self.generation {
            warn!(
                action = action.name(),
                generation,
                current = self.generation,
                "discarding response from a previous session"
            );
            return Vec::new();
        }
        if self.outstanding != Some(action) {
            warn!(action = action.name(), "discarding unexpected response");
            return Vec::new();
        }
        self.outstanding = None;

        match outcome {
            Ok(snapshot) => self.apply_snapshot(action, snapshot),
            Err(err) => self.fault(action, err),
        }
    }

    fn on_opponent_timer(&mut self, generation: u64) -> Vec<Effect> {
        if generation != self.generation
            || self.phase != ControllerPhase::OpponentThinking
            || !self.opponent_timer_armed
        {
            debug!(generation, "stale opponent timer; ignoring");
            return Vec::new();
        }
        self.opponent_timer_armed = false;
        self.issue(Action::RequestOpponentMove)
    }

    fn on_navigation_timer(&mut self, generation: u64) -> Vec<Effect> {
        if generation != self.generation || self.phase != ControllerPhase::GameOver {
            debug!(generation, "stale navigation timer; ignoring");
            return Vec::new();
        }
        info!(generation, "navigating to results");
        vec![Effect::Navigate]
    }

    // Banners belong to the previous response and are cleared before any
    // new request goes out.
    fn issue(&mut self, action: Action) -> Vec<Effect> {
        self.outstanding = Some(action.kind());
        vec![
            Effect::Render(RenderOp::ErrorBanner(None)),
            Effect::Render(RenderOp::OpponentErrorBanner(None)),
            Effect::Render(RenderOp::InputEnabled(false)),
            Effect::Call {
                generation: self.generation,
                action,
            },
        ]
    }

    fn fault(&mut self, action: ActionKind, err: TransportError) -> Vec<Effect> {
        error!(action = action.name(), %err, "oracle exchange failed");
        self.phase = ControllerPhase::Faulted;
        self.opponent_timer_armed = false;
        let texts = &self.settings.texts;
        vec![
            Effect::Render(RenderOp::Message {
                text: texts.fault_message.clone(),
                emphasis: Emphasis::Normal,
            }),
            Effect::Render(RenderOp::ErrorBanner(Some(texts.communication_error.clone()))),
            Effect::Render(RenderOp::InputEnabled(false)),
        ]
    }

    fn apply_snapshot(&mut self, origin: ActionKind, snapshot: GameStateSnapshot) -> Vec<Effect> {
        if let Some(previous) = &self.snapshot {
            if snapshot.used_words.len() < previous.used_words.len() {
                warn!(
                    previous = previous.used_words.len(),
                    current = snapshot.used_words.len(),
                    "oracle history shrank within one session"
                );
            }
        }

        let texts = &self.settings.texts;
        let next_phase = if snapshot.game_over {
            ControllerPhase::GameOver
        } else if snapshot.player_turn == PlayerTurn::Opponent {
            ControllerPhase::OpponentThinking
        } else {
            ControllerPhase::AwaitingUserMove
        };

        let answered_opponent = next_phase == ControllerPhase::AwaitingUserMove
            && origin == ActionKind::RequestOpponentMove;
        let (current_word, opponent_word) = if answered_opponent {
            (
                snapshot
                    .word_before_current()
                    .unwrap_or(texts.no_prior_word.as_str())
                    .to_string(),
                snapshot.current_word.clone().unwrap_or_default(),
            )
        } else {
            (
                snapshot
                    .current_word
                    .clone()
                    .unwrap_or_else(|| texts.fallback_word.clone()),
                String::new(),
            )
        };

        let (message, emphasis) = match next_phase {
            ControllerPhase::GameOver => (snapshot.message.clone(), Emphasis::Terminal),
            ControllerPhase::OpponentThinking => (texts.thinking.clone(), Emphasis::Normal),
            _ => (snapshot.message.clone(), Emphasis::Normal),
        };

        let mut effects = vec![
            Effect::Render(RenderOp::CurrentWord(current_word)),
            Effect::Render(RenderOp::OpponentWord(opponent_word)),
            Effect::Render(RenderOp::Message { text: message, emphasis }),
            Effect::Render(RenderOp::UsedWords(snapshot.used_words.clone())),
            Effect::Render(RenderOp::OpponentErrorBanner(
                snapshot.opponent_error_message.clone(),
            )),
            Effect::Render(RenderOp::InputEnabled(
                next_phase == ControllerPhase::AwaitingUserMove,
            )),
        ];

        match next_phase {
            ControllerPhase::GameOver if !self.navigation_scheduled => {
                self.navigation_scheduled = true;
                effects.push(Effect::ScheduleNavigation {
                    generation: self.generation,
                    delay: self.settings.results_delay,
                });
            }
            ControllerPhase::OpponentThinking if !self.opponent_timer_armed => {
                self.opponent_timer_armed = true;
                effects.push(Effect::ScheduleOpponentMove {
                    generation: self.generation,
                    delay: self.settings.opponent_delay,
                });
            }
            _ => {}
        }

        if next_phase != self.phase {
            info!(from = ?self.phase, to = ?next_phase, origin = origin.name(), "phase transition");
        }
        self.phase = next_phase;
        self.snapshot = Some(snapshot);
        effects
    }
}

#[cfg(test)]
#[path = "tests/reducer_tests.rs"]
mod tests;
