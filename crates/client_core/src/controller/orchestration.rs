//! Runtime driving the session reducer: transport calls, timers, and port writes.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::{
    config::ControllerSettings,
    controller::{
        events::{Effect, SessionEvent},
        reducer::{ControllerPhase, SessionState},
    },
    ports::{InputEvent, NavigationPort, PresentationPort},
    transport::{Action, Transport},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionExit {
    /// The game ended and the results view was opened.
    Results,
    /// The input source went away before the game ended.
    InputClosed,
}

/// Owns one session. Calls and timers run as detached tasks that report back
/// through an internal channel; the controller itself is the only place the
/// session state is mutated.
pub struct SessionController {
    state: SessionState,
    transport: Arc<dyn Transport>,
    presentation: Box<dyn PresentationPort>,
    navigation: Box<dyn NavigationPort>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl SessionController {
    pub fn new(
        settings: ControllerSettings,
        transport: Arc<dyn Transport>,
        presentation: Box<dyn PresentationPort>,
        navigation: Box<dyn NavigationPort>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: SessionState::new(settings),
            transport,
            presentation,
            navigation,
            events_tx,
            events_rx,
        }
    }

    pub async fn run(mut self, mut input: mpsc::Receiver<InputEvent>) -> SessionExit {
        self.dispatch(SessionEvent::Bootstrap);
        let mut input_open = true;

        loop {
            let event = tokio::select! {
                Some(event) = self.events_rx.recv() => event,
                received = input.recv(), if input_open => match received {
                    Some(event) => SessionEvent::from(event),
                    // A finished game still gets to show its results.
                    None if self.state.phase() == ControllerPhase::GameOver => {
                        info!("input source closed; waiting for results");
                        input_open = false;
                        continue;
                    }
                    None => {
                        info!("input source closed; leaving session");
                        return SessionExit::InputClosed;
                    }
                },
            };

            if self.dispatch(event) {
                return SessionExit::Results;
            }
        }
    }

    /// Returns true once the session has navigated away.
    fn dispatch(&mut self, event: SessionEvent) -> bool {
        let mut navigated = false;
        for effect in self.state.reduce(event) {
            match effect {
                Effect::Render(op) => op.apply(self.presentation.as_mut()),
                Effect::Call { generation, action } => self.spawn_call(generation, action),
                Effect::ScheduleOpponentMove { generation, delay } => {
                    self.schedule(delay, SessionEvent::OpponentTimerElapsed { generation })
                }
                Effect::ScheduleNavigation { generation, delay } => {
                    self.schedule(delay, SessionEvent::NavigationTimerElapsed { generation })
                }
                Effect::Navigate => {
                    self.navigation.go_to_results();
                    navigated = true;
                }
            }
        }
        navigated
    }

    fn spawn_call(&self, generation: u64, action: Action) {
        debug!(action = action.name(), generation, "queued oracle call");
        let transport = Arc::clone(&self.transport);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = transport.call(&action).await;
            let _ = events.send(SessionEvent::Response {
                generation,
                action: action.kind(),
                outcome,
            });
        });
    }

    fn schedule(&self, delay: Duration, event: SessionEvent) {
        debug!(?delay, ?event, "scheduled session timer");
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(event);
        });
    }
}

#[cfg(test)]
#[path = "tests/orchestration_tests.rs"]
mod tests;
