//! Session events fed into the reducer and the effects it asks the runtime to perform.

use std::time::Duration;

use shared::protocol::GameStateSnapshot;

use crate::{
    error::TransportError,
    ports::{Emphasis, InputEvent, PresentationPort},
    transport::{Action, ActionKind},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Bootstrap,
    Submit(String),
    Reset,
    Response {
        generation: u64,
        action: ActionKind,
        outcome: Result<GameStateSnapshot, TransportError>,
    },
    OpponentTimerElapsed {
        generation: u64,
    },
    NavigationTimerElapsed {
        generation: u64,
    },
}

impl From<InputEvent> for SessionEvent {
    fn from(event: InputEvent) -> Self {
        match event {
            InputEvent::Submit(word) => SessionEvent::Submit(word),
            InputEvent::Reset => SessionEvent::Reset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    CurrentWord(String),
    OpponentWord(String),
    Message { text: String, emphasis: Emphasis },
    UsedWords(Vec<String>),
    InputEnabled(bool),
    OpponentErrorBanner(Option<String>),
    ErrorBanner(Option<String>),
}

impl RenderOp {
    pub fn apply(self, port: &mut dyn PresentationPort) {
        match self {
            RenderOp::CurrentWord(word) => port.set_current_word(&word),
            RenderOp::OpponentWord(word) => port.set_opponent_word(&word),
            RenderOp::Message { text, emphasis } => port.set_message(&text, emphasis),
            RenderOp::UsedWords(words) => port.set_used_words(&words),
            RenderOp::InputEnabled(enabled) => port.set_input_enabled(enabled),
            RenderOp::OpponentErrorBanner(text) => port.set_opponent_error_banner(text.as_deref()),
            RenderOp::ErrorBanner(text) => port.set_error_banner(text.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Render(RenderOp),
    Call { generation: u64, action: Action },
    ScheduleOpponentMove { generation: u64, delay: Duration },
    ScheduleNavigation { generation: u64, delay: Duration },
    Navigate,
}
