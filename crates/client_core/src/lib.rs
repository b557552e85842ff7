//! Client side of a shiritori game played against a remote oracle.
//!
//! The oracle owns the game; this crate only decides which request to send
//! next and what to show. See [`controller`] for the session state machine.

pub mod config;
pub mod controller;
pub mod error;
pub mod ports;
pub mod transport;

pub use config::{load_settings, ControllerSettings, Settings};
pub use controller::{
    orchestration::{SessionController, SessionExit},
    reducer::{ControllerPhase, SessionState},
};
pub use error::{LevelSelectionError, TransportError};
pub use ports::{Emphasis, InputEvent, NavigationPort, PresentationPort};
pub use transport::{Action, ActionKind, HttpTransport, Transport};
