use std::{
    io::{self, BufRead},
    thread,
};

use client_core::InputEvent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum LineCommand {
    Input(InputEvent),
    Quit,
    Blank,
}

pub fn parse_line(line: &str) -> LineCommand {
    match line.trim() {
        "" => LineCommand::Blank,
        ":reset" => LineCommand::Input(InputEvent::Reset),
        ":quit" | ":q" => LineCommand::Quit,
        word => LineCommand::Input(InputEvent::Submit(word.to_string())),
    }
}

/// Reads stdin on a plain thread so a pending read never holds the runtime
/// open after the session ends.
pub fn spawn_stdin_reader(tx: mpsc::Sender<InputEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(error = %err, "stdin read failed");
                    break;
                }
            };
            match parse_line(&line) {
                LineCommand::Blank => continue,
                LineCommand::Quit => break,
                LineCommand::Input(event) => {
                    if tx.blocking_send(event).is_err() {
                        break;
                    }
                }
            }
        }
        debug!("stdin reader finished");
    });
}
