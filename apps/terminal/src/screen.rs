//! Line-oriented rendering of the session onto a terminal.

use std::io::Write;

use client_core::{Emphasis, NavigationPort, PresentationPort};
use url::Url;

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[0m";

/// Prints the word and the history only when they change, so a snapshot that
/// re-sends them does not flood the terminal. Messages are verdicts and are
/// printed every time.
pub struct TerminalPresentation<W: Write + Send> {
    out: W,
    current_word: Option<String>,
    opponent_word: Option<String>,
    used_words: Option<Vec<String>>,
    input_enabled: bool,
}

impl<W: Write + Send> TerminalPresentation<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            current_word: None,
            opponent_word: None,
            used_words: None,
            input_enabled: false,
        }
    }
}

impl<W: Write + Send> PresentationPort for TerminalPresentation<W> {
    fn set_current_word(&mut self, word: &str) {
        if self.current_word.as_deref() == Some(word) {
            return;
        }
        self.current_word = Some(word.to_string());
        let _ = writeln!(self.out, "いまの単語: {word}");
    }

    fn set_opponent_word(&mut self, word: &str) {
        if self.opponent_word.as_deref() == Some(word) {
            return;
        }
        self.opponent_word = Some(word.to_string());
        if !word.is_empty() {
            let _ = writeln!(self.out, "相手の単語: {word}");
        }
    }

    fn set_message(&mut self, text: &str, emphasis: Emphasis) {
        let _ = match emphasis {
            Emphasis::Normal => writeln!(self.out, "{text}"),
            Emphasis::Terminal => writeln!(self.out, "{RED}{text}{RESET}"),
        };
    }

    fn set_used_words(&mut self, words: &[String]) {
        if self.used_words.as_deref() == Some(words) {
            return;
        }
        self.used_words = Some(words.to_vec());
        if words.is_empty() {
            let _ = writeln!(self.out, "使った単語: (まだありません)");
        } else {
            let _ = writeln!(self.out, "使った単語: {}", words.join(" → "));
        }
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        if enabled && !self.input_enabled {
            let _ = write!(self.out, "> ");
            let _ = self.out.flush();
        }
        self.input_enabled = enabled;
    }

    fn set_opponent_error_banner(&mut self, text: Option<&str>) {
        if let Some(text) = text {
            let _ = writeln!(self.out, "{YELLOW}[相手] {text}{RESET}");
        }
    }

    fn set_error_banner(&mut self, text: Option<&str>) {
        if let Some(text) = text {
            let _ = writeln!(self.out, "{RED}{text}{RESET}");
            let _ = writeln!(self.out, ":reset で新しいゲームを始められます");
        }
    }
}

pub struct TerminalNavigation<W: Write + Send> {
    results_url: Url,
    out: W,
}

impl<W: Write + Send> TerminalNavigation<W> {
    pub fn new(results_url: Url, out: W) -> Self {
        Self { results_url, out }
    }
}

impl<W: Write + Send> NavigationPort for TerminalNavigation<W> {
    fn go_to_results(&mut self) {
        let _ = writeln!(self.out, "結果はこちら: {}", self.results_url);
        let _ = self.out.flush();
    }
}
