//! Seams between the session controller and whatever front end hosts it.

/// How the game message should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Normal,
    /// Final message of a finished game.
    Terminal,
}

/// Write-only display surface. Implementations must not block and cannot
/// report failures back to the controller.
pub trait PresentationPort: Send {
    fn set_current_word(&mut self, word: &str);
    fn set_opponent_word(&mut self, word: &str);
    fn set_message(&mut self, text: &str, emphasis: Emphasis);
    /// Replaces the whole history, rendered in play order.
    fn set_used_words(&mut self, words: &[String]);
    fn set_input_enabled(&mut self, enabled: bool);
    fn set_opponent_error_banner(&mut self, text: Option<&str>);
    fn set_error_banner(&mut self, text: Option<&str>);
}

pub trait NavigationPort: Send {
    fn go_to_results(&mut self);
}

/// Triggers produced by the human side. The bootstrap trigger is fired by the
/// controller itself when it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Submit(String),
    Reset,
}
