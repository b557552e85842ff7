use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{Level, PlayerTurn};

/// Full game state as reported by the oracle after any action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    /// Last accepted word. `None` (absent, null or empty) until the game starts.
    #[serde(default, deserialize_with = "non_empty_string")]
    pub current_word: Option<String>,
    pub used_words: Vec<String>,
    pub message: String,
    pub player_turn: PlayerTurn,
    pub game_over: bool,
    #[serde(
        default,
        rename = "gemini_error_message",
        alias = "opponent_error_message",
        deserialize_with = "non_empty_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub opponent_error_message: Option<String>,
}

impl GameStateSnapshot {
    /// The entry played before `current_word`.
    ///
    /// After the opponent moves, `current_word` holds the opponent's word and
    /// the oracle carries no separate field for the word the human answered,
    /// so it is read back positionally from the history.
    pub fn word_before_current(&self) -> Option<&str> {
        self.used_words
            .len()
            .checked_sub(2)
            .and_then(|index| self.used_words.get(index))
            .map(String::as_str)
    }
}

fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.is_empty()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitWordRequest {
    pub word: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectLevelRequest {
    pub level: Level,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectLevelResponse {
    pub status: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl SelectLevelResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}
