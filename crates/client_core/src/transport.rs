//! Request/response exchanges with the game oracle.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::Level,
    protocol::{GameStateSnapshot, SelectLevelRequest, SelectLevelResponse, SubmitWordRequest},
};
use tracing::debug;
use url::Url;

use crate::{
    config::Settings,
    error::{LevelSelectionError, TransportError},
};

/// One of the four remote actions a session can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Bootstrap,
    SubmitMove { word: String },
    RequestOpponentMove,
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Bootstrap,
    SubmitMove,
    RequestOpponentMove,
    Reset,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Bootstrap => ActionKind::Bootstrap,
            Action::SubmitMove { .. } => ActionKind::SubmitMove,
            Action::RequestOpponentMove => ActionKind::RequestOpponentMove,
            Action::Reset => ActionKind::Reset,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }
}

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Bootstrap => "bootstrap",
            ActionKind::SubmitMove => "submit_move",
            ActionKind::RequestOpponentMove => "request_opponent_move",
            ActionKind::Reset => "reset",
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn call(&self, action: &Action) -> std::result::Result<GameStateSnapshot, TransportError>;
}

#[derive(Debug, Clone)]
struct EndpointUrls {
    bootstrap: Url,
    submit_move: Url,
    opponent_move: Url,
    reset: Url,
    select_level: Url,
}

#[derive(Serialize)]
struct EmptyBody {}

/// HTTP transport bound to one oracle session.
///
/// The oracle tracks the game in a cookie-backed session, so every action must
/// go through the same client and its cookie jar.
pub struct HttpTransport {
    http: Client,
    urls: EndpointUrls,
}

impl HttpTransport {
    pub fn new(settings: &Settings) -> Result<Self> {
        let endpoints = &settings.endpoints;
        let urls = EndpointUrls {
            bootstrap: settings.resolve(&endpoints.bootstrap)?,
            submit_move: settings.resolve(&endpoints.submit_move)?,
            opponent_move: settings.resolve(&endpoints.opponent_move)?,
            reset: settings.resolve(&endpoints.reset)?,
            select_level: settings.resolve(&endpoints.select_level)?,
        };
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .context("failed to build oracle http client")?;
        Ok(Self { http, urls })
    }

    /// Chooses the opponent's difficulty for the session this transport
    /// plays in. Returns the level name the oracle confirmed.
    pub async fn select_level(&self, level: Level) -> std::result::Result<String, LevelSelectionError> {
        debug!(%level, url = %self.urls.select_level, "selecting level");
        let res = self
            .http
            .post(self.urls.select_level.clone())
            .json(&SelectLevelRequest { level })
            .send()
            .await
            .map_err(TransportError::from)?;
        let body: SelectLevelResponse = read_json(res).await?;
        if !body.is_success() {
            return Err(LevelSelectionError::Rejected(
                body.message.unwrap_or(body.status),
            ));
        }
        Ok(body.level.unwrap_or_else(|| level.to_string()))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn call(&self, action: &Action) -> std::result::Result<GameStateSnapshot, TransportError> {
        let request = match action {
            Action::Bootstrap => self.http.get(self.urls.bootstrap.clone()),
            Action::SubmitMove { word } => self
                .http
                .post(self.urls.submit_move.clone())
                .json(&SubmitWordRequest { word: word.clone() }),
            Action::RequestOpponentMove => self
                .http
                .post(self.urls.opponent_move.clone())
                .json(&EmptyBody {}),
            Action::Reset => self.http.post(self.urls.reset.clone()).json(&EmptyBody {}),
        };
        debug!(action = action.name(), "sending oracle request");
        let res = request.send().await?;
        read_json(res).await
    }
}

async fn read_json<T: DeserializeOwned>(res: Response) -> std::result::Result<T, TransportError> {
    let status = res.status();
    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
        });
    }
    let body = res.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| TransportError::Malformed(err.to_string()))
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
