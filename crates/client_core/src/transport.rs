//! Remote engine contract and its rspc-over-HTTP binding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use shared::protocol::{
    GameState, MoveInput, MoveRequest, RpcResponse, ECHO_PROCEDURE, MOVE_PROCEDURE,
    START_PROCEDURE,
};
use tracing::debug;
use url::Url;

use crate::error::EngineError;

/// The authoritative rules engine. The client never second-guesses its answers.
#[async_trait]
pub trait ChessEngine: Send + Sync {
    async fn start(&self) -> Result<GameState, EngineError>;
    async fn make_move(
        &self,
        request: &MoveRequest,
        context: &GameState,
    ) -> Result<GameState, EngineError>;
}

pub struct HttpChessEngine {
    http: Client,
    base: Url,
}

impl HttpChessEngine {
    pub fn new(server_url: &str) -> Result<Self, EngineError> {
        Ok(Self {
            http: Client::new(),
            base: parse_base_url(server_url)?,
        })
    }

    pub fn with_timeout(server_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base: parse_base_url(server_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Round-trips `input` through the engine's `echo` query.
    pub async fn echo(&self, input: &str) -> Result<String, EngineError> {
        self.query(ECHO_PROCEDURE, Some(&input)).await
    }

    /// Plain liveness probe outside the rspc router.
    pub async fn health(&self) -> Result<String, EngineError> {
        let url = self.join("health")?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Status {
                procedure: "health".to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }

    fn join(&self, path: &str) -> Result<Url, EngineError> {
        self.base
            .join(path)
            .map_err(|err| EngineError::InvalidUrl(format!("{path}: {err}")))
    }

    async fn query<I, O>(&self, procedure: &str, input: Option<&I>) -> Result<O, EngineError>
    where
        I: Serialize + ?Sized + Sync,
        O: DeserializeOwned,
    {
        let url = self.join(&format!("rspc/{procedure}"))?;
        let mut request = self.http.get(url);
        if let Some(input) = input {
            request = request.query(&[("input", serde_json::to_string(input)?)]);
        }
        debug!(procedure, "engine query");
        self.execute(procedure, request).await
    }

    async fn mutation<I, O>(&self, procedure: &str, input: &I) -> Result<O, EngineError>
    where
        I: Serialize + ?Sized + Sync,
        O: DeserializeOwned,
    {
        let url = self.join(&format!("rspc/{procedure}"))?;
        debug!(procedure, "engine mutation");
        self.execute(procedure, self.http.post(url).json(input))
            .await
    }

    async fn execute<O: DeserializeOwned>(
        &self,
        procedure: &str,
        request: RequestBuilder,
    ) -> Result<O, EngineError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        match serde_json::from_slice::<RpcResponse<O>>(&body) {
            Ok(envelope) => envelope
                .into_result()
                .map_err(|err| EngineError::rejected(procedure, err)),
            Err(err) if status.is_success() => Err(EngineError::Decode(err)),
            Err(_) => Err(EngineError::Status {
                procedure: procedure.to_string(),
                status: status.as_u16(),
            }),
        }
    }
}

#[async_trait]
impl ChessEngine for HttpChessEngine {
    async fn start(&self) -> Result<GameState, EngineError> {
        self.query::<(), _>(START_PROCEDURE, None).await
    }

    async fn make_move(
        &self,
        request: &MoveRequest,
        context: &GameState,
    ) -> Result<GameState, EngineError> {
        let input: MoveInput = (request.clone(), context.clone());
        self.mutation(MOVE_PROCEDURE, &input).await
    }
}

fn parse_base_url(server_url: &str) -> Result<Url, EngineError> {
    let mut base = Url::parse(server_url.trim())
        .map_err(|err| EngineError::InvalidUrl(format!("{server_url}: {err}")))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(EngineError::InvalidUrl(format!(
            "{server_url}: scheme must be http or https"
        )));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
