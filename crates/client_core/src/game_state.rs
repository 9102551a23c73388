use std::sync::Arc;

use shared::protocol::{GameState, MoveRequest};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::{error::StoreError, store::Store, transport::ChessEngine};

/// Cache of the one authoritative [`GameState`].
///
/// The cached value only ever changes by wholesale replacement with an engine
/// response; nothing here inspects or merges its contents.
pub struct GameStateStore {
    engine: Arc<dyn ChessEngine>,
    state: Store<Option<Arc<GameState>>>,
    start_gate: Mutex<()>,
}

impl GameStateStore {
    pub fn new(engine: Arc<dyn ChessEngine>) -> Self {
        Self {
            engine,
            state: Store::new(None),
            start_gate: Mutex::new(()),
        }
    }

    /// Fetches the initial game once. Later calls return whatever is cached.
    pub async fn start(&self) -> Result<Arc<GameState>, StoreError> {
        if let Some(state) = self.state.snapshot() {
            return Ok(state);
        }

        let _gate = self.start_gate.lock().await;
        if let Some(state) = self.state.snapshot() {
            return Ok(state);
        }

        let state = Arc::new(self.engine.start().await.map_err(|err| {
            warn!(%err, "chess: failed to fetch initial game state");
            err
        })?);
        info!(
            team_to_move = %state.team_to_move,
            moves = state.moves.len(),
            "chess: game started"
        );
        self.state.replace(Some(Arc::clone(&state)));
        Ok(state)
    }

    /// Submits `request` with the cached state as context and replaces the cache with
    /// the engine's answer. On failure the cache is left as it was.
    pub async fn make_move(&self, request: MoveRequest) -> Result<Arc<GameState>, StoreError> {
        let context = self.state.snapshot().ok_or(StoreError::NotStarted)?;

        let next = match self.engine.make_move(&request, &context).await {
            Ok(next) => Arc::new(next),
            Err(err) => {
                warn!(
                    origin = %request.origin,
                    destination = %request.destination,
                    %err,
                    "chess: move rejected"
                );
                return Err(err.into());
            }
        };

        info!(
            origin = %request.origin,
            destination = %request.destination,
            promotion = ?request.promotion,
            team_to_move = %next.team_to_move,
            "chess: move applied"
        );
        self.state.replace(Some(Arc::clone(&next)));
        Ok(next)
    }

    pub fn snapshot(&self) -> Option<Arc<GameState>> {
        self.state.snapshot()
    }

    /// Waits until a game state has been published.
    pub async fn current(&self) -> Result<Arc<GameState>, StoreError> {
        let mut rx = self.state.subscribe();
        let state = rx
            .wait_for(Option::is_some)
            .await
            .map_err(|_| StoreError::Closed)?;
        state.clone().ok_or(StoreError::NotStarted)
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<GameState>>> {
        self.state.subscribe()
    }
}
