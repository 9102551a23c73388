use std::sync::Arc;

use shared::{
    protocol::GameState,
    square::{SquareId, SquareIndex},
};
use tokio::sync::watch;

pub mod error;
pub mod game_state;
pub mod interaction;
pub mod promotion;
pub mod store;
pub mod submission;
pub mod transport;

pub use error::{ClickError, EngineError, PromptError, StoreError, SubmissionError};
pub use game_state::GameStateStore;
pub use interaction::{
    ClickOutcome, InteractionState, InteractionStateMachine, Selection, SquareHint,
};
pub use promotion::{PromotionPrompt, PromotionRequest, PromptResolution, PromptSlot};
pub use submission::{MoveSubmissionProtocol, SubmissionOutcome};
pub use transport::{ChessEngine, HttpChessEngine};

/// One board session: the game cache, the selection machine and the promotion slot,
/// wired together.
pub struct BoardClient {
    games: Arc<GameStateStore>,
    interaction: InteractionStateMachine,
    prompt_slot: PromptSlot,
}

impl BoardClient {
    pub fn new(engine: Arc<dyn ChessEngine>, prompt: Arc<dyn PromotionPrompt>) -> Self {
        let games = Arc::new(GameStateStore::new(engine));
        let prompt_slot = PromptSlot::new();
        let protocol =
            MoveSubmissionProtocol::new(Arc::clone(&games), prompt, prompt_slot.clone());
        let interaction = InteractionStateMachine::new(Arc::clone(&games), protocol);
        Self {
            games,
            interaction,
            prompt_slot,
        }
    }

    pub async fn start(&self) -> Result<Arc<GameState>, StoreError> {
        self.games.start().await
    }

    pub async fn click(&self, target: SquareIndex) -> Result<ClickOutcome, ClickError> {
        self.interaction.click(target).await
    }

    pub async fn click_square(&self, square: SquareId) -> Result<ClickOutcome, ClickError> {
        self.interaction.click(square.to_index()).await
    }

    pub fn game_state(&self) -> Option<Arc<GameState>> {
        self.games.snapshot()
    }

    pub fn interaction(&self) -> InteractionState {
        self.interaction.snapshot()
    }

    pub fn subscribe_game_state(&self) -> watch::Receiver<Option<Arc<GameState>>> {
        self.games.subscribe()
    }

    pub fn subscribe_interaction(&self) -> watch::Receiver<InteractionState> {
        self.interaction.subscribe()
    }

    pub fn clear_selection(&self) {
        self.interaction.reset();
    }

    /// Dismisses the open promotion prompt, if there is one.
    pub fn cancel_promotion(&self) -> bool {
        self.prompt_slot.cancel_active()
    }

    pub fn promotion_pending(&self) -> bool {
        self.prompt_slot.is_active()
    }

    /// Per-square hints in index order, once the game has loaded.
    pub fn hints(&self) -> Option<Vec<SquareHint>> {
        let game = self.games.snapshot()?;
        let state = self.interaction.snapshot();
        Some(
            SquareIndex::all()
                .map(|index| state.hint(&game, index))
                .collect(),
        )
    }
}

#[cfg(test)]
mod test_support;

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
