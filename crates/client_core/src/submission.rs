use std::sync::Arc;

use shared::{
    domain::PieceVariant,
    protocol::{GameState, Move, MoveRequest},
    square::SquareIndex,
};
use tracing::info;

use crate::{
    error::SubmissionError,
    game_state::GameStateStore,
    interaction::Selection,
    promotion::{PromotionPrompt, PromotionRequest, PromptResolution, PromptSlot},
};

#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Submitted(Arc<GameState>),
    /// The user dismissed the promotion prompt; nothing was sent.
    Cancelled,
}

/// Turns a selection plus destination into a [`MoveRequest`], asking for a promotion
/// target first when the engine offered more than one.
pub struct MoveSubmissionProtocol {
    games: Arc<GameStateStore>,
    prompt: Arc<dyn PromotionPrompt>,
    slot: PromptSlot,
}

impl MoveSubmissionProtocol {
    pub fn new(
        games: Arc<GameStateStore>,
        prompt: Arc<dyn PromotionPrompt>,
        slot: PromptSlot,
    ) -> Self {
        Self {
            games,
            prompt,
            slot,
        }
    }

    pub async fn submit(
        &self,
        selection: &Selection,
        destination: SquareIndex,
        game: &GameState,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let destination_id = destination.to_id();
        let candidates: Vec<&Move> = selection.candidates(destination_id).collect();
        if candidates.is_empty() {
            return Err(SubmissionError::NoCandidate {
                origin: selection.square.to_string(),
                destination: destination_id.to_string(),
            });
        }

        let takes = game
            .piece_at(destination)
            .is_some_and(|piece| piece.team == selection.team.opponent());

        let options = promotion_options(&candidates);
        let promotion = if options.is_empty() {
            None
        } else {
            let request = PromotionRequest {
                square: destination_id,
                team: selection.team,
                options,
            };
            match self.choose_promotion(&request).await? {
                PromptResolution::Chosen(variant) => Some(variant),
                PromptResolution::Cancelled => {
                    info!(
                        origin = %selection.square,
                        destination = %destination_id,
                        "promotion: cancelled, no move sent"
                    );
                    return Ok(SubmissionOutcome::Cancelled);
                }
            }
        };

        let request = MoveRequest {
            origin: selection.square,
            destination: destination_id,
            takes,
            piece: selection.variant,
            promotion,
        };
        let next = self.games.make_move(request).await?;
        Ok(SubmissionOutcome::Submitted(next))
    }

    async fn choose_promotion(
        &self,
        request: &PromotionRequest,
    ) -> Result<PromptResolution, SubmissionError> {
        let handle = self.slot.acquire()?;
        let resolution = tokio::select! {
            resolution = self.prompt.choose(request) => {
                resolution.map_err(SubmissionError::PromptFailed)
            }
            _ = handle.cancelled() => Ok(PromptResolution::Cancelled),
        };
        handle.close();

        let resolution = resolution?;
        if let PromptResolution::Chosen(choice) = resolution {
            if !request.options.contains(&choice) {
                return Err(SubmissionError::UnofferedPromotion {
                    choice: choice.to_string(),
                });
            }
        }
        Ok(resolution)
    }
}

/// Distinct promotion targets among `candidates`, in engine order. Empty means the
/// destination is unambiguous.
fn promotion_options(candidates: &[&Move]) -> Vec<PieceVariant> {
    let mut options = Vec::new();
    for variant in candidates.iter().filter_map(|m| m.promotion) {
        if !options.contains(&variant) {
            options.push(variant);
        }
    }
    options
}

#[cfg(test)]
#[path = "tests/submission_tests.rs"]
mod tests;
