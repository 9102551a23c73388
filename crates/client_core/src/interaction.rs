//! Click-to-move selection state.
//!
//! [`InteractionState::plan`] is the whole transition table; it looks only at the
//! engine-provided move list, never at chess rules. [`InteractionStateMachine`] applies
//! the plan and hands completed moves to the [`MoveSubmissionProtocol`].

use std::sync::Arc;

use shared::{
    domain::{Piece, PieceVariant, Team},
    protocol::{GameState, Move},
    square::{SquareId, SquareIndex},
};
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::{
    error::ClickError,
    game_state::GameStateStore,
    store::Store,
    submission::{MoveSubmissionProtocol, SubmissionOutcome},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub index: SquareIndex,
    pub square: SquareId,
    pub team: Team,
    pub variant: PieceVariant,
    /// Every engine move whose origin is `square`.
    pub legal_destinations: Vec<Move>,
}

impl Selection {
    fn new(game: &GameState, index: SquareIndex, piece: Piece) -> Self {
        let square = index.to_id();
        Self {
            index,
            square,
            team: piece.team,
            variant: piece.variant,
            legal_destinations: game.moves_from(square).cloned().collect(),
        }
    }

    /// Moves landing on `destination`. Several entries mean promotion alternatives.
    pub fn candidates(&self, destination: SquareId) -> impl Iterator<Item = &Move> + '_ {
        self.legal_destinations
            .iter()
            .filter(move |m| m.destination == destination)
    }

    pub fn can_reach(&self, destination: SquareId) -> bool {
        self.candidates(destination).next().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Selected(Selection),
}

/// What a click at some square should do, given the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Select(Selection),
    /// The selected square was clicked again.
    Deselect,
    /// A click that neither selects nor reaches a legal destination.
    Clear,
    /// Nothing to do (Idle and the square holds no piece of the side to move).
    Ignore,
    Submit {
        selection: Selection,
        destination: SquareIndex,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareHint {
    None,
    /// A piece of the side to move that can be picked up.
    Grab,
    Selected,
    MoveTarget { takes: bool },
    /// Occupied, but not a destination of the current selection.
    Blocked,
}

impl InteractionState {
    pub fn selection(&self) -> Option<&Selection> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Selected(selection) => Some(selection),
        }
    }

    pub fn plan(&self, game: &GameState, target: SquareIndex) -> Transition {
        let piece = game.piece_at(target);
        match self {
            InteractionState::Idle => match piece {
                Some(piece) if piece.team == game.team_to_move => {
                    Transition::Select(Selection::new(game, target, piece))
                }
                _ => Transition::Ignore,
            },
            InteractionState::Selected(selection) => {
                if selection.index == target {
                    return Transition::Deselect;
                }
                if let Some(piece) = piece.filter(|piece| piece.team == selection.team) {
                    return Transition::Select(Selection::new(game, target, piece));
                }
                if selection.can_reach(target.to_id()) {
                    Transition::Submit {
                        selection: selection.clone(),
                        destination: target,
                    }
                } else {
                    Transition::Clear
                }
            }
        }
    }

    pub fn hint(&self, game: &GameState, index: SquareIndex) -> SquareHint {
        let piece = game.piece_at(index);
        match self {
            InteractionState::Idle => {
                if piece.is_some_and(|piece| piece.team == game.team_to_move) {
                    SquareHint::Grab
                } else {
                    SquareHint::None
                }
            }
            InteractionState::Selected(selection) => {
                if selection.index == index {
                    SquareHint::Selected
                } else if let Some(m) = selection.candidates(index.to_id()).next() {
                    SquareHint::MoveTarget { takes: m.takes }
                } else if piece.is_some() {
                    SquareHint::Blocked
                } else {
                    SquareHint::None
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub enum ClickOutcome {
    Selected(SquareId),
    Deselected,
    Cleared,
    Ignored,
    Moved(Arc<GameState>),
    /// The promotion prompt was dismissed; the selection is kept.
    PromotionCancelled,
    /// A previous click is still being submitted; this one was dropped.
    Busy,
}

pub struct InteractionStateMachine {
    games: Arc<GameStateStore>,
    protocol: MoveSubmissionProtocol,
    state: Store<InteractionState>,
    in_flight: Mutex<()>,
}

impl InteractionStateMachine {
    pub fn new(games: Arc<GameStateStore>, protocol: MoveSubmissionProtocol) -> Self {
        Self {
            games,
            protocol,
            state: Store::new(InteractionState::Idle),
            in_flight: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> InteractionState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<InteractionState> {
        self.state.subscribe()
    }

    /// Drops any selection without touching the game.
    pub fn reset(&self) {
        self.state.replace(InteractionState::Idle);
    }

    /// Applies one click. Errors leave both the selection and the game state as they
    /// were before the click.
    pub async fn click(&self, target: SquareIndex) -> Result<ClickOutcome, ClickError> {
        let Ok(_in_flight) = self.in_flight.try_lock() else {
            debug!(square = %target.to_id(), "interaction: click ignored while a move is pending");
            return Ok(ClickOutcome::Busy);
        };

        let game = self.games.current().await?;
        let current = self.state.snapshot();
        let outcome = match current.plan(&game, target) {
            Transition::Select(selection) => {
                let square = selection.square;
                debug!(
                    %square,
                    destinations = selection.legal_destinations.len(),
                    "interaction: piece selected"
                );
                self.state.replace(InteractionState::Selected(selection));
                ClickOutcome::Selected(square)
            }
            Transition::Deselect => {
                self.state.replace(InteractionState::Idle);
                ClickOutcome::Deselected
            }
            Transition::Clear => {
                self.state.replace(InteractionState::Idle);
                ClickOutcome::Cleared
            }
            Transition::Ignore => ClickOutcome::Ignored,
            Transition::Submit {
                selection,
                destination,
            } => match self.protocol.submit(&selection, destination, &game).await? {
                SubmissionOutcome::Submitted(next) => {
                    self.state.replace(InteractionState::Idle);
                    ClickOutcome::Moved(next)
                }
                SubmissionOutcome::Cancelled => ClickOutcome::PromotionCancelled,
            },
        };
        Ok(outcome)
    }
}
