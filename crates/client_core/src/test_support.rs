//! Fixtures shared by the unit tests: positions, an in-memory engine and scripted prompts.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::anyhow;
use async_trait::async_trait;
use shared::{
    domain::{BoardStatus, PieceVariant, Team},
    protocol::{Board, GameState, Move, MoveRequest, MOVE_PROCEDURE},
    square::{SquareId, SquareIndex},
};
use tokio::sync::mpsc;

use crate::{
    error::EngineError,
    promotion::{PromotionPrompt, PromotionRequest, PromptResolution},
    transport::ChessEngine,
};

pub(crate) const START_PLACEMENT: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";
/// White pawn on e7 that can advance to e8 or capture the rook on d8.
pub(crate) const PROMOTION_PLACEMENT: &str = "k2r4/4P3/8/8/8/8/8/4K3";

pub(crate) fn sq(id: &str) -> SquareIndex {
    id.parse::<SquareId>().expect("square id").to_index()
}

pub(crate) fn mv(
    origin: &str,
    destination: &str,
    piece: PieceVariant,
    takes: bool,
    promotion: Option<PieceVariant>,
) -> Move {
    Move {
        origin: origin.parse().expect("origin"),
        destination: destination.parse().expect("destination"),
        takes,
        piece,
        promotion,
    }
}

pub(crate) fn pawn_push(origin: &str, destination: &str) -> Move {
    mv(origin, destination, PieceVariant::Pawn, false, None)
}

pub(crate) fn position(placement: &str, team_to_move: Team, moves: Vec<Move>) -> GameState {
    GameState {
        team_to_move,
        moves,
        board: Board::from_placement(placement).expect("placement"),
        status: BoardStatus::Ongoing,
    }
}

pub(crate) fn initial_position() -> GameState {
    let mut moves = Vec::new();
    for file in ['a', 'b', 'c', 'd', 'e', 'f', 'g', 'h'] {
        moves.push(pawn_push(&format!("{file}2"), &format!("{file}3")));
        moves.push(pawn_push(&format!("{file}2"), &format!("{file}4")));
    }
    for (origin, destination) in [("b1", "a3"), ("b1", "c3"), ("g1", "f3"), ("g1", "h3")] {
        moves.push(mv(origin, destination, PieceVariant::Knight, false, None));
    }
    position(START_PLACEMENT, Team::White, moves)
}

pub(crate) const PROMOTION_TARGETS: [PieceVariant; 4] = [
    PieceVariant::Knight,
    PieceVariant::Bishop,
    PieceVariant::Rook,
    PieceVariant::Queen,
];

pub(crate) fn promotion_position() -> GameState {
    let mut moves = Vec::new();
    for target in PROMOTION_TARGETS {
        moves.push(mv("e7", "e8", PieceVariant::Pawn, false, Some(target)));
    }
    for target in PROMOTION_TARGETS {
        moves.push(mv("e7", "d8", PieceVariant::Pawn, true, Some(target)));
    }
    for destination in ["d1", "d2", "e2", "f2", "f1"] {
        moves.push(mv("e1", destination, PieceVariant::King, false, None));
    }
    position(PROMOTION_PLACEMENT, Team::White, moves)
}

/// In-memory engine: serves a fixed start position and pops scripted move replies.
pub(crate) struct FakeEngine {
    start: GameState,
    start_delay: Duration,
    start_calls: Mutex<usize>,
    move_replies: Mutex<VecDeque<Result<GameState, &'static str>>>,
    move_calls: Mutex<Vec<(MoveRequest, GameState)>>,
}

impl FakeEngine {
    pub(crate) fn new(start: GameState) -> Self {
        Self {
            start,
            start_delay: Duration::ZERO,
            start_calls: Mutex::new(0),
            move_replies: Mutex::new(VecDeque::new()),
            move_calls: Mutex::new(Vec::new()),
        }
    }

    /// Makes every `start` call take `delay` before answering.
    pub(crate) fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    pub(crate) fn push_move_reply(&self, reply: Result<GameState, &'static str>) {
        self.move_replies.lock().unwrap().push_back(reply);
    }

    pub(crate) fn start_calls(&self) -> usize {
        *self.start_calls.lock().unwrap()
    }

    pub(crate) fn move_calls(&self) -> Vec<(MoveRequest, GameState)> {
        self.move_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChessEngine for FakeEngine {
    async fn start(&self) -> Result<GameState, EngineError> {
        *self.start_calls.lock().unwrap() += 1;
        if !self.start_delay.is_zero() {
            tokio::time::sleep(self.start_delay).await;
        }
        Ok(self.start.clone())
    }

    async fn make_move(
        &self,
        request: &MoveRequest,
        context: &GameState,
    ) -> Result<GameState, EngineError> {
        self.move_calls
            .lock()
            .unwrap()
            .push((request.clone(), context.clone()));
        let reply = self
            .move_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err("no scripted reply"));
        reply.map_err(|message| EngineError::Rejected {
            procedure: MOVE_PROCEDURE.to_string(),
            code: 409,
            message: message.to_string(),
        })
    }
}

/// Prompt that always answers the same way without waiting.
pub(crate) struct ImmediatePrompt(pub(crate) PromptResolution);

#[async_trait]
impl PromotionPrompt for ImmediatePrompt {
    async fn choose(&self, _request: &PromotionRequest) -> anyhow::Result<PromptResolution> {
        Ok(self.0)
    }
}

/// Prompt driven from the test through a [`PromptDriver`].
pub(crate) struct ScriptedPrompt {
    opened: mpsc::UnboundedSender<PromotionRequest>,
    answers: tokio::sync::Mutex<mpsc::UnboundedReceiver<anyhow::Result<PromptResolution>>>,
}

pub(crate) struct PromptDriver {
    opened: mpsc::UnboundedReceiver<PromotionRequest>,
    answers: mpsc::UnboundedSender<anyhow::Result<PromptResolution>>,
}

pub(crate) fn scripted_prompt() -> (Arc<ScriptedPrompt>, PromptDriver) {
    let (opened_tx, opened_rx) = mpsc::unbounded_channel();
    let (answers_tx, answers_rx) = mpsc::unbounded_channel();
    let prompt = ScriptedPrompt {
        opened: opened_tx,
        answers: tokio::sync::Mutex::new(answers_rx),
    };
    let driver = PromptDriver {
        opened: opened_rx,
        answers: answers_tx,
    };
    (Arc::new(prompt), driver)
}

#[async_trait]
impl PromotionPrompt for ScriptedPrompt {
    async fn choose(&self, request: &PromotionRequest) -> anyhow::Result<PromptResolution> {
        let _ = self.opened.send(request.clone());
        self.answers
            .lock()
            .await
            .recv()
            .await
            .unwrap_or_else(|| Err(anyhow!("prompt driver dropped")))
    }
}

impl PromptDriver {
    pub(crate) async fn next_request(&mut self) -> PromotionRequest {
        tokio::time::timeout(Duration::from_secs(2), self.opened.recv())
            .await
            .expect("prompt opened in time")
            .expect("prompt channel open")
    }

    pub(crate) fn answer(&self, resolution: PromptResolution) {
        self.answers.send(Ok(resolution)).expect("prompt listening");
    }

    pub(crate) fn fail(&self, message: &'static str) {
        self.answers
            .send(Err(anyhow!(message)))
            .expect("prompt listening");
    }
}
