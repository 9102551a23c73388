use serde::{Deserialize, Serialize};

use crate::{
    domain::{BoardStatus, Piece, PieceVariant, Team},
    error::{ApiError, CoordinateError},
    square::{SquareId, SquareIndex, NUM_FILES, NUM_SQUARES},
};

pub const START_PROCEDURE: &str = "chess.start";
pub const MOVE_PROCEDURE: &str = "chess.move";
pub const ECHO_PROCEDURE: &str = "echo";

/// 64 slots addressed by [`SquareIndex`]. On the wire this is a plain array of
/// `Piece | null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Option<Piece>>", into = "Vec<Option<Piece>>")]
pub struct Board([Option<Piece>; NUM_SQUARES]);

impl Board {
    pub fn empty() -> Self {
        Self([None; NUM_SQUARES])
    }

    pub fn get(&self, index: SquareIndex) -> Option<Piece> {
        self.0[index.get()]
    }

    pub fn get_by_id(&self, id: SquareId) -> Option<Piece> {
        self.get(id.to_index())
    }

    /// Parses the piece-placement field of FEN. Anything after the first space is ignored.
    pub fn from_placement(placement: &str) -> Result<Self, CoordinateError> {
        let malformed = || CoordinateError::MalformedPlacement(placement.to_string());
        let field = placement.split_whitespace().next().ok_or_else(malformed)?;
        let rows: Vec<&str> = field.split('/').collect();
        if rows.len() != NUM_FILES as usize {
            return Err(malformed());
        }

        let mut board = Self::empty();
        let mut index = 0usize;
        for row in rows {
            let row_start = index;
            for c in row.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip > NUM_FILES as u32 {
                        return Err(malformed());
                    }
                    index += skip as usize;
                } else {
                    let piece = Piece::from_char(c).ok_or_else(malformed)?;
                    if index >= row_start + NUM_FILES as usize {
                        return Err(malformed());
                    }
                    board.0[index] = Some(piece);
                    index += 1;
                }
            }
            if index != row_start + NUM_FILES as usize {
                return Err(malformed());
            }
        }
        Ok(board)
    }

    pub fn placement(&self) -> String {
        let mut out = String::new();
        for (row_number, row) in self.0.chunks(NUM_FILES as usize).enumerate() {
            if row_number > 0 {
                out.push('/');
            }
            let mut empty = 0;
            for slot in row {
                match slot {
                    Some(piece) => {
                        if empty > 0 {
                            out.push_str(&empty.to_string());
                            empty = 0;
                        }
                        out.push(piece.to_char());
                    }
                    None => empty += 1,
                }
            }
            if empty > 0 {
                out.push_str(&empty.to_string());
            }
        }
        out
    }
}

impl TryFrom<Vec<Option<Piece>>> for Board {
    type Error = CoordinateError;

    fn try_from(value: Vec<Option<Piece>>) -> Result<Self, Self::Error> {
        let len = value.len();
        let squares: [Option<Piece>; NUM_SQUARES] = value
            .try_into()
            .map_err(|_| CoordinateError::BoardSize(len))?;
        Ok(Self(squares))
    }
}

impl From<Board> for Vec<Option<Piece>> {
    fn from(value: Board) -> Self {
        value.0.to_vec()
    }
}

/// A legal move as asserted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub origin: SquareId,
    pub destination: SquareId,
    pub takes: bool,
    pub piece: PieceVariant,
    #[serde(default)]
    pub promotion: Option<PieceVariant>,
}

/// A candidate move sent to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub origin: SquareId,
    pub destination: SquareId,
    pub takes: bool,
    pub piece: PieceVariant,
    pub promotion: Option<PieceVariant>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub team_to_move: Team,
    pub moves: Vec<Move>,
    pub board: Board,
    #[serde(default)]
    pub status: BoardStatus,
}

impl GameState {
    pub fn piece_at(&self, index: SquareIndex) -> Option<Piece> {
        self.board.get(index)
    }

    pub fn moves_from(&self, origin: SquareId) -> impl Iterator<Item = &Move> + '_ {
        self.moves.iter().filter(move |m| m.origin == origin)
    }
}

/// Input of the `chess.move` mutation, serialized as a two-element array.
pub type MoveInput = (MoveRequest, GameState);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub result: RpcResult<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum RpcResult<T> {
    Response(T),
    Error(ApiError),
}

impl<T> RpcResponse<T> {
    pub fn response(data: T) -> Self {
        Self {
            id: None,
            result: RpcResult::Response(data),
        }
    }

    pub fn error(error: ApiError) -> Self {
        Self {
            id: None,
            result: RpcResult::Error(error),
        }
    }

    pub fn into_result(self) -> Result<T, ApiError> {
        match self.result {
            RpcResult::Response(data) => Ok(data),
            RpcResult::Error(error) => Err(error),
        }
    }
}
