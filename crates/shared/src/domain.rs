use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    White,
    Black,
}

impl Team {
    pub fn opponent(self) -> Self {
        match self {
            Team::White => Team::Black,
            Team::Black => Team::White,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::White => f.write_str("White"),
            Team::Black => f.write_str("Black"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceVariant {
    Pawn,
    Bishop,
    Knight,
    Rook,
    Queen,
    King,
}

impl PieceVariant {
    /// Lowercase letter used by FEN and the terminal board; `n` stands for the knight.
    pub fn letter(self) -> char {
        match self {
            PieceVariant::Pawn => 'p',
            PieceVariant::Bishop => 'b',
            PieceVariant::Knight => 'n',
            PieceVariant::Rook => 'r',
            PieceVariant::Queen => 'q',
            PieceVariant::King => 'k',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'p' => Some(PieceVariant::Pawn),
            'b' => Some(PieceVariant::Bishop),
            'n' => Some(PieceVariant::Knight),
            'r' => Some(PieceVariant::Rook),
            'q' => Some(PieceVariant::Queen),
            'k' => Some(PieceVariant::King),
            _ => None,
        }
    }
}

impl fmt::Display for PieceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PieceVariant::Pawn => "Pawn",
            PieceVariant::Bishop => "Bishop",
            PieceVariant::Knight => "Knight",
            PieceVariant::Rook => "Rook",
            PieceVariant::Queen => "Queen",
            PieceVariant::King => "King",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    pub team: Team,
    pub variant: PieceVariant,
}

impl Piece {
    pub const fn new(team: Team, variant: PieceVariant) -> Self {
        Self { team, variant }
    }

    /// Uppercase for white, lowercase for black.
    pub fn to_char(self) -> char {
        let letter = self.variant.letter();
        match self.team {
            Team::White => letter.to_ascii_uppercase(),
            Team::Black => letter,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        let variant = PieceVariant::from_letter(c)?;
        let team = if c.is_ascii_uppercase() {
            Team::White
        } else {
            Team::Black
        };
        Some(Self { team, variant })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoardStatus {
    #[default]
    Ongoing,
    Stalemate,
    Checkmate,
}
