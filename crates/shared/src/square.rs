//! Square addressing: files, ranks, square ids (`e4`) and the canonical 0..64 index.
//!
//! Index 0 is `a8` and index 63 is `h1`: the board is stored rank-major starting from
//! rank 8, so `index = (7 - rank) * 8 + file` with 0-based ordinals.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CoordinateError;

pub const NUM_FILES: u8 = 8;
pub const NUM_RANKS: u8 = 8;
pub const NUM_SQUARES: usize = (NUM_FILES as usize) * (NUM_RANKS as usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct File(u8);

impl File {
    pub const fn new(ordinal: u8) -> Self {
        assert!(ordinal < NUM_FILES);
        Self(ordinal)
    }

    pub fn from_char(c: char) -> Result<Self, CoordinateError> {
        match c {
            'a'..='h' => Ok(Self(c as u8 - b'a')),
            _ => Err(CoordinateError::InvalidFile(c)),
        }
    }

    pub const fn ordinal(self) -> u8 {
        self.0
    }

    pub const fn to_char(self) -> char {
        (b'a' + self.0) as char
    }

    pub fn all() -> impl DoubleEndedIterator<Item = Self> + Clone {
        (0..NUM_FILES).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank(u8);

impl Rank {
    /// `ordinal` is 0-based: rank `1` has ordinal 0.
    pub const fn new(ordinal: u8) -> Self {
        assert!(ordinal < NUM_RANKS);
        Self(ordinal)
    }

    pub fn from_char(c: char) -> Result<Self, CoordinateError> {
        match c {
            '1'..='8' => Ok(Self(c as u8 - b'1')),
            _ => Err(CoordinateError::InvalidRank(c)),
        }
    }

    pub const fn ordinal(self) -> u8 {
        self.0
    }

    pub const fn to_char(self) -> char {
        (b'1' + self.0) as char
    }

    pub fn all() -> impl DoubleEndedIterator<Item = Self> + Clone {
        (0..NUM_RANKS).map(Self)
    }
}

/// Canonical board address in `0..64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SquareIndex(u8);

impl SquareIndex {
    pub const fn new(index: u8) -> Self {
        assert!((index as usize) < NUM_SQUARES);
        Self(index)
    }

    /// Checks an untrusted integer against `[0, 64)`.
    pub fn validate(index: i64) -> Result<Self, CoordinateError> {
        if (0..NUM_SQUARES as i64).contains(&index) {
            Ok(Self(index as u8))
        } else {
            Err(CoordinateError::IndexOutOfRange(index))
        }
    }

    pub const fn from_coords(file: File, rank: Rank) -> Self {
        Self((NUM_RANKS - 1 - rank.0) * NUM_FILES + file.0)
    }

    pub const fn get(self) -> usize {
        self.0 as usize
    }

    pub const fn file(self) -> File {
        File(self.0 % NUM_FILES)
    }

    pub const fn rank(self) -> Rank {
        Rank(NUM_RANKS - 1 - self.0 / NUM_FILES)
    }

    pub const fn to_id(self) -> SquareId {
        SQUARE_IDS[self.0 as usize]
    }

    pub fn all() -> impl DoubleEndedIterator<Item = Self> + Clone {
        (0..NUM_SQUARES as u8).map(Self)
    }
}

impl fmt::Display for SquareIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Algebraic square name such as `e4`. Serialized as that string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SquareId {
    file: File,
    rank: Rank,
}

impl SquareId {
    pub const fn new(file: File, rank: Rank) -> Self {
        Self { file, rank }
    }

    pub const fn file(self) -> File {
        self.file
    }

    pub const fn rank(self) -> Rank {
        self.rank
    }

    pub const fn to_index(self) -> SquareIndex {
        SquareIndex::from_coords(self.file, self.rank)
    }
}

/// Every square id in index order (`a8`, `b8`, ..., `h1`).
pub const SQUARE_IDS: [SquareId; NUM_SQUARES] = build_square_ids();

const fn build_square_ids() -> [SquareId; NUM_SQUARES] {
    let mut ids = [SquareId::new(File(0), Rank(0)); NUM_SQUARES];
    let mut index = 0;
    while index < NUM_SQUARES {
        let file = (index % NUM_FILES as usize) as u8;
        let rank = NUM_RANKS - 1 - (index / NUM_FILES as usize) as u8;
        ids[index] = SquareId::new(File(file), Rank(rank));
        index += 1;
    }
    ids
}

impl fmt::Display for SquareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.file.to_char(), self.rank.to_char())
    }
}

impl FromStr for SquareId {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(file), Some(rank), None) => {
                let file = File::from_char(file)
                    .map_err(|_| CoordinateError::MalformedSquareId(s.to_string()))?;
                let rank = Rank::from_char(rank)
                    .map_err(|_| CoordinateError::MalformedSquareId(s.to_string()))?;
                Ok(Self::new(file, rank))
            }
            _ => Err(CoordinateError::MalformedSquareId(s.to_string())),
        }
    }
}

impl TryFrom<String> for SquareId {
    type Error = CoordinateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SquareId> for String {
    fn from(value: SquareId) -> Self {
        value.to_string()
    }
}

impl From<SquareId> for SquareIndex {
    fn from(value: SquareId) -> Self {
        value.to_index()
    }
}

impl From<SquareIndex> for SquareId {
    fn from(value: SquareIndex) -> Self {
        value.to_id()
    }
}
