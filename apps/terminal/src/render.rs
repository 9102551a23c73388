//! Plain-text board drawing.

use std::fmt::Write as _;

use client_core::{PromotionRequest, SquareHint};
use shared::{
    domain::BoardStatus,
    protocol::GameState,
    square::{File, Rank, SquareIndex},
};

/// Draws the board from White's side. `hints` is indexed like the board; a short
/// slice leaves the remaining squares unmarked.
pub fn render_board(game: &GameState, hints: &[SquareHint]) -> String {
    let mut out = String::new();
    for rank in Rank::all().rev() {
        let _ = write!(out, "{} ", rank.to_char());
        for file in File::all() {
            let index = SquareIndex::from_coords(file, rank);
            let piece = game.piece_at(index).map(|piece| piece.to_char());
            let hint = hints.get(index.get()).copied().unwrap_or(SquareHint::None);
            out.push_str(&cell(piece, hint));
        }
        out.push('\n');
    }
    out.push_str("  ");
    for file in File::all() {
        let _ = write!(out, " {} ", file.to_char());
    }
    out.push('\n');
    out.push_str(&status_line(game));
    out.push('\n');
    out
}

fn cell(piece: Option<char>, hint: SquareHint) -> String {
    let glyph = piece.unwrap_or('.');
    match hint {
        SquareHint::Selected => format!("[{glyph}]"),
        SquareHint::MoveTarget { takes: true } => format!("<{}>", piece.unwrap_or('x')),
        SquareHint::MoveTarget { takes: false } => match piece {
            Some(piece) => format!("<{piece}>"),
            None => " * ".to_string(),
        },
        SquareHint::None | SquareHint::Grab | SquareHint::Blocked => format!(" {glyph} "),
    }
}

pub fn status_line(game: &GameState) -> String {
    match game.status {
        BoardStatus::Ongoing => format!("{} to move", game.team_to_move),
        BoardStatus::Stalemate => "stalemate".to_string(),
        BoardStatus::Checkmate => format!("checkmate, {} to move", game.team_to_move),
    }
}

pub fn render_prompt(request: &PromotionRequest) -> String {
    let choices: Vec<String> = request
        .options
        .iter()
        .map(|variant| format!("[{}] {variant}", variant.letter()))
        .collect();
    format!(
        "promote {} pawn on {}: {} (esc to cancel)",
        request.team,
        request.square,
        choices.join("  ")
    )
}
