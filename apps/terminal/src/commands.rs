use shared::square::{SquareId, SquareIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Click(SquareIndex),
    Clear,
    Fen,
    Board,
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "commands: <square> (e2) or <index> (0-63) to click, cancel, fen, board, status, help, quit";

pub fn parse_command(line: &str) -> Result<Command, String> {
    let word = line.trim();
    match word.to_ascii_lowercase().as_str() {
        "" => Err(String::new()),
        "fen" => Ok(Command::Fen),
        "board" => Ok(Command::Board),
        "status" => Ok(Command::Status),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "cancel" | "esc" | "c" => Ok(Command::Clear),
        lowered => {
            if let Ok(index) = lowered.parse::<i64>() {
                return SquareIndex::validate(index)
                    .map(Command::Click)
                    .map_err(|err| err.to_string());
            }
            lowered
                .parse::<SquareId>()
                .map(|square| Command::Click(square.to_index()))
                .map_err(|_| format!("unknown command '{word}'"))
        }
    }
}
