use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use client_core::{PromotionPrompt, PromotionRequest, PromptResolution};
use shared::domain::PieceVariant;
use tokio::sync::{mpsc, Mutex};

use crate::render::render_prompt;

/// Stdin lines, shared by the command loop and the promotion prompt.
pub type Lines = Arc<Mutex<mpsc::Receiver<String>>>;

pub struct TerminalPrompt {
    lines: Lines,
}

impl TerminalPrompt {
    pub fn new(lines: Lines) -> Self {
        Self { lines }
    }
}

#[async_trait]
impl PromotionPrompt for TerminalPrompt {
    async fn choose(&self, request: &PromotionRequest) -> anyhow::Result<PromptResolution> {
        println!("{}", render_prompt(request));
        loop {
            let Some(line) = self.lines.lock().await.recv().await else {
                bail!("input closed during promotion prompt");
            };
            match parse_answer(&line, &request.options) {
                Some(resolution) => return Ok(resolution),
                None => println!("pick one of the listed letters, or esc to cancel"),
            }
        }
    }
}

/// `None` means the line matched neither an offered piece nor a cancel word.
pub fn parse_answer(line: &str, options: &[PieceVariant]) -> Option<PromptResolution> {
    let answer = line.trim().to_ascii_lowercase();
    if matches!(answer.as_str(), "" | "esc" | "cancel" | "c") {
        return Some(PromptResolution::Cancelled);
    }

    options
        .iter()
        .copied()
        .find(|variant| {
            answer == variant.to_string().to_ascii_lowercase()
                || answer.chars().eq(std::iter::once(variant.letter()))
        })
        .map(PromptResolution::Chosen)
}
