use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use client_core::{BoardClient, ClickError, ClickOutcome, HttpChessEngine};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::{mpsc, Mutex},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod prompt;
mod render;

use commands::{parse_command, Command, HELP};
use config::{load_settings, normalize_server_url, DEFAULT_CONFIG_FILE};
use prompt::{Lines, TerminalPrompt};
use render::{render_board, status_line};

#[derive(Parser, Debug)]
#[command(about = "Click-to-move chess board backed by a remote engine")]
struct Args {
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    server_url: Option<String>,
    /// Probe the engine and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(&args.config)?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let server_url = normalize_server_url(&settings.server_url)?;
    let engine = Arc::new(HttpChessEngine::with_timeout(
        &server_url,
        Duration::from_secs(settings.request_timeout_secs),
    )?);
    info!(%server_url, "terminal: using engine");

    if args.check {
        return check(&engine).await;
    }

    let lines = spawn_stdin_reader();
    let prompt = Arc::new(TerminalPrompt::new(Arc::clone(&lines)));
    let client = BoardClient::new(engine, prompt);
    run(&client, &lines).await
}

async fn check(engine: &HttpChessEngine) -> Result<()> {
    let health = engine.health().await?;
    println!("health: {}", health.trim());
    let echo = engine.echo("ping").await?;
    println!("echo: {echo}");
    Ok(())
}

fn spawn_stdin_reader() -> Lines {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut stdin = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match stdin.next_line().await {
                Ok(Some(line)) => {
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(error = %err, "terminal: stdin read failed");
                    break;
                }
            }
        }
    });
    Arc::new(Mutex::new(rx))
}

async fn run(client: &BoardClient, lines: &Lines) -> Result<()> {
    client.start().await?;
    let mut games = client.subscribe_game_state();
    let mut selection = client.subscribe_interaction();
    redraw(client);
    let _ = games.borrow_and_update();
    let _ = selection.borrow_and_update();
    println!("{HELP}");

    loop {
        let Some(line) = lines.lock().await.recv().await else {
            break;
        };
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                if !message.is_empty() {
                    println!("{message}");
                }
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Board => redraw(client),
            Command::Fen => {
                if let Some(game) = client.game_state() {
                    println!("{}", game.board.placement());
                }
            }
            Command::Status => {
                if let Some(game) = client.game_state() {
                    println!("{}", status_line(&game));
                }
            }
            Command::Clear => client.clear_selection(),
            Command::Click(index) => match client.click(index).await {
                Ok(ClickOutcome::PromotionCancelled) => println!("promotion cancelled"),
                Ok(ClickOutcome::Busy) => println!("a move is still being submitted"),
                Ok(_) => {}
                Err(err) => report(&err),
            },
        }

        let game_changed = games.has_changed().unwrap_or(false);
        let selection_changed = selection.has_changed().unwrap_or(false);
        if game_changed || selection_changed {
            let _ = games.borrow_and_update();
            let _ = selection.borrow_and_update();
            redraw(client);
        }
    }

    Ok(())
}

fn redraw(client: &BoardClient) {
    let (Some(game), Some(hints)) = (client.game_state(), client.hints()) else {
        return;
    };
    print!("{}", render_board(&game, &hints));
}

fn report(err: &ClickError) {
    warn!(error = %err, "terminal: move failed");
    println!("move failed: {err}");
}
