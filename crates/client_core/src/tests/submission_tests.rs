use shared::domain::Team;

use super::*;
use crate::{
    error::{EngineError, PromptError, StoreError},
    interaction::{InteractionState, Transition},
    test_support::{
        initial_position, promotion_position, scripted_prompt, sq, FakeEngine, ImmediatePrompt,
        PROMOTION_TARGETS,
    },
};

async fn protocol_for(
    start: GameState,
    prompt: Arc<dyn PromotionPrompt>,
) -> (
    Arc<MoveSubmissionProtocol>,
    Arc<FakeEngine>,
    Arc<GameStateStore>,
    PromptSlot,
) {
    let engine = Arc::new(FakeEngine::new(start));
    let games = Arc::new(GameStateStore::new(engine.clone()));
    games.start().await.expect("start");
    let slot = PromptSlot::new();
    let protocol = MoveSubmissionProtocol::new(Arc::clone(&games), prompt, slot.clone());
    (Arc::new(protocol), engine, games, slot)
}

fn select(game: &GameState, square: &str) -> Selection {
    match InteractionState::Idle.plan(game, sq(square)) {
        Transition::Select(selection) => selection,
        other => panic!("expected selection, got {other:?}"),
    }
}

#[tokio::test]
async fn unambiguous_destination_sends_plain_request() {
    let game = initial_position();
    let (protocol, engine, _games, _slot) = protocol_for(
        game.clone(),
        Arc::new(ImmediatePrompt(PromptResolution::Cancelled)),
    )
    .await;
    engine.push_move_reply(Ok(game.clone()));

    let outcome = protocol
        .submit(&select(&game, "e2"), sq("e4"), &game)
        .await
        .expect("submit");

    assert!(matches!(outcome, SubmissionOutcome::Submitted(_)));
    let calls = engine.move_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].0,
        MoveRequest {
            origin: "e2".parse().unwrap(),
            destination: "e4".parse().unwrap(),
            takes: false,
            piece: PieceVariant::Pawn,
            promotion: None,
        }
    );
}

#[tokio::test]
async fn promotion_waits_for_a_choice_before_moving() {
    let game = promotion_position();
    let (prompt, mut driver) = scripted_prompt();
    let (protocol, engine, _games, slot) = protocol_for(game.clone(), prompt).await;
    engine.push_move_reply(Ok(initial_position()));

    let task = {
        let protocol = Arc::clone(&protocol);
        let game = game.clone();
        tokio::spawn(async move {
            let selection = select(&game, "e7");
            protocol.submit(&selection, sq("e8"), &game).await
        })
    };

    let request = driver.next_request().await;
    assert_eq!(request.square, "e8".parse().unwrap());
    assert_eq!(request.team, Team::White);
    assert_eq!(request.options, PROMOTION_TARGETS.to_vec());
    assert!(engine.move_calls().is_empty());
    assert!(slot.is_active());

    driver.answer(PromptResolution::Chosen(PieceVariant::Queen));
    let outcome = task.await.expect("join").expect("submit");

    assert!(matches!(outcome, SubmissionOutcome::Submitted(_)));
    assert!(!slot.is_active());
    let calls = engine.move_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0.promotion, Some(PieceVariant::Queen));
    assert_eq!(calls[0].0.piece, PieceVariant::Pawn);
    assert!(!calls[0].0.takes);
}

#[tokio::test]
async fn cancelled_prompt_sends_nothing() {
    let game = promotion_position();
    let (prompt, mut driver) = scripted_prompt();
    let (protocol, engine, _games, slot) = protocol_for(game.clone(), prompt).await;

    let task = {
        let protocol = Arc::clone(&protocol);
        let game = game.clone();
        tokio::spawn(async move {
            let selection = select(&game, "e7");
            protocol.submit(&selection, sq("e8"), &game).await
        })
    };
    driver.next_request().await;
    driver.answer(PromptResolution::Cancelled);

    let outcome = task.await.expect("join").expect("submit");
    assert!(matches!(outcome, SubmissionOutcome::Cancelled));
    assert!(engine.move_calls().is_empty());
    assert!(!slot.is_active());
}

#[tokio::test]
async fn capture_promotion_marks_takes() {
    let game = promotion_position();
    let (protocol, engine, _games, _slot) = protocol_for(
        game.clone(),
        Arc::new(ImmediatePrompt(PromptResolution::Chosen(PieceVariant::Knight))),
    )
    .await;
    engine.push_move_reply(Ok(game.clone()));

    protocol
        .submit(&select(&game, "e7"), sq("d8"), &game)
        .await
        .expect("submit");

    let calls = engine.move_calls();
    assert_eq!(calls[0].0.destination, "d8".parse().unwrap());
    assert!(calls[0].0.takes);
    assert_eq!(calls[0].0.promotion, Some(PieceVariant::Knight));
}

#[tokio::test]
async fn second_prompt_conflicts_and_leaves_the_first_running() {
    let game = promotion_position();
    let (prompt, mut driver) = scripted_prompt();
    let (protocol, engine, _games, slot) = protocol_for(game.clone(), prompt).await;

    let first = {
        let protocol = Arc::clone(&protocol);
        let game = game.clone();
        tokio::spawn(async move {
            let selection = select(&game, "e7");
            protocol.submit(&selection, sq("e8"), &game).await
        })
    };
    driver.next_request().await;

    let err = protocol
        .submit(&select(&game, "e7"), sq("d8"), &game)
        .await
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Prompt(PromptError::Conflict)));
    assert!(slot.is_active());

    driver.answer(PromptResolution::Cancelled);
    let outcome = first.await.expect("join").expect("first submit");
    assert!(matches!(outcome, SubmissionOutcome::Cancelled));
    assert!(engine.move_calls().is_empty());
    assert!(!slot.is_active());
}

#[tokio::test]
async fn slot_cancel_resolves_the_open_prompt() {
    let game = promotion_position();
    let (prompt, mut driver) = scripted_prompt();
    let (protocol, engine, _games, slot) = protocol_for(game.clone(), prompt).await;

    let task = {
        let protocol = Arc::clone(&protocol);
        let game = game.clone();
        tokio::spawn(async move {
            let selection = select(&game, "e7");
            protocol.submit(&selection, sq("e8"), &game).await
        })
    };
    driver.next_request().await;
    assert!(slot.cancel_active());

    let outcome = task.await.expect("join").expect("submit");
    assert!(matches!(outcome, SubmissionOutcome::Cancelled));
    assert!(engine.move_calls().is_empty());
    assert!(!slot.is_active());
}

#[tokio::test]
async fn prompt_failure_releases_the_slot() {
    let game = promotion_position();
    let (prompt, mut driver) = scripted_prompt();
    let (protocol, engine, _games, slot) = protocol_for(game.clone(), prompt).await;

    let task = {
        let protocol = Arc::clone(&protocol);
        let game = game.clone();
        tokio::spawn(async move {
            let selection = select(&game, "e7");
            protocol.submit(&selection, sq("e8"), &game).await
        })
    };
    driver.next_request().await;
    driver.fail("prompt window closed");

    let err = task.await.expect("join").unwrap_err();
    assert!(matches!(err, SubmissionError::PromptFailed(_)));
    assert!(engine.move_calls().is_empty());
    assert!(!slot.is_active());
}

#[tokio::test]
async fn unoffered_promotion_choice_is_rejected() {
    let game = promotion_position();
    let (protocol, engine, _games, _slot) = protocol_for(
        game.clone(),
        Arc::new(ImmediatePrompt(PromptResolution::Chosen(PieceVariant::King))),
    )
    .await;

    let err = protocol
        .submit(&select(&game, "e7"), sq("e8"), &game)
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::UnofferedPromotion { .. }));
    assert!(engine.move_calls().is_empty());
}

#[tokio::test]
async fn destination_without_candidates_is_an_error() {
    let game = initial_position();
    let (protocol, engine, _games, _slot) = protocol_for(
        game.clone(),
        Arc::new(ImmediatePrompt(PromptResolution::Cancelled)),
    )
    .await;

    let err = protocol
        .submit(&select(&game, "e2"), sq("e5"), &game)
        .await
        .unwrap_err();

    assert!(matches!(err, SubmissionError::NoCandidate { .. }));
    assert!(engine.move_calls().is_empty());
}

#[tokio::test]
async fn rejected_move_is_surfaced_and_cache_kept() {
    let game = initial_position();
    let (protocol, engine, games, _slot) = protocol_for(
        game.clone(),
        Arc::new(ImmediatePrompt(PromptResolution::Cancelled)),
    )
    .await;
    engine.push_move_reply(Err("illegal move"));

    let err = protocol
        .submit(&select(&game, "e2"), sq("e4"), &game)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SubmissionError::Store(StoreError::Engine(EngineError::Rejected { .. }))
    ));
    assert_eq!(games.snapshot().as_deref(), Some(&game));
}
