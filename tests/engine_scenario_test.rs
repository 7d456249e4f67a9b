use std::sync::{Arc, Mutex};

use gem_cascade::core::{find_matches, match_score, target_score, Board, ScriptedRng, SequentialIds};
use gem_cascade::engine::{EngineConfig, EngineError, GameEngine, GameEngineEvent, MoveRejection};
use gem_cascade::types::{GameStatus, GemKind, Position};

// Swapping (3,2) with (4,2) completes FFF on row 3 and nothing else.
const SCENARIO: [&str; 8] = [
    "LEAEMNAA", "NMELMANW", "LAWNWLNN", "FFLAWWAE", "MNFMALMM", "AAEEAMMA", "AWAMLNNM",
    "LMLNAEAW",
];

fn scenario_engine() -> (GameEngine, Board) {
    let mut ids = SequentialIds::new();
    let board = Board::from_glyphs(&SCENARIO, &mut ids).unwrap();
    let engine = GameEngine::with_sources(
        EngineConfig::default(),
        ScriptedRng::from_kinds(&[GemKind::Lightning, GemKind::Nature, GemKind::Magic]),
        SequentialIds::starting_at(1_000),
    );
    engine.load_board(board.clone()).unwrap();
    (engine, board)
}

fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

#[test]
fn fire_triple_scores_one_combo() {
    let (engine, before) = scenario_engine();
    assert!(find_matches(&before).is_empty());

    let outcome = engine.try_move(pos(3, 2), pos(4, 2)).unwrap();
    assert!(outcome.valid);
    assert_eq!(outcome.matches_found.len(), 1);
    assert_eq!(outcome.matches_found[0].len(), 3);
    assert_eq!(outcome.matches_found[0].kind, GemKind::Fire);
    assert_eq!(outcome.score_change, 50);
    assert_eq!(outcome.combo_count, 1);

    let state = engine.get_game_state();
    assert_eq!(state.moves, 1);
    assert_eq!(state.score, 50);
    assert_eq!(state.combo_multiplier, 1);
    assert_eq!(
        state.board.to_string(),
        [
            "LNMEMNAA", "LEALMANW", "NMENWLNN", "LAWAWWAE", "MNLMALMM", "AAEEAMMA", "AWAMLNNM",
            "LMLNAEAW",
        ]
        .join("\n")
    );
    assert!(find_matches(&state.board).is_empty());
}

#[test]
fn gems_above_the_match_fall_and_keep_their_ids() {
    let (engine, before) = scenario_engine();
    let falling = before.gem(pos(2, 0)).unwrap();

    engine.try_move(pos(3, 2), pos(4, 2)).unwrap();
    let after = engine.get_game_state().board;

    let landed = after.gem(pos(3, 0)).unwrap();
    assert_eq!(landed.id, falling.id);
    assert_eq!((landed.row, landed.col), (3, 0));
    assert!(after.coordinates_consistent());

    // Refilled gems take fresh ids.
    let top = after.gem(pos(0, 0)).unwrap();
    assert!(top.id.0 >= 1_000);
    assert_eq!(top.kind, GemKind::Lightning);
}

#[test]
fn swapped_gem_that_moved_down_is_preserved() {
    let (engine, before) = scenario_engine();
    let moved = before.gem(pos(3, 2)).unwrap();

    engine.try_move(pos(3, 2), pos(4, 2)).unwrap();
    let after = engine.get_game_state().board;
    assert_eq!(after.gem(pos(4, 2)).unwrap().id, moved.id);
}

#[test]
fn invalid_swap_is_cell_for_cell_no_op() {
    let (engine, before) = scenario_engine();
    let outcome = engine.try_move(pos(0, 0), pos(0, 1)).unwrap();

    assert!(!outcome.valid);
    assert_eq!(outcome.score_change, 0);
    assert_eq!(outcome.rejection, Some(MoveRejection::NoMatch));
    assert_eq!(outcome.new_board, before);
    assert_eq!(engine.get_game_state().board, before);
    assert_eq!(engine.get_game_state().moves, 0);
}

#[test]
fn event_sequence_for_a_move() {
    let (engine, _) = scenario_engine();
    let log = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    engine.subscribe(move |e: &GameEngineEvent| sink.lock().unwrap().push(e.name()));

    engine.try_move(pos(3, 2), pos(4, 2)).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        vec!["move_made", "board_changed", "score_updated"]
    );
}

#[tokio::test]
async fn second_move_while_first_unresolved_is_refused() {
    let (engine, _) = scenario_engine();
    let refused = Arc::new(Mutex::new(None));
    let inner = engine.clone();
    let sink = Arc::clone(&refused);
    engine.subscribe(move |e| {
        if let GameEngineEvent::MoveMade { .. } = e {
            let state_before = inner.get_game_state();
            let result = inner.try_move(pos(0, 0), pos(1, 0));
            *sink.lock().unwrap() = Some((result, state_before == inner.get_game_state()));
        }
    });

    engine.make_move(pos(3, 2), pos(4, 2)).await.unwrap();
    let (result, unchanged) = refused.lock().unwrap().take().unwrap();
    assert_eq!(result, Err(EngineError::MoveInProgress));
    assert!(unchanged);
}

#[test]
fn hint_then_play_it() {
    let (engine, _) = scenario_engine();
    let hint = engine.show_hint().unwrap();
    let outcome = engine.try_move(hint.from, hint.to).unwrap();
    assert!(outcome.valid);
}

#[test]
fn pause_and_fail_flow() {
    let (engine, _) = scenario_engine();
    assert!(engine.pause());
    assert_eq!(engine.get_game_state().status, GameStatus::Paused);
    engine.fail("timer expired").unwrap();
    assert_eq!(engine.get_game_state().status, GameStatus::Failed);
    assert!(!engine.resume());
}

#[test]
fn scoring_and_target_tables() {
    assert_eq!(match_score(3, 0), 50);
    assert_eq!(match_score(3, 1), 100);
    assert_eq!(match_score(4, 0), 150);
    assert_eq!(match_score(6, 0), 500);
    assert_eq!(match_score(7, 0), 600);

    assert_eq!(target_score(1), 1000);
    assert_eq!(target_score(2), 2500);
    assert_eq!(target_score(3), 4000);
}
