//! Snapshot tests - JSON shape, validation and rehydration

use tetromino::core::{ActiveSnapshot, GameConfig, GameSession, GameSnapshot, SnapshotError};
use tetromino::types::{PieceKind, SessionPhase};

fn saved() -> GameSnapshot {
    let mut session = GameSession::default();
    session.start();
    session.hard_drop();
    session.snapshot()
}

fn refused(snapshot: &GameSnapshot) -> SnapshotError {
    GameSession::from_snapshot(snapshot, GameConfig::default())
        .err()
        .expect("snapshot should be refused")
}

#[test]
fn test_json_round_trip_restores_same_game() {
    let mut session = GameSession::default();
    session.start();
    session.hard_drop();
    session.tick(300);
    let snapshot = session.snapshot();

    let text = serde_json::to_string(&snapshot).unwrap();
    let decoded: GameSnapshot = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, snapshot);

    let restored = GameSession::from_snapshot(&decoded, GameConfig::default()).unwrap();
    assert_eq!(restored.phase(), SessionPhase::Paused);
    assert_eq!(restored.board(), session.board());
    assert_eq!(restored.active(), session.active());
    assert_eq!(restored.preview(), session.preview());
    assert_eq!(restored.score(), session.score());
    assert_eq!(restored.elapsed_ms(), 300);
}

#[test]
fn test_json_field_names() {
    let value = serde_json::to_value(saved()).unwrap();
    assert_eq!(value["phase"], "playing");
    assert_eq!(value["level"], 1);
    assert_eq!(value["lives"], 3);
    assert_eq!(value["board"].as_array().unwrap().len(), 20);
    assert!(value["active"]["kind"].is_string());
    assert!(value["next"].as_array().is_some_and(|n| !n.is_empty()));
}

#[test]
fn test_restored_game_continues_the_same_pieces() {
    let snapshot = saved();
    let mut a = GameSession::from_snapshot(&snapshot, GameConfig::default()).unwrap();
    let mut b = GameSession::from_snapshot(&snapshot, GameConfig::default()).unwrap();
    a.resume();
    b.resume();
    for _ in 0..5 {
        a.hard_drop();
        b.hard_drop();
        assert_eq!(a.active(), b.active());
    }
    assert_eq!(a.board(), b.board());
}

#[test]
fn test_missing_active_piece_is_spawned() {
    let mut snapshot = saved();
    snapshot.active = None;
    let first = PieceKind::from_str(&snapshot.next[0]).unwrap();
    let session = GameSession::from_snapshot(&snapshot, GameConfig::default()).unwrap();
    assert_eq!(session.phase(), SessionPhase::Paused);
    assert_eq!(session.active().map(|p| p.kind), Some(first));
}

#[test]
fn test_finished_game_restores_result() {
    let mut snapshot = saved();
    snapshot.phase = "over".to_string();
    snapshot.active = None;
    snapshot.score = 1234;
    let session = GameSession::from_snapshot(&snapshot, GameConfig::default()).unwrap();
    assert_eq!(session.phase(), SessionPhase::GameOver);
    assert_eq!(session.final_score(), Some(1234));
}

#[test]
fn test_zero_seed_uses_config_seed() {
    let mut snapshot = saved();
    snapshot.seed = 0;
    let session = GameSession::from_snapshot(&snapshot, GameConfig::default()).unwrap();
    assert_eq!(session.snapshot().seed, GameConfig::default().seed);
}

#[test]
fn test_bad_grid_is_refused() {
    let mut snapshot = saved();
    snapshot.board.pop();
    assert_eq!(refused(&snapshot), SnapshotError::BoardHeight(19));

    let mut snapshot = saved();
    snapshot.board[3].push(0);
    assert_eq!(
        refused(&snapshot),
        SnapshotError::BoardWidth { row: 3, len: 11 }
    );

    let mut snapshot = saved();
    snapshot.board[5][2] = 9;
    assert_eq!(
        refused(&snapshot),
        SnapshotError::UnknownCell { x: 2, y: 5, code: 9 }
    );
}

#[test]
fn test_bad_names_are_refused() {
    let mut snapshot = saved();
    snapshot.phase = "running".to_string();
    assert_eq!(
        refused(&snapshot),
        SnapshotError::UnknownPhase("running".to_string())
    );

    let mut snapshot = saved();
    snapshot.next = vec!["Q".to_string()];
    assert_eq!(
        refused(&snapshot),
        SnapshotError::InvalidPieceType("Q".to_string())
    );

    let mut snapshot = saved();
    snapshot.next.clear();
    assert_eq!(refused(&snapshot), SnapshotError::EmptyNextQueue);
}

#[test]
fn test_bad_active_piece_is_refused() {
    let piece = |kind: &str, rotation: u8, y: i8| ActiveSnapshot {
        kind: kind.to_string(),
        rotation,
        x: 0,
        y,
    };

    let mut snapshot = saved();
    snapshot.active = Some(piece("X", 0, 0));
    assert_eq!(
        refused(&snapshot),
        SnapshotError::InvalidPieceType("X".to_string())
    );

    let mut snapshot = saved();
    snapshot.active = Some(piece("T", 4, 0));
    assert_eq!(refused(&snapshot), SnapshotError::InvalidRotation(4));

    let mut snapshot = saved();
    snapshot.board[1][1] = PieceKind::O.code();
    snapshot.active = Some(piece("T", 0, 0));
    assert_eq!(refused(&snapshot), SnapshotError::ActiveCollides);

    let mut snapshot = saved();
    snapshot.phase = "completed".to_string();
    assert_eq!(refused(&snapshot), SnapshotError::TerminalWithActive);
}

#[test]
fn test_bad_counters_are_refused() {
    let mut snapshot = saved();
    snapshot.level = 11;
    assert_eq!(refused(&snapshot), SnapshotError::LevelOutOfRange(11));

    let mut snapshot = saved();
    snapshot.level = 0;
    assert_eq!(refused(&snapshot), SnapshotError::LevelOutOfRange(0));

    let mut snapshot = saved();
    snapshot.lives = 0;
    assert_eq!(refused(&snapshot), SnapshotError::LivesOutOfRange(0));

    // More lives than a game starts with.
    let mut snapshot = saved();
    snapshot.lives = 4;
    assert_eq!(refused(&snapshot), SnapshotError::LivesOutOfRange(4));

    let mut snapshot = saved();
    snapshot.lines_this_level = 10;
    snapshot.total_lines = 40;
    assert_eq!(
        refused(&snapshot),
        SnapshotError::AccumulatorOutOfRange {
            lines_this_level: 10,
            total_lines: 40
        }
    );

    let mut snapshot = saved();
    snapshot.lines_this_level = 3;
    snapshot.total_lines = 1;
    assert_eq!(
        refused(&snapshot),
        SnapshotError::AccumulatorOutOfRange {
            lines_this_level: 3,
            total_lines: 1
        }
    );
}

#[test]
fn test_restored_accumulator_levels_up_on_next_clear() {
    let mut snapshot = saved();
    snapshot.board = vec![vec![0; 10]; 20];
    for cell in &mut snapshot.board[19][1..] {
        *cell = PieceKind::J.code();
    }
    snapshot.active = Some(ActiveSnapshot {
        kind: "I".to_string(),
        rotation: 1,
        x: 0,
        y: 0,
    });
    snapshot.lines_this_level = 9;
    snapshot.total_lines = 9;

    let mut session = GameSession::from_snapshot(&snapshot, GameConfig::default()).unwrap();
    session.resume();
    session.hard_drop();
    assert_eq!(session.level(), 2);
    assert_eq!(session.lines_this_level(), 0);
    assert_eq!(session.total_lines(), 10);
}

#[test]
fn test_restore_or_new_discards_bad_snapshot() {
    let mut snapshot = saved();
    snapshot.level = 99;
    let session = GameSession::restore_or_new(Some(&snapshot), GameConfig::default());
    assert_eq!(session.phase(), SessionPhase::Start);
    assert_eq!(session.score(), 0);
}
