//! Board tests - grid bounds, collision, locking and row clearing

use tetromino::core::{get_shape, Board, LineClearer};
use tetromino::types::{PieceKind, Rotation, BOARD_HEIGHT, BOARD_WIDTH};

fn fill_row(board: &mut Board, y: i8, kind: PieceKind) {
    for x in 0..BOARD_WIDTH as i8 {
        board.set(x, y, Some(kind));
    }
}

#[test]
fn test_board_new_empty() {
    let board = Board::new();
    assert_eq!(board.width(), BOARD_WIDTH);
    assert_eq!(board.height(), BOARD_HEIGHT);
    assert_eq!(board.filled_count(), 0);

    for y in 0..BOARD_HEIGHT as i8 {
        for x in 0..BOARD_WIDTH as i8 {
            assert_eq!(board.get(x, y), Some(None), "cell ({x}, {y})");
        }
    }
}

#[test]
fn test_board_get_out_of_bounds() {
    let board = Board::new();
    assert_eq!(board.get(-1, 0), None);
    assert_eq!(board.get(0, -1), None);
    assert_eq!(board.get(BOARD_WIDTH as i8, 0), None);
    assert_eq!(board.get(0, BOARD_HEIGHT as i8), None);
}

#[test]
fn test_board_set_and_get() {
    let mut board = Board::new();
    assert!(board.set(5, 10, Some(PieceKind::T)));
    assert_eq!(board.get(5, 10), Some(Some(PieceKind::T)));

    assert!(board.set(5, 10, None));
    assert_eq!(board.get(5, 10), Some(None));

    assert!(!board.set(10, 0, Some(PieceKind::T)));
    assert!(!board.set(0, -1, Some(PieceKind::T)));
}

#[test]
fn test_outside_the_grid() {
    let board = Board::new();
    // Walls and floor block; open sky above does not.
    assert!(board.is_occupied(-1, 5));
    assert!(board.is_occupied(BOARD_WIDTH as i8, 5));
    assert!(board.is_occupied(4, BOARD_HEIGHT as i8));
    assert!(!board.is_occupied(4, -3));
    assert!(!board.is_occupied(4, 0));
}

#[test]
fn test_collides_with_walls_and_cells() {
    let mut board = Board::new();
    let i = get_shape(PieceKind::I, Rotation::North);

    assert!(!board.collides(i, 0, 0));
    assert!(!board.collides(i, 6, 19));
    assert!(board.collides(i, 7, 0));
    assert!(board.collides(i, -1, 0));
    assert!(board.collides(i, 0, 20));
    assert!(!board.collides(i, 0, -1));

    board.set(3, 19, Some(PieceKind::O));
    assert!(board.collides(i, 0, 19));
    assert!(!board.collides(i, 4, 19));
}

#[test]
fn test_every_shape_stops_at_walls_and_floor() {
    let board = Board::new();
    let (cols, rows) = (BOARD_WIDTH as i8, BOARD_HEIGHT as i8);
    for kind in PieceKind::ALL {
        for rotation in [
            Rotation::North,
            Rotation::East,
            Rotation::South,
            Rotation::West,
        ] {
            let shape = get_shape(kind, rotation);
            let (w, h) = (shape.width() as i8, shape.height() as i8);

            // Flush against each side and the floor still fits.
            assert!(!board.collides(shape, 0, 0), "{kind:?} {rotation:?}");
            assert!(!board.collides(shape, cols - w, rows - h), "{kind:?} {rotation:?}");

            assert!(board.collides(shape, -1, 5), "{kind:?} {rotation:?} left");
            assert!(board.collides(shape, cols - w + 1, 5), "{kind:?} {rotation:?} right");
            assert!(board.collides(shape, 0, rows - h + 1), "{kind:?} {rotation:?} floor");
            // Entirely above the top row is open sky.
            assert!(!board.collides(shape, 0, -h), "{kind:?} {rotation:?} sky");
        }
    }
}

#[test]
fn test_lock_writes_piece_kind() {
    let mut board = Board::new();
    let t = get_shape(PieceKind::T, Rotation::North);
    assert_eq!(board.lock(t, 4, 18, PieceKind::T), 0);

    assert_eq!(board.get(5, 18), Some(Some(PieceKind::T)));
    for x in 4..7 {
        assert_eq!(board.get(x, 19), Some(Some(PieceKind::T)));
    }
    assert_eq!(board.filled_count(), 4);
}

#[test]
fn test_lock_above_top_drops_hidden_minos() {
    let mut board = Board::new();
    let t = get_shape(PieceKind::T, Rotation::North);
    assert_eq!(board.lock(t, 0, -1, PieceKind::T), 1);
    assert_eq!(board.filled_count(), 3);

    let i = get_shape(PieceKind::I, Rotation::North);
    assert_eq!(board.lock(i, 0, -1, PieceKind::I), 4);
    assert_eq!(board.filled_count(), 3);
}

#[test]
fn test_clear_rows_compacts_downward() {
    let mut board = Board::new();
    fill_row(&mut board, 19, PieceKind::I);
    fill_row(&mut board, 18, PieceKind::J);
    board.set(0, 17, Some(PieceKind::L));
    board.set(9, 16, Some(PieceKind::S));

    let cleared = board.clear_full_rows();
    assert_eq!(cleared.as_slice(), &[19, 18]);
    assert_eq!(board.get(0, 19), Some(Some(PieceKind::L)));
    assert_eq!(board.get(9, 18), Some(Some(PieceKind::S)));
    assert_eq!(board.filled_count(), 2);
    assert!(board.row(0).iter().all(|c| c.is_none()));
}

#[test]
fn test_clear_non_adjacent_rows() {
    let mut board = Board::new();
    fill_row(&mut board, 19, PieceKind::I);
    board.set(2, 18, Some(PieceKind::T));
    fill_row(&mut board, 17, PieceKind::I);

    assert_eq!(LineClearer.process(&mut board), 2);
    assert_eq!(board.get(2, 19), Some(Some(PieceKind::T)));
    assert_eq!(board.filled_count(), 1);
}

#[test]
fn test_no_full_rows_is_a_noop() {
    let mut board = Board::new();
    board.set(0, 19, Some(PieceKind::Z));
    let before = board.clone();
    assert_eq!(LineClearer.process(&mut board), 0);
    assert_eq!(board.cells(), before.cells());
}

#[test]
fn test_codes_are_row_major_top_first() {
    let mut board = Board::new();
    board.set(1, 19, Some(PieceKind::O));
    let codes = board.to_codes();
    assert_eq!(codes.len(), BOARD_HEIGHT as usize);
    assert_eq!(codes[19][1], PieceKind::O.code());
    assert_eq!(codes[19][0], 0);
    assert!(codes[..19].iter().flatten().all(|&c| c == 0));
}
