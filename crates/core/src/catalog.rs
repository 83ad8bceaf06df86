//! Piece catalog - tetromino templates and their precomputed rotations
//!
//! Each base shape is a small boolean matrix. Rotation state R+1 is built from
//! state R by transposing the matrix and reversing every row (a clockwise
//! quarter turn around the shape's own bounding box). The whole table is built
//! once, at compile time, so lookups never compose transforms at runtime.
//!
//! Wall kick tables live here too: they are keyed by piece type and by the
//! rotation state a clockwise turn starts from.

use crate::error::{CoreError, CoreResult};
use crate::types::{PieceKind, Rotation};

/// Largest template edge (the I piece is 1x4 / 4x1)
pub const MAX_SHAPE_EDGE: usize = 4;

/// Offset of a single mino relative to the shape's bounding-box origin
pub type MinoOffset = (i8, i8);

/// Immutable occupancy matrix for one rotation state of one piece.
///
/// Values are `Copy`; every rotation state owns its storage outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMatrix {
    rows: u8,
    cols: u8,
    grid: [[bool; MAX_SHAPE_EDGE]; MAX_SHAPE_EDGE],
    /// Occupied cells as (dx, dy), row-major
    minos: [MinoOffset; 4],
}

impl ShapeMatrix {
    const EMPTY: ShapeMatrix = ShapeMatrix {
        rows: 0,
        cols: 0,
        grid: [[false; MAX_SHAPE_EDGE]; MAX_SHAPE_EDGE],
        minos: [(0, 0); 4],
    };

    const fn from_grid(rows: u8, cols: u8, grid: [[bool; MAX_SHAPE_EDGE]; MAX_SHAPE_EDGE]) -> Self {
        let mut minos = [(0i8, 0i8); 4];
        let mut n = 0;
        let mut r = 0;
        while r < rows as usize {
            let mut c = 0;
            while c < cols as usize {
                if grid[r][c] {
                    minos[n] = (c as i8, r as i8);
                    n += 1;
                }
                c += 1;
            }
            r += 1;
        }
        assert!(n == 4, "tetromino templates have exactly four cells");
        Self {
            rows,
            cols,
            grid,
            minos,
        }
    }

    /// Quarter turn clockwise: new[i][j] = old[rows - 1 - j][i]
    const fn rotated_cw(&self) -> Self {
        let rows = self.cols;
        let cols = self.rows;
        let mut grid = [[false; MAX_SHAPE_EDGE]; MAX_SHAPE_EDGE];
        let mut i = 0;
        while i < rows as usize {
            let mut j = 0;
            while j < cols as usize {
                grid[i][j] = self.grid[self.rows as usize - 1 - j][i];
                j += 1;
            }
            i += 1;
        }
        Self::from_grid(rows, cols, grid)
    }

    /// Number of rows in the bounding box
    pub fn height(&self) -> u8 {
        self.rows
    }

    /// Number of columns in the bounding box
    pub fn width(&self) -> u8 {
        self.cols
    }

    /// Whether the cell at (row, col) of the bounding box is occupied
    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.rows as usize && col < self.cols as usize && self.grid[row][col]
    }

    /// Occupied cells as (dx, dy) offsets from the anchor
    pub fn minos(&self) -> &[MinoOffset; 4] {
        &self.minos
    }

    /// Rows of the bounding box as booleans
    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        (0..self.rows as usize)
            .map(|r| self.grid[r][..self.cols as usize].to_vec())
            .collect()
    }
}

/// Build a template from row strings at compile time (`#` = filled)
const fn template(rows: &[&str]) -> ShapeMatrix {
    let mut grid = [[false; MAX_SHAPE_EDGE]; MAX_SHAPE_EDGE];
    let mut r = 0;
    let mut cols = 0;
    while r < rows.len() {
        let bytes = rows[r].as_bytes();
        let mut c = 0;
        while c < bytes.len() {
            grid[r][c] = bytes[c] == b'#';
            c += 1;
        }
        cols = bytes.len();
        r += 1;
    }
    ShapeMatrix::from_grid(rows.len() as u8, cols as u8, grid)
}

/// Spawn orientation for each kind
const fn base_shape(kind: PieceKind) -> ShapeMatrix {
    match kind {
        PieceKind::I => template(&["####"]),
        PieceKind::O => template(&["##", "##"]),
        PieceKind::T => template(&[".#.", "###"]),
        PieceKind::S => template(&[".##", "##."]),
        PieceKind::Z => template(&["##.", ".##"]),
        PieceKind::J => template(&["#..", "###"]),
        PieceKind::L => template(&["..#", "###"]),
    }
}

/// Read-only rotation table: `[kind][rotation]`
#[derive(Debug)]
pub struct PieceCatalog {
    shapes: [[ShapeMatrix; 4]; 7],
}

impl PieceCatalog {
    const fn build() -> Self {
        let mut shapes = [[ShapeMatrix::EMPTY; 4]; 7];
        let mut k = 0;
        while k < PieceKind::ALL.len() {
            let mut current = base_shape(PieceKind::ALL[k]);
            shapes[k][0] = current;
            let mut r = 1;
            while r < 4 {
                current = current.rotated_cw();
                shapes[k][r] = current;
                r += 1;
            }
            k += 1;
        }
        Self { shapes }
    }

    /// The process-wide catalog
    pub fn global() -> &'static PieceCatalog {
        &CATALOG
    }

    /// Shape for a kind in a rotation state
    pub fn shape(&self, kind: PieceKind, rotation: Rotation) -> &ShapeMatrix {
        &self.shapes[kind.index()][rotation.index()]
    }

    /// Lookup by piece name and raw rotation index.
    ///
    /// Used where the kind comes from outside the type system (saved games,
    /// protocol text).
    pub fn shape_named(&self, kind: &str, rotation_index: u8) -> CoreResult<&ShapeMatrix> {
        let kind =
            PieceKind::from_str(kind).ok_or_else(|| CoreError::InvalidPieceType(kind.to_string()))?;
        let rotation =
            Rotation::from_index(rotation_index).ok_or(CoreError::InvalidRotation(rotation_index))?;
        Ok(self.shape(kind, rotation))
    }
}

static CATALOG: PieceCatalog = PieceCatalog::build();

/// Get the shape for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> &'static ShapeMatrix {
    CATALOG.shape(kind, rotation)
}

/// Wall kick candidates for one transition; (0, 0) is always tried first
pub type KickRow = [(i8, i8); 5];

/// Kick offsets applied in grid space (y grows downward)
const I_KICKS: [KickRow; 4] = [
    // 0->1
    [(0, 0), (-2, 0), (1, 0), (-2, -1), (1, 2)],
    // 1->2
    [(0, 0), (-1, 0), (2, 0), (-1, 2), (2, -1)],
    // 2->3
    [(0, 0), (2, 0), (-1, 0), (2, 1), (-1, -2)],
    // 3->0
    [(0, 0), (1, 0), (-2, 0), (1, -2), (-2, 1)],
];

/// Shared by J, L, S, T and Z
const JLSTZ_KICKS: [KickRow; 4] = [
    // 0->1
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    // 1->2
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    // 2->3
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    // 3->0
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
];

/// O rotations are all identical, so its only candidate is in place
const O_KICKS: KickRow = [(0, 0); 5];

/// Ordered kick candidates for a clockwise turn out of `from`
pub fn kick_offsets(kind: PieceKind, from: Rotation) -> &'static KickRow {
    match kind {
        PieceKind::O => &O_KICKS,
        PieceKind::I => &I_KICKS[from.index()],
        _ => &JLSTZ_KICKS[from.index()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROTATIONS: [Rotation; 4] = [
        Rotation::North,
        Rotation::East,
        Rotation::South,
        Rotation::West,
    ];

    #[test]
    fn test_every_state_has_four_cells_in_bounds() {
        for kind in PieceKind::ALL {
            for rotation in ROTATIONS {
                let shape = get_shape(kind, rotation);
                for &(dx, dy) in shape.minos() {
                    assert!(dx >= 0 && (dx as u8) < shape.width());
                    assert!(dy >= 0 && (dy as u8) < shape.height());
                    assert!(shape.is_filled(dy as usize, dx as usize));
                }
            }
        }
    }

    #[test]
    fn test_i_piece_alternates_orientation() {
        let north = get_shape(PieceKind::I, Rotation::North);
        let east = get_shape(PieceKind::I, Rotation::East);
        assert_eq!((north.width(), north.height()), (4, 1));
        assert_eq!((east.width(), east.height()), (1, 4));
        assert_eq!(east.minos(), &[(0, 0), (0, 1), (0, 2), (0, 3)]);
    }

    #[test]
    fn test_t_piece_clockwise_turn() {
        // .#.      #.
        // ###  ->  ##
        //          #.
        let east = get_shape(PieceKind::T, Rotation::East);
        assert_eq!(
            east.to_rows(),
            vec![vec![true, false], vec![true, true], vec![true, false]]
        );
        // ###
        // .#.
        let south = get_shape(PieceKind::T, Rotation::South);
        assert_eq!(
            south.to_rows(),
            vec![vec![true, true, true], vec![false, true, false]]
        );
    }

    #[test]
    fn test_o_piece_states_identical() {
        let north = get_shape(PieceKind::O, Rotation::North);
        for rotation in ROTATIONS {
            assert_eq!(get_shape(PieceKind::O, rotation), north);
        }
    }

    #[test]
    fn test_shape_named_rejects_bad_input() {
        let catalog = PieceCatalog::global();
        assert!(catalog.shape_named("t", 2).is_ok());
        assert_eq!(
            catalog.shape_named("X", 0),
            Err(CoreError::InvalidPieceType("X".to_string()))
        );
        assert_eq!(catalog.shape_named("I", 4), Err(CoreError::InvalidRotation(4)));
    }

    #[test]
    fn test_kick_tables_start_in_place() {
        for kind in PieceKind::ALL {
            for rotation in ROTATIONS {
                assert_eq!(kick_offsets(kind, rotation)[0], (0, 0));
            }
        }
        assert_eq!(kick_offsets(PieceKind::I, Rotation::North)[1], (-2, 0));
        assert_eq!(kick_offsets(PieceKind::T, Rotation::West)[4], (-1, 2));
    }
}
