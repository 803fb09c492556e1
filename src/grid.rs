//! Grid System - Mirrored Cell Layout
//!
//! Turns digest bytes into the symmetric 5-wide cell grid and filters it
//! down to the cells that will be drawn.

/// Width of the cell grid. Rows are built from groups of 3 digest bytes
/// mirrored out to this width.
pub const GRID_WIDTH: usize = 5;

/// Number of digest bytes consumed per row before mirroring.
pub const ROW_SOURCE_LEN: usize = 3;

/// One grid cell: the original digest byte and its row-major position.
///
/// The index is assigned once at grid construction and never recomputed;
/// it encodes the cell's fixed position regardless of later filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub value: u8,
    pub index: usize,
}

/// Build the mirrored grid from digest bytes.
///
/// The digest is partitioned into consecutive groups of 3; a trailing group
/// with fewer than 3 bytes is discarded, not padded. Each group `[a, b, c]`
/// becomes the row `[a, b, c, b, a]`, and the rows are concatenated in
/// order with row-major indices. A 16-byte digest yields exactly 25 cells;
/// fewer than 3 bytes yields an empty grid, which is legal.
pub fn build_grid(digest: &[u8]) -> Vec<Cell> {
    let mut cells = Vec::with_capacity(digest.len() / ROW_SOURCE_LEN * GRID_WIDTH);
    for group in digest.chunks_exact(ROW_SOURCE_LEN) {
        for value in [group[0], group[1], group[2], group[1], group[0]] {
            cells.push(Cell {
                value,
                index: cells.len(),
            });
        }
    }
    cells
}

/// Drop every odd-valued cell, keeping order and indices untouched.
///
/// Zero survivors is legal and renders as a blank canvas.
pub fn discard_odd_cells(cells: Vec<Cell>) -> Vec<Cell> {
    cells.into_iter().filter(|cell| cell.value % 2 == 0).collect()
}
