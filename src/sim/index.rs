//! Index - spatial queries over the compiled track
//!
//! Direct row/column arithmetic; every query is total. Out-of-range lookups
//! answer with synthetic Empty blocks so callers never bounds-check, and
//! range queries clamp into the element table.

use std::ops::Range;

use crate::consts::{BLOCK_COUNT, BLOCK_WIDTH, RAFT_ALIGN, SLICE_HEIGHT};
use crate::sim::geom::{Rect, Vec2};
use crate::sim::track::{Block, BlockKind, Element, Surface, SurfaceKind, Track};

impl Track {
    /// Row whose band contains `y`; negative behind the start line
    pub fn row_of(&self, y: f32) -> i32 {
        ((self.start_y - y) / SLICE_HEIGHT).floor() as i32
    }

    /// Column whose cell contains `x`; may fall outside the grid
    pub fn col_of(&self, x: f32) -> i32 {
        (x / BLOCK_WIDTH).floor() as i32
    }

    pub fn get_element(&self, row: i32) -> Option<&Element> {
        usize::try_from(row).ok().and_then(|r| self.elements.get(r))
    }

    /// Geometry of a cell; defined for synthetic out-of-range cells too
    pub fn block_rect(&self, row: i32, col: i32) -> Rect {
        Rect::new(
            col as f32 * BLOCK_WIDTH,
            self.start_y - SLICE_HEIGHT * (row as f32 + 1.0),
            BLOCK_WIDTH,
            SLICE_HEIGHT,
        )
    }

    /// Cell lookup; anything outside the table is a synthetic Empty block
    pub fn get_block(&self, row: i32, col: i32) -> Block {
        if col < 0 || col >= BLOCK_COUNT as i32 {
            return Block::empty(row, col);
        }
        match self.get_element(row) {
            Some(element) => Block {
                row,
                col,
                kind: element.blocks[col as usize],
            },
            None => Block::empty(row, col),
        }
    }

    /// Block containing a world position
    pub fn get_block_at(&self, pos: Vec2) -> Block {
        self.get_block(self.row_of(pos.y), self.col_of(pos.x))
    }

    /// True iff the cell is walkable right now. Raft cells are free only
    /// while the serving raft is aligned with the cell's band.
    pub fn is_free(&self, row: i32, col: i32) -> bool {
        self.is_free_at(row, col, None)
    }

    /// `raft_y` overrides the raft position under test, e.g. a dock the
    /// raft has not reached yet.
    pub fn is_free_at(&self, row: i32, col: i32, raft_y: Option<f32>) -> bool {
        match self.get_block(row, col).kind {
            BlockKind::Free => true,
            BlockKind::Empty | BlockKind::Obstacle => false,
            BlockKind::Raft => {
                let band_y = self.block_rect(row, col).y;
                match self.serving_raft(row, col) {
                    Some(surface) => {
                        let y = raft_y.unwrap_or(surface.rect.y);
                        (y - band_y).abs() <= RAFT_ALIGN
                    }
                    None => false,
                }
            }
        }
    }

    /// The raft surface serving a Raft cell: homed in the cell's own element,
    /// or in the element after it for propagated arrival cells.
    pub fn serving_raft(&self, row: i32, col: i32) -> Option<&Surface> {
        let cell_center = (col as f32 + 0.5) * BLOCK_WIDTH;
        for r in [row, row + 1] {
            let found = self.get_element(r).and_then(|element| {
                element
                    .surfaces
                    .iter()
                    .find(|s| s.is_raft() && s.rect.x <= cell_center && cell_center <= s.rect.right())
            });
            if found.is_some() {
                return found;
            }
        }
        None
    }

    /// Rows whose bands intersect [y_min, y_max], clamped into the table.
    /// Scopes collision and platform checks to nearby elements.
    pub fn get_between(&self, y_min: f32, y_max: f32) -> Range<usize> {
        if self.elements.is_empty() {
            return 0..0;
        }
        let last = self.elements.len() as i32 - 1;
        let lo = self.row_of(y_max).clamp(0, last) as usize;
        let hi = self.row_of(y_min).clamp(0, last) as usize;
        lo..hi + 1
    }

    /// True iff the footprint is supported by a surface in the scoped rows.
    /// Raft surfaces support at their current position. Obstacles never void
    /// support: they sit on solid surfaces and contact resolution pushes the
    /// footprint clear.
    pub fn is_on_platform(&self, rows: Range<usize>, area: &Rect) -> bool {
        let support = area.shrunk(0.5);
        rows.into_iter().any(|row| {
            self.elements[row]
                .surfaces
                .iter()
                .any(|s| s.rect.overlaps(&support))
        })
    }

    /// Checkpoint element by checkpoint index (0 = start line)
    pub fn get_checkpoint(&self, index: usize) -> Option<&Element> {
        self.checkpoints.get(index).map(|&row| &self.elements[row])
    }

    /// Highest checkpoint whose band top is at or above `y` - the latest
    /// checkpoint a character at `y` has already reached.
    pub fn find_latest_checkpoint(&self, y: f32) -> Option<usize> {
        (0..self.checkpoints.len()).rev().find(|&i| {
            let row = self.checkpoints[i];
            self.elements[row].y + SLICE_HEIGHT >= y
        })
    }

    /// Lateral slope force of the surface under the point, zero elsewhere
    pub fn slope_force_at(&self, rows: Range<usize>, point: Vec2) -> f32 {
        for row in rows {
            for surface in &self.elements[row].surfaces {
                if surface.rect.contains(point) {
                    return surface.slope_force();
                }
            }
        }
        0.0
    }

    /// Displacement of the raft under the point on the latest tick, if any
    pub fn raft_carry(&self, rows: Range<usize>, point: Vec2) -> f32 {
        for row in rows {
            for surface in &self.elements[row].surfaces {
                if let SurfaceKind::Raft(state) = &surface.kind {
                    if surface.rect.contains(point) {
                        return state.last_dy;
                    }
                }
            }
        }
        0.0
    }
}
