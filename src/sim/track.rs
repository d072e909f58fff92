//! Track - compiled slice model
//!
//! The compiler turns a plan of template tags into elements: one fixed-height
//! slice per tag with concrete surfaces, obstacles, and a nine-cell
//! walkability grid. The orchestrator owns the result and advances raft
//! surfaces each tick; everything else reads it through the spatial queries
//! in `index`.

use serde::{Deserialize, Serialize};

use crate::consts::{BLOCK_COUNT, BLOCK_WIDTH, RAFT_DWELL, RAFT_SPEED, SLICE_HEIGHT, TRACK_WIDTH};
use crate::sim::geom::Rect;
use crate::sim::rng::RaceRng;
use crate::sim::template::TemplateTag;

/// Cell walkability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Empty,
    Free,
    Obstacle,
    Raft,
}

/// One grid cell. Queries beyond the table return synthetic Empty blocks, so
/// callers never bounds-check first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub row: i32,
    pub col: i32,
    pub kind: BlockKind,
}

impl Block {
    pub fn empty(row: i32, col: i32) -> Self {
        Self {
            row,
            col,
            kind: BlockKind::Empty,
        }
    }

    pub fn is_walkable(&self) -> bool {
        matches!(self.kind, BlockKind::Free | BlockKind::Raft)
    }
}

/// Slice role in the race
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Normal,
    Checkpoint,
    Finish,
    Raft,
}

/// Oscillation bookkeeping for one raft surface. Rafts travel one slice
/// height between the home band and the band above it, dwelling at each dock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaftState {
    pub home_y: f32,
    /// +1 rising toward the arrival band, -1 returning home
    pub dir: f32,
    pub docked: bool,
    pub docked_since: f32,
    /// Vertical displacement applied on the latest tick, for carrying riders
    pub last_dy: f32,
}

impl RaftState {
    pub fn new(home_y: f32) -> Self {
        Self {
            home_y,
            dir: 1.0,
            docked: true,
            docked_since: 0.0,
            last_dy: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SurfaceKind {
    Solid,
    Slope { force: f32 },
    Raft(RaftState),
}

/// Walkable rectangle within a slice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub rect: Rect,
    pub kind: SurfaceKind,
}

impl Surface {
    pub fn is_raft(&self) -> bool {
        matches!(self.kind, SurfaceKind::Raft(_))
    }

    /// Lateral force imparted to standing characters
    pub fn slope_force(&self) -> f32 {
        match self.kind {
            SurfaceKind::Slope { force } => force,
            _ => 0.0,
        }
    }

    /// The surface rectangle at its resting slot. Raft rects move; the
    /// walkability grid is derived from where the raft lives, not where it
    /// happens to be.
    pub fn nominal_rect(&self) -> Rect {
        match &self.kind {
            SurfaceKind::Raft(state) => Rect::new(self.rect.x, state.home_y, self.rect.w, self.rect.h),
            _ => self.rect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub rect: Rect,
}

/// One fixed-height slice of the track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub row: usize,
    /// Band anchor: the slice spans (y, y + SLICE_HEIGHT]
    pub y: f32,
    pub kind: ElementKind,
    pub surfaces: Vec<Surface>,
    pub obstacles: Vec<Obstacle>,
    pub blocks: [BlockKind; BLOCK_COUNT],
}

impl Element {
    /// A cell is Free (or Raft) when it lies fully inside a surface;
    /// obstacle overlap takes precedence.
    fn derive_blocks(&mut self) {
        for col in 0..BLOCK_COUNT {
            let cell = Rect::new(col as f32 * BLOCK_WIDTH, self.y, BLOCK_WIDTH, SLICE_HEIGHT);

            let covered = self
                .surfaces
                .iter()
                .find(|s| s.nominal_rect().contains_rect(&cell));
            let obstructed = self.obstacles.iter().any(|o| o.rect.overlaps(&cell));

            self.blocks[col] = if obstructed {
                BlockKind::Obstacle
            } else {
                match covered {
                    Some(s) if s.is_raft() => BlockKind::Raft,
                    Some(_) => BlockKind::Free,
                    None => BlockKind::Empty,
                }
            };
        }
    }
}

/// Compiled track: elements in travel order plus race scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub start_y: f32,
    pub elements: Vec<Element>,
    /// Checkpoint rows in ascending order; index 0 is the start line
    pub checkpoints: Vec<usize>,
    /// Reaching this y or below counts as crossing the finish line
    pub finish_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Track {
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Advance every raft surface: dwell at a dock, travel one slice height,
    /// reverse. Displacements are recorded so the orchestrator can carry
    /// riders.
    pub fn advance_rafts(&mut self, time: f32, dt: f32) {
        for element in &mut self.elements {
            for surface in &mut element.surfaces {
                let Surface { rect, kind } = surface;
                if let SurfaceKind::Raft(state) = kind {
                    advance_raft(rect, state, time, dt);
                }
            }
        }
    }
}

fn advance_raft(rect: &mut Rect, state: &mut RaftState, time: f32, dt: f32) {
    state.last_dy = 0.0;

    if state.docked {
        if time - state.docked_since < RAFT_DWELL {
            return;
        }
        state.docked = false;
    }

    let target = if state.dir > 0.0 {
        state.home_y + SLICE_HEIGHT
    } else {
        state.home_y
    };

    let next = rect.y + RAFT_SPEED * dt * state.dir;
    let arrived = if state.dir > 0.0 {
        next >= target
    } else {
        next <= target
    };

    let new_y = if arrived { target } else { next };
    state.last_dy = new_y - rect.y;
    rect.y = new_y;

    if arrived {
        state.docked = true;
        state.docked_since = time;
        state.dir = -state.dir;
    }
}

/// Compile a tag plan into a track anchored at `start_y`. Pure apart from
/// the raft-jitter draws; compiling the same plan with the same seed yields
/// the same track.
pub fn compile(tags: &[TemplateTag], start_y: f32, rng: &mut RaceRng) -> Track {
    let mut elements = Vec::with_capacity(tags.len());
    let mut checkpoints = Vec::new();

    for (row, tag) in tags.iter().enumerate() {
        let y = start_y - SLICE_HEIGHT * (row as f32 + 1.0);
        let layout = tag.layout(y, rng);

        let mut element = Element {
            row,
            y,
            kind: layout.kind,
            surfaces: layout.surfaces,
            obstacles: layout.obstacles,
            blocks: [BlockKind::Empty; BLOCK_COUNT],
        };
        element.derive_blocks();

        if element.kind == ElementKind::Checkpoint {
            checkpoints.push(row);
        }
        elements.push(element);
    }

    propagate_rafts(&mut elements);

    let finish_y = elements
        .iter()
        .rev()
        .find(|e| e.kind == ElementKind::Finish)
        .map(|e| e.y + SLICE_HEIGHT)
        .unwrap_or(start_y - SLICE_HEIGHT * tags.len() as f32);

    Track {
        start_y,
        height: SLICE_HEIGHT * elements.len() as f32,
        elements,
        checkpoints,
        finish_y,
        width: TRACK_WIDTH,
    }
}

/// A raft's arrival band must read as walkable raft before the geometry gets
/// there: copy each row's Raft cells into Empty cells of the row before it.
/// Ascending row order keeps the pass single-step (no chaining).
fn propagate_rafts(elements: &mut [Element]) {
    for row in 1..elements.len() {
        for col in 0..BLOCK_COUNT {
            if elements[row].blocks[col] == BlockKind::Raft
                && elements[row - 1].blocks[col] == BlockKind::Empty
            {
                elements[row - 1].blocks[col] = BlockKind::Raft;
            }
        }
    }
}
