//! Template - slice shapes and race plans
//!
//! Each tag names one fixed slice layout. A race plan is a literal tag list:
//! the start banner, three or four hazard segments separated by Checkpoint
//! tags, and a terminating Finish. The segment literals double as the
//! reproducible fixture for track-generation tests.

use serde::{Deserialize, Serialize};

use crate::consts::{BLOCK_WIDTH, RAFT_JITTER, SLICE_HEIGHT};
use crate::sim::geom::Rect;
use crate::sim::rng::RaceRng;
use crate::sim::track::{ElementKind, Obstacle, RaftState, Surface, SurfaceKind};

/// Lateral velocity bias applied by slope surfaces (world units per second)
pub const SLOPE_FORCE: f32 = 90.0;

const BUMPER_WIDTH: f32 = 32.0;
const BUMPER_HEIGHT: f32 = 36.0;

/// The closed set of slice shapes a plan can name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateTag {
    Full,
    Chasm,
    NarrowLeft,
    NarrowCenter,
    NarrowRight,
    DualPassage,
    TriplePassage,
    WideLeft,
    WideRight,
    SlopeLeft,
    SlopeRight,
    SlopeSplit,
    ObstacleField,
    ObstacleFieldDense,
    ObstacleStagger,
    NarrowObstacle,
    Raft,
    RaftPair,
    Checkpoint,
    Finish,
}

/// Concrete geometry for one slice, anchored at the slice's band y
#[derive(Debug, Clone)]
pub struct SliceLayout {
    pub kind: ElementKind,
    pub surfaces: Vec<Surface>,
    pub obstacles: Vec<Obstacle>,
}

impl TemplateTag {
    /// Expand the tag into surfaces and obstacles for the band anchored at
    /// `y`. Only raft tags draw from the random source (vertical jitter).
    pub fn layout(self, y: f32, rng: &mut RaceRng) -> SliceLayout {
        match self {
            TemplateTag::Full => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(0, 9, y)],
                obstacles: Vec::new(),
            },
            TemplateTag::Chasm => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: Vec::new(),
                obstacles: Vec::new(),
            },
            TemplateTag::NarrowLeft => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(0, 3, y)],
                obstacles: Vec::new(),
            },
            TemplateTag::NarrowCenter => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(3, 6, y)],
                obstacles: Vec::new(),
            },
            TemplateTag::NarrowRight => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(6, 9, y)],
                obstacles: Vec::new(),
            },
            TemplateTag::DualPassage => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(0, 3, y), solid(6, 9, y)],
                obstacles: Vec::new(),
            },
            TemplateTag::TriplePassage => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(0, 2, y), solid(4, 5, y), solid(7, 9, y)],
                obstacles: Vec::new(),
            },
            TemplateTag::WideLeft => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(0, 6, y)],
                obstacles: Vec::new(),
            },
            TemplateTag::WideRight => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(3, 9, y)],
                obstacles: Vec::new(),
            },
            TemplateTag::SlopeLeft => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![slope(0, 9, y, -SLOPE_FORCE)],
                obstacles: Vec::new(),
            },
            TemplateTag::SlopeRight => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![slope(0, 9, y, SLOPE_FORCE)],
                obstacles: Vec::new(),
            },
            // Both halves push toward the center gap
            TemplateTag::SlopeSplit => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![slope(0, 4, y, SLOPE_FORCE), slope(5, 9, y, -SLOPE_FORCE)],
                obstacles: Vec::new(),
            },
            TemplateTag::ObstacleField => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(0, 9, y)],
                obstacles: vec![bumper(1, y), bumper(4, y), bumper(7, y)],
            },
            TemplateTag::ObstacleFieldDense => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(0, 9, y)],
                obstacles: vec![bumper(0, y), bumper(2, y), bumper(4, y), bumper(6, y), bumper(8, y)],
            },
            TemplateTag::ObstacleStagger => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(0, 9, y)],
                obstacles: vec![bumper(2, y), bumper(6, y)],
            },
            TemplateTag::NarrowObstacle => SliceLayout {
                kind: ElementKind::Normal,
                surfaces: vec![solid(3, 6, y)],
                obstacles: vec![bumper(4, y)],
            },
            TemplateTag::Raft => SliceLayout {
                kind: ElementKind::Raft,
                surfaces: vec![raft(3, 6, y, rng)],
                obstacles: Vec::new(),
            },
            TemplateTag::RaftPair => SliceLayout {
                kind: ElementKind::Raft,
                surfaces: vec![raft(0, 3, y, rng), raft(6, 9, y, rng)],
                obstacles: Vec::new(),
            },
            TemplateTag::Checkpoint => SliceLayout {
                kind: ElementKind::Checkpoint,
                surfaces: vec![solid(0, 9, y)],
                obstacles: Vec::new(),
            },
            TemplateTag::Finish => SliceLayout {
                kind: ElementKind::Finish,
                surfaces: vec![solid(0, 9, y)],
                obstacles: Vec::new(),
            },
        }
    }
}

/// Full-height strip spanning columns [c0, c1)
fn strip(c0: usize, c1: usize, y: f32) -> Rect {
    Rect::new(
        c0 as f32 * BLOCK_WIDTH,
        y,
        (c1 - c0) as f32 * BLOCK_WIDTH,
        SLICE_HEIGHT,
    )
}

fn solid(c0: usize, c1: usize, y: f32) -> Surface {
    Surface {
        rect: strip(c0, c1, y),
        kind: SurfaceKind::Solid,
    }
}

fn slope(c0: usize, c1: usize, y: f32, force: f32) -> Surface {
    Surface {
        rect: strip(c0, c1, y),
        kind: SurfaceKind::Slope { force },
    }
}

fn raft(c0: usize, c1: usize, y: f32, rng: &mut RaceRng) -> Surface {
    let jitter = rng.range_f32(0.0, RAFT_JITTER);
    let mut rect = strip(c0, c1, y);
    rect.y += jitter;

    Surface {
        rect,
        kind: SurfaceKind::Raft(RaftState::new(y)),
    }
}

/// Obstacle bumper centered in the given column's cell
fn bumper(col: usize, y: f32) -> Obstacle {
    Obstacle {
        rect: Rect::centered(
            (col as f32 + 0.5) * BLOCK_WIDTH,
            y + SLICE_HEIGHT * 0.5,
            BUMPER_WIDTH,
            BUMPER_HEIGHT,
        ),
    }
}

/// Spawn apron: the start line plus the full slices holding the formation
pub const START_BANNER: &[TemplateTag] = &[
    TemplateTag::Checkpoint,
    TemplateTag::Full,
    TemplateTag::Full,
    TemplateTag::Full,
    TemplateTag::Full,
    TemplateTag::Full,
];

/// Groves: passages and sparse obstacle fields
pub const SEGMENT_GROVES: &[TemplateTag] = &[
    TemplateTag::Full,
    TemplateTag::ObstacleField,
    TemplateTag::NarrowLeft,
    TemplateTag::Full,
    TemplateTag::NarrowCenter,
    TemplateTag::DualPassage,
    TemplateTag::SlopeLeft,
    TemplateTag::Full,
    TemplateTag::ObstacleStagger,
    TemplateTag::WideRight,
    TemplateTag::NarrowObstacle,
    TemplateTag::Full,
];

/// Ferries: chasm crossings served by rafts
pub const SEGMENT_FERRIES: &[TemplateTag] = &[
    TemplateTag::Full,
    TemplateTag::Chasm,
    TemplateTag::Raft,
    TemplateTag::Full,
    TemplateTag::NarrowRight,
    TemplateTag::Chasm,
    TemplateTag::Raft,
    TemplateTag::WideLeft,
    TemplateTag::Full,
    TemplateTag::Chasm,
    TemplateTag::RaftPair,
    TemplateTag::Full,
];

/// Steeps: slope runs and dense obstacles
pub const SEGMENT_STEEPS: &[TemplateTag] = &[
    TemplateTag::SlopeLeft,
    TemplateTag::SlopeRight,
    TemplateTag::SlopeSplit,
    TemplateTag::Full,
    TemplateTag::ObstacleFieldDense,
    TemplateTag::NarrowCenter,
    TemplateTag::SlopeLeft,
    TemplateTag::WideLeft,
    TemplateTag::ObstacleField,
    TemplateTag::TriplePassage,
    TemplateTag::Full,
];

/// Gauntlet: the closing mix used by four-segment plans
pub const SEGMENT_GAUNTLET: &[TemplateTag] = &[
    TemplateTag::ObstacleField,
    TemplateTag::Chasm,
    TemplateTag::Raft,
    TemplateTag::NarrowObstacle,
    TemplateTag::SlopeSplit,
    TemplateTag::DualPassage,
    TemplateTag::Chasm,
    TemplateTag::RaftPair,
    TemplateTag::Full,
    TemplateTag::Full,
];

/// The default three-segment race plan
pub fn standard_plan() -> Vec<TemplateTag> {
    race_plan(3)
}

/// Build a plan with the requested number of hazard segments (clamped to
/// 3..=4): start banner, segments separated by checkpoints, finish slice.
pub fn race_plan(segments: u32) -> Vec<TemplateTag> {
    let order: &[&[TemplateTag]] = if segments >= 4 {
        &[SEGMENT_GROVES, SEGMENT_FERRIES, SEGMENT_STEEPS, SEGMENT_GAUNTLET]
    } else {
        &[SEGMENT_GROVES, SEGMENT_FERRIES, SEGMENT_STEEPS]
    };

    let mut plan: Vec<TemplateTag> = START_BANNER.to_vec();
    for (i, segment) in order.iter().enumerate() {
        if i > 0 {
            plan.push(TemplateTag::Checkpoint);
        }
        plan.extend_from_slice(segment);
    }
    plan.push(TemplateTag::Finish);
    plan
}
