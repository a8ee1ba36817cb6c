use serde::{Deserialize, Serialize};

use crate::config::GameConfig;
use crate::error::RuleCode;
use crate::input::decode_input_byte;

mod collision;
mod progression;
mod session;
mod spawn;

pub use session::Session;

/// Axis-aligned box in canvas pixels, origin top-left.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Hitbox {
    /// Strict overlap on both axes; touching edges do not collide.
    #[inline]
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ship {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub direction: i8,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub alive: bool,
}

/// Enemy archetype, fixed at spawn time. It decides size, base speed, base points and
/// the vertical movement pattern.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    Straight,
    Wave,
    Zigzag,
}

pub(crate) struct Archetype {
    pub(crate) width: f32,
    pub(crate) height: f32,
    pub(crate) points: u32,
    pub(crate) speed: f32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [Self::Straight, Self::Wave, Self::Zigzag];

    pub(crate) fn archetype(self) -> Archetype {
        match self {
            Self::Straight => Archetype {
                width: 12.0,
                height: 10.0,
                points: 10,
                speed: 1.5,
            },
            Self::Wave => Archetype {
                width: 14.0,
                height: 12.0,
                points: 20,
                speed: 1.0,
            },
            Self::Zigzag => Archetype {
                width: 16.0,
                height: 14.0,
                points: 30,
                speed: 0.8,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub points: u32,
    pub phase_offset: f32,
    pub alive: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boss {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub health: u32,
    pub max_health: u32,
    pub points: u32,
    pub target_y: f32,
    pub movement_phase: f32,
    pub entered: bool,
}

impl Boss {
    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.max_health as f32
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Explosion {
    pub x: f32,
    pub y: f32,
    pub frame: u32,
    pub max_frames: u32,
}

/// Star or bubble, depending on the theme. Purely decorative.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub speed: f32,
    pub size: f32,
    pub wobble: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    Normal,
    BossEncounter,
    PhaseTransition { remaining: u32 },
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub phase: u32,
    pub kills_in_phase: u32,
    pub kills_required: u32,
    pub stage: Stage,
}

impl Progression {
    pub fn is_boss_active(&self) -> bool {
        matches!(self.stage, Stage::BossEncounter)
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self.stage, Stage::PhaseTransition { .. })
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.stage, Stage::GameOver)
    }
}

/// Discrete things that happened during one step. Audio cues and the host react to
/// these; the simulation itself never reads them back.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    Shot,
    EnemyDestroyed { kind: EnemyKind, points: u32 },
    BossSpawned { phase: u32 },
    BossHit { health_left: u32 },
    BossDefeated { phase: u32, points: u32 },
    PhaseAdvanced { phase: u32 },
    PlayerDied { score: u32 },
    NamePromptReady { score: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ReplayResult {
    pub final_score: u32,
    pub final_phase: u32,
    pub final_rng_state: u32,
    pub frame_count: u32,
    pub game_over: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ReplayCheckpoint {
    pub frame_count: u32,
    pub rng_state: u32,
    pub score: u32,
    pub phase: u32,
    pub kills_in_phase: u32,
    pub stage: Stage,
    pub bullets: usize,
    pub enemies: usize,
    pub boss_health: Option<u32>,
    pub ship_y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayViolation {
    pub frame_count: u32,
    pub rule: RuleCode,
}

pub fn replay(seed: u32, inputs: &[u8]) -> ReplayResult {
    let mut session = Session::new(GameConfig::default(), seed);

    for input in inputs {
        session.step(decode_input_byte(*input));
    }

    session.result()
}

pub fn replay_strict(seed: u32, inputs: &[u8]) -> Result<ReplayResult, ReplayViolation> {
    let mut session = Session::new(GameConfig::default(), seed);
    session
        .validate_invariants()
        .map_err(|rule| ReplayViolation {
            frame_count: session.frame_count(),
            rule,
        })?;

    for input in inputs {
        session.step(decode_input_byte(*input));
        session
            .validate_invariants()
            .map_err(|rule| ReplayViolation {
                frame_count: session.frame_count(),
                rule,
            })?;
    }

    Ok(session.result())
}

pub fn replay_with_checkpoints(
    seed: u32,
    inputs: &[u8],
    sample_every: u32,
) -> Vec<ReplayCheckpoint> {
    let mut session = Session::new(GameConfig::default(), seed);
    let stride = if sample_every == 0 { 1 } else { sample_every };
    let total_frames = inputs.len() as u32;
    let mut checkpoints = vec![session.checkpoint()];

    for (index, input) in inputs.iter().enumerate() {
        session.step(decode_input_byte(*input));
        let frame = (index + 1) as u32;
        if frame % stride == 0 || frame == total_frames {
            checkpoints.push(session.checkpoint());
        }
    }

    checkpoints
}
