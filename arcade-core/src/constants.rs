//! Gameplay tuning. Distances are canvas pixels, durations are frames (one frame per
//! display refresh).

pub const DESKTOP_WIDTH: f32 = 400.0;
pub const DESKTOP_HEIGHT: f32 = 200.0;
pub const MOBILE_WIDTH: f32 = 280.0;
pub const MOBILE_HEIGHT: f32 = 180.0;
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

/// Vertical keep-out band at the top and bottom of the play field.
pub const PLAY_MARGIN: f32 = 5.0;

pub const SHIP_X: f32 = 10.0;
pub const SHIP_WIDTH: f32 = 18.0;
pub const SHIP_HEIGHT: f32 = 12.0;
pub const SHIP_SPEED: f32 = 3.0;
pub const TOUCH_DRAG_FACTOR: f32 = 0.5;

pub const BULLET_WIDTH: f32 = 6.0;
pub const BULLET_HEIGHT: f32 = 2.0;
pub const BULLET_SPEED: f32 = 6.0;
pub const BULLET_LIMIT: usize = 5;

pub const ENEMY_SPAWN_X_OFFSET: f32 = 10.0;
pub const ENEMY_SPAWN_Y_MIN: f32 = 15.0;
/// Spawn band height is `viewport height - ENEMY_SPAWN_Y_SPAN_INSET`.
pub const ENEMY_SPAWN_Y_SPAN_INSET: f32 = 40.0;
pub const ENEMY_CULL_X: f32 = -20.0;
pub const ENEMY_SPEED_STEP_PER_PHASE: f32 = 0.1;

pub const WAVE_FREQUENCY: f32 = 0.1;
pub const WAVE_AMPLITUDE: f32 = 0.8;
pub const ZIGZAG_PERIOD_FRAMES: u32 = 30;
pub const ZIGZAG_HALF_PERIOD_FRAMES: u32 = 15;
pub const ZIGZAG_STEP: f32 = 0.5;

pub const SPAWN_INTERVAL_FRAMES: u32 = 60;
pub const FAST_SPAWN_INTERVAL_FRAMES: u32 = 40;
pub const FAST_SPAWN_SCORE_THRESHOLD: u32 = 50;

pub const BOSS_WIDTH: f32 = 36.0;
pub const BOSS_HEIGHT: f32 = 30.0;
pub const BOSS_BASE_HEALTH: u32 = 5;
pub const BOSS_HEALTH_PER_PHASE: u32 = 3;
pub const BOSS_POINTS_PER_PHASE: u32 = 100;
pub const BOSS_BASE_SPEED: f32 = 1.0;
pub const BOSS_SPEED_STEP_PER_PHASE: f32 = 0.2;
/// Gap between the boss and the right edge once it has finished entering.
pub const BOSS_HOLD_INSET: f32 = 20.0;
pub const BOSS_BOB_STEP: f32 = 0.05;
pub const BOSS_BOB_AMPLITUDE: f32 = 0.5;
pub const BOSS_DEATH_EXPLOSIONS: usize = 5;

pub const BASE_KILL_QUOTA: u32 = 10;
pub const KILL_QUOTA_STEP: u32 = 2;
pub const PHASE_TRANSITION_FRAMES: u32 = 120;
pub const NAME_PROMPT_DELAY_FRAMES: u32 = 90;

pub const EXPLOSION_FRAMES: u32 = 8;
pub const BOSS_EXPLOSION_FRAMES: u32 = 12;

pub const STAR_COUNT: usize = 30;
pub const BUBBLE_COUNT: usize = 24;

pub const LOADING_TICK_FRAMES: u32 = 6;
pub const LOADING_STEP_MIN: f32 = 1.5;
pub const LOADING_STEP_SPREAD: f32 = 2.0;

pub const LEADERBOARD_SIZE: usize = 10;
pub const PLAYER_NAME_MAX_CHARS: usize = 20;
pub const DEFAULT_PLAYER_NAME: &str = "Anonymous";

/// Kills needed in `phase` before its boss appears.
#[inline]
pub fn kill_quota_for_phase(phase: u32) -> u32 {
    BASE_KILL_QUOTA + KILL_QUOTA_STEP * phase.saturating_sub(1)
}

#[inline]
pub fn boss_health_for_phase(phase: u32) -> u32 {
    BOSS_BASE_HEALTH + BOSS_HEALTH_PER_PHASE * phase
}

#[inline]
pub fn enemy_speed_multiplier(phase: u32) -> f32 {
    1.0 + ENEMY_SPEED_STEP_PER_PHASE * phase.saturating_sub(1) as f32
}

#[inline]
pub fn boss_speed_for_phase(phase: u32) -> f32 {
    BOSS_BASE_SPEED + BOSS_SPEED_STEP_PER_PHASE * phase.saturating_sub(1) as f32
}
