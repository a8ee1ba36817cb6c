//! Scripted players for headless runs. Every run is recorded as a one-byte-per-frame
//! input tape and re-checked with strict replay before its metrics are reported.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use arcade_core::input::{decode_input_byte, encode_input_byte};
use arcade_core::sim::replay_strict;
use arcade_core::{GameConfig, GameEvent, Intent, Session};
use serde::Serialize;

/// Vertical distance (px) between ship and target inside which the tracker holds still.
const TRACK_DEADZONE: f32 = 2.0;
const TRACK_FIRE_WINDOW: f32 = 6.0;
const SWEEP_FIRE_EVERY: u32 = 3;

pub trait AutopilotBot {
    fn id(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn reset(&mut self, seed: u32);
    fn next_input(&mut self, session: &Session) -> Intent;
}

/// Never touches the controls.
#[derive(Default)]
pub struct IdleBot;

impl AutopilotBot for IdleBot {
    fn id(&self) -> &'static str {
        "idle"
    }

    fn description(&self) -> &'static str {
        "no input; baseline for how long a passive ship survives"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, _session: &Session) -> Intent {
        Intent::IDLE
    }
}

/// Bounces between the margins, firing on a fixed cadence.
#[derive(Default)]
pub struct SweeperBot {
    heading_down: bool,
    frames: u32,
}

impl AutopilotBot for SweeperBot {
    fn id(&self) -> &'static str {
        "sweeper"
    }

    fn description(&self) -> &'static str {
        "sweeps the full column and fires every third frame"
    }

    fn reset(&mut self, seed: u32) {
        self.heading_down = seed & 1 == 1;
        self.frames = 0;
    }

    fn next_input(&mut self, session: &Session) -> Intent {
        let ship = session.ship();
        let viewport = session.viewport();
        let top = arcade_core::constants::PLAY_MARGIN;
        let bottom = viewport.height - ship.height - arcade_core::constants::PLAY_MARGIN;
        if ship.y <= top {
            self.heading_down = true;
        } else if ship.y >= bottom {
            self.heading_down = false;
        }

        self.frames += 1;
        let intent = if self.heading_down {
            Intent::down()
        } else {
            Intent::up()
        };
        if self.frames % SWEEP_FIRE_EVERY == 0 {
            intent.with_fire()
        } else {
            intent
        }
    }
}

/// Lines up with the boss, or else the closest enemy still ahead of the ship, and fires
/// once aligned.
#[derive(Default)]
pub struct TrackerBot;

impl TrackerBot {
    fn target_y(session: &Session) -> Option<f32> {
        if let Some(boss) = session.boss() {
            return Some(boss.y + boss.height / 2.0);
        }
        let ship = session.ship();
        session
            .enemies()
            .iter()
            .filter(|enemy| enemy.alive && enemy.x + enemy.width > ship.x + ship.width)
            .min_by(|a, b| a.x.total_cmp(&b.x))
            .map(|enemy| enemy.y + enemy.height / 2.0)
    }
}

impl AutopilotBot for TrackerBot {
    fn id(&self) -> &'static str {
        "tracker"
    }

    fn description(&self) -> &'static str {
        "aligns with the nearest threat and fires when level with it"
    }

    fn reset(&mut self, _seed: u32) {}

    fn next_input(&mut self, session: &Session) -> Intent {
        let Some(target_y) = Self::target_y(session) else {
            return Intent::IDLE;
        };
        let ship = session.ship();
        let dy = target_y - (ship.y + ship.height / 2.0);

        let intent = if dy < -TRACK_DEADZONE {
            Intent::up()
        } else if dy > TRACK_DEADZONE {
            Intent::down()
        } else {
            Intent::IDLE
        };
        if dy.abs() <= TRACK_FIRE_WINDOW {
            intent.with_fire()
        } else {
            intent
        }
    }
}

pub fn bot_ids() -> &'static [&'static str] {
    &["idle", "sweeper", "tracker"]
}

pub fn create_bot(bot_id: &str) -> Option<Box<dyn AutopilotBot + Send>> {
    match bot_id {
        "idle" => Some(Box::new(IdleBot)),
        "sweeper" => Some(Box::new(SweeperBot::default())),
        "tracker" => Some(Box::new(TrackerBot)),
        _ => None,
    }
}

pub fn describe_bots() -> Vec<(&'static str, &'static str)> {
    bot_ids()
        .iter()
        .filter_map(|id| create_bot(id))
        .map(|bot| (bot.id(), bot.description()))
        .collect()
}

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub bot_id: String,
    pub seed: u32,
    pub max_frames: u32,
    pub frame_count: u32,
    pub final_score: u32,
    pub final_phase: u32,
    pub final_rng_state: u32,
    pub game_over: bool,
    pub shots_fired: u32,
    pub enemies_destroyed: u32,
    pub bosses_defeated: u32,
    pub move_frames: u32,
    pub fire_frames: u32,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub inputs: Vec<u8>,
}

pub fn run_bot(bot_id: &str, seed: u32, max_frames: u32) -> Result<RunArtifact> {
    let mut bot = create_bot(bot_id).ok_or_else(|| anyhow!("unknown bot '{bot_id}'"))?;
    run_bot_instance(bot.as_mut(), seed, max_frames)
}

pub fn run_bot_instance(
    bot: &mut dyn AutopilotBot,
    seed: u32,
    max_frames: u32,
) -> Result<RunArtifact> {
    if max_frames == 0 {
        return Err(anyhow!("max_frames must be > 0"));
    }

    bot.reset(seed);

    let mut session = Session::new(GameConfig::default(), seed);
    session
        .validate_invariants()
        .map_err(|rule| anyhow!("initial invariant failure: {rule}"))?;

    let mut inputs = Vec::with_capacity(max_frames as usize);
    let mut shots_fired = 0u32;
    let mut enemies_destroyed = 0u32;
    let mut bosses_defeated = 0u32;

    while inputs.len() < max_frames as usize && !session.is_game_over() {
        // Step on the decoded byte so the tape replays exactly.
        let byte = encode_input_byte(bot.next_input(&session));
        inputs.push(byte);
        for event in session.step(decode_input_byte(byte)) {
            match event {
                GameEvent::Shot => shots_fired += 1,
                GameEvent::EnemyDestroyed { .. } => enemies_destroyed += 1,
                GameEvent::BossDefeated { .. } => bosses_defeated += 1,
                _ => {}
            }
        }
    }

    let result = session.result();
    let replayed = replay_strict(seed, &inputs).map_err(|violation| {
        anyhow!(
            "recorded run broke {} at frame {}",
            violation.rule,
            violation.frame_count
        )
    })?;
    if replayed != result {
        return Err(anyhow!(
            "replay diverged from live run: live={result:?} replay={replayed:?}"
        ));
    }

    let move_frames = inputs.iter().filter(|byte| *byte & 0x03 != 0).count() as u32;
    let fire_frames = inputs.iter().filter(|byte| *byte & 0x04 != 0).count() as u32;

    Ok(RunArtifact {
        metrics: RunMetrics {
            bot_id: bot.id().to_string(),
            seed,
            max_frames,
            frame_count: result.frame_count,
            final_score: result.final_score,
            final_phase: result.final_phase,
            final_rng_state: result.final_rng_state,
            game_over: result.game_over,
            shots_fired,
            enemies_destroyed,
            bosses_defeated,
            move_frames,
            fire_frames,
        },
        inputs,
    })
}

pub fn write_inputs(path: &Path, inputs: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating {}", parent.display()))?;
        }
    }
    fs::write(path, inputs).with_context(|| format!("failed writing {}", path.display()))
}

pub fn read_inputs(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed reading {}", path.display()))
}
