use super::*;

use crate::constants::{
    boss_health_for_phase, boss_speed_for_phase, enemy_speed_multiplier, BOSS_HEIGHT,
    BOSS_POINTS_PER_PHASE, BOSS_WIDTH, ENEMY_SPAWN_X_OFFSET, ENEMY_SPAWN_Y_MIN,
    ENEMY_SPAWN_Y_SPAN_INSET, FAST_SPAWN_INTERVAL_FRAMES, FAST_SPAWN_SCORE_THRESHOLD,
    SPAWN_INTERVAL_FRAMES,
};

impl Session {
    /// Both cadences are checked every frame, but a frame spawns at most one enemy.
    pub(super) fn run_spawn_schedule(&mut self) {
        let frame = self.frame_count;
        let slow_due = frame % SPAWN_INTERVAL_FRAMES == 0;
        let fast_due = frame % FAST_SPAWN_INTERVAL_FRAMES == 0
            && self.score > FAST_SPAWN_SCORE_THRESHOLD;

        if slow_due || fast_due {
            self.spawn_enemy();
        }
    }

    /// Spawns one random archetype scaled to the current phase. Returns `false` (and
    /// does nothing) outside the `Normal` stage.
    pub fn spawn_enemy(&mut self) -> bool {
        if !matches!(self.progression.stage, Stage::Normal) {
            return false;
        }

        let kind = EnemyKind::ALL[self.rng.next_int(EnemyKind::ALL.len() as u32) as usize];
        let archetype = kind.archetype();
        let phase = self.progression.phase;
        let viewport = self.config.viewport;

        let y = ENEMY_SPAWN_Y_MIN
            + self.rng.next_f32() * (viewport.height - ENEMY_SPAWN_Y_SPAN_INSET).max(0.0);
        let phase_offset = self.rng.next_f32() * core::f32::consts::TAU;

        self.enemies.push(Enemy {
            kind,
            x: viewport.width + ENEMY_SPAWN_X_OFFSET,
            y,
            width: archetype.width,
            height: archetype.height,
            speed: archetype.speed * enemy_speed_multiplier(phase),
            points: archetype.points * phase,
            phase_offset,
            alive: true,
        });
        true
    }

    /// Starts the boss encounter for the current phase. Returns `false` when bosses are
    /// disabled or the stage is not `Normal`.
    pub fn spawn_boss(&mut self) -> bool {
        if !self.config.features.bosses || !matches!(self.progression.stage, Stage::Normal) {
            return false;
        }

        let phase = self.progression.phase;
        let health = boss_health_for_phase(phase);
        let y = self.random_band_y(BOSS_HEIGHT);
        let target_y = self.random_band_y(BOSS_HEIGHT);

        self.boss = Some(Boss {
            x: self.config.viewport.width + ENEMY_SPAWN_X_OFFSET,
            y,
            width: BOSS_WIDTH,
            height: BOSS_HEIGHT,
            speed: boss_speed_for_phase(phase),
            health,
            max_health: health,
            points: BOSS_POINTS_PER_PHASE * phase,
            target_y,
            movement_phase: 0.0,
            entered: false,
        });
        self.progression.stage = Stage::BossEncounter;
        self.events.push(GameEvent::BossSpawned { phase });
        tracing::debug!(phase, health, "boss spawned");
        true
    }
}
