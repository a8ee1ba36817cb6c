use super::*;

use crate::config::{Theme, Viewport};
use crate::constants::{
    kill_quota_for_phase, BOSS_BOB_AMPLITUDE, BOSS_BOB_STEP, BOSS_HOLD_INSET, BUBBLE_COUNT,
    BULLET_HEIGHT, BULLET_LIMIT, BULLET_SPEED, BULLET_WIDTH, ENEMY_CULL_X,
    NAME_PROMPT_DELAY_FRAMES, PLAY_MARGIN, SHIP_HEIGHT, SHIP_SPEED, SHIP_WIDTH, SHIP_X,
    STAR_COUNT, TOUCH_DRAG_FACTOR, WAVE_AMPLITUDE, WAVE_FREQUENCY, ZIGZAG_HALF_PERIOD_FRAMES,
    ZIGZAG_PERIOD_FRAMES, ZIGZAG_STEP,
};
use crate::input::Intent;
use crate::rng::SeededRng;

#[cfg(test)]
mod tests;

/// One running game. Owns every entity; nothing here is shared between sessions.
#[derive(Clone, Debug)]
pub struct Session {
    pub(super) config: GameConfig,
    pub(super) ship: Ship,
    pub(super) bullets: Vec<Bullet>,
    pub(super) enemies: Vec<Enemy>,
    pub(super) boss: Option<Boss>,
    pub(super) explosions: Vec<Explosion>,
    pub(super) background: Vec<Particle>,
    pub(super) progression: Progression,
    pub(super) score: u32,
    pub(super) frame_count: u32,
    pub(super) game_over_frames: u32,
    pub(super) rng: SeededRng,
    pub(super) events: Vec<GameEvent>,
}

impl Session {
    pub fn new(config: GameConfig, seed: u32) -> Self {
        let viewport = config.viewport;
        let mut session = Self {
            config,
            ship: Ship {
                x: SHIP_X,
                y: viewport.height / 2.0 - SHIP_HEIGHT / 2.0,
                width: SHIP_WIDTH,
                height: SHIP_HEIGHT,
                speed: SHIP_SPEED,
                direction: 0,
            },
            bullets: Vec::with_capacity(BULLET_LIMIT),
            enemies: Vec::with_capacity(16),
            boss: None,
            explosions: Vec::with_capacity(16),
            background: Vec::new(),
            progression: Progression {
                phase: 1,
                kills_in_phase: 0,
                kills_required: kill_quota_for_phase(1),
                stage: Stage::Normal,
            },
            score: 0,
            frame_count: 0,
            game_over_frames: 0,
            rng: SeededRng::new(seed),
            events: Vec::new(),
        };

        session.seed_background();
        session.spawn_enemy();
        session
    }

    #[inline]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.config.viewport
    }

    #[inline]
    pub fn ship(&self) -> &Ship {
        &self.ship
    }

    #[inline]
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    #[inline]
    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    #[inline]
    pub fn boss(&self) -> Option<&Boss> {
        self.boss.as_ref()
    }

    #[inline]
    pub fn explosions(&self) -> &[Explosion] {
        &self.explosions
    }

    #[inline]
    pub fn background(&self) -> &[Particle] {
        &self.background
    }

    #[inline]
    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[inline]
    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.progression.is_game_over()
    }

    /// True once the post-death delay has elapsed and the player may enter a name.
    #[inline]
    pub fn awaiting_name(&self) -> bool {
        self.is_game_over() && self.game_over_frames >= NAME_PROMPT_DELAY_FRAMES
    }

    pub fn result(&self) -> ReplayResult {
        ReplayResult {
            final_score: self.score,
            final_phase: self.progression.phase,
            final_rng_state: self.rng.state(),
            frame_count: self.frame_count,
            game_over: self.is_game_over(),
        }
    }

    pub fn checkpoint(&self) -> ReplayCheckpoint {
        ReplayCheckpoint {
            frame_count: self.frame_count,
            rng_state: self.rng.state(),
            score: self.score,
            phase: self.progression.phase,
            kills_in_phase: self.progression.kills_in_phase,
            stage: self.progression.stage,
            bullets: self.bullets.len(),
            enemies: self.enemies.len(),
            boss_health: self.boss.map(|boss| boss.health),
            ship_y: self.ship.y,
        }
    }

    /// Advances one frame and returns what happened during it.
    pub fn step(&mut self, intent: Intent) -> Vec<GameEvent> {
        if self.is_game_over() {
            self.step_game_over();
            return std::mem::take(&mut self.events);
        }

        self.frame_count += 1;

        self.apply_intent(intent);
        self.update_ship();
        self.update_background();
        self.update_bullets();
        self.update_enemies();
        self.update_boss();
        self.update_explosions();
        self.advance_progression();

        self.resolve_bullet_enemy_hits();
        self.resolve_boss_hits();
        if self.resolve_ship_collisions() {
            return std::mem::take(&mut self.events);
        }

        self.run_spawn_schedule();

        std::mem::take(&mut self.events)
    }

    fn step_game_over(&mut self) {
        if self.game_over_frames < NAME_PROMPT_DELAY_FRAMES {
            self.game_over_frames += 1;
            if self.game_over_frames == NAME_PROMPT_DELAY_FRAMES {
                self.events.push(GameEvent::NamePromptReady { score: self.score });
            }
        }
    }

    fn apply_intent(&mut self, intent: Intent) {
        self.ship.direction = intent.direction.signum();

        if intent.touch_dy != 0.0 {
            self.ship.y = self.clamp_ship_y(self.ship.y + intent.touch_dy * TOUCH_DRAG_FACTOR);
        }

        for _ in 0..intent.fire_presses {
            self.shoot();
        }
    }

    fn shoot(&mut self) {
        if self.bullets.len() >= BULLET_LIMIT {
            return;
        }

        self.bullets.push(Bullet {
            x: self.ship.x + self.ship.width,
            y: self.ship.y + self.ship.height / 2.0 - BULLET_HEIGHT / 2.0,
            width: BULLET_WIDTH,
            height: BULLET_HEIGHT,
            speed: BULLET_SPEED,
            alive: true,
        });
        self.events.push(GameEvent::Shot);
    }

    #[inline]
    fn clamp_ship_y(&self, y: f32) -> f32 {
        clamp_to_band(y, self.ship.height, self.config.viewport.height)
    }

    fn update_ship(&mut self) {
        let moved = self.ship.y + f32::from(self.ship.direction) * self.ship.speed;
        self.ship.y = self.clamp_ship_y(moved);
    }

    fn seed_background(&mut self) {
        let Viewport { width, height } = self.config.viewport;
        let count = match self.config.theme {
            Theme::Space => STAR_COUNT,
            Theme::Underwater => BUBBLE_COUNT,
        };

        for _ in 0..count {
            let particle = match self.config.theme {
                Theme::Space => Particle {
                    x: self.rng.next_f32() * width,
                    y: self.rng.next_f32() * height,
                    speed: 0.5 + self.rng.next_f32() * 1.5,
                    size: if self.rng.next_f32() > 0.7 { 2.0 } else { 1.0 },
                    wobble: 0.0,
                },
                Theme::Underwater => Particle {
                    x: self.rng.next_f32() * width,
                    y: self.rng.next_f32() * height,
                    speed: 0.3 + self.rng.next_f32() * 0.7,
                    size: 1.0 + (self.rng.next_f32() * 3.0).floor(),
                    wobble: self.rng.next_f32() * core::f32::consts::TAU,
                },
            };
            self.background.push(particle);
        }
    }

    fn update_background(&mut self) {
        let Viewport { width, height } = self.config.viewport;

        for index in 0..self.background.len() {
            let mut particle = self.background[index];
            match self.config.theme {
                Theme::Space => {
                    particle.x -= particle.speed;
                    if particle.x < 0.0 {
                        particle.x = width;
                        particle.y = self.rng.next_f32() * height;
                    }
                }
                Theme::Underwater => {
                    particle.y -= particle.speed;
                    particle.wobble += 0.1;
                    particle.x += particle.wobble.sin() * 0.3;
                    if particle.y < -particle.size {
                        particle.y = height + particle.size;
                        particle.x = self.rng.next_f32() * width;
                    }
                }
            }
            self.background[index] = particle;
        }
    }

    fn update_bullets(&mut self) {
        let width = self.config.viewport.width;
        for bullet in &mut self.bullets {
            bullet.x += bullet.speed;
            if bullet.x > width {
                bullet.alive = false;
            }
        }
        self.bullets.retain(|bullet| bullet.alive);
    }

    fn update_enemies(&mut self) {
        let height = self.config.viewport.height;
        let frame = self.frame_count;

        for enemy in &mut self.enemies {
            enemy.x -= enemy.speed;

            match enemy.kind {
                EnemyKind::Straight => {}
                EnemyKind::Wave => {
                    enemy.y += (frame as f32 * WAVE_FREQUENCY + enemy.phase_offset).sin()
                        * WAVE_AMPLITUDE;
                }
                EnemyKind::Zigzag => {
                    if frame % ZIGZAG_PERIOD_FRAMES < ZIGZAG_HALF_PERIOD_FRAMES {
                        enemy.y += ZIGZAG_STEP;
                    } else {
                        enemy.y -= ZIGZAG_STEP;
                    }
                }
            }

            enemy.y = clamp_to_band(enemy.y, enemy.height, height);
            if enemy.x < ENEMY_CULL_X {
                enemy.alive = false;
            }
        }
        self.enemies.retain(|enemy| enemy.alive);
    }

    fn update_boss(&mut self) {
        let Viewport { width, height } = self.config.viewport;
        let Some(boss) = self.boss.as_mut() else {
            return;
        };

        let hold_x = width - boss.width - BOSS_HOLD_INSET;
        if !boss.entered {
            boss.x -= boss.speed;
            if boss.x <= hold_x {
                boss.x = hold_x;
                boss.entered = true;
            }
            return;
        }

        let delta = boss.target_y - boss.y;
        let arrived = delta.abs() <= boss.speed;
        if arrived {
            boss.y = boss.target_y;
        } else {
            boss.y += boss.speed * delta.signum();
        }

        boss.movement_phase += BOSS_BOB_STEP;
        boss.y += boss.movement_phase.sin() * BOSS_BOB_AMPLITUDE;
        boss.y = clamp_to_band(boss.y, boss.height, height);

        if arrived {
            let boss_height = boss.height;
            let target = self.random_band_y(boss_height);
            if let Some(boss) = self.boss.as_mut() {
                boss.target_y = target;
            }
        }
    }

    fn update_explosions(&mut self) {
        for explosion in &mut self.explosions {
            explosion.frame += 1;
        }
        self.explosions
            .retain(|explosion| explosion.frame < explosion.max_frames);
    }

    pub(super) fn random_band_y(&mut self, entity_height: f32) -> f32 {
        let height = self.config.viewport.height;
        let span = (height - entity_height - 2.0 * PLAY_MARGIN).max(0.0);
        PLAY_MARGIN + self.rng.next_f32() * span
    }

    pub(super) fn push_explosion(&mut self, x: f32, y: f32, max_frames: u32) {
        self.explosions.push(Explosion {
            x,
            y,
            frame: 0,
            max_frames,
        });
    }

    pub fn validate_invariants(&self) -> Result<(), RuleCode> {
        let Viewport { width, height } = self.config.viewport;

        if self.progression.phase < 1 {
            return Err(RuleCode::PhaseNonZero);
        }

        if self.progression.kills_required != kill_quota_for_phase(self.progression.phase) {
            return Err(RuleCode::KillQuota);
        }

        let boss_consistent = match self.progression.stage {
            Stage::BossEncounter => self.boss.is_some(),
            Stage::Normal | Stage::PhaseTransition { .. } => self.boss.is_none(),
            Stage::GameOver => true,
        };
        if !boss_consistent {
            return Err(RuleCode::StageBossConsistency);
        }

        if self.ship.y < PLAY_MARGIN || self.ship.y > height - self.ship.height - PLAY_MARGIN {
            return Err(RuleCode::ShipBounds);
        }

        if !(-1..=1).contains(&self.ship.direction) {
            return Err(RuleCode::ShipDirectionRange);
        }

        if self.bullets.len() > BULLET_LIMIT {
            return Err(RuleCode::BulletLimit);
        }

        for bullet in &self.bullets {
            if !bullet.alive || bullet.x > width {
                return Err(RuleCode::BulletState);
            }
        }

        for enemy in &self.enemies {
            if !enemy.alive || enemy.x < ENEMY_CULL_X {
                return Err(RuleCode::EnemyState);
            }
        }

        if let Some(boss) = &self.boss {
            if boss.health == 0 || boss.health > boss.max_health {
                return Err(RuleCode::BossHealthRange);
            }
        }

        Ok(())
    }
}

/// Clamps `y` so an entity of `entity_height` stays inside the margins.
#[inline]
pub(super) fn clamp_to_band(y: f32, entity_height: f32, viewport_height: f32) -> f32 {
    let max = viewport_height - entity_height - PLAY_MARGIN;
    y.max(PLAY_MARGIN).min(max)
}

impl Ship {
    #[inline]
    pub fn hitbox(&self) -> Hitbox {
        Hitbox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

impl Bullet {
    #[inline]
    pub fn hitbox(&self) -> Hitbox {
        Hitbox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

impl Enemy {
    #[inline]
    pub fn hitbox(&self) -> Hitbox {
        Hitbox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

impl Boss {
    #[inline]
    pub fn hitbox(&self) -> Hitbox {
        Hitbox {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}
