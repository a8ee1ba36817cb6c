use super::*;

use crate::constants::{BOSS_EXPLOSION_FRAMES, EXPLOSION_FRAMES, PHASE_TRANSITION_FRAMES};

const BOSS_BURST_OFFSETS: [(f32, f32); 5] =
    [(0.0, 0.0), (-8.0, -6.0), (8.0, -6.0), (-8.0, 6.0), (8.0, 6.0)];

impl Session {
    /// Each bullet takes out at most one enemy. Both lists are scanned newest first, so
    /// the most recently fired bullet claims the most recently spawned enemy it overlaps.
    pub(super) fn resolve_bullet_enemy_hits(&mut self) {
        for bullet_index in (0..self.bullets.len()).rev() {
            if !self.bullets[bullet_index].alive {
                continue;
            }
            let bullet_box = self.bullets[bullet_index].hitbox();

            for enemy_index in (0..self.enemies.len()).rev() {
                if !self.enemies[enemy_index].alive {
                    continue;
                }

                if bullet_box.overlaps(&self.enemies[enemy_index].hitbox()) {
                    self.bullets[bullet_index].alive = false;
                    self.enemies[enemy_index].alive = false;
                    let enemy = self.enemies[enemy_index];
                    self.destroy_enemy(enemy);
                    break;
                }
            }
        }

        self.bullets.retain(|bullet| bullet.alive);
        self.enemies.retain(|enemy| enemy.alive);
    }

    fn destroy_enemy(&mut self, enemy: Enemy) {
        let (cx, cy) = enemy.hitbox().center();
        self.push_explosion(cx, cy, EXPLOSION_FRAMES);
        self.score = self.score.saturating_add(enemy.points);
        self.progression.kills_in_phase += 1;
        self.events.push(GameEvent::EnemyDestroyed {
            kind: enemy.kind,
            points: enemy.points,
        });

        if matches!(self.progression.stage, Stage::Normal)
            && self.progression.kills_in_phase >= self.progression.kills_required
        {
            self.spawn_boss();
        }
    }

    /// Every overlapping bullet costs the boss one health point.
    pub(super) fn resolve_boss_hits(&mut self) {
        let Some(mut boss) = self.boss else {
            return;
        };
        let boss_box = boss.hitbox();
        let mut defeated = false;

        for bullet in &mut self.bullets {
            if !bullet.alive || !bullet.hitbox().overlaps(&boss_box) {
                continue;
            }

            bullet.alive = false;
            boss.health -= 1;
            if boss.health == 0 {
                defeated = true;
                break;
            }
            self.events.push(GameEvent::BossHit {
                health_left: boss.health,
            });
        }
        self.bullets.retain(|bullet| bullet.alive);

        if defeated {
            self.boss = None;
            self.defeat_boss(boss);
        } else {
            self.boss = Some(boss);
        }
    }

    fn defeat_boss(&mut self, boss: Boss) {
        let (cx, cy) = boss.hitbox().center();
        for (dx, dy) in BOSS_BURST_OFFSETS {
            self.push_explosion(cx + dx, cy + dy, BOSS_EXPLOSION_FRAMES);
        }

        self.score = self.score.saturating_add(boss.points);
        self.progression.stage = Stage::PhaseTransition {
            remaining: PHASE_TRANSITION_FRAMES,
        };
        self.events.push(GameEvent::BossDefeated {
            phase: self.progression.phase,
            points: boss.points,
        });
        tracing::debug!(phase = self.progression.phase, score = self.score, "boss defeated");
    }

    /// Returns `true` when the ship was hit; the caller must end the frame there.
    pub(super) fn resolve_ship_collisions(&mut self) -> bool {
        let ship_box = self.ship.hitbox();
        let hit_enemy = self
            .enemies
            .iter()
            .any(|enemy| enemy.hitbox().overlaps(&ship_box));
        let hit_boss = self
            .boss
            .is_some_and(|boss| boss.hitbox().overlaps(&ship_box));

        if !hit_enemy && !hit_boss {
            return false;
        }

        let (cx, cy) = ship_box.center();
        self.push_explosion(cx, cy, BOSS_EXPLOSION_FRAMES);
        self.progression.stage = Stage::GameOver;
        self.game_over_frames = 0;
        self.events.push(GameEvent::PlayerDied { score: self.score });
        tracing::debug!(score = self.score, frame = self.frame_count, "ship destroyed");
        true
    }
}
