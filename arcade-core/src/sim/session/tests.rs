use super::*;
use crate::config::Features;
use crate::constants::{
    boss_health_for_phase, BOSS_HEIGHT, BOSS_WIDTH, PHASE_TRANSITION_FRAMES, SHIP_HEIGHT,
};
use crate::input::encode_input_byte;

const SEED: u32 = 0xDEAD_BEEF;

fn quiet_session() -> Session {
    let mut session = Session::new(GameConfig::default(), SEED);
    session.enemies.clear();
    session
}

fn enemy_at(kind: EnemyKind, x: f32, y: f32) -> Enemy {
    let archetype = kind.archetype();
    Enemy {
        kind,
        x,
        y,
        width: archetype.width,
        height: archetype.height,
        speed: archetype.speed,
        points: archetype.points,
        phase_offset: 0.0,
        alive: true,
    }
}

fn bullet_at(x: f32, y: f32) -> Bullet {
    Bullet {
        x,
        y,
        width: BULLET_WIDTH,
        height: BULLET_HEIGHT,
        speed: BULLET_SPEED,
        alive: true,
    }
}

fn boss_at(x: f32, y: f32, health: u32) -> Boss {
    Boss {
        x,
        y,
        width: BOSS_WIDTH,
        height: BOSS_HEIGHT,
        speed: 1.0,
        health,
        max_health: health,
        points: 100,
        target_y: y,
        movement_phase: 0.0,
        entered: true,
    }
}

fn drain(session: &mut Session) -> Vec<GameEvent> {
    std::mem::take(&mut session.events)
}

fn assert_invariant_violation(mutator: impl FnOnce(&mut Session), expected: RuleCode) {
    let mut session = Session::new(GameConfig::default(), SEED);
    mutator(&mut session);
    assert_eq!(session.validate_invariants(), Err(expected));
}

#[test]
fn same_seed_and_inputs_are_deterministic() {
    let inputs = [0x00u8, 0x01, 0x04, 0x06, 0x00, 0x02, 0x05, 0x00];
    let a = replay(0x1234_5678, &inputs);
    let b = replay(0x1234_5678, &inputs);
    assert_eq!(a, b);
}

#[test]
fn strict_replay_matches_regular_replay_on_random_inputs() {
    let mut rng = SeededRng::new(0xC0FF_EE00);

    for _ in 0..32 {
        let seed = rng.next();
        let len = (rng.next() % 2_000 + 1) as usize;
        let inputs: Vec<u8> = (0..len).map(|_| (rng.next() & 0x07) as u8).collect();

        let regular = replay(seed, &inputs);
        let strict = replay_strict(seed, &inputs).expect("strict replay should succeed");
        assert_eq!(regular, strict);
    }
}

#[test]
fn ship_stays_inside_vertical_band_every_frame() {
    let mut rng = SeededRng::new(42);
    let mut session = Session::new(GameConfig::default(), 7);
    let height = session.viewport().height;

    for _ in 0..5_000 {
        let intent = Intent {
            direction: (rng.next_int(3) as i8) - 1,
            fire_presses: (rng.next_int(2)) as u8,
            touch_dy: rng.next_range_f32(-120.0, 120.0),
        };
        session.step(intent);

        let y = session.ship().y;
        assert!(y >= PLAY_MARGIN, "ship above band: {y}");
        assert!(
            y <= height - SHIP_HEIGHT - PLAY_MARGIN,
            "ship below band: {y}"
        );
    }
}

#[test]
fn holding_up_pins_ship_to_top_margin() {
    let mut session = quiet_session();
    for _ in 0..100 {
        session.step(Intent::up());
    }
    assert_eq!(session.ship().y, PLAY_MARGIN);
}

#[test]
fn live_bullets_are_capped() {
    let mut session = quiet_session();
    let intent = Intent {
        fire_presses: 10,
        ..Intent::IDLE
    };

    let events = session.step(intent);
    assert_eq!(session.bullets().len(), BULLET_LIMIT);
    assert_eq!(
        events.iter().filter(|event| **event == GameEvent::Shot).count(),
        BULLET_LIMIT
    );
}

#[test]
fn bullets_leave_past_the_right_edge() {
    let mut session = quiet_session();
    session.step(Intent::fire());
    assert_eq!(session.bullets().len(), 1);

    for _ in 0..100 {
        session.step(Intent::IDLE);
    }
    assert!(session.bullets().is_empty());
}

#[test]
fn one_bullet_resolves_against_newest_overlapping_enemy_only() {
    let mut session = quiet_session();
    session.enemies.push(enemy_at(EnemyKind::Straight, 200.0, 100.0));
    session.enemies.push(enemy_at(EnemyKind::Wave, 202.0, 99.0));
    session.bullets.push(bullet_at(203.0, 104.0));

    session.resolve_bullet_enemy_hits();

    assert!(session.bullets.is_empty());
    assert_eq!(session.enemies.len(), 1);
    assert_eq!(session.enemies[0].kind, EnemyKind::Straight);
    assert_eq!(session.score, 20);
    assert_eq!(session.progression.kills_in_phase, 1);

    let explosion = session.explosions.last().copied().expect("explosion spawned");
    assert_eq!((explosion.x, explosion.y), (209.0, 105.0));
    assert_eq!(
        drain(&mut session),
        vec![GameEvent::EnemyDestroyed {
            kind: EnemyKind::Wave,
            points: 20
        }]
    );
}

#[test]
fn newest_bullet_claims_a_shared_enemy() {
    let mut session = quiet_session();
    session.enemies.push(enemy_at(EnemyKind::Zigzag, 200.0, 100.0));
    session.bullets.push(bullet_at(201.0, 104.0));
    session.bullets.push(bullet_at(203.0, 106.0));

    session.resolve_bullet_enemy_hits();

    assert!(session.enemies.is_empty());
    assert_eq!(session.bullets.len(), 1);
    assert_eq!(session.bullets[0].x, 201.0);
    assert_eq!(session.score, 30);
}

#[test]
fn kill_quota_grows_with_phase() {
    assert_eq!(kill_quota_for_phase(1), 10);
    assert_eq!(kill_quota_for_phase(2), 12);
    for phase in 1..50 {
        assert!(kill_quota_for_phase(phase + 1) > kill_quota_for_phase(phase));
    }
}

#[test]
fn reaching_kill_quota_spawns_boss() {
    let mut session = quiet_session();
    session.progression.kills_in_phase = session.progression.kills_required - 1;
    session.enemies.push(enemy_at(EnemyKind::Straight, 200.0, 100.0));
    session.bullets.push(bullet_at(203.0, 104.0));

    session.resolve_bullet_enemy_hits();

    assert_eq!(session.progression.stage, Stage::BossEncounter);
    let boss = session.boss.expect("boss spawned");
    assert_eq!(boss.health, boss_health_for_phase(1));
    assert_eq!(boss.health, 8);
    assert_eq!(boss.points, 100);
    assert!(drain(&mut session).contains(&GameEvent::BossSpawned { phase: 1 }));
}

#[test]
fn boss_is_not_spawned_when_disabled() {
    let config = GameConfig {
        features: Features::BASIC,
        ..GameConfig::default()
    };
    let mut session = Session::new(config, SEED);
    session.enemies.clear();
    session.progression.kills_in_phase = 50;
    session.enemies.push(enemy_at(EnemyKind::Straight, 200.0, 100.0));
    session.bullets.push(bullet_at(203.0, 104.0));

    session.resolve_bullet_enemy_hits();

    assert!(session.boss.is_none());
    assert_eq!(session.progression.stage, Stage::Normal);
}

#[test]
fn no_enemies_spawn_during_boss_or_transition() {
    let mut session = quiet_session();
    session.boss = Some(boss_at(300.0, 80.0, 8));
    session.progression.stage = Stage::BossEncounter;
    assert!(!session.spawn_enemy());

    session.boss = None;
    session.progression.stage = Stage::PhaseTransition { remaining: 10 };
    assert!(!session.spawn_enemy());
    assert!(session.enemies.is_empty());
}

#[test]
fn boss_health_decreases_one_per_hit_and_encounter_ends_at_zero() {
    let mut session = quiet_session();
    session.boss = Some(boss_at(300.0, 80.0, 4));
    session.progression.stage = Stage::BossEncounter;

    let mut last_health = 4;
    for expected in (1..4).rev() {
        session.bullets.push(bullet_at(305.0, 90.0));
        session.resolve_boss_hits();

        let boss = session.boss.expect("boss still alive");
        assert_eq!(boss.health, expected);
        assert!(boss.health < last_health);
        last_health = boss.health;
        assert_eq!(session.progression.stage, Stage::BossEncounter);
    }
    drain(&mut session);

    session.bullets.push(bullet_at(305.0, 90.0));
    session.resolve_boss_hits();

    assert!(session.boss.is_none());
    assert_eq!(
        session.progression.stage,
        Stage::PhaseTransition {
            remaining: PHASE_TRANSITION_FRAMES
        }
    );
    assert_eq!(session.score, 100);
    assert_eq!(session.explosions.len(), 5);
    assert_eq!(
        drain(&mut session),
        vec![GameEvent::BossDefeated {
            phase: 1,
            points: 100
        }]
    );
}

#[test]
fn extra_bullets_after_boss_death_are_kept() {
    let mut session = quiet_session();
    session.boss = Some(boss_at(300.0, 80.0, 1));
    session.progression.stage = Stage::BossEncounter;
    session.bullets.push(bullet_at(305.0, 90.0));
    session.bullets.push(bullet_at(306.0, 92.0));

    session.resolve_boss_hits();

    assert!(session.boss.is_none());
    assert_eq!(session.bullets.len(), 1);
}

#[test]
fn phase_transition_opens_next_phase_after_countdown() {
    let mut session = quiet_session();
    session.progression.kills_in_phase = 14;
    session.progression.stage = Stage::PhaseTransition {
        remaining: PHASE_TRANSITION_FRAMES,
    };

    for _ in 0..PHASE_TRANSITION_FRAMES - 1 {
        let events = session.step(Intent::IDLE);
        assert!(!events
            .iter()
            .any(|event| matches!(event, GameEvent::PhaseAdvanced { .. })));
        assert!(session.progression.is_transitioning());
    }

    let events = session.step(Intent::IDLE);
    assert!(events.contains(&GameEvent::PhaseAdvanced { phase: 2 }));
    assert_eq!(session.progression.phase, 2);
    assert_eq!(session.progression.kills_in_phase, 0);
    assert_eq!(session.progression.kills_required, 12);
    assert_eq!(session.progression.stage, Stage::Normal);
}

#[test]
fn later_phases_scale_enemy_points_and_speed() {
    let mut session = quiet_session();
    session.progression.phase = 3;
    session.progression.kills_required = kill_quota_for_phase(3);

    assert!(session.spawn_enemy());
    let enemy = session.enemies[0];
    let archetype = enemy.kind.archetype();
    assert_eq!(enemy.points, archetype.points * 3);
    assert!((enemy.speed - archetype.speed * 1.2).abs() < 1e-5);
}

#[test]
fn ship_contact_with_enemy_ends_the_game() {
    let mut session = quiet_session();
    let ship_y = session.ship.y;
    session
        .enemies
        .push(enemy_at(EnemyKind::Straight, 15.0, ship_y));

    let events = session.step(Intent::IDLE);
    assert!(events.contains(&GameEvent::PlayerDied { score: 0 }));
    assert!(session.is_game_over());

    let frozen_frame = session.frame_count();
    let frozen_enemy_x = session.enemies[0].x;
    for _ in 1..NAME_PROMPT_DELAY_FRAMES {
        assert!(session.step(Intent::fire()).is_empty());
        assert!(!session.awaiting_name());
    }
    assert_eq!(
        session.step(Intent::IDLE),
        vec![GameEvent::NamePromptReady { score: 0 }]
    );
    assert!(session.awaiting_name());
    assert!(session.step(Intent::IDLE).is_empty());

    assert_eq!(session.frame_count(), frozen_frame);
    assert_eq!(session.enemies[0].x, frozen_enemy_x);
    assert!(session.bullets().is_empty());
}

#[test]
fn ship_contact_with_boss_ends_the_game() {
    let mut session = quiet_session();
    let ship_y = session.ship.y;
    session.boss = Some(boss_at(12.0, ship_y, 8));
    session.progression.stage = Stage::BossEncounter;

    let events = session.step(Intent::IDLE);
    assert!(events
        .iter()
        .any(|event| matches!(event, GameEvent::PlayerDied { .. })));
    assert_eq!(session.progression.stage, Stage::GameOver);
}

#[test]
fn frame_due_on_both_spawn_cadences_spawns_once() {
    let mut session = quiet_session();
    session.frame_count = 119;
    session.score = 60;
    session.step(Intent::IDLE);
    assert_eq!(session.enemies.len(), 1);

    let mut session = quiet_session();
    session.frame_count = 119;
    session.score = 50;
    session.step(Intent::IDLE);
    assert_eq!(session.enemies.len(), 1);

    let mut session = quiet_session();
    session.frame_count = 39;
    session.score = 60;
    session.step(Intent::IDLE);
    assert_eq!(session.enemies.len(), 1);

    let mut session = quiet_session();
    session.frame_count = 39;
    session.step(Intent::IDLE);
    assert!(session.enemies.is_empty());
}

#[test]
fn movement_patterns_follow_archetype() {
    let mut session = quiet_session();
    session
        .enemies
        .push(enemy_at(EnemyKind::Straight, 300.0, 100.0));
    session.enemies.push(enemy_at(EnemyKind::Zigzag, 300.0, 100.0));

    session.step(Intent::IDLE);
    assert_eq!(session.enemies[0].y, 100.0);
    assert_eq!(session.enemies[0].x, 298.5);
    assert_eq!(session.enemies[1].y, 100.5);

    session.frame_count = 15;
    session.step(Intent::IDLE);
    assert_eq!(session.enemies[1].y, 100.0);
}

#[test]
fn enemies_are_culled_past_left_edge() {
    let mut session = quiet_session();
    session
        .enemies
        .push(enemy_at(EnemyKind::Straight, -19.0, 20.0));
    session.step(Intent::IDLE);
    assert!(session.enemies.is_empty());
}

#[test]
fn explosions_expire_after_their_frame_budget() {
    let mut session = quiet_session();
    session.push_explosion(200.0, 100.0, 8);
    for _ in 0..7 {
        session.step(Intent::IDLE);
    }
    assert_eq!(session.explosions.len(), 1);
    session.step(Intent::IDLE);
    assert!(session.explosions.is_empty());
}

#[test]
fn boss_enters_then_holds_its_column() {
    let mut session = quiet_session();
    session.progression.kills_in_phase = session.progression.kills_required;
    assert!(session.spawn_boss());

    for _ in 0..200 {
        session.step(Intent::IDLE);
    }
    let boss = session.boss.expect("boss still present");
    assert!(boss.entered);
    assert_eq!(boss.x, session.viewport().width - BOSS_WIDTH - 20.0);
    assert!(boss.y >= PLAY_MARGIN);
    assert!(boss.y <= session.viewport().height - BOSS_HEIGHT - PLAY_MARGIN);
}

#[test]
fn underwater_bubbles_rise() {
    let config = GameConfig {
        theme: Theme::Underwater,
        ..GameConfig::default()
    };
    let mut session = Session::new(config, SEED);
    session.enemies.clear();
    let before: Vec<f32> = session.background.iter().map(|bubble| bubble.y).collect();
    assert_eq!(before.len(), BUBBLE_COUNT);

    session.step(Intent::IDLE);
    for (bubble, old_y) in session.background.iter().zip(before) {
        assert!(bubble.y < old_y || bubble.y > session.viewport().height);
    }
}

#[test]
fn checkpoints_cover_every_stride_and_the_last_frame() {
    let inputs = vec![encode_input_byte(Intent::fire()); 25];
    let checkpoints = replay_with_checkpoints(SEED, &inputs, 10);
    let frames: Vec<u32> = checkpoints.iter().map(|entry| entry.frame_count).collect();
    assert_eq!(frames, vec![0, 10, 20, 25]);
}

#[test]
fn invariants_hold_for_fresh_session() {
    let session = Session::new(GameConfig::default(), SEED);
    assert_eq!(session.validate_invariants(), Ok(()));
}

#[test]
fn invariant_checks_catch_broken_state() {
    assert_invariant_violation(|session| session.progression.phase = 0, RuleCode::PhaseNonZero);
    assert_invariant_violation(
        |session| session.progression.kills_required = 3,
        RuleCode::KillQuota,
    );
    assert_invariant_violation(
        |session| session.progression.stage = Stage::BossEncounter,
        RuleCode::StageBossConsistency,
    );
    assert_invariant_violation(|session| session.ship.y = 0.0, RuleCode::ShipBounds);
    assert_invariant_violation(
        |session| session.ship.direction = 2,
        RuleCode::ShipDirectionRange,
    );
    assert_invariant_violation(
        |session| {
            for _ in 0..=BULLET_LIMIT {
                session.bullets.push(bullet_at(50.0, 50.0));
            }
        },
        RuleCode::BulletLimit,
    );
    assert_invariant_violation(
        |session| session.bullets.push(bullet_at(900.0, 50.0)),
        RuleCode::BulletState,
    );
    assert_invariant_violation(
        |session| {
            session
                .enemies
                .push(enemy_at(EnemyKind::Wave, -50.0, 50.0))
        },
        RuleCode::EnemyState,
    );
    assert_invariant_violation(
        |session| {
            let mut boss = boss_at(300.0, 80.0, 8);
            boss.health = 0;
            session.boss = Some(boss);
            session.progression.stage = Stage::BossEncounter;
        },
        RuleCode::BossHealthRange,
    );
}
