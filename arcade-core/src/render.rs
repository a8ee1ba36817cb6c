//! Display-list renderer.
//!
//! [`render`] reads a session and produces draw commands in painter's order. Colors are
//! semantic roles; a [`Palette`] resolves them per theme. [`Canvas`] rasterizes the list
//! when a pixel buffer is needed.

use serde::Serialize;

use crate::config::Theme;
use crate::leaderboard::LeaderboardEntry;
use crate::sim::{Boss, EnemyKind, Session, Stage};

mod canvas;

pub use canvas::Canvas;

const HUD_TEXT_SIZE: f32 = 8.0;
const BANNER_TEXT_SIZE: f32 = 12.0;
const HEALTH_BAR_HEIGHT: f32 = 3.0;
const HEALTH_BAR_GAP: f32 = 5.0;
const QUOTA_BAR_WIDTH: f32 = 60.0;
const QUOTA_BAR_HEIGHT: f32 = 3.0;
const LEADERBOARD_SNIPPET_ROWS: usize = 3;
const SCORE_DIGITS: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Background,
    Particle,
    Ship,
    ShipAccent,
    Bullet,
    EnemyStraight,
    EnemyWave,
    EnemyZigzag,
    Boss,
    BossAccent,
    HealthHigh,
    HealthMid,
    HealthLow,
    BarTrack,
    QuotaFill,
    Explosion,
    Text,
    TextDim,
    Border,
    BorderAlert,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DrawCmd {
    Clear {
        color: Color,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    StrokeRect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Color,
    },
    /// `x`/`y` is the top-left corner of the first glyph.
    Text {
        x: f32,
        y: f32,
        size: f32,
        text: String,
        color: Color,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb,
    pub particle: Rgb,
    pub ship: Rgb,
    pub ship_accent: Rgb,
    pub bullet: Rgb,
    pub enemies: [Rgb; 3],
    pub boss: Rgb,
    pub boss_accent: Rgb,
    pub health: [Rgb; 3],
    pub bar_track: Rgb,
    pub explosion: Rgb,
    pub text: Rgb,
    pub text_dim: Rgb,
    pub border: Rgb,
    pub border_alert: Rgb,
}

impl Palette {
    pub const SPACE: Self = Self {
        background: Rgb(0, 0, 0),
        particle: Rgb(255, 255, 255),
        ship: Rgb(0, 255, 0),
        ship_accent: Rgb(0, 160, 0),
        bullet: Rgb(255, 255, 0),
        enemies: [Rgb(255, 68, 68), Rgb(255, 136, 0), Rgb(255, 0, 255)],
        boss: Rgb(170, 0, 170),
        boss_accent: Rgb(255, 255, 255),
        health: [Rgb(0, 255, 0), Rgb(255, 255, 0), Rgb(255, 0, 0)],
        bar_track: Rgb(51, 51, 51),
        explosion: Rgb(255, 170, 0),
        text: Rgb(255, 255, 255),
        text_dim: Rgb(136, 136, 136),
        border: Rgb(51, 51, 51),
        border_alert: Rgb(255, 0, 0),
    };

    pub const UNDERWATER: Self = Self {
        background: Rgb(0, 30, 60),
        particle: Rgb(150, 210, 255),
        ship: Rgb(255, 220, 0),
        ship_accent: Rgb(255, 140, 0),
        bullet: Rgb(180, 255, 255),
        enemies: [Rgb(255, 120, 160), Rgb(120, 255, 180), Rgb(200, 140, 255)],
        boss: Rgb(20, 120, 120),
        boss_accent: Rgb(230, 255, 255),
        health: [Rgb(0, 255, 170), Rgb(255, 230, 90), Rgb(255, 80, 80)],
        bar_track: Rgb(0, 50, 90),
        explosion: Rgb(200, 240, 255),
        text: Rgb(230, 250, 255),
        text_dim: Rgb(110, 160, 190),
        border: Rgb(0, 70, 120),
        border_alert: Rgb(255, 80, 80),
    };

    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Space => Self::SPACE,
            Theme::Underwater => Self::UNDERWATER,
        }
    }

    pub fn resolve(&self, color: Color) -> Rgb {
        match color {
            Color::Background => self.background,
            Color::Particle => self.particle,
            Color::Ship => self.ship,
            Color::ShipAccent => self.ship_accent,
            Color::Bullet => self.bullet,
            Color::EnemyStraight => self.enemies[0],
            Color::EnemyWave => self.enemies[1],
            Color::EnemyZigzag => self.enemies[2],
            Color::Boss => self.boss,
            Color::BossAccent => self.boss_accent,
            Color::HealthHigh => self.health[0],
            Color::HealthMid => self.health[1],
            Color::HealthLow => self.health[2],
            Color::BarTrack => self.bar_track,
            Color::QuotaFill => self.health[0],
            Color::Explosion => self.explosion,
            Color::Text => self.text,
            Color::TextDim => self.text_dim,
            Color::Border => self.border,
            Color::BorderAlert => self.border_alert,
        }
    }
}

/// Data drawn over the game that the session does not own.
#[derive(Clone, Copy, Debug, Default)]
pub struct HudOverlay<'a> {
    pub leaderboard: &'a [LeaderboardEntry],
    /// Shown until the page finishes loading.
    pub loading_percent: Option<u8>,
    /// Name typed so far, once the game-over prompt is up.
    pub name_entry: Option<&'a str>,
}

/// Boss health bar color: high above half, mid above a quarter, low otherwise.
pub fn health_color(ratio: f32) -> Color {
    if ratio > 0.5 {
        Color::HealthHigh
    } else if ratio > 0.25 {
        Color::HealthMid
    } else {
        Color::HealthLow
    }
}

pub fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Straight => Color::EnemyStraight,
        EnemyKind::Wave => Color::EnemyWave,
        EnemyKind::Zigzag => Color::EnemyZigzag,
    }
}

pub fn format_score(score: u32) -> String {
    format!("{score:0width$}", width = SCORE_DIGITS)
}

pub fn render(session: &Session, overlay: &HudOverlay<'_>) -> Vec<DrawCmd> {
    let mut frame = Frame::default();

    frame.cmds.push(DrawCmd::Clear {
        color: Color::Background,
    });
    draw_background(&mut frame, session);
    draw_ship(&mut frame, session);
    for bullet in session.bullets() {
        frame.rect(bullet.x, bullet.y, bullet.width, bullet.height, Color::Bullet);
    }
    draw_enemies(&mut frame, session);
    if let Some(boss) = session.boss() {
        draw_boss(&mut frame, boss);
    }
    for explosion in session.explosions() {
        let growth = explosion.frame as f32 / explosion.max_frames.max(1) as f32;
        let size = 4.0 + 12.0 * growth;
        frame.rect(
            explosion.x - size / 2.0,
            explosion.y - size / 2.0,
            size,
            size,
            Color::Explosion,
        );
    }

    draw_hud(&mut frame, session, overlay);
    draw_banners(&mut frame, session, overlay);

    let viewport = session.viewport();
    let border = if session.progression().is_boss_active() {
        Color::BorderAlert
    } else {
        Color::Border
    };
    frame.cmds.push(DrawCmd::StrokeRect {
        x: 0.0,
        y: 0.0,
        width: viewport.width,
        height: viewport.height,
        color: border,
    });

    frame.cmds
}

#[derive(Default)]
struct Frame {
    cmds: Vec<DrawCmd>,
}

impl Frame {
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, color: Color) {
        self.cmds.push(DrawCmd::Rect {
            x,
            y,
            width,
            height,
            color,
        });
    }

    fn text(&mut self, x: f32, y: f32, size: f32, text: impl Into<String>, color: Color) {
        self.cmds.push(DrawCmd::Text {
            x,
            y,
            size,
            text: text.into(),
            color,
        });
    }

    /// Horizontally centered on `center_x`, assuming glyphs are `size * 0.6` wide.
    fn centered_text(&mut self, center_x: f32, y: f32, size: f32, text: String, color: Color) {
        let width = text.chars().count() as f32 * size * 0.6;
        self.text(center_x - width / 2.0, y, size, text, color);
    }
}

fn draw_background(frame: &mut Frame, session: &Session) {
    for particle in session.background() {
        frame.rect(particle.x, particle.y, particle.size, particle.size, Color::Particle);
    }
}

fn draw_ship(frame: &mut Frame, session: &Session) {
    let ship = session.ship();
    if session.is_game_over() {
        return;
    }
    frame.rect(ship.x, ship.y + 3.0, ship.width - 4.0, ship.height - 6.0, Color::Ship);
    frame.rect(
        ship.x + ship.width - 4.0,
        ship.y + ship.height / 2.0 - 1.0,
        4.0,
        2.0,
        Color::Ship,
    );
    frame.rect(ship.x, ship.y, 6.0, 3.0, Color::ShipAccent);
    frame.rect(ship.x, ship.y + ship.height - 3.0, 6.0, 3.0, Color::ShipAccent);
}

fn draw_enemies(frame: &mut Frame, session: &Session) {
    for enemy in session.enemies() {
        let color = enemy_color(enemy.kind);
        match enemy.kind {
            EnemyKind::Straight => {
                frame.rect(enemy.x, enemy.y, enemy.width, enemy.height, color);
            }
            EnemyKind::Wave => {
                frame.rect(enemy.x + 2.0, enemy.y, enemy.width - 2.0, enemy.height, color);
                frame.rect(enemy.x, enemy.y + enemy.height / 2.0 - 2.0, 2.0, 4.0, color);
            }
            EnemyKind::Zigzag => {
                frame.rect(enemy.x, enemy.y, enemy.width, enemy.height, color);
                frame.rect(
                    enemy.x + enemy.width / 4.0,
                    enemy.y + enemy.height / 4.0,
                    enemy.width / 2.0,
                    enemy.height / 2.0,
                    Color::Background,
                );
            }
        }
    }
}

fn draw_boss(frame: &mut Frame, boss: &Boss) {
    frame.rect(boss.x, boss.y, boss.width, boss.height, Color::Boss);
    frame.rect(boss.x + 6.0, boss.y + 8.0, 6.0, 6.0, Color::BossAccent);
    frame.rect(
        boss.x + 6.0,
        boss.y + boss.height - 14.0,
        6.0,
        6.0,
        Color::BossAccent,
    );

    let bar_y = boss.y - HEALTH_BAR_GAP - HEALTH_BAR_HEIGHT;
    let ratio = boss.health_ratio();
    frame.rect(boss.x, bar_y, boss.width, HEALTH_BAR_HEIGHT, Color::BarTrack);
    frame.rect(
        boss.x,
        bar_y,
        boss.width * ratio,
        HEALTH_BAR_HEIGHT,
        health_color(ratio),
    );
}

fn draw_hud(frame: &mut Frame, session: &Session, overlay: &HudOverlay<'_>) {
    let viewport = session.viewport();
    let progression = session.progression();

    frame.text(
        5.0,
        5.0,
        HUD_TEXT_SIZE,
        format!("SCORE {}", format_score(session.score())),
        Color::Text,
    );
    frame.text(
        5.0,
        5.0 + HUD_TEXT_SIZE + 2.0,
        HUD_TEXT_SIZE,
        format!("PHASE {}", progression.phase),
        Color::Text,
    );

    if matches!(progression.stage, Stage::Normal) && progression.kills_required > 0 {
        let bar_y = viewport.height - QUOTA_BAR_HEIGHT - 3.0;
        let filled = (progression.kills_in_phase as f32 / progression.kills_required as f32)
            .min(1.0);
        frame.rect(5.0, bar_y, QUOTA_BAR_WIDTH, QUOTA_BAR_HEIGHT, Color::BarTrack);
        frame.rect(
            5.0,
            bar_y,
            QUOTA_BAR_WIDTH * filled,
            QUOTA_BAR_HEIGHT,
            Color::QuotaFill,
        );
    }

    let column_x = viewport.width - 90.0;
    for (rank, entry) in overlay
        .leaderboard
        .iter()
        .take(LEADERBOARD_SNIPPET_ROWS)
        .enumerate()
    {
        frame.text(
            column_x,
            5.0 + rank as f32 * (HUD_TEXT_SIZE + 2.0),
            HUD_TEXT_SIZE,
            format!("{}. {} {}", rank + 1, entry.name, entry.score),
            Color::TextDim,
        );
    }

    if let Some(percent) = overlay.loading_percent {
        frame.centered_text(
            viewport.width / 2.0,
            5.0,
            HUD_TEXT_SIZE,
            format!("LOADING {percent}%"),
            Color::TextDim,
        );
    }
}

fn draw_banners(frame: &mut Frame, session: &Session, overlay: &HudOverlay<'_>) {
    let viewport = session.viewport();
    let center_x = viewport.width / 2.0;
    let center_y = viewport.height / 2.0 - BANNER_TEXT_SIZE / 2.0;
    let progression = session.progression();

    match progression.stage {
        Stage::Normal => {}
        Stage::BossEncounter => {
            if session.boss().is_some_and(|boss| !boss.entered) {
                frame.centered_text(
                    center_x,
                    center_y,
                    BANNER_TEXT_SIZE,
                    "WARNING: BOSS".to_string(),
                    Color::BorderAlert,
                );
            }
        }
        Stage::PhaseTransition { .. } => {
            frame.centered_text(
                center_x,
                center_y,
                BANNER_TEXT_SIZE,
                format!("PHASE {} CLEAR", progression.phase),
                Color::Text,
            );
        }
        Stage::GameOver => {
            frame.centered_text(
                center_x,
                center_y,
                BANNER_TEXT_SIZE,
                "GAME OVER".to_string(),
                Color::Text,
            );
            if session.awaiting_name() {
                let typed = overlay.name_entry.unwrap_or("");
                frame.centered_text(
                    center_x,
                    center_y + BANNER_TEXT_SIZE + 4.0,
                    HUD_TEXT_SIZE,
                    format!("NAME: {typed}_"),
                    Color::TextDim,
                );
            }
        }
    }
}
