//! Interactive terminal game loop.

use std::io::{self, BufWriter};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use arcade_core::render::{render, HudOverlay};
use arcade_core::{
    CuePlayer, DrawCmd, Features, GameConfig, GameEvent, LeaderboardEntry, LoadingMeter,
    Palette, Session, Theme, Viewport,
};
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use crossterm::terminal;

use crate::background::LeaderboardWorker;
use crate::sound::{open_play_sink, PlaySink};
use crate::terminal::{present, CellGrid, NameEntry, TerminalGuard, TerminalInput};
use crate::transport::HttpTransport;

/// Rough CSS pixels per terminal column, for picking the mobile or desktop canvas.
const PX_PER_COLUMN: u32 = 8;

#[derive(Clone, Debug)]
pub struct PlayOptions {
    pub seed: u32,
    pub theme: Theme,
    pub features: Features,
    pub api_url: String,
    pub fps: u32,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    Submit(String),
    Skip,
}

/// Applies one key to the name prompt. Enter submits whatever was typed, Esc skips.
pub fn prompt_key(entry: &mut NameEntry, code: KeyCode) -> Option<PromptOutcome> {
    match code {
        KeyCode::Enter => Some(PromptOutcome::Submit(entry.take())),
        KeyCode::Esc => Some(PromptOutcome::Skip),
        KeyCode::Backspace => {
            entry.backspace();
            None
        }
        KeyCode::Char(ch) => {
            entry.push(ch);
            None
        }
        _ => None,
    }
}

enum Prompt {
    Hidden,
    Typing(NameEntry),
    Done,
}

fn is_quit(code: KeyCode, modifiers: KeyModifiers) -> bool {
    matches!(code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL))
}

pub fn run(options: &PlayOptions) -> Result<()> {
    let mut out = BufWriter::new(io::stdout());
    let _guard = TerminalGuard::enter(&mut out).context("failed to prepare terminal")?;

    // Blocking reads live on their own thread so the frame loop never waits on input.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if tx.send(ev).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });

    let (cols, rows) = terminal::size().context("failed to read terminal size")?;
    let viewport = Viewport::for_window_width(u32::from(cols) * PX_PER_COLUMN);
    let config = GameConfig {
        viewport,
        theme: options.theme,
        features: options.features,
    };
    let palette = Palette::for_theme(options.theme);
    let frame_time = Duration::from_secs_f64(1.0 / f64::from(options.fps.max(1)));

    let worker = if options.features.leaderboard {
        let worker = LeaderboardWorker::spawn(HttpTransport::new(&options.api_url))
            .context("failed to start leaderboard worker")?;
        worker.request_load();
        Some(worker)
    } else {
        None
    };

    tracing::info!(
        seed = options.seed,
        theme = options.theme.as_str(),
        width = viewport.width,
        height = viewport.height,
        "starting game"
    );

    let mut grid = CellGrid::new(cols, rows, viewport);
    let mut cues: CuePlayer<PlaySink> = CuePlayer::new(options.features);
    let mut input = TerminalInput::new();
    let mut loading = LoadingMeter::new(options.seed);
    let mut leaderboard: Vec<LeaderboardEntry> = Vec::new();
    let mut seed = options.seed;
    let mut session = Session::new(config, seed);
    let mut prompt = Prompt::Hidden;
    let mut frame: u64 = 0;

    loop {
        let frame_start = Instant::now();
        frame += 1;

        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => {
                    if kind == KeyEventKind::Press {
                        cues.unlock_with(open_play_sink);
                    }
                    let typing = matches!(prompt, Prompt::Typing(_));
                    if kind == KeyEventKind::Press && !typing && is_quit(code, modifiers) {
                        return Ok(());
                    }

                    match &mut prompt {
                        Prompt::Typing(entry) => {
                            if kind == KeyEventKind::Release {
                                continue;
                            }
                            match prompt_key(entry, code) {
                                Some(PromptOutcome::Submit(name)) => {
                                    if let Some(worker) = &worker {
                                        worker.request_submit(&name, session.score());
                                    }
                                    prompt = Prompt::Done;
                                }
                                Some(PromptOutcome::Skip) => prompt = Prompt::Done,
                                None => {}
                            }
                        }
                        Prompt::Done => {
                            if kind == KeyEventKind::Press
                                && matches!(
                                    code,
                                    KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::Enter
                                )
                            {
                                seed = seed.wrapping_add(1);
                                session = Session::new(config, seed);
                                input.reset();
                                prompt = Prompt::Hidden;
                            }
                        }
                        Prompt::Hidden => input.key(code, kind, frame),
                    }
                }
                Event::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(_),
                    ..
                }) => {
                    cues.unlock_with(open_play_sink);
                    input.click();
                }
                Event::Resize(cols, rows) => grid = CellGrid::new(cols, rows, viewport),
                _ => {}
            }
        }

        let events = session.step(input.snapshot(frame));
        cues.handle_events(&events);
        for event in &events {
            match event {
                GameEvent::PlayerDied { score } => {
                    tracing::info!(score, phase = session.progression().phase, "game over");
                }
                GameEvent::NamePromptReady { .. } => {
                    prompt = if options.features.leaderboard {
                        Prompt::Typing(NameEntry::default())
                    } else {
                        Prompt::Done
                    };
                }
                _ => {}
            }
        }

        if let Some(entries) = worker.as_ref().and_then(LeaderboardWorker::poll) {
            leaderboard = entries;
            loading.complete();
        }
        loading.tick();

        let overlay = HudOverlay {
            leaderboard: &leaderboard,
            loading_percent: (!loading.is_complete()).then(|| loading.percent()),
            name_entry: match &prompt {
                Prompt::Typing(entry) => Some(entry.as_str()),
                _ => None,
            },
        };
        let mut cmds = render(&session, &overlay);
        if matches!(prompt, Prompt::Done) {
            cmds.push(restart_hint(viewport));
        }
        grid.draw(&cmds, &palette);
        present(&mut out, &grid).context("failed to draw frame")?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn restart_hint(viewport: Viewport) -> DrawCmd {
    let text = "R: RESTART  Q: QUIT";
    let size = 8.0;
    DrawCmd::Text {
        x: viewport.width / 2.0 - text.len() as f32 * size * 0.3,
        y: viewport.height - 20.0,
        size,
        text: text.to_string(),
        color: arcade_core::render::Color::TextDim,
    }
}
