use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use arcade_core::input::decode_input_byte;
use arcade_core::render::{render, HudOverlay};
use arcade_core::{Canvas, CuePlayer, CueSink, GameConfig, Palette, Session};

/// Replays a recorded tape on the default configuration, sounding cues as it goes.
/// Returns the finished session and how many cues were sent to the sink.
pub fn replay_session<S: CueSink>(
    seed: u32,
    inputs: &[u8],
    cues: &mut CuePlayer<S>,
) -> (Session, usize) {
    let mut session = Session::new(GameConfig::default(), seed);
    let mut cues_played = 0;
    for byte in inputs {
        let events = session.step(decode_input_byte(*byte));
        cues_played += cues.handle_events(&events);
    }
    (session, cues_played)
}

/// Binary PPM (`P6`) of the session as currently drawn.
pub fn frame_ppm(session: &Session, overlay: &HudOverlay<'_>) -> Vec<u8> {
    let viewport = session.viewport();
    let mut canvas = Canvas::new(viewport.width as usize, viewport.height as usize);
    canvas.draw(
        &render(session, overlay),
        &Palette::for_theme(session.config().theme),
    );

    let mut ppm = format!("P6\n{} {}\n255\n", canvas.width(), canvas.height()).into_bytes();
    ppm.extend_from_slice(&canvas.to_rgb_bytes());
    ppm
}

pub fn write_frame_ppm(path: &Path, session: &Session, overlay: &HudOverlay<'_>) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating {}", parent.display()))?;
        }
    }
    fs::write(path, frame_ppm(session, overlay))
        .with_context(|| format!("failed writing {}", path.display()))
}
