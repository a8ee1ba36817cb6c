use crate::constants::{LOADING_STEP_MIN, LOADING_STEP_SPREAD, LOADING_TICK_FRAMES};
use crate::rng::SeededRng;

/// Fake progress shown while the page behind the game loads. It creeps forward on its
/// own and jumps to 100 once the page reports ready.
#[derive(Clone, Debug)]
pub struct LoadingMeter {
    progress: f32,
    frames: u32,
    rng: SeededRng,
}

impl LoadingMeter {
    pub fn new(seed: u32) -> Self {
        Self {
            progress: 0.0,
            frames: 0,
            rng: SeededRng::new(seed),
        }
    }

    pub fn tick(&mut self) {
        if self.progress >= 100.0 {
            return;
        }
        self.frames += 1;
        if self.frames % LOADING_TICK_FRAMES == 0 {
            self.progress += LOADING_STEP_MIN + self.rng.next_f32() * LOADING_STEP_SPREAD;
        }
    }

    pub fn complete(&mut self) {
        self.progress = 100.0;
    }

    pub fn percent(&self) -> u8 {
        self.progress.min(100.0) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.progress >= 100.0
    }
}
