pub mod audio;
pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod leaderboard;
pub mod loading;
pub mod render;
pub mod rng;
pub mod sim;

pub use audio::{Cue, CuePlayer, CueSink};
pub use config::{Features, GameConfig, Theme, Viewport};
pub use error::{ClientError, RuleCode};
pub use input::{InputAdapter, InputEvent, Intent};
pub use leaderboard::{LeaderboardClient, LeaderboardEntry, ScoreSubmission, ScoreTransport};
pub use loading::LoadingMeter;
pub use render::{Canvas, DrawCmd, HudOverlay, Palette};
pub use sim::{replay, replay_strict, GameEvent, ReplayResult, Session, Stage};
