pub mod autopilot;
pub mod background;
pub mod benchmark;
pub mod headless;
pub mod play;
pub mod sound;
pub mod terminal;
pub mod transport;
pub mod util;
