use serde::{Deserialize, Serialize};

use crate::constants::{
    DESKTOP_HEIGHT, DESKTOP_WIDTH, MOBILE_BREAKPOINT_PX, MOBILE_HEIGHT, MOBILE_WIDTH,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const DESKTOP: Self = Self {
        width: DESKTOP_WIDTH,
        height: DESKTOP_HEIGHT,
    };

    pub const MOBILE: Self = Self {
        width: MOBILE_WIDTH,
        height: MOBILE_HEIGHT,
    };

    /// Canvas size for a browser window of the given CSS width.
    pub fn for_window_width(window_width: u32) -> Self {
        if window_width < MOBILE_BREAKPOINT_PX {
            Self::MOBILE
        } else {
            Self::DESKTOP
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DESKTOP
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Space,
    Underwater,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Underwater => "underwater",
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "space" => Ok(Self::Space),
            "underwater" => Ok(Self::Underwater),
            _ => Err(format!("invalid theme: {value} (expected space|underwater)")),
        }
    }
}

/// Toggles for the layers that were added on top of the basic shooter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Features {
    pub audio: bool,
    pub leaderboard: bool,
    pub bosses: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            audio: true,
            leaderboard: true,
            bosses: true,
        }
    }
}

impl Features {
    pub const BASIC: Self = Self {
        audio: false,
        leaderboard: false,
        bosses: false,
    };
}

#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct GameConfig {
    pub viewport: Viewport,
    pub theme: Theme,
    pub features: Features,
}
