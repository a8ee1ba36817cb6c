use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleCode {
    PhaseNonZero,
    KillQuota,
    StageBossConsistency,
    ShipBounds,
    ShipDirectionRange,
    BulletLimit,
    BulletState,
    EnemyState,
    BossHealthRange,
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PhaseNonZero => write!(f, "PHASE_NONZERO"),
            Self::KillQuota => write!(f, "KILL_QUOTA"),
            Self::StageBossConsistency => write!(f, "STAGE_BOSS_CONSISTENCY"),
            Self::ShipBounds => write!(f, "SHIP_BOUNDS"),
            Self::ShipDirectionRange => write!(f, "SHIP_DIRECTION_RANGE"),
            Self::BulletLimit => write!(f, "BULLET_LIMIT"),
            Self::BulletState => write!(f, "BULLET_STATE"),
            Self::EnemyState => write!(f, "ENEMY_STATE"),
            Self::BossHealthRange => write!(f, "BOSS_HEALTH_RANGE"),
        }
    }
}

/// Failure talking to the score service. The client never surfaces these to
/// gameplay; they are logged and the local leaderboard is left as it was.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientError {
    Unavailable { reason: String },
    Status { code: u16, message: String },
    Decode { reason: String },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable { reason } => write!(f, "score service unavailable: {reason}"),
            Self::Status { code, message } => {
                write!(f, "score service returned {code}: {message}")
            }
            Self::Decode { reason } => write!(f, "malformed score service response: {reason}"),
        }
    }
}

impl std::error::Error for ClientError {}
