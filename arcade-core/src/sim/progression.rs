use super::*;

use crate::constants::kill_quota_for_phase;

impl Session {
    /// Counts down a running phase transition and opens the next phase when it expires.
    pub(super) fn advance_progression(&mut self) {
        let Stage::PhaseTransition { remaining } = self.progression.stage else {
            return;
        };

        let remaining = remaining.saturating_sub(1);
        if remaining > 0 {
            self.progression.stage = Stage::PhaseTransition { remaining };
            return;
        }

        let phase = self.progression.phase + 1;
        self.progression = Progression {
            phase,
            kills_in_phase: 0,
            kills_required: kill_quota_for_phase(phase),
            stage: Stage::Normal,
        };
        self.events.push(GameEvent::PhaseAdvanced { phase });
        tracing::debug!(phase, "phase advanced");
    }
}
