use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::info;

use crate::{name::FieldName, TelemetryField};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    NotArmed,
    Armed { since: Instant },
}

/// Mission clock that starts on the first affirmative `Armed` report and
/// never stops or restarts for the rest of the session.
#[derive(Debug)]
pub struct ArmTimer {
    state: Mutex<ArmState>,
}

impl Default for ArmTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl ArmTimer {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ArmState::NotArmed),
        }
    }

    pub fn observe(&self, field: &TelemetryField) {
        self.observe_at(field, Instant::now())
    }

    pub fn observe_at(&self, field: &TelemetryField, now: Instant) {
        if field.name != FieldName::Armed {
            return;
        }

        let affirmative = field
            .value
            .as_text()
            .is_some_and(|armed| armed.eq_ignore_ascii_case("yes"));

        let mut state = self.state.lock();

        if affirmative && *state == ArmState::NotArmed {
            info!("vehicle armed, starting flight timer");

            *state = ArmState::Armed { since: now };
        }
    }

    pub fn state(&self) -> ArmState {
        *self.state.lock()
    }

    pub fn started_at(&self) -> Option<Instant> {
        match self.state() {
            ArmState::NotArmed => None,
            ArmState::Armed { since } => Some(since),
        }
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed_at(Instant::now())
    }

    pub fn elapsed_at(&self, now: Instant) -> Option<Duration> {
        self.started_at()
            .map(|since| now.saturating_duration_since(since))
    }
}

/// `HH:MM:SS`, with hours allowed to grow past 24.
pub fn format_elapsed(elapsed: Duration) -> String {
    let seconds = elapsed.as_secs();

    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3_600,
        (seconds / 60) % 60,
        seconds % 60
    )
}
