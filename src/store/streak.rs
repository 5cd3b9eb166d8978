use chrono::{Days, NaiveDate};
use tracing::{info, warn};

use crate::error::Result;
use crate::model::StreakState;
use crate::store::kv::{self, SharedKv};

/// How the last recorded completion day relates to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastSeen {
    Never,
    Today,
    Yesterday,
    /// More than a day ago, or (after a clock change) in the future.
    Lapsed,
}

fn last_seen(last: Option<NaiveDate>, today: NaiveDate) -> LastSeen {
    match last {
        None => LastSeen::Never,
        Some(d) if d == today => LastSeen::Today,
        Some(d) if Some(d) == today.checked_sub_days(Days::new(1)) => LastSeen::Yesterday,
        Some(_) => LastSeen::Lapsed,
    }
}

/// Day-transition rule. Returns the new state, or `None` when nothing changes.
///
/// With completions today the streak starts, holds (already counted today),
/// grows (continues from yesterday) or restarts at 1 (a day was missed).
/// Without completions it only ever drops to 0, once the grace day has
/// passed; the last completion date is kept as it was.
pub fn next_state(
    state: &StreakState,
    completed_today: usize,
    today: NaiveDate,
) -> Option<StreakState> {
    let seen = last_seen(state.last_completion_date, today);
    if completed_today > 0 {
        let current_streak = match seen {
            LastSeen::Today => return None,
            LastSeen::Yesterday => state.current_streak.saturating_add(1),
            LastSeen::Never | LastSeen::Lapsed => 1,
        };
        return Some(StreakState {
            current_streak,
            last_completion_date: Some(today),
        });
    }

    match seen {
        LastSeen::Lapsed if state.current_streak > 0 => Some(StreakState {
            current_streak: 0,
            last_completion_date: state.last_completion_date,
        }),
        LastSeen::Never | LastSeen::Today | LastSeen::Yesterday | LastSeen::Lapsed => None,
    }
}

/// Persisted daily-streak counter.
pub struct StreakEngine {
    kv: SharedKv,
    state: StreakState,
}

impl StreakEngine {
    pub const KEY: &'static str = "streak";

    pub fn load(kv: SharedKv) -> Result<Self> {
        let state = match kv::load_record::<StreakState>(kv.as_ref(), Self::KEY)? {
            Some(state) if state.is_consistent() => state,
            Some(state) => {
                warn!(
                    current_streak = state.current_streak,
                    "streak record has no completion date, starting over"
                );
                StreakState::default()
            }
            None => StreakState::default(),
        };
        Ok(Self { kv, state })
    }

    pub fn state(&self) -> &StreakState {
        &self.state
    }

    pub fn current(&self) -> u32 {
        self.state.current_streak
    }

    /// Feed today's completion count into the state machine and return the
    /// resulting streak. Storage is only touched when the state changes, so
    /// repeating the same input on the same day is free.
    pub fn evaluate(&mut self, completed_today: usize, today: NaiveDate) -> Result<u32> {
        let Some(next) = next_state(&self.state, completed_today, today) else {
            return Ok(self.state.current_streak);
        };
        kv::save_record(self.kv.as_ref(), Self::KEY, &next)?;
        info!(
            from = self.state.current_streak,
            to = next.current_streak,
            %today,
            "streak updated"
        );
        self.state = next;
        Ok(self.state.current_streak)
    }
}
