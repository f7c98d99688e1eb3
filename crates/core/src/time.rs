use chrono::{DateTime, Duration, Utc};

/// Where scheduling code reads the current instant from.
///
/// Services read it once per operation and pass that instant down, so
/// pinning it with [`Clock::Fixed`] replays a multi-day study history in a
/// test without waiting.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Step a pinned clock forward by `days`; the system clock cannot move.
    pub fn advance_days(&mut self, days: i64) {
        if let Clock::Fixed(at) = self {
            *at += Duration::days(days);
        }
    }
}

/// 2023-11-14T22:13:20Z, the instant every test day is counted from.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

/// A clock pinned at [`fixed_now`].
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_clock_moves_by_whole_days() {
        let mut clock = fixed_clock();
        clock.advance_days(3);
        assert_eq!(clock.now(), fixed_now() + Duration::days(3));
        assert!(matches!(clock, Clock::Fixed(_)));
    }

    #[test]
    fn system_clock_stays_on_wall_time() {
        let mut clock = Clock::system();
        clock.advance_days(10);
        assert!(matches!(clock, Clock::System));
        assert!(clock.now() > fixed_now());
    }
}
