// SPDX-License-Identifier: Apache-2.0

use chrono::{DateTime, Duration, Utc};

/// Trailing window for measurement and trend queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Last30Days,
    Last90Days,
    #[default]
    All,
}

impl TimeRange {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "30d" => Some(Self::Last30Days),
            "90d" => Some(Self::Last90Days),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Last30Days => "30d",
            Self::Last90Days => "90d",
            Self::All => "all",
        }
    }

    /// Inclusive lower bound on `created_at`, `None` for an unbounded window.
    #[must_use]
    pub fn since(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Last30Days => Some(now - Duration::days(30)),
            Self::Last90Days => Some(now - Duration::days(90)),
            Self::All => None,
        }
    }
}
