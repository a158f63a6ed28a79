use chrono::{DateTime, Duration, Utc};

/// When cached pages should be considered stale and refetched on entry.
///
/// Nothing is evicted either way; a stale page stays visible while its
/// replacement loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StalenessPolicy {
    #[default]
    Never,
    After(Duration),
}

impl StalenessPolicy {
    /// Policy from the configured minutes; zero, negative or out-of-range
    /// values mean `Never`.
    pub fn from_minutes(minutes: Option<i64>) -> Self {
        match minutes.filter(|m| *m > 0).and_then(Duration::try_minutes) {
            Some(max_age) => StalenessPolicy::After(max_age),
            None => StalenessPolicy::Never,
        }
    }

    pub fn is_stale(&self, fetched_at: DateTime<Utc>) -> bool {
        match self {
            StalenessPolicy::Never => false,
            StalenessPolicy::After(max_age) => Utc::now() - fetched_at > *max_age,
        }
    }
}

pub fn age_minutes(fetched_at: DateTime<Utc>) -> i64 {
    (Utc::now() - fetched_at).num_minutes()
}

/// Human-readable age such as "just now", "5m ago", "2h ago" or "3d ago".
pub fn age_display(fetched_at: DateTime<Utc>) -> String {
    let minutes = age_minutes(fetched_at);
    if minutes < 1 {
        // Clock skew lands here too
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}
