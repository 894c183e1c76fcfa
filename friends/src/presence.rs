use chrono::{DateTime, Utc};

/// Short "last seen" label: `Just now`, `12m ago`, `3h ago`, `2d ago`.
pub fn format_last_seen(last_seen_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(last_seen_at) = last_seen_at else {
        return String::new();
    };

    let elapsed = now.signed_duration_since(last_seen_at);
    let mins = elapsed.num_minutes();
    let hours = elapsed.num_hours();

    if mins < 1 {
        "Just now".to_string()
    } else if mins < 60 {
        format!("{}m ago", mins)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}
