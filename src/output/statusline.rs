use chrono::{DateTime, Utc};

use crate::core::{Session, TrackerSummary};
use crate::utils::format_duration;

/// Latest running session, if any
pub(crate) fn current_session(sessions: &[Session]) -> Option<&Session> {
    sessions
        .iter()
        .filter(|s| s.is_running)
        .max_by_key(|s| s.start_time)
}

/// Single line suitable for statusline/tmux integration
/// Format: "Today: 2h 05m | Week: 10h 00m | Streak: 3d | > Title 12m"
pub(crate) fn format_statusline(
    summary: &TrackerSummary,
    running: Option<&Session>,
    now: DateTime<Utc>,
) -> String {
    let mut parts = vec![
        format!("Today: {}", format_duration(summary.today_time)),
        format!("Week: {}", format_duration(summary.week_time)),
    ];
    if summary.streak > 0 {
        parts.push(format!("Streak: {}d", summary.streak));
    }
    if let Some(session) = running {
        parts.push(format!(
            "> {} {}",
            session.title,
            format_duration(session.elapsed_seconds(now))
        ));
    }
    parts.join(" | ")
}

/// Statusline as JSON for programmatic consumption
pub(crate) fn statusline_json(
    summary: &TrackerSummary,
    running: Option<&Session>,
    now: DateTime<Utc>,
) -> String {
    let running = running.map(|s| {
        serde_json::json!({
            "id": s.id,
            "title": s.title,
            "start_time": s.start_time,
            "elapsed_seconds": s.elapsed_seconds(now),
        })
    });
    let output = serde_json::json!({
        "today_seconds": summary.today_time,
        "week_seconds": summary.week_time,
        "month_seconds": summary.month_time,
        "streak": summary.streak,
        "running": running,
    });
    serde_json::to_string(&output).unwrap_or_else(|e| {
        eprintln!("Failed to serialize statusline JSON: {e}");
        "{}".to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{session, ts};

    fn summary() -> TrackerSummary {
        TrackerSummary {
            today_time: 3600 + 5 * 60,
            week_time: 10 * 3600,
            month_time: 20 * 3600,
            streak: 3,
            ..Default::default()
        }
    }

    #[test]
    fn line_includes_running_session() {
        let now = ts("2025-01-06T10:12:00Z");
        let sessions = vec![
            session("a", "Done", "2025-01-06T08:00:00Z", Some("2025-01-06T09:00:00Z")),
            session("b", "Writing", "2025-01-06T10:00:00Z", None),
        ];
        let running = current_session(&sessions);
        assert_eq!(
            format_statusline(&summary(), running, now),
            "Today: 1h 05m | Week: 10h 00m | Streak: 3d | > Writing 12m"
        );
    }

    #[test]
    fn line_omits_empty_streak() {
        let mut s = summary();
        s.streak = 0;
        let line = format_statusline(&s, None, ts("2025-01-06T10:00:00Z"));
        assert_eq!(line, "Today: 1h 05m | Week: 10h 00m");
    }

    #[test]
    fn json_has_null_running() {
        let json = statusline_json(&summary(), None, ts("2025-01-06T10:00:00Z"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["streak"], 3);
        assert!(value["running"].is_null());
    }
}
