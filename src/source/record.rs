//! Raw session rows as exported by the tracker, before normalization

use serde::Deserialize;

use crate::core::{CategoryRef, Session, TaskRef, UserRef};
use crate::utils::parse_timestamp;

/// Ids are UUID strings in exports but integers in some local databases
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecordId {
    Text(String),
    Number(i64),
}

impl RecordId {
    fn into_string(self) -> String {
        match self {
            RecordId::Text(s) => s,
            RecordId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct SessionRecord {
    #[serde(default)]
    pub(crate) id: Option<RecordId>,
    #[serde(default)]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) category_id: Option<RecordId>,
    #[serde(default)]
    pub(crate) task_id: Option<RecordId>,
    #[serde(default)]
    pub(crate) user_id: Option<RecordId>,
    #[serde(default)]
    pub(crate) start_time: Option<String>,
    #[serde(default)]
    pub(crate) end_time: Option<String>,
    #[serde(default)]
    pub(crate) duration_seconds: Option<f64>,
    #[serde(default)]
    pub(crate) is_running: Option<bool>,
    #[serde(default)]
    pub(crate) created_at: Option<String>,
    #[serde(default)]
    pub(crate) category: Option<CategoryRef>,
    #[serde(default)]
    pub(crate) task: Option<TaskRef>,
    #[serde(default)]
    pub(crate) user: Option<UserRef>,
}

impl SessionRecord {
    /// Normalize into a `Session`. Returns `None` when the row has no id or
    /// no parseable start time.
    pub(crate) fn into_session(self) -> Option<Session> {
        let id = self.id?.into_string();
        let start_time = parse_timestamp(self.start_time.as_deref()?)?;
        let end_time = self.end_time.as_deref().and_then(parse_timestamp);
        let is_running = self.is_running.unwrap_or(end_time.is_none());

        Some(Session {
            id,
            title: self.title.unwrap_or_default(),
            description: self.description.filter(|d| !d.is_empty()),
            category_id: self.category_id.map(RecordId::into_string),
            task_id: self.task_id.map(RecordId::into_string),
            user_id: self.user_id.map(RecordId::into_string),
            start_time,
            end_time,
            duration_seconds: self.duration_seconds.map(|d| d.round() as i64),
            is_running,
            created_at: self.created_at.as_deref().and_then(parse_timestamp),
            category: self.category,
            task: self.task,
            user: self.user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Option<Session> {
        serde_json::from_str::<SessionRecord>(json)
            .ok()
            .and_then(SessionRecord::into_session)
    }

    #[test]
    fn full_row_with_relations() {
        let s = parse(
            r#"{
                "id": "s1",
                "title": "Write docs",
                "category_id": "c1",
                "start_time": "2025-01-06T09:00:00+00:00",
                "end_time": "2025-01-06T10:00:00+00:00",
                "duration_seconds": 3600,
                "is_running": false,
                "category": {"id": "c1", "name": "Docs", "color": "GREEN"},
                "user": {"display_name": "Ann"}
            }"#,
        )
        .unwrap();
        assert_eq!(s.id, "s1");
        assert_eq!(s.duration_seconds, Some(3600));
        assert_eq!(s.category_name(), Some("Docs"));
        assert_eq!(s.user_name(), Some("Ann"));
        assert!(!s.is_running);
    }

    #[test]
    fn numeric_ids_become_strings() {
        let s = parse(r#"{"id": 42, "task_id": 7, "start_time": "2025-01-06 09:00:00"}"#).unwrap();
        assert_eq!(s.id, "42");
        assert_eq!(s.task_id.as_deref(), Some("7"));
    }

    #[test]
    fn missing_end_means_running() {
        let s = parse(r#"{"id": "s1", "title": "Focus", "start_time": "2025-01-06T09:00:00Z"}"#)
            .unwrap();
        assert!(s.is_running);
        assert!(s.end_time.is_none());
        assert!(s.duration_seconds.is_none());
    }

    #[test]
    fn rows_without_id_or_start_are_rejected() {
        assert!(parse(r#"{"title": "x", "start_time": "2025-01-06T09:00:00Z"}"#).is_none());
        assert!(parse(r#"{"id": "s1", "title": "x"}"#).is_none());
        assert!(parse(r#"{"id": "s1", "start_time": "not a time"}"#).is_none());
    }
}
