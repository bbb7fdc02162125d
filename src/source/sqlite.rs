//! Local SQLite database source
//!
//! Reads `time_tracking_sessions`, joining categories, tasks and users when
//! those tables exist, plus `time_tracking_goals` when present. The database
//! is opened read-only.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use tracing::debug;

use crate::core::{CategoryRef, Goal, TaskRef, UserRef};
use crate::error::AppError;
use crate::source::record::{RecordId, SessionRecord};
use crate::source::{ParsedFile, Source};

const SESSIONS_TABLE: &str = "time_tracking_sessions";
const CATEGORIES_TABLE: &str = "time_tracking_categories";
const TASKS_TABLE: &str = "tasks";
const USERS_TABLE: &str = "users";
const GOALS_TABLE: &str = "time_tracking_goals";

/// Goal columns in select order, followed by the category name and color
const GOAL_COLUMNS: [&str; 5] = [
    "id",
    "category_id",
    "daily_goal_minutes",
    "weekly_goal_minutes",
    "is_active",
];

/// Session columns in select order; missing optional ones read as NULL
const SESSION_COLUMNS: [&str; 10] = [
    "id",
    "title",
    "description",
    "category_id",
    "task_id",
    "user_id",
    "start_time",
    "end_time",
    "duration_seconds",
    "is_running",
];
const CREATED_AT_COLUMN: &str = "created_at";

pub(crate) struct SqliteSource {
    path: PathBuf,
}

impl SqliteSource {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Source for SqliteSource {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn display_name(&self) -> &'static str {
        "SQLite"
    }

    fn find_files(&self) -> Result<Vec<PathBuf>, AppError> {
        if !self.path.is_file() {
            return Err(AppError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("database not found: {}", self.path.display()),
            )));
        }
        Ok(vec![self.path.clone()])
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile, AppError> {
        let conn = open_read_only(path)?;
        let records = read_records(&conn)?;
        Ok(ParsedFile::from_records(records))
    }

    fn load_goals(&self) -> Result<Vec<Goal>, AppError> {
        if !self.path.is_file() {
            return Ok(Vec::new());
        }
        let conn = open_read_only(&self.path)?;
        read_goals(&conn)
    }
}

fn open_read_only(path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

fn table_columns(conn: &Connection, table: &str) -> rusqlite::Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(1))?;
    rows.collect()
}

fn column_or_null(columns: &HashSet<String>, alias: &str, name: &str) -> String {
    if columns.contains(name) {
        format!("{alias}.{name}")
    } else {
        "NULL".to_string()
    }
}

/// Build the select statement for whatever schema the database has
fn build_query(conn: &Connection) -> rusqlite::Result<String> {
    let session_cols = table_columns(conn, SESSIONS_TABLE)?;
    let category_cols = table_columns(conn, CATEGORIES_TABLE)?;
    let task_cols = table_columns(conn, TASKS_TABLE)?;
    let user_cols = table_columns(conn, USERS_TABLE)?;

    let mut select: Vec<String> = SESSION_COLUMNS
        .iter()
        .map(|c| column_or_null(&session_cols, "s", c))
        .collect();
    select.push(column_or_null(&session_cols, "s", CREATED_AT_COLUMN));

    let mut joins = Vec::new();
    let join_categories = category_cols.contains("id") && session_cols.contains("category_id");
    if join_categories {
        joins.push(format!("LEFT JOIN {CATEGORIES_TABLE} c ON c.id = s.category_id"));
        select.push(column_or_null(&category_cols, "c", "name"));
        select.push(column_or_null(&category_cols, "c", "color"));
    } else {
        select.extend(["NULL".to_string(), "NULL".to_string()]);
    }

    let join_tasks = task_cols.contains("id") && session_cols.contains("task_id");
    if join_tasks {
        joins.push(format!("LEFT JOIN {TASKS_TABLE} t ON t.id = s.task_id"));
        select.push(column_or_null(&task_cols, "t", "name"));
    } else {
        select.push("NULL".to_string());
    }

    let join_users = user_cols.contains("id") && session_cols.contains("user_id");
    if join_users {
        joins.push(format!("LEFT JOIN {USERS_TABLE} u ON u.id = s.user_id"));
        select.push(column_or_null(&user_cols, "u", "display_name"));
        select.push(column_or_null(&user_cols, "u", "avatar_url"));
    } else {
        select.extend(["NULL".to_string(), "NULL".to_string()]);
    }

    debug!(
        categories = join_categories,
        tasks = join_tasks,
        users = join_users,
        "sqlite joins"
    );

    Ok(format!(
        "SELECT {} FROM {SESSIONS_TABLE} s {} ORDER BY s.start_time",
        select.join(", "),
        joins.join(" ")
    ))
}

fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null | ValueRef::Blob(_) => None,
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
        ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
    })
}

fn id(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<RecordId>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => Some(RecordId::Number(i)),
        _ => text(row, idx)?.map(RecordId::Text),
    })
}

fn number(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => Some(i as f64),
        ValueRef::Real(f) => Some(f),
        ValueRef::Text(t) => String::from_utf8_lossy(t).trim().parse().ok(),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<SessionRecord> {
    let category_id = text(row, 3)?;
    let task_id = text(row, 4)?;
    let color = text(row, 12)?;
    let category = text(row, 11)?.map(|name| CategoryRef {
        id: category_id.clone(),
        name,
        color,
    });
    let task = text(row, 13)?.map(|name| TaskRef {
        id: task_id.clone(),
        name,
    });
    let display_name = text(row, 14)?;
    let avatar_url = text(row, 15)?;
    let user = (display_name.is_some() || avatar_url.is_some()).then_some(UserRef {
        display_name,
        avatar_url,
    });

    Ok(SessionRecord {
        id: id(row, 0)?,
        title: text(row, 1)?,
        description: text(row, 2)?,
        category_id: category_id.map(RecordId::Text),
        task_id: task_id.map(RecordId::Text),
        user_id: text(row, 5)?.map(RecordId::Text),
        start_time: text(row, 6)?,
        end_time: text(row, 7)?,
        duration_seconds: number(row, 8)?,
        is_running: number(row, 9)?.map(|v| v != 0.0),
        created_at: text(row, 10)?,
        category,
        task,
        user,
    })
}

fn read_records(conn: &Connection) -> Result<Vec<SessionRecord>, AppError> {
    let query = build_query(conn)?;
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([], record_from_row)?;
    let records = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(records)
}

fn goal_from_row(row: &Row<'_>) -> rusqlite::Result<Option<Goal>> {
    let Some(daily) = number(row, 2)? else {
        return Ok(None);
    };
    let category_id = text(row, 1)?;
    let color = text(row, 6)?;
    let category = text(row, 5)?.map(|name| CategoryRef {
        id: category_id.clone(),
        name,
        color,
    });
    Ok(Some(Goal {
        id: text(row, 0)?,
        category_id,
        category,
        daily_goal_minutes: daily as i64,
        weekly_goal_minutes: number(row, 3)?.map(|m| m as i64),
        is_active: number(row, 4)?.is_none_or(|v| v != 0.0),
    }))
}

/// Goals from `time_tracking_goals`; an absent table means no goals
fn read_goals(conn: &Connection) -> Result<Vec<Goal>, AppError> {
    let goal_cols = table_columns(conn, GOALS_TABLE)?;
    if !goal_cols.contains("daily_goal_minutes") {
        return Ok(Vec::new());
    }
    let category_cols = table_columns(conn, CATEGORIES_TABLE)?;

    let mut select: Vec<String> = GOAL_COLUMNS
        .iter()
        .map(|c| column_or_null(&goal_cols, "g", c))
        .collect();
    let mut join = String::new();
    if category_cols.contains("id") && goal_cols.contains("category_id") {
        join = format!("LEFT JOIN {CATEGORIES_TABLE} c ON c.id = g.category_id");
        select.push(column_or_null(&category_cols, "c", "name"));
        select.push(column_or_null(&category_cols, "c", "color"));
    } else {
        select.extend(["NULL".to_string(), "NULL".to_string()]);
    }

    let query = format!("SELECT {} FROM {GOALS_TABLE} g {join}", select.join(", "));
    let mut stmt = conn.prepare(&query)?;
    let rows = stmt.query_map([], goal_from_row)?;
    let goals: Vec<Goal> = rows
        .collect::<rusqlite::Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();
    debug!(count = goals.len(), "sqlite goals");
    Ok(goals)
}
