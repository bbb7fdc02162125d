/// Standard date format used throughout the codebase: "2025-01-15"
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";

/// Month key format for month-level groups: "2025-01"
pub(crate) const MONTH_FORMAT: &str = "%Y-%m";

/// Grouping key used when a session has no category or task
pub(crate) const NONE_KEY: &str = "none";

/// Fallback label when a user has no display name
pub(crate) const UNKNOWN_USER: &str = "Unknown User";

/// Fallback label for uncategorized sessions in breakdowns
pub(crate) const UNCATEGORIZED: &str = "Uncategorized";
