/// Initial schema.
///
/// `assigned_to` and `category_id` are soft references: there is no
/// `FOREIGN KEY` clause, and deleting a member or category clears them from
/// application code instead.
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS family_members (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT,
    avatar_url TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    color TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL,
    description TEXT,
    due_date TEXT,
    is_completed INTEGER NOT NULL DEFAULT 0 CHECK (is_completed IN (0, 1)),
    assigned_to INTEGER,
    category_id INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL CHECK (updated_at >= created_at)
);

CREATE INDEX IF NOT EXISTS idx_tasks_assigned_to ON tasks(assigned_to);
CREATE INDEX IF NOT EXISTS idx_tasks_category ON tasks(category_id);
"#;

pub(crate) struct Migration {
    pub version: u32,
    pub sql: &'static str,
}

/// Applied in order; `version` is mirrored to `PRAGMA user_version`.
pub(crate) const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: SCHEMA,
}];

/// Latest schema version this build knows how to produce.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}
