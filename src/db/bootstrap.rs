//! Store bootstrap — schema creation and demo seed data.
//!
//! A store is fresh when the `users` table does not exist yet (works for
//! both file-backed and in-memory connections). Fresh stores get the schema
//! plus two demo users and three demo todos; existing stores are left
//! untouched.

use rusqlite::Connection;

use crate::types::Result;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL,
    email TEXT UNIQUE NOT NULL
);

CREATE TABLE IF NOT EXISTS todos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users (id),
    task TEXT NOT NULL,
    completed BOOLEAN NOT NULL DEFAULT 0
);
";

const SEED_USERS: &[(&str, &str)] = &[
    ("user1", "user1@example.com"),
    ("user2", "user2@example.com"),
];

const SEED_TODOS: &[(i64, &str, bool)] = &[
    (1, "Complete MCP project", false),
    (1, "Read about SQL injection", true),
    (2, "Buy groceries", false),
];

/// Create and seed the store if it is fresh. Returns whether seeding ran.
pub fn ensure_database(conn: &Connection) -> Result<bool> {
    let already_created: bool = conn
        .prepare("SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'users'")?
        .query_row([], |row| row.get::<_, i64>(0))?
        > 0;

    if already_created {
        tracing::debug!("Database already initialized, no changes made");
        return Ok(false);
    }

    conn.execute_batch(SCHEMA_SQL)?;

    let mut insert_user = conn.prepare("INSERT INTO users (username, email) VALUES (?1, ?2)")?;
    for (username, email) in SEED_USERS {
        insert_user.execute((username, email))?;
    }

    let mut insert_todo =
        conn.prepare("INSERT INTO todos (user_id, task, completed) VALUES (?1, ?2, ?3)")?;
    for (user_id, task, completed) in SEED_TODOS {
        insert_todo.execute((user_id, task, completed))?;
    }

    tracing::info!(
        users = SEED_USERS.len(),
        todos = SEED_TODOS.len(),
        "Database created and seeded"
    );
    Ok(true)
}
