//! SQL schema for the PVZ SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS pickup_points (
    pickup_point_id TEXT PRIMARY KEY,
    city            TEXT NOT NULL,
    registered_at   TEXT NOT NULL,
    active          INTEGER NOT NULL DEFAULT 1
);

-- Sessions are never deleted; only `status`, `closed_at` and the
-- `last_sequence` high-water mark change.
CREATE TABLE IF NOT EXISTS intake_sessions (
    session_id      TEXT PRIMARY KEY,
    pickup_point_id TEXT NOT NULL REFERENCES pickup_points(pickup_point_id),
    status          TEXT NOT NULL,   -- 'in_progress' | 'closed'
    opened_at       TEXT NOT NULL,
    closed_at       TEXT,
    last_sequence   INTEGER NOT NULL DEFAULT 0,
    CHECK ((status = 'in_progress') = (closed_at IS NULL))
);

-- At most one open session per pickup point.
CREATE UNIQUE INDEX IF NOT EXISTS intake_sessions_one_open_idx
    ON intake_sessions(pickup_point_id)
    WHERE status = 'in_progress';

CREATE INDEX IF NOT EXISTS intake_sessions_point_idx
    ON intake_sessions(pickup_point_id, opened_at);

-- Rows are deleted only from the top of an open session (LIFO).
CREATE TABLE IF NOT EXISTS products (
    product_id   TEXT PRIMARY KEY,
    session_id   TEXT NOT NULL REFERENCES intake_sessions(session_id),
    product_type TEXT NOT NULL,
    sequence     INTEGER NOT NULL,
    added_at     TEXT NOT NULL,
    UNIQUE (session_id, sequence)
);

CREATE TABLE IF NOT EXISTS accounts (
    account_id    TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    role          TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

-- Bearer tokens, stored as hex SHA-256 digests only.
CREATE TABLE IF NOT EXISTS tokens (
    token_digest TEXT PRIMARY KEY,
    actor_id     TEXT NOT NULL,
    role         TEXT NOT NULL,
    issued_at    TEXT NOT NULL
);

PRAGMA user_version = 1;
";
