pub const SCHEMA: &str = r#"
-- Primary account records
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT,            -- NULL for identity-provider accounts
    name TEXT,
    admin INTEGER NOT NULL DEFAULT 0,
    permissions INTEGER NOT NULL DEFAULT 0,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Per-account profile records, created lazily on first profile update.
-- Keyed one-to-one to users by email value.
CREATE TABLE IF NOT EXISTS user_infos (
    email TEXT PRIMARY KEY REFERENCES users(email) ON DELETE CASCADE,
    image TEXT,
    admin INTEGER NOT NULL DEFAULT 0,
    permissions INTEGER NOT NULL DEFAULT 0,
    phone TEXT,
    street_address TEXT,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
"#;
