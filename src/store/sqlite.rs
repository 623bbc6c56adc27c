use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::{User, UserInfo};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        password_hash: row.get(2)?,
        name: row.get(3)?,
        admin: row.get(4)?,
        permissions: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        updated_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

fn user_info_from_row(row: &Row<'_>) -> rusqlite::Result<UserInfo> {
    Ok(UserInfo {
        email: row.get(0)?,
        image: row.get(1)?,
        admin: row.get(2)?,
        permissions: row.get(3)?,
        phone: row.get(4)?,
        street_address: row.get(5)?,
        created_at: parse_datetime(&row.get::<_, String>(6)?),
        updated_at: parse_datetime(&row.get::<_, String>(7)?),
    })
}

const USER_COLUMNS: &str =
    "id, email, password_hash, name, admin, permissions, created_at, updated_at";
const USER_INFO_COLUMNS: &str =
    "email, image, admin, permissions, phone, street_address, created_at, updated_at";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (id, email, password_hash, name, admin, permissions, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                user.id,
                user.email,
                user.password_hash,
                user.name,
                user.admin,
                user.permissions,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at, id"
        ))?;

        let rows = stmt.query_map([], user_from_row)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET name = ?1, admin = ?2, permissions = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                user.name,
                user.admin,
                user.permissions,
                format_datetime(&user.updated_at),
                user.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_user(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Profile operations

    fn get_user_info(&self, email: &str) -> Result<Option<UserInfo>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_INFO_COLUMNS} FROM user_infos WHERE email = ?1"),
            params![email],
            user_info_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn upsert_user_info(&self, info: &UserInfo) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO user_infos (email, image, admin, permissions, phone, street_address, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(email) DO UPDATE SET
                 image = excluded.image,
                 admin = excluded.admin,
                 permissions = excluded.permissions,
                 phone = excluded.phone,
                 street_address = excluded.street_address,
                 updated_at = excluded.updated_at",
            params![
                info.email,
                info.image,
                info.admin,
                info.permissions,
                info.phone,
                info.street_address,
                format_datetime(&info.created_at),
                format_datetime(&info.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            // Foreign key failure: no user row carries this email
            Err(e) if is_constraint_violation(&e) => Err(Error::NotFound),
            Err(e) => Err(Error::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("teahouse.db")).unwrap();
        store.initialize().unwrap();
        (dir, store)
    }

    fn test_user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: Some("$argon2id$test".to_string()),
            name: None,
            admin: false,
            permissions: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_and_get_user() {
        let (_dir, store) = test_store();
        let user = test_user("a@x.com");
        store.create_user(&user).unwrap();

        let by_id = store.get_user(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");

        let by_email = store.get_user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
    }

    #[test]
    fn test_duplicate_email_is_already_exists() {
        let (_dir, store) = test_store();
        store.create_user(&test_user("a@x.com")).unwrap();

        let err = store.create_user(&test_user("a@x.com")).unwrap_err();
        assert!(matches!(err, Error::AlreadyExists));
    }

    #[test]
    fn test_update_missing_user_is_not_found() {
        let (_dir, store) = test_store();
        let err = store.update_user(&test_user("ghost@x.com")).unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn test_upsert_user_info_twice() {
        let (_dir, store) = test_store();
        let user = test_user("a@x.com");
        store.create_user(&user).unwrap();

        let now = Utc::now();
        let mut info = UserInfo {
            email: "a@x.com".to_string(),
            image: None,
            admin: false,
            permissions: false,
            phone: Some("555-1234".to_string()),
            street_address: None,
            created_at: now,
            updated_at: now,
        };
        store.upsert_user_info(&info).unwrap();

        info.phone = Some("555-9999".to_string());
        info.admin = true;
        store.upsert_user_info(&info).unwrap();

        let stored = store.get_user_info("a@x.com").unwrap().unwrap();
        assert_eq!(stored.phone.as_deref(), Some("555-9999"));
        assert!(stored.admin);
    }

    #[test]
    fn test_upsert_info_without_user_is_not_found() {
        let (_dir, store) = test_store();
        let now = Utc::now();
        let info = UserInfo {
            email: "nobody@x.com".to_string(),
            image: None,
            admin: false,
            permissions: false,
            phone: None,
            street_address: None,
            created_at: now,
            updated_at: now,
        };
        let err = store.upsert_user_info(&info).unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn test_delete_user_cascades_info() {
        let (_dir, store) = test_store();
        let user = test_user("a@x.com");
        store.create_user(&user).unwrap();

        let now = Utc::now();
        store
            .upsert_user_info(&UserInfo {
                email: "a@x.com".to_string(),
                image: None,
                admin: false,
                permissions: false,
                phone: None,
                street_address: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        assert!(store.delete_user(&user.id).unwrap());
        assert!(store.get_user_info("a@x.com").unwrap().is_none());
        assert!(!store.delete_user(&user.id).unwrap());
    }

    #[test]
    fn test_list_users_returns_all() {
        let (_dir, store) = test_store();
        store.create_user(&test_user("a@x.com")).unwrap();
        store.create_user(&test_user("b@x.com")).unwrap();

        let users = store.list_users().unwrap();
        assert_eq!(users.len(), 2);
    }
}
