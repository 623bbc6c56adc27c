use chrono::Utc;
use uuid::Uuid;

use super::CredentialHasher;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Session, User, UserInfo};

/// One authentication request, regardless of how the caller proved their
/// identity. The `Provider` variant carries claims already verified by an
/// external identity provider; this crate does not speak the provider's
/// protocol itself.
#[derive(Debug, Clone)]
pub enum AuthRequest {
    Password { email: String, password: String },
    Provider {
        email: String,
        name: Option<String>,
        image: Option<String>,
    },
}

/// Authenticates a request against the store and returns the matching user.
///
/// Password requests fail with `NotFound` when no account carries the email
/// and `InvalidCredentials` on a hash mismatch (or when the account has no
/// password at all). Provider requests create a password-less account on
/// first login.
pub fn authenticate(
    store: &dyn Store,
    hasher: &CredentialHasher,
    request: AuthRequest,
) -> Result<User> {
    match request {
        AuthRequest::Password { email, password } => {
            let user = store.get_user_by_email(&email)?.ok_or(Error::NotFound)?;

            let hash = user
                .password_hash
                .as_deref()
                .ok_or(Error::InvalidCredentials)?;

            if !hasher.verify(&password, hash)? {
                return Err(Error::InvalidCredentials);
            }

            Ok(user)
        }
        AuthRequest::Provider { email, name, image } => {
            if let Some(user) = store.get_user_by_email(&email)? {
                return Ok(user);
            }

            let now = Utc::now();
            let user = User {
                id: Uuid::new_v4().to_string(),
                email: email.clone(),
                password_hash: None,
                name,
                admin: false,
                permissions: false,
                created_at: now,
                updated_at: now,
            };
            store.create_user(&user)?;

            if image.is_some() {
                store.upsert_user_info(&UserInfo {
                    email,
                    image,
                    admin: false,
                    permissions: false,
                    phone: None,
                    street_address: None,
                    created_at: now,
                    updated_at: now,
                })?;
            }

            Ok(user)
        }
    }
}

/// Admin gate: true only when the session's profile record says so.
/// Never fails; anonymous callers, missing profiles, and store errors all
/// read as non-admin.
pub fn is_admin(store: &dyn Store, session: Option<&Session>) -> bool {
    let Some(session) = session else {
        return false;
    };

    match store.get_user_info(&session.email) {
        Ok(Some(info)) => info.admin,
        Ok(None) => false,
        Err(e) => {
            tracing::warn!("admin check failed for {}: {e}", session.email);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn test_store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("teahouse.db")).unwrap();
        store.initialize().unwrap();
        (dir, store)
    }

    fn register(store: &dyn Store, hasher: &CredentialHasher, email: &str, password: &str) {
        let now = Utc::now();
        store
            .create_user(&User {
                id: Uuid::new_v4().to_string(),
                email: email.to_string(),
                password_hash: Some(hasher.hash(password).unwrap()),
                name: None,
                admin: false,
                permissions: false,
                created_at: now,
                updated_at: now,
            })
            .unwrap();
    }

    #[test]
    fn test_password_auth_success() {
        let (_dir, store) = test_store();
        let hasher = CredentialHasher::new();
        register(&store, &hasher, "a@x.com", "secret1");

        let user = authenticate(
            &store,
            &hasher,
            AuthRequest::Password {
                email: "a@x.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .unwrap();
        assert_eq!(user.email, "a@x.com");
    }

    #[test]
    fn test_password_auth_wrong_password() {
        let (_dir, store) = test_store();
        let hasher = CredentialHasher::new();
        register(&store, &hasher, "a@x.com", "secret1");

        let err = authenticate(
            &store,
            &hasher,
            AuthRequest::Password {
                email: "a@x.com".to_string(),
                password: "wrong".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[test]
    fn test_password_auth_unknown_email() {
        let (_dir, store) = test_store();
        let hasher = CredentialHasher::new();

        let err = authenticate(
            &store,
            &hasher,
            AuthRequest::Password {
                email: "nobody@x.com".to_string(),
                password: "secret1".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotFound));
    }

    #[test]
    fn test_password_auth_against_provider_account() {
        let (_dir, store) = test_store();
        let hasher = CredentialHasher::new();

        authenticate(
            &store,
            &hasher,
            AuthRequest::Provider {
                email: "a@x.com".to_string(),
                name: None,
                image: None,
            },
        )
        .unwrap();

        let err = authenticate(
            &store,
            &hasher,
            AuthRequest::Password {
                email: "a@x.com".to_string(),
                password: "anything".to_string(),
            },
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidCredentials));
    }

    #[test]
    fn test_provider_auth_creates_account_once() {
        let (_dir, store) = test_store();
        let hasher = CredentialHasher::new();

        let first = authenticate(
            &store,
            &hasher,
            AuthRequest::Provider {
                email: "a@x.com".to_string(),
                name: Some("Mei".to_string()),
                image: Some("https://img.example/a.png".to_string()),
            },
        )
        .unwrap();
        assert!(first.password_hash.is_none());

        let second = authenticate(
            &store,
            &hasher,
            AuthRequest::Provider {
                email: "a@x.com".to_string(),
                name: None,
                image: None,
            },
        )
        .unwrap();
        assert_eq!(second.id, first.id);

        let info = store.get_user_info("a@x.com").unwrap().unwrap();
        assert_eq!(info.image.as_deref(), Some("https://img.example/a.png"));
    }

    #[test]
    fn test_is_admin_gate() {
        let (_dir, store) = test_store();
        let hasher = CredentialHasher::new();
        register(&store, &hasher, "a@x.com", "secret1");

        let session = Session {
            email: "a@x.com".to_string(),
            name: None,
        };

        // No profile record yet
        assert!(!is_admin(&store, Some(&session)));
        assert!(!is_admin(&store, None));

        let now = Utc::now();
        store
            .upsert_user_info(&UserInfo {
                email: "a@x.com".to_string(),
                image: None,
                admin: true,
                permissions: false,
                phone: None,
                street_address: None,
                created_at: now,
                updated_at: now,
            })
            .unwrap();

        assert!(is_admin(&store, Some(&session)));
    }
}
