use chrono::Utc;

use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{MergedProfile, ProfilePatch, UserInfo};

/// Which account a profile operation applies to: an explicit id, or the
/// email of the caller's current session.
#[derive(Debug, Clone)]
pub enum ProfileTarget {
    Id(String),
    Email(String),
}

/// Loads the merged identity + profile view for an account. Pure read.
pub fn load_profile(store: &dyn Store, email: &str) -> Result<MergedProfile> {
    let user = store.get_user_by_email(email)?.ok_or(Error::NotFound)?;
    let info = store.get_user_info(&user.email)?;
    Ok(MergedProfile::from_records(user, info))
}

/// Applies a patch across the identity and profile records as one logical
/// merge.
///
/// Step 1 updates the identity record matched by the target (`NotFound` when
/// nothing matches). Step 2 upserts the profile record keyed by the
/// identity's own email after step 1, creating it on first touch. The two
/// writes are independent: a failure between them leaves the identity
/// updated with the profile untouched, and the error is surfaced rather
/// than retried. Concurrent merges against the same email interleave
/// last-write-wins per record.
///
/// The returned view is re-read after both writes.
pub fn merge_profile(
    store: &dyn Store,
    target: &ProfileTarget,
    patch: &ProfilePatch,
) -> Result<MergedProfile> {
    let mut user = match target {
        ProfileTarget::Id(id) => store.get_user(id)?,
        ProfileTarget::Email(email) => store.get_user_by_email(email)?,
    }
    .ok_or(Error::NotFound)?;

    let now = Utc::now();

    if let Some(name) = &patch.name {
        user.name = Some(name.clone());
    }
    user.updated_at = now;
    store.update_user(&user)?;

    // Keyed by the identity's email post-update, never by the selector.
    let existing = store.get_user_info(&user.email)?;
    let mut info = existing.unwrap_or_else(|| UserInfo {
        email: user.email.clone(),
        image: None,
        admin: false,
        permissions: false,
        phone: None,
        street_address: None,
        created_at: now,
        updated_at: now,
    });

    if let Some(image) = &patch.image {
        info.image = Some(image.clone());
    }
    if let Some(phone) = &patch.phone {
        info.phone = Some(phone.clone());
    }
    if let Some(street_address) = &patch.street_address {
        info.street_address = Some(street_address.clone());
    }
    if let Some(admin) = patch.admin {
        info.admin = admin;
    }
    if let Some(permissions) = patch.permissions {
        info.permissions = permissions;
    }
    info.updated_at = now;
    store.upsert_user_info(&info)?;

    let user = store.get_user(&user.id)?.ok_or(Error::NotFound)?;
    let info = store.get_user_info(&user.email)?;
    Ok(MergedProfile::from_records(user, info))
}
