use serde::{Deserialize, Deserializer};

/// Partial profile update. `name` and `image` land on the user record,
/// everything else on the profile record.
///
/// `admin` and `permissions` accept either a JSON boolean or a string.
/// A string is stored as `s.trim() == "true"`; any other string (including
/// "True" or "1") is falsy. This matches the upstream form behavior and is
/// deliberately not applied to any other field.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default, alias = "streetAddress")]
    pub street_address: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub admin: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub permissions: Option<bool>,
}

impl ProfilePatch {
    /// True when the patch touches any field stored on the profile record.
    #[must_use]
    pub fn touches_info(&self) -> bool {
        self.image.is_some()
            || self.phone.is_some()
            || self.street_address.is_some()
            || self.admin.is_some()
            || self.permissions.is_some()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagValue {
    Bool(bool),
    Str(String),
}

fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<FlagValue>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        FlagValue::Bool(b) => b,
        FlagValue::Str(s) => s.trim() == "true",
    }))
}
