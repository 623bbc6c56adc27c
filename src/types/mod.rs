mod models;
mod patch;

pub use models::{MergedProfile, Session, User, UserInfo};
pub use patch::ProfilePatch;
