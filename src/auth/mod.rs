mod middleware;
mod password;
mod provider;
mod session;

pub use middleware::{AuthError, MaybeSession, RequireSession};
pub use password::CredentialHasher;
pub use provider::{AuthRequest, authenticate, is_admin};
pub use session::{Claims, IssuedSession, SessionKeys};
