mod server;

pub use server::{SESSION_SECRET_ENV, ServerConfig};
