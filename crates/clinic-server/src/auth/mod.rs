// Authentication module
// Decision: Cookie sessions backed by the auth_sessions table
// Decision: Guards are extractors reading the per-request context

pub mod config;
pub mod middleware;
pub mod routes;
pub mod session;

pub use config::AuthConfig;
pub use middleware::{
    resolve_session, AdminUser, AuthRedirect, AuthUser, RequestContext, SessionUser,
};
pub use routes::{routes, AuthState};
pub use session::{SessionStore, SESSION_COOKIE};
