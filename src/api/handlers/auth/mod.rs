//! Role-based authentication.
//!
//! Three principal kinds (admin, organizer, user) share one session
//! mechanism: an HMAC-signed token carried in an `HttpOnly` cookie. The
//! access guard in [`principal`] resolves the cookie back to a live store
//! record before any protected handler runs.

pub(crate) mod admin;
pub(crate) mod organizer;
mod password;
pub(crate) mod principal;
mod session;
mod state;
mod storage;
mod token;
mod types;
pub(crate) mod user;
mod utils;

pub use state::{AuthConfig, AuthState, Environment};
pub use token::{Role, TOKEN_TTL_SECONDS, TokenSigner};

pub(crate) use principal::{require_admin, require_organizer, require_user};
