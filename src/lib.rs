//! # GatherGuru (Event Discovery & Ticketing API)
//!
//! `gatherguru` is the backend for an event-discovery and ticketing platform.
//! Three actor roles (admin, organizer, user) authenticate with cookie-held
//! session tokens; organizers create and publish events through a multi-step
//! wizard; users browse and search published events.
//!
//! ## Principals & Roles
//!
//! Each role lives in its own table (`admins`, `organizers`, `users`), so a
//! record's role is fixed by where it lives and is never reinterpreted.
//! Emails are normalized to lowercase before insert and lookup.
//!
//! ## Sessions
//!
//! A successful login or registration sets an `HttpOnly` cookie named `token`
//! holding a signed, 30-day session token (HMAC-SHA256). Sessions are
//! stateless: there is no server-side session table and no revocation list.
//! Logout overwrites the cookie with an already-expired value, which clears
//! the browser copy but does not invalidate a captured token before its
//! natural expiry.
//!
//! ## Authorization
//!
//! Every protected handler resolves the cookie into a typed principal and,
//! where role-specific, checks it against an allow-list of roles. Unknown or
//! stale tokens are rejected with a generic 401; a wrong role is a 403.

pub mod api;
pub mod cli;
pub mod upload;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(GIT_COMMIT_HASH.len() >= 7);
        assert!(GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with("gatherguru/"));
        let version = APP_USER_AGENT.trim_start_matches("gatherguru/");
        assert!(!version.is_empty());
    }
}
