//! Database helpers for principal records.
//!
//! One table per role; a record's role is fixed by the table it lives in.
//! Emails are normalized before they reach this layer, so lookups and the
//! unique indexes only ever see lowercased values.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row, postgres::PgRow};
use tracing::Instrument;
use uuid::Uuid;

use super::utils::is_unique_violation;

/// Outcome when attempting to create a new principal.
#[derive(Debug)]
pub(super) enum RegisterOutcome<T> {
    Created(T),
    EmailTaken,
}

pub(crate) struct AdminRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) hashed_secret: String,
}

pub(crate) struct OrganizerRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: Option<String>,
    pub(crate) organization: Option<String>,
    pub(crate) is_verified: bool,
    pub(crate) hashed_secret: String,
}

pub(crate) struct UserRecord {
    pub(crate) id: Uuid,
    pub(crate) name: String,
    pub(crate) email: String,
    pub(crate) phone: Option<String>,
    pub(crate) status: String,
    pub(crate) hashed_secret: String,
}

/// Fields an organizer may change on their own profile. `None` leaves the
/// stored value untouched.
pub(super) struct OrganizerProfileUpdate {
    pub(super) name: Option<String>,
    pub(super) phone: Option<String>,
    pub(super) organization: Option<String>,
}

fn admin_from_row(row: &PgRow) -> AdminRecord {
    AdminRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        hashed_secret: row.get("hashed_secret"),
    }
}

fn organizer_from_row(row: &PgRow) -> OrganizerRecord {
    OrganizerRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        organization: row.get("organization"),
        is_verified: row.get("is_verified"),
        hashed_secret: row.get("hashed_secret"),
    }
}

fn user_from_row(row: &PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        status: row.get("status"),
        hashed_secret: row.get("hashed_secret"),
    }
}

macro_rules! db_span {
    ($operation:expr, $query:expr) => {
        tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = $operation,
            db.statement = $query
        )
    };
}

pub(super) async fn admin_by_email(pool: &PgPool, email: &str) -> Result<Option<AdminRecord>> {
    let query = "SELECT id, name, email, hashed_secret FROM admins WHERE email = $1";
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(db_span!("SELECT", query))
        .await
        .context("failed to lookup admin by email")?;
    Ok(row.map(|row| admin_from_row(&row)))
}

pub(super) async fn admin_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AdminRecord>> {
    let query = "SELECT id, name, email, hashed_secret FROM admins WHERE id = $1";
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(db_span!("SELECT", query))
        .await
        .context("failed to lookup admin by id")?;
    Ok(row.map(|row| admin_from_row(&row)))
}

pub(super) async fn organizer_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<OrganizerRecord>> {
    let query = "SELECT id, name, email, phone, organization, is_verified, hashed_secret \
                 FROM organizers WHERE email = $1";
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(db_span!("SELECT", query))
        .await
        .context("failed to lookup organizer by email")?;
    Ok(row.map(|row| organizer_from_row(&row)))
}

pub(super) async fn organizer_by_id(pool: &PgPool, id: Uuid) -> Result<Option<OrganizerRecord>> {
    let query = "SELECT id, name, email, phone, organization, is_verified, hashed_secret \
                 FROM organizers WHERE id = $1";
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(db_span!("SELECT", query))
        .await
        .context("failed to lookup organizer by id")?;
    Ok(row.map(|row| organizer_from_row(&row)))
}

pub(super) async fn user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>> {
    let query = "SELECT id, name, email, phone, status, hashed_secret FROM users WHERE email = $1";
    let row = sqlx::query(query)
        .bind(email)
        .fetch_optional(pool)
        .instrument(db_span!("SELECT", query))
        .await
        .context("failed to lookup user by email")?;
    Ok(row.map(|row| user_from_row(&row)))
}

pub(super) async fn user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRecord>> {
    let query = "SELECT id, name, email, phone, status, hashed_secret FROM users WHERE id = $1";
    let row = sqlx::query(query)
        .bind(id)
        .fetch_optional(pool)
        .instrument(db_span!("SELECT", query))
        .await
        .context("failed to lookup user by id")?;
    Ok(row.map(|row| user_from_row(&row)))
}

pub(super) async fn insert_organizer(
    pool: &PgPool,
    name: &str,
    email: &str,
    phone: Option<&str>,
    organization: Option<&str>,
    hashed_secret: &str,
) -> Result<RegisterOutcome<OrganizerRecord>> {
    let query = "INSERT INTO organizers (name, email, phone, organization, hashed_secret) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id, name, email, phone, organization, is_verified, hashed_secret";
    let result = sqlx::query(query)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(organization)
        .bind(hashed_secret)
        .fetch_one(pool)
        .instrument(db_span!("INSERT", query))
        .await;
    match result {
        Ok(row) => Ok(RegisterOutcome::Created(organizer_from_row(&row))),
        Err(err) if is_unique_violation(&err) => Ok(RegisterOutcome::EmailTaken),
        Err(err) => Err(err).context("failed to insert organizer"),
    }
}

pub(super) async fn insert_user(
    pool: &PgPool,
    name: &str,
    email: &str,
    phone: Option<&str>,
    hashed_secret: &str,
) -> Result<RegisterOutcome<UserRecord>> {
    let query = "INSERT INTO users (name, email, phone, hashed_secret) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, name, email, phone, status, hashed_secret";
    let result = sqlx::query(query)
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(hashed_secret)
        .fetch_one(pool)
        .instrument(db_span!("INSERT", query))
        .await;
    match result {
        Ok(row) => Ok(RegisterOutcome::Created(user_from_row(&row))),
        Err(err) if is_unique_violation(&err) => Ok(RegisterOutcome::EmailTaken),
        Err(err) => Err(err).context("failed to insert user"),
    }
}

pub(super) async fn update_organizer_profile(
    pool: &PgPool,
    id: Uuid,
    update: &OrganizerProfileUpdate,
) -> Result<Option<OrganizerRecord>> {
    let query = "UPDATE organizers \
                 SET name = COALESCE($2, name), \
                     phone = COALESCE($3, phone), \
                     organization = COALESCE($4, organization) \
                 WHERE id = $1 \
                 RETURNING id, name, email, phone, organization, is_verified, hashed_secret";
    let row = sqlx::query(query)
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.phone.as_deref())
        .bind(update.organization.as_deref())
        .fetch_optional(pool)
        .instrument(db_span!("UPDATE", query))
        .await
        .context("failed to update organizer profile")?;
    Ok(row.map(|row| organizer_from_row(&row)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_outcome_debug_names() {
        let created: RegisterOutcome<()> = RegisterOutcome::Created(());
        assert_eq!(format!("{created:?}"), "Created(())");
        let taken: RegisterOutcome<()> = RegisterOutcome::EmailTaken;
        assert_eq!(format!("{taken:?}"), "EmailTaken");
    }
}
