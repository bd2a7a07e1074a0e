//! Database helpers for user profiles.
//!
//! A profile row is created lazily by the first update or image upload, so
//! absence is a normal state, not an error.

use anyhow::{Context, Result};
use sqlx::{PgPool, Row, postgres::PgRow};
use time::OffsetDateTime;
use tracing::Instrument;
use uuid::Uuid;

const PROFILE_COLUMNS: &str =
    "id, user_id, bio, location, website, profile_image_url, updated_at";

pub(super) struct ProfileRecord {
    pub(super) id: Uuid,
    pub(super) user_id: Uuid,
    pub(super) bio: Option<String>,
    pub(super) location: Option<String>,
    pub(super) website: Option<String>,
    pub(super) profile_image_url: Option<String>,
    pub(super) updated_at: OffsetDateTime,
}

/// Allow-listed profile fields. `None` leaves the stored value untouched.
pub(super) struct ProfileUpdate {
    pub(super) bio: Option<String>,
    pub(super) location: Option<String>,
    pub(super) website: Option<String>,
}

fn profile_from_row(row: &PgRow) -> ProfileRecord {
    ProfileRecord {
        id: row.get("id"),
        user_id: row.get("user_id"),
        bio: row.get("bio"),
        location: row.get("location"),
        website: row.get("website"),
        profile_image_url: row.get("profile_image_url"),
        updated_at: row.get("updated_at"),
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

pub(super) async fn by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<ProfileRecord>> {
    let query = format!("SELECT {PROFILE_COLUMNS} FROM user_profiles WHERE user_id = $1");
    let row = sqlx::query(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(db_span!("SELECT", query.as_str()))
        .await
        .context("failed to lookup user profile")?;
    Ok(row.map(|row| profile_from_row(&row)))
}

pub(super) async fn upsert(
    pool: &PgPool,
    user_id: Uuid,
    update: &ProfileUpdate,
) -> Result<ProfileRecord> {
    let query = format!(
        "INSERT INTO user_profiles (user_id, bio, location, website) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (user_id) DO UPDATE SET \
             bio = COALESCE($2, user_profiles.bio), \
             location = COALESCE($3, user_profiles.location), \
             website = COALESCE($4, user_profiles.website), \
             updated_at = now() \
         RETURNING {PROFILE_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .bind(update.bio.as_deref())
        .bind(update.location.as_deref())
        .bind(update.website.as_deref())
        .fetch_one(pool)
        .instrument(db_span!("INSERT", query.as_str()))
        .await
        .context("failed to upsert user profile")?;
    Ok(profile_from_row(&row))
}

pub(super) async fn set_image(
    pool: &PgPool,
    user_id: Uuid,
    image_url: &str,
) -> Result<ProfileRecord> {
    let query = format!(
        "INSERT INTO user_profiles (user_id, profile_image_url) \
         VALUES ($1, $2) \
         ON CONFLICT (user_id) DO UPDATE SET \
             profile_image_url = $2, \
             updated_at = now() \
         RETURNING {PROFILE_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .bind(image_url)
        .fetch_one(pool)
        .instrument(db_span!("INSERT", query.as_str()))
        .await
        .context("failed to set profile image")?;
    Ok(profile_from_row(&row))
}

pub(super) async fn clear_image(pool: &PgPool, user_id: Uuid) -> Result<Option<ProfileRecord>> {
    let query = format!(
        "UPDATE user_profiles SET profile_image_url = NULL, updated_at = now() \
         WHERE user_id = $1 \
         RETURNING {PROFILE_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(user_id)
        .fetch_optional(pool)
        .instrument(db_span!("UPDATE", query.as_str()))
        .await
        .context("failed to clear profile image")?;
    Ok(row.map(|row| profile_from_row(&row)))
}
