//! Database helpers for events.
//!
//! Wizard mutations are scoped by `organizer_id` in the statement itself, so
//! a foreign event id behaves exactly like a missing one.

use anyhow::{Context, Result};
use sqlx::{PgPool, QueryBuilder, Row, postgres::PgRow};
use time::Date;
use tracing::Instrument;
use uuid::Uuid;

use super::types::{
    Category, CreateEventRequest, EventFilters, EventRecord, EventType, OrganizerSummary,
};

const EVENT_COLUMNS: &str = "id, organizer_id, title, category, schedule_type, start_date, \
                             start_time, end_time, location, description, banner_url, \
                             event_type, ticket_price, ticket_quantity, status, created_at";

/// Outcome of a publish attempt.
pub(super) enum PublishOutcome {
    Published(EventRecord),
    Incomplete,
    NotFound,
}

fn event_from_row(row: &PgRow) -> Result<EventRecord> {
    let category: String = row.get("category");
    let status: String = row.get("status");
    let event_type: Option<String> = row.get("event_type");
    Ok(EventRecord {
        id: row.get("id"),
        organizer_id: row.get("organizer_id"),
        title: row.get("title"),
        category: category
            .parse()
            .context("event row carries unknown category")?,
        schedule_type: row.get("schedule_type"),
        start_date: row.get("start_date"),
        start_time: row.get("start_time"),
        end_time: row.get("end_time"),
        location: row.get("location"),
        description: row.get("description"),
        banner_url: row.get("banner_url"),
        event_type: event_type
            .map(|tag| tag.parse())
            .transpose()
            .context("event row carries unknown event type")?,
        ticket_price: row.get("ticket_price"),
        ticket_quantity: row.get("ticket_quantity"),
        status: status.parse().context("event row carries unknown status")?,
        created_at: row.get("created_at"),
    })
}

fn events_from_rows(rows: &[PgRow]) -> Result<Vec<EventRecord>> {
    rows.iter().map(event_from_row).collect()
}

/// Escape `%`, `_` and `\` so user input only ever matches literally inside
/// an ILIKE pattern.
fn like_pattern(query: &str) -> String {
    let escaped = query
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
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

pub(super) async fn insert_draft(
    pool: &PgPool,
    organizer_id: Uuid,
    request: &CreateEventRequest,
) -> Result<EventRecord> {
    let query = format!(
        "INSERT INTO events (organizer_id, title, category, schedule_type, start_date, \
         start_time, end_time, location, description) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {EVENT_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(organizer_id)
        .bind(request.title.trim())
        .bind(request.category.as_str())
        .bind(&request.schedule_type)
        .bind(request.start_date)
        .bind(request.start_time.as_deref())
        .bind(request.end_time.as_deref())
        .bind(request.location.as_deref())
        .bind(request.description.as_deref())
        .fetch_one(pool)
        .instrument(db_span!("INSERT", query.as_str()))
        .await
        .context("failed to insert event draft")?;
    event_from_row(&row)
}

pub(super) async fn set_banner(
    pool: &PgPool,
    organizer_id: Uuid,
    event_id: Uuid,
    banner_url: &str,
) -> Result<Option<EventRecord>> {
    let query = format!(
        "UPDATE events SET banner_url = $3, updated_at = now() \
         WHERE id = $1 AND organizer_id = $2 \
         RETURNING {EVENT_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(event_id)
        .bind(organizer_id)
        .bind(banner_url)
        .fetch_optional(pool)
        .instrument(db_span!("UPDATE", query.as_str()))
        .await
        .context("failed to set event banner")?;
    row.as_ref().map(event_from_row).transpose()
}

pub(super) async fn set_ticketing(
    pool: &PgPool,
    organizer_id: Uuid,
    event_id: Uuid,
    event_type: EventType,
    ticket_price: Option<i64>,
    ticket_quantity: Option<i32>,
) -> Result<Option<EventRecord>> {
    let query = format!(
        "UPDATE events SET event_type = $3, ticket_price = $4, ticket_quantity = $5, \
         updated_at = now() \
         WHERE id = $1 AND organizer_id = $2 \
         RETURNING {EVENT_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(event_id)
        .bind(organizer_id)
        .bind(event_type.as_str())
        .bind(ticket_price)
        .bind(ticket_quantity)
        .fetch_optional(pool)
        .instrument(db_span!("UPDATE", query.as_str()))
        .await
        .context("failed to set event ticketing")?;
    row.as_ref().map(event_from_row).transpose()
}

pub(super) async fn publish(
    pool: &PgPool,
    organizer_id: Uuid,
    event_id: Uuid,
) -> Result<PublishOutcome> {
    let query = format!(
        "UPDATE events SET status = 'published', updated_at = now() \
         WHERE id = $1 AND organizer_id = $2 \
           AND banner_url IS NOT NULL AND event_type IS NOT NULL \
         RETURNING {EVENT_COLUMNS}"
    );
    let row = sqlx::query(&query)
        .bind(event_id)
        .bind(organizer_id)
        .fetch_optional(pool)
        .instrument(db_span!("UPDATE", query.as_str()))
        .await
        .context("failed to publish event")?;

    if let Some(row) = row {
        return Ok(PublishOutcome::Published(event_from_row(&row)?));
    }

    // Tell an incomplete event apart from a missing or foreign one.
    match by_id_for_organizer(pool, organizer_id, event_id).await? {
        Some(_) => Ok(PublishOutcome::Incomplete),
        None => Ok(PublishOutcome::NotFound),
    }
}

pub(super) async fn by_id_for_organizer(
    pool: &PgPool,
    organizer_id: Uuid,
    event_id: Uuid,
) -> Result<Option<EventRecord>> {
    let query =
        format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND organizer_id = $2");
    let row = sqlx::query(&query)
        .bind(event_id)
        .bind(organizer_id)
        .fetch_optional(pool)
        .instrument(db_span!("SELECT", query.as_str()))
        .await
        .context("failed to lookup event for organizer")?;
    row.as_ref().map(event_from_row).transpose()
}

pub(super) async fn details(
    pool: &PgPool,
    event_id: Uuid,
) -> Result<Option<(EventRecord, OrganizerSummary)>> {
    let query = "SELECT e.id, e.organizer_id, e.title, e.category, e.schedule_type, \
                 e.start_date, e.start_time, e.end_time, e.location, e.description, \
                 e.banner_url, e.event_type, e.ticket_price, e.ticket_quantity, e.status, \
                 e.created_at, o.name AS organizer_name, \
                 o.organization AS organizer_organization \
                 FROM events e \
                 JOIN organizers o ON o.id = e.organizer_id \
                 WHERE e.id = $1";
    let row = sqlx::query(query)
        .bind(event_id)
        .fetch_optional(pool)
        .instrument(db_span!("SELECT", query))
        .await
        .context("failed to lookup event details")?;

    row.map(|row| {
        let organizer = OrganizerSummary {
            name: row.get("organizer_name"),
            organization: row.get("organizer_organization"),
        };
        Ok((event_from_row(&row)?, organizer))
    })
    .transpose()
}

pub(super) async fn organizer_events(
    pool: &PgPool,
    organizer_id: Uuid,
) -> Result<Vec<EventRecord>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE organizer_id = $1 ORDER BY created_at DESC"
    );
    let rows = sqlx::query(&query)
        .bind(organizer_id)
        .fetch_all(pool)
        .instrument(db_span!("SELECT", query.as_str()))
        .await
        .context("failed to list organizer events")?;
    events_from_rows(&rows)
}

pub(super) async fn popular(pool: &PgPool) -> Result<Vec<EventRecord>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE status = 'published' \
         ORDER BY created_at DESC LIMIT 6"
    );
    let rows = sqlx::query(&query)
        .fetch_all(pool)
        .instrument(db_span!("SELECT", query.as_str()))
        .await
        .context("failed to list popular events")?;
    events_from_rows(&rows)
}

pub(super) async fn upcoming(pool: &PgPool, today: Date) -> Result<Vec<EventRecord>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} FROM events \
         WHERE status = 'published' AND start_date >= $1 \
         ORDER BY start_date ASC, start_time ASC LIMIT 5"
    );
    let rows = sqlx::query(&query)
        .bind(today)
        .fetch_all(pool)
        .instrument(db_span!("SELECT", query.as_str()))
        .await
        .context("failed to list upcoming events")?;
    events_from_rows(&rows)
}

pub(super) async fn by_category(
    pool: &PgPool,
    category: Category,
    today: Date,
) -> Result<Vec<EventRecord>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} FROM events \
         WHERE status = 'published' AND category = $1 AND start_date >= $2 \
         ORDER BY start_date ASC, start_time ASC LIMIT 6"
    );
    let rows = sqlx::query(&query)
        .bind(category.as_str())
        .bind(today)
        .fetch_all(pool)
        .instrument(db_span!("SELECT", query.as_str()))
        .await
        .context("failed to list events by category")?;
    events_from_rows(&rows)
}

pub(super) async fn search(pool: &PgPool, needle: &str) -> Result<Vec<EventRecord>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} FROM events \
         WHERE status = 'published' \
           AND (title ILIKE $1 OR description ILIKE $1 OR location ILIKE $1) \
         ORDER BY start_date ASC LIMIT 10"
    );
    let rows = sqlx::query(&query)
        .bind(like_pattern(needle))
        .fetch_all(pool)
        .instrument(db_span!("SELECT", query.as_str()))
        .await
        .context("failed to search events")?;
    events_from_rows(&rows)
}

pub(super) async fn list(
    pool: &PgPool,
    filters: &EventFilters,
    today: Date,
) -> Result<Vec<EventRecord>> {
    let mut builder = QueryBuilder::new(format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE status = 'published'"
    ));

    if let Some(category) = filters.category {
        builder.push(" AND category = ").push_bind(category.as_str());
    }

    if let Some(range) = filters.price_range {
        builder.push(" AND ").push(range.sql_predicate());
    }

    if let Some(range) = filters.date_range {
        let (from, to) = range.window(today);
        builder
            .push(" AND start_date >= ")
            .push_bind(from)
            .push(" AND start_date <= ")
            .push_bind(to);
    }

    builder.push(" ORDER BY start_date ASC, start_time ASC");

    let span = db_span!("SELECT", builder.sql());
    let rows = builder
        .build()
        .fetch_all(pool)
        .instrument(span)
        .await
        .context("failed to list events")?;
    events_from_rows(&rows)
}

pub(super) async fn admin_upcoming(pool: &PgPool, today: Date) -> Result<Vec<EventRecord>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE start_date >= $1 \
         ORDER BY start_date ASC, start_time ASC"
    );
    let rows = sqlx::query(&query)
        .bind(today)
        .fetch_all(pool)
        .instrument(db_span!("SELECT", query.as_str()))
        .await
        .context("failed to list upcoming events for admin")?;
    events_from_rows(&rows)
}

pub(super) async fn admin_past(pool: &PgPool, today: Date) -> Result<Vec<EventRecord>> {
    let query = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE start_date < $1 \
         ORDER BY start_date DESC"
    );
    let rows = sqlx::query(&query)
        .bind(today)
        .fetch_all(pool)
        .instrument(db_span!("SELECT", query.as_str()))
        .await
        .context("failed to list past events for admin")?;
    events_from_rows(&rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("rust"), "%rust%");
        assert_eq!(like_pattern("100%"), "%100\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern(r"back\slash"), "%back\\\\slash%");
    }

    #[test]
    fn filtered_list_builder_composes_predicates() {
        let mut builder = QueryBuilder::<sqlx::Postgres>::new(
            "SELECT id FROM events WHERE status = 'published'",
        );
        builder.push(" AND ").push(
            super::super::types::PriceRange::Free.sql_predicate(),
        );
        assert!(builder.sql().contains("event_type = 'free' OR ticket_price = 0"));
    }
}
