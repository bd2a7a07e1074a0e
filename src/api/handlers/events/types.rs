//! Event domain types: the closed category set, wizard payloads, browse
//! filters and the wire shapes events serialize to.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed set of event categories. The store carries the snake_case tag.
#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MusicConcert,
    Wedding,
    CorporateEvent,
    BirthdayParty,
    Conference,
    Seminar,
    Workshop,
    Exhibition,
    SportsEvent,
    CharityEvent,
    FoodFestival,
    CulturalFestival,
    TheaterPlay,
    ComedyShow,
    NetworkingEvent,
}

impl Category {
    pub const ALL: [Self; 15] = [
        Self::MusicConcert,
        Self::Wedding,
        Self::CorporateEvent,
        Self::BirthdayParty,
        Self::Conference,
        Self::Seminar,
        Self::Workshop,
        Self::Exhibition,
        Self::SportsEvent,
        Self::CharityEvent,
        Self::FoodFestival,
        Self::CulturalFestival,
        Self::TheaterPlay,
        Self::ComedyShow,
        Self::NetworkingEvent,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MusicConcert => "music_concert",
            Self::Wedding => "wedding",
            Self::CorporateEvent => "corporate_event",
            Self::BirthdayParty => "birthday_party",
            Self::Conference => "conference",
            Self::Seminar => "seminar",
            Self::Workshop => "workshop",
            Self::Exhibition => "exhibition",
            Self::SportsEvent => "sports_event",
            Self::CharityEvent => "charity_event",
            Self::FoodFestival => "food_festival",
            Self::CulturalFestival => "cultural_festival",
            Self::TheaterPlay => "theater_play",
            Self::ComedyShow => "comedy_show",
            Self::NetworkingEvent => "networking_event",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MusicConcert => "Music Concert",
            Self::Wedding => "Wedding",
            Self::CorporateEvent => "Corporate Event",
            Self::BirthdayParty => "Birthday Party",
            Self::Conference => "Conference",
            Self::Seminar => "Seminar",
            Self::Workshop => "Workshop",
            Self::Exhibition => "Exhibition",
            Self::SportsEvent => "Sports Event",
            Self::CharityEvent => "Charity Event",
            Self::FoodFestival => "Food Festival",
            Self::CulturalFestival => "Cultural Festival",
            Self::TheaterPlay => "Theater Play",
            Self::ComedyShow => "Comedy Show",
            Self::NetworkingEvent => "Networking Event",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == tag)
            .ok_or_else(|| anyhow!("unknown category: {tag}"))
    }
}

/// Entry in the public category listing.
#[derive(ToSchema, Serialize, Debug)]
pub struct CategoryInfo {
    value: &'static str,
    label: &'static str,
}

impl From<Category> for CategoryInfo {
    fn from(category: Category) -> Self {
        Self {
            value: category.as_str(),
            label: category.label(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Free,
    Paid,
}

impl EventType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Paid => "paid",
        }
    }
}

impl FromStr for EventType {
    type Err = anyhow::Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "free" => Ok(Self::Free),
            "paid" => Ok(Self::Paid),
            other => Err(anyhow!("unknown event type: {other}")),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Published,
}

impl EventStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }
}

impl FromStr for EventStatus {
    type Err = anyhow::Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            other => Err(anyhow!("unknown event status: {other}")),
        }
    }
}

/// Step 1 of the wizard: the event skeleton.
#[derive(ToSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub(super) title: String,
    pub(super) category: Category,
    #[serde(default = "default_schedule_type")]
    pub(super) schedule_type: String,
    pub(super) start_date: Date,
    pub(super) start_time: Option<String>,
    pub(super) end_time: Option<String>,
    pub(super) location: Option<String>,
    pub(super) description: Option<String>,
}

fn default_schedule_type() -> String {
    "single".to_string()
}

/// Step 3 of the wizard: ticketing.
#[derive(ToSchema, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TicketingRequest {
    pub(super) event_type: EventType,
    pub(super) ticket_price: Option<i64>,
    pub(super) ticket_quantity: Option<i32>,
}

/// Query filters for the public event listing. Absent fields do not
/// constrain the result.
#[derive(ToSchema, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct EventFilters {
    pub(super) category: Option<Category>,
    pub(super) price_range: Option<PriceRange>,
    pub(super) date_range: Option<DateRange>,
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum PriceRange {
    #[serde(rename = "free")]
    Free,
    #[serde(rename = "under25")]
    Under25,
    #[serde(rename = "25to50")]
    Mid25To50,
    #[serde(rename = "above50")]
    Above50,
}

impl PriceRange {
    /// Predicate over `event_type` and `ticket_price`; constants only, no
    /// bind parameters.
    pub(super) const fn sql_predicate(self) -> &'static str {
        match self {
            Self::Free => "(event_type = 'free' OR ticket_price = 0)",
            Self::Under25 => "(ticket_price > 0 AND ticket_price < 25)",
            Self::Mid25To50 => "(ticket_price >= 25 AND ticket_price <= 50)",
            Self::Above50 => "(ticket_price > 50)",
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Debug)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Today,
    Tomorrow,
    Weekend,
    Week,
    Month,
}

impl DateRange {
    /// Inclusive `[from, to]` window anchored at `today`. `weekend` points at
    /// the coming Saturday and Sunday; on a Sunday that is already the next
    /// weekend.
    pub(super) fn window(self, today: Date) -> (Date, Date) {
        match self {
            Self::Today => (today, today),
            Self::Tomorrow => {
                let tomorrow = today.saturating_add(Duration::days(1));
                (tomorrow, tomorrow)
            }
            Self::Weekend => {
                let days_to_saturday =
                    6 - i64::from(today.weekday().number_days_from_sunday());
                let saturday = today.saturating_add(Duration::days(days_to_saturday));
                (saturday, saturday.saturating_add(Duration::days(1)))
            }
            Self::Week => (today, today.saturating_add(Duration::days(7))),
            Self::Month => (today, today.saturating_add(Duration::days(30))),
        }
    }
}

/// Full event row.
pub(crate) struct EventRecord {
    pub(crate) id: Uuid,
    pub(crate) organizer_id: Uuid,
    pub(crate) title: String,
    pub(crate) category: Category,
    pub(crate) schedule_type: String,
    pub(crate) start_date: Date,
    pub(crate) start_time: Option<String>,
    pub(crate) end_time: Option<String>,
    pub(crate) location: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) banner_url: Option<String>,
    pub(crate) event_type: Option<EventType>,
    pub(crate) ticket_price: Option<i64>,
    pub(crate) ticket_quantity: Option<i32>,
    pub(crate) status: EventStatus,
    pub(crate) created_at: OffsetDateTime,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    #[serde(rename = "_id")]
    id: Uuid,
    organizer_id: Uuid,
    title: String,
    category: Category,
    schedule_type: String,
    start_date: Date,
    start_time: Option<String>,
    end_time: Option<String>,
    location: Option<String>,
    description: Option<String>,
    banner_url: Option<String>,
    event_type: Option<EventType>,
    ticket_price: Option<i64>,
    ticket_quantity: Option<i32>,
    status: EventStatus,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
}

impl From<EventRecord> for EventPayload {
    fn from(record: EventRecord) -> Self {
        Self {
            id: record.id,
            organizer_id: record.organizer_id,
            title: record.title,
            category: record.category,
            schedule_type: record.schedule_type,
            start_date: record.start_date,
            start_time: record.start_time,
            end_time: record.end_time,
            location: record.location,
            description: record.description,
            banner_url: record.banner_url,
            event_type: record.event_type,
            ticket_price: record.ticket_price,
            ticket_quantity: record.ticket_quantity,
            status: record.status,
            created_at: record.created_at,
        }
    }
}

/// Organizer fields joined into the event details view.
#[derive(ToSchema, Serialize, Debug)]
pub struct OrganizerSummary {
    pub(super) name: String,
    pub(super) organization: Option<String>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct EventDetails {
    #[serde(flatten)]
    pub(super) event: EventPayload,
    pub(super) organizer: OrganizerSummary,
}

/// Listing response: `count` always matches `data.len()`.
#[derive(ToSchema, Serialize, Debug)]
pub struct EventList {
    pub(super) count: usize,
    pub(super) data: Vec<EventPayload>,
}
