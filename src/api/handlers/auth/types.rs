//! Request and response payloads for the auth endpoints.
//!
//! Response payloads serialize record ids as `_id`, which is the wire shape
//! the frontend consumes. Hashed secrets never appear here.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::storage::{AdminRecord, OrganizerRecord, UserRecord};
use super::token::Role;

#[derive(ToSchema, Deserialize, Debug)]
pub struct LoginRequest {
    pub(super) email: String,
    pub(super) password: String,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct OrganizerRegisterRequest {
    pub(super) name: String,
    pub(super) email: String,
    pub(super) password: String,
    pub(super) phone: Option<String>,
    pub(super) organization: Option<String>,
}

#[derive(ToSchema, Deserialize, Debug)]
pub struct UserRegisterRequest {
    pub(super) name: String,
    pub(super) email: String,
    pub(super) password: String,
    pub(super) phone: Option<String>,
}

/// Allow-listed profile fields an organizer may change. Unknown fields are
/// rejected rather than ignored.
#[derive(ToSchema, Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct OrganizerProfileRequest {
    pub(super) name: Option<String>,
    pub(super) phone: Option<String>,
    pub(super) organization: Option<String>,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct AdminPayload {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    email: String,
    role: Role,
}

#[derive(ToSchema, Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerPayload {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    role: Role,
    organization: Option<String>,
    is_verified: bool,
}

#[derive(ToSchema, Serialize, Debug)]
pub struct UserPayload {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    email: String,
    phone: Option<String>,
    role: Role,
    status: String,
}

impl From<AdminRecord> for AdminPayload {
    fn from(record: AdminRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            role: Role::Admin,
        }
    }
}

impl From<OrganizerRecord> for OrganizerPayload {
    fn from(record: OrganizerRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            role: Role::Organizer,
            organization: record.organization,
            is_verified: record.is_verified,
        }
    }
}

impl From<UserRecord> for UserPayload {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            role: Role::User,
            status: record.status,
        }
    }
}
