use super::handlers::{auth, events, health, profile};
use utoipa::openapi::{Contact, InfoBuilder, License, OpenApiBuilder, Tag};
use utoipa_axum::{router::OpenApiRouter, routes};

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Reuse the same router wiring and only return the generated OpenAPI spec.
    let (_router, openapi) = api_router().split_for_parts();
    openapi
}

/// Build the router that also drives the `OpenAPI` document.
///
/// Add new endpoints here via `.routes(routes!(...))` so they are both served
/// and included in the generated `OpenAPI` spec. Handlers that share a path
/// (`GET`+`POST /api/events`, `GET`+`PUT /api/organizer/profile`) must sit in
/// the same `routes!` call so their methods merge into one route.
/// Routes added outside (like `/` or `OPTIONS /health`) are intentionally not documented.
pub(crate) fn api_router() -> OpenApiRouter {
    let mut health_tag = Tag::new("health");
    health_tag.description = Some("Service and database health".to_string());

    let mut auth_tag = Tag::new("auth");
    auth_tag.description = Some("Admin, organizer, and user sessions".to_string());

    let mut events_tag = Tag::new("events");
    events_tag.description = Some("Event creation wizard and public discovery".to_string());

    let mut profile_tag = Tag::new("profile");
    profile_tag.description = Some("User profile details and picture".to_string());

    // utoipa-axum 0.1 has no mutable OpenApi access after construction, so the
    // tags go on the seed document; `routes!` merges only paths and schemas.
    let mut openapi = cargo_openapi();
    openapi.tags = Some(vec![health_tag, auth_tag, events_tag, profile_tag]);

    // `routes!` reads #[utoipa::path] to bind HTTP method + path and add the route to OpenAPI.
    OpenApiRouter::with_openapi(openapi)
        .routes(routes!(health::health))
        .routes(routes!(auth::admin::login))
        .routes(routes!(auth::admin::logout))
        .routes(routes!(auth::admin::profile))
        .routes(routes!(auth::organizer::register))
        .routes(routes!(auth::organizer::login))
        .routes(routes!(auth::organizer::logout))
        .routes(routes!(
            auth::organizer::profile,
            auth::organizer::update_profile
        ))
        .routes(routes!(auth::user::register))
        .routes(routes!(auth::user::login))
        .routes(routes!(auth::user::logout))
        .routes(routes!(auth::user::profile))
        .routes(routes!(events::wizard::create, events::browse::list))
        .routes(routes!(events::wizard::update_banner))
        .routes(routes!(events::wizard::update_ticketing))
        .routes(routes!(events::wizard::publish))
        .routes(routes!(events::wizard::mine))
        .routes(routes!(events::browse::categories))
        .routes(routes!(events::browse::popular))
        .routes(routes!(events::browse::upcoming))
        .routes(routes!(events::browse::search))
        .routes(routes!(events::browse::by_category))
        .routes(routes!(events::browse::details))
        .routes(routes!(events::admin::upcoming))
        .routes(routes!(events::admin::past))
        .routes(routes!(profile::me))
        .routes(routes!(profile::update))
        .routes(routes!(profile::upload_image))
        .routes(routes!(profile::delete_image))
}

fn cargo_openapi() -> utoipa::openapi::OpenApi {
    // Use Cargo.toml metadata instead of the utoipa-axum crate info defaults.
    let mut info = InfoBuilder::new()
        .title(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .description(optional_str(env!("CARGO_PKG_DESCRIPTION")))
        .build();

    info.contact = cargo_contact();
    info.license = cargo_license();

    OpenApiBuilder::new().info(info).build()
}

fn cargo_contact() -> Option<Contact> {
    // Cargo authors are `;` separated and may include "Name <email>".
    let authors = env!("CARGO_PKG_AUTHORS");
    let primary = authors.split(';').next().map(str::trim)?;
    if primary.is_empty() {
        return None;
    }

    let (name, email) = parse_author(primary);
    if name.is_none() && email.is_none() {
        return None;
    }

    let mut contact = Contact::new();
    contact.name = name.map(str::to_string);
    contact.email = email.map(str::to_string);
    Some(contact)
}

fn cargo_license() -> Option<License> {
    let identifier = optional_str(env!("CARGO_PKG_LICENSE"))?;
    let mut license = License::new(identifier);
    license.identifier = Some(identifier.to_string());
    Some(license)
}

fn optional_str(value: &'static str) -> Option<&'static str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn parse_author(author: &str) -> (Option<&str>, Option<&str>) {
    if let Some(start) = author.find('<') {
        let name = author[..start].trim();
        let email = author[start + 1..].trim_end_matches('>').trim();
        let name = if name.is_empty() { None } else { Some(name) };
        let email = if email.is_empty() { None } else { Some(email) };
        (name, email)
    } else {
        let name = author.trim();
        (if name.is_empty() { None } else { Some(name) }, None)
    }
}
