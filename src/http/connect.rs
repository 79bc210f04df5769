//! Demo `Connect Project` route.
//!
//! Echoes the `key` query parameter back as plain text. Admin authorization
//! is opt-in through `connect.require_admin_auth`.

use axum::{extract::Query, http::StatusCode};

use crate::records::QueryParams;

pub async fn connect(Query(query): Query<QueryParams>) -> (StatusCode, String) {
    // Project access key; first value wins when repeated.
    let access_key = query.get("key").unwrap_or_default();

    tracing::info!(key_present = !access_key.is_empty(), "Connect project requested");

    (StatusCode::OK, format!("Your Access Key: {}", access_key))
}
