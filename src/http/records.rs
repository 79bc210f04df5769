//! Record route handlers.
//!
//! Thin host routes over the [`RecordStore`](crate::records::RecordStore).
//! The list handler is where post-list hooks run.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::records::{ListResult, QueryParams, Record, RecordsListEvent};

const DEFAULT_PER_PAGE: usize = 30;
const MAX_PER_PAGE: usize = 500;

fn positive_param(query: &QueryParams, name: &str) -> Option<usize> {
    query
        .get(name)
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|v| *v > 0)
}

fn paginate(items: Vec<Record>, query: &QueryParams) -> ListResult {
    let page = positive_param(query, "page").unwrap_or(1);
    let per_page = positive_param(query, "perPage")
        .unwrap_or(DEFAULT_PER_PAGE)
        .min(MAX_PER_PAGE);

    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page);
    let items = items
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .collect();

    ListResult {
        page,
        per_page,
        total_items,
        total_pages,
        items,
    }
}

fn parse_record(body: &Bytes) -> Result<Record, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(record)) => Ok(record),
        _ => Err(ApiError::BadRequest(
            "Failed to load the submitted data due to invalid formatting.".to_string(),
        )),
    }
}

pub async fn list_records(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    Query(query): Query<QueryParams>,
) -> Result<Json<ListResult>, ApiError> {
    let records = state.store.list(&collection)?;
    let mut result = paginate(records, &query);

    let mut event = RecordsListEvent {
        collection: &collection,
        query: &query,
        result: &mut result,
    };
    state.hooks.trigger_records_list(&mut event)?;

    Ok(Json(result))
}

pub async fn view_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<Json<Record>, ApiError> {
    Ok(Json(state.store.view(&collection, &id)?))
}

pub async fn create_record(
    State(state): State<AppState>,
    Path(collection): Path<String>,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let record = parse_record(&body)?;
    let created = state.store.create(&collection, record)?;
    tracing::debug!(collection = %collection, id = ?created.get("id"), "Record created");
    Ok(Json(created))
}

pub async fn update_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<Record>, ApiError> {
    let patch = parse_record(&body)?;
    Ok(Json(state.store.update(&collection, &id, patch)?))
}

pub async fn delete_record(
    State(state): State<AppState>,
    Path((collection, id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.store.delete(&collection, &id)?;
    tracing::debug!(collection = %collection, id = %id, "Record deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| serde_json::from_value(json!({"id": i.to_string()})).unwrap())
            .collect()
    }

    fn query(pairs: &[(&str, &str)]) -> QueryParams {
        QueryParams::from_iter(pairs.iter().copied())
    }

    #[test]
    fn test_paginate_defaults() {
        let result = paginate(records(45), &query(&[]));
        assert_eq!(result.page, 1);
        assert_eq!(result.per_page, 30);
        assert_eq!(result.total_items, 45);
        assert_eq!(result.total_pages, 2);
        assert_eq!(result.items.len(), 30);
    }

    #[test]
    fn test_paginate_second_page() {
        let result = paginate(records(45), &query(&[("page", "2"), ("perPage", "20")]));
        assert_eq!(result.total_pages, 3);
        assert_eq!(result.items.len(), 20);
        assert_eq!(result.items[0].get("id"), Some(&json!("20")));
    }

    #[test]
    fn test_paginate_invalid_params_fall_back() {
        let result = paginate(records(3), &query(&[("page", "0"), ("perPage", "abc")]));
        assert_eq!(result.page, 1);
        assert_eq!(result.per_page, 30);
        assert_eq!(result.items.len(), 3);
    }

    #[test]
    fn test_paginate_empty() {
        let result = paginate(Vec::new(), &query(&[]));
        assert_eq!(result.total_pages, 0);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_parse_record_requires_object() {
        assert!(parse_record(&Bytes::from_static(b"{\"a\":1}")).is_ok());
        assert!(parse_record(&Bytes::from_static(b"[1,2]")).is_err());
        assert!(parse_record(&Bytes::from_static(b"not json")).is_err());
    }
}
