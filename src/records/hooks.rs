//! Post-query hooks for record list requests.
//!
//! Hooks run after the list query has produced its page of items and before
//! the response is serialized. Each hook may replace the items in place.

use std::sync::Arc;

use serde::Serialize;

use crate::http::response::ApiError;
use crate::observability::metrics;
use crate::records::exclude::{exclude_fields, ExclusionSet, Record};
use crate::records::query::QueryParams;

/// Paginated list response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResult {
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub items: Vec<Record>,
}

/// State handed to list hooks.
#[derive(Debug)]
pub struct RecordsListEvent<'a> {
    pub collection: &'a str,
    pub query: &'a QueryParams,
    pub result: &'a mut ListResult,
}

pub trait RecordsListHook: Send + Sync {
    fn on_records_list(&self, event: &mut RecordsListEvent<'_>) -> Result<(), ApiError>;
}

/// Registered hooks, run in registration order.
#[derive(Clone, Default)]
pub struct Hooks {
    records_list: Vec<Arc<dyn RecordsListHook>>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_records_list(mut self, hook: impl RecordsListHook + 'static) -> Self {
        self.records_list.push(Arc::new(hook));
        self
    }

    /// Run every list hook; the first failure stops the chain.
    pub fn trigger_records_list(&self, event: &mut RecordsListEvent<'_>) -> Result<(), ApiError> {
        for hook in &self.records_list {
            hook.on_records_list(event)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks")
            .field("records_list", &self.records_list.len())
            .finish()
    }
}

/// Strips the fields named by `?excluded=a,b` from every listed record.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExclusionHook;

impl RecordsListHook for FieldExclusionHook {
    fn on_records_list(&self, event: &mut RecordsListEvent<'_>) -> Result<(), ApiError> {
        let Some(fields) = ExclusionSet::from_query(event.query) else {
            return Ok(());
        };

        let items = exclude_fields(&event.result.items, &fields)?;

        tracing::debug!(
            collection = %event.collection,
            fields = fields.len(),
            items = items.len(),
            "Excluded record fields"
        );
        metrics::record_fields_excluded(event.collection);

        event.result.items = items;
        Ok(())
    }
}
