//! Record serving subsystem.
//!
//! # Data Flow
//! ```text
//! GET /api/collections/{c}/records
//!     → store.rs (load collection records)
//!     → page slicing (http handler)
//!     → hooks.rs (post-list hooks, e.g. field exclusion)
//!     → exclude.rs (strip ?excluded fields)
//!     → JSON list envelope
//! ```

pub mod exclude;
pub mod hooks;
pub mod query;
pub mod store;

pub use exclude::{exclude_fields, ExcludeError, ExclusionSet, Record};
pub use hooks::{FieldExclusionHook, Hooks, ListResult, RecordsListEvent, RecordsListHook};
pub use query::QueryParams;
pub use store::{MemoryStore, RecordStore, StoreError};
