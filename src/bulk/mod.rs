//! Bulk operations over the whole app collection
//!
//! Every command follows the same shape: load and validate the collection,
//! prepare the per-app inputs, then fan one unit per app out through the
//! coordinator.

pub mod collection;
pub mod coordinator;
pub mod dedupe;
pub mod delete;
pub mod export;
pub mod import;

pub use collection::{Collection, ensure_consistent, filter_by_tags, load_collection};
pub use coordinator::{
    BulkProgress, BulkReport, BulkTarget, Stage, UnitFailure, UnitOutcome, UnitState, run_bulk, run_bulk_with_progress,
};
pub use dedupe::{DUPLICATE_MARKER, RenameRecord, dedupe};
pub use delete::run_delete;
pub use export::{ExportPlan, plan_export, run_export};
pub use import::{ImportOptions, resolve_targets, run_import};
