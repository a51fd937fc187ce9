//! Helper for writing battle move commands from a form.
//!
//! Two tools share the move catalog and the exclusive toggle groups:
//! the single-action form (one unit, one move, one target) and the
//! multi-action form (three slots joined into one line).

pub mod catalog;
pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod selection;
pub mod web;

pub use catalog::{MoveCatalog, MoveRecord, TargetType};
pub use error::{ConfigError, DataLoadError, FormError};
pub use selection::{ExclusiveGroup, SelectionState};
