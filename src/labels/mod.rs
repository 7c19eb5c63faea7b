//! Word <-> sub-token label mapping
//!
//! # Components
//! - `aggregate.rs`: First-sub-token label assignment (training) and
//!   first-sub-token prediction selection (inference)

pub mod aggregate;

pub use aggregate::{assign_labels, first_subtoken_positions, select_predictions, IGNORE_INDEX};
