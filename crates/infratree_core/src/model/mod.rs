//! Protocol records exchanged with read handlers.
//!
//! # Responsibility
//! - Define the request/result envelopes and the tree object shapes.
//! - Keep serialization rules (elided empties, tagged properties) in one place.
//!
//! # Invariants
//! - Records are plain data; no storage access happens here.
//! - Empty collections serialize as absent fields.

pub mod entity;
pub mod property;
pub mod request;
pub mod result;
