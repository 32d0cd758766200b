#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]
#![cfg_attr(test, deny(warnings))]

//! # tsync-entities
//!
//! Reusable, agnostic domain entities for tsync discussions.
//!
//! The entities only contain generic functionality that does not reveal any
//! synchronization logic.

pub mod actor;
pub mod comment;
pub mod context;
pub mod id;
pub mod pagination;
pub mod time;

#[cfg(any(test, feature = "builders"))]
pub mod builders;
