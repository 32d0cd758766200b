//! Client-side engine that keeps a threaded discussion in sync with
//! a remote comment service while applying user actions optimistically.

#![deny(missing_debug_implementations)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod authorization;
pub mod gateways;
pub mod repositories;
pub mod store;
pub mod tree;
pub mod usecases;
pub mod util;
