//! Gem Cascade (workspace facade crate).
//!
//! Re-exports the workspace crates under one name so callers can depend on
//! `gem_cascade::{core, engine, adapter, types}` while the implementation lives in
//! dedicated crates under `crates/`.

pub use gem_cascade_adapter as adapter;
pub use gem_cascade_core as core;
pub use gem_cascade_engine as engine;
pub use gem_cascade_types as types;
