//! Game session engine
//!
//! Wraps the pure rules from `gem-cascade-core` in a stateful, thread-safe session:
//!
//! - [`GameEngine`]: state machine, single-flight moves, hints, selection
//! - [`GameEngineEvent`]: typed events delivered to subscribers
//! - [`EngineConfig`]: board size, seed and limits, loadable from the environment
//! - [`EngineError`]: refused operations

pub mod config;
pub mod engine;
pub mod error;
pub mod events;

pub use config::EngineConfig;
pub use engine::{GameEngine, MoveOutcome, Selection};
pub use error::{EngineError, MoveRejection};
pub use events::{GameEngineEvent, Subscription};
