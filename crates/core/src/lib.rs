//! Core game logic module - pure, deterministic, and testable
//!
//! This crate contains the match-3 rules: board representation, move validation, match
//! detection, board generation, scoring, cascade resolution and hint search.
//! It has no UI, networking, or I/O, which makes it:
//!
//! - **Deterministic**: randomness and gem ids are injected, so a seed replays a game
//! - **Testable**: every rule is a plain function over a [`Board`]
//! - **Portable**: the engine, the JSON adapter and benches all drive the same code
//!
//! # Module Structure
//!
//! - [`board`]: square gem grid with swap, gravity and coordinate re-stamping
//! - [`validator`]: bounds / occupancy / adjacency checks for a swap
//! - [`matcher`]: two-axis run detection with horizontal precedence
//! - [`generator`]: match-free board generation with a constrained fallback
//! - [`scoring`]: run-length base points, cascade rush bonus, level targets
//! - [`cascade`]: remove, drop, refill, re-detect until stable (round-capped)
//! - [`hint`]: exhaustive search over all adjacent swaps
//! - [`rng`]: injected RNG and gem id capabilities
//! - [`state`]: the `GameState` snapshot
//!
//! # Example
//!
//! ```
//! use gem_cascade_core::{cascade, find_matches, generate, legal_swaps, SequentialIds, SimpleRng};
//!
//! let mut rng = SimpleRng::new(12345);
//! let mut ids = SequentialIds::new();
//!
//! let board = generate(8, &mut rng, &mut ids);
//! assert!(find_matches(&board).is_empty());
//!
//! if let Some(swap) = legal_swaps(&board).first().copied() {
//!     let mut next = board.clone();
//!     next.swap(swap.from, swap.to);
//!     let matches = find_matches(&next);
//!     let outcome = cascade::resolve(next, matches, 0, 50, &mut rng, &mut ids).unwrap();
//!     assert!(outcome.total_score >= 50);
//! }
//! ```

pub mod board;
pub mod cascade;
pub mod generator;
pub mod hint;
pub mod matcher;
pub mod rng;
pub mod scoring;
pub mod state;
pub mod validator;

pub use gem_cascade_types as types;

// Re-export commonly used types for convenience
pub use board::Board;
pub use cascade::{resolve, CascadeOutcome, CascadeStep, TooManyCascades};
pub use generator::{generate, generate_with_attempts, GeneratedBoard, GenerationStrategy};
pub use hint::{legal_swaps, suggest, Swap};
pub use matcher::{find_matches, has_match, MatchGroup, Orientation};
pub use rng::{GemIdSource, GemRng, RandRng, ScriptedRng, SequentialIds, SimpleRng};
pub use scoring::{match_score, score_match, target_score, MatchScore};
pub use state::GameState;
pub use validator::{check_move, is_valid_move, InvalidMove};
