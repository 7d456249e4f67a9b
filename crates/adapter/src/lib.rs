//! Adapter - drive the engine over a line-delimited JSON protocol
//!
//! The adapter lets an external client (a UI, a bot, a test harness) play a game
//! through any async byte stream; the binary wires it to stdin/stdout.
//!
//! # Protocol Overview
//!
//! 1. **Requests**: the client writes one JSON object per line, tagged by `"type"`
//! 2. **Responses**: each request gets exactly one `response` line echoing its `seq`
//! 3. **Events**: every engine event is streamed as an `event` line, ahead of the
//!    response of the request that caused it
//!
//! # Message Types
//!
//! ## Client → Engine
//!
//! - **initialize** `{size?}`: start a game (size defaults to the configured one)
//! - **move** `{from:[r,c], to:[r,c]}`: swap two gems
//! - **select** `{at:[r,c]}` / **deselect**: two-click swap input
//! - **hint**, **pause**, **resume**, **reset**, **next_level**, **state**
//! - **fail** `{reason?}`: end the game as lost
//!
//! ## Engine → Client
//!
//! - **response**: `{seq, ok, error?, result?}`
//! - **event**: `{event: {type, ...}}`
//!
//! Lines that do not parse still get a response, with `seq` recovered from the raw text
//! where possible.

pub mod protocol;
pub mod runtime;

pub use protocol::{parse_request, Outbound, Request, ResponseMessage, WireEvent};
pub use runtime::{serve, serve_stdio};
