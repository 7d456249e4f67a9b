//! RNG module - injected randomness and gem id capabilities
//!
//! Everything that creates gems (board generation, refill) or breaks ties (hint
//! selection) draws from a [`GemRng`] passed in by the caller, so the same seed always
//! replays the same game. Gem ids come from a [`GemIdSource`] for the same reason.
//!
//! Provides a simple LCG for deterministic play and tests, plus an adapter over any
//! `rand` generator.

use crate::types::{GemId, GemKind, GEM_KIND_COUNT};

/// Source of uniformly distributed random numbers
pub trait GemRng {
    /// Generate next random u32
    fn next_u32(&mut self) -> u32;

    /// Generate random value in range [0, max)
    ///
    /// Returns 0 when `max` is 0.
    fn next_below(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        self.next_u32() % max
    }

    /// Draw a gem kind uniformly at random
    fn next_kind(&mut self) -> GemKind {
        let idx = self.next_below(GEM_KIND_COUNT as u32) as usize;
        GemKind::ALL[idx]
    }
}

impl<R: GemRng + ?Sized> GemRng for &mut R {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next_below(&mut self, max: u32) -> u32 {
        (**self).next_below(max)
    }
}

impl<R: GemRng + ?Sized> GemRng for Box<R> {
    fn next_u32(&mut self) -> u32 {
        (**self).next_u32()
    }

    fn next_below(&mut self, max: u32) -> u32 {
        (**self).next_below(max)
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Current internal state (reseeding with it resumes the sequence)
    pub fn state(&self) -> u32 {
        self.state
    }
}

impl GemRng for SimpleRng {
    fn next_u32(&mut self) -> u32 {
        // LCG formula: (a * state + c) mod m
        // Using Numerical Recipes constants: a=1664525, c=1013904223, m=2^32
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        // Low bits of a power-of-two LCG cycle quickly; lead with the high half.
        self.state.rotate_left(16)
    }
}

impl Default for SimpleRng {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Adapter exposing any `rand` generator as a [`GemRng`]
#[derive(Debug, Clone)]
pub struct RandRng<R>(pub R);

impl RandRng<rand::rngs::StdRng> {
    /// Seeded `StdRng`
    pub fn seeded(seed: u64) -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::seed_from_u64(seed))
    }

    /// `StdRng` seeded from the operating system
    pub fn from_entropy() -> Self {
        use rand::SeedableRng;
        Self(rand::rngs::StdRng::from_entropy())
    }
}

impl<R: rand::RngCore> GemRng for RandRng<R> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_below(&mut self, max: u32) -> u32 {
        use rand::Rng;
        if max == 0 {
            return 0;
        }
        self.0.gen_range(0..max)
    }
}

/// Supplier of fresh gem ids
pub trait GemIdSource {
    fn next_id(&mut self) -> GemId;
}

impl<S: GemIdSource + ?Sized> GemIdSource for &mut S {
    fn next_id(&mut self) -> GemId {
        (**self).next_id()
    }
}

impl<S: GemIdSource + ?Sized> GemIdSource for Box<S> {
    fn next_id(&mut self) -> GemId {
        (**self).next_id()
    }
}

/// Monotonic counter id source
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `first`
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Number of ids handed out so far (when started at 0)
    pub fn issued(&self) -> u64 {
        self.next
    }
}

impl GemIdSource for SequentialIds {
    fn next_id(&mut self) -> GemId {
        let id = GemId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Replays a fixed list of values, then repeats the last one
///
/// Lets tests script exactly which kinds a refill produces.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    values: Vec<u32>,
    cursor: usize,
}

impl ScriptedRng {
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// Script that yields the given kinds, in order, from [`GemRng::next_kind`]
    pub fn from_kinds(kinds: &[GemKind]) -> Self {
        Self::new(kinds.iter().map(|k| k.index() as u32).collect())
    }
}

impl GemRng for ScriptedRng {
    fn next_u32(&mut self) -> u32 {
        let value = self
            .values
            .get(self.cursor)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0);
        if self.cursor < self.values.len() {
            self.cursor += 1;
        }
        value
    }
}
