//! GameEngine - the authoritative game session
//!
//! All rule work is delegated to `gem-cascade-core`; this module owns the state
//! machine, the single-flight move guard and event publication.
//!
//! Every operation follows the same shape: take the state lock, compute the new state
//! on a copy (or refuse), commit, queue the collected events, release the lock, then
//! deliver. Queueing under the lock keeps delivery in commit order when several threads
//! drive the same engine. A move additionally holds the in-flight flag until its events
//! are delivered, so a subscriber that re-enters `make_move` is refused with
//! `MoveInProgress`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gem_cascade_core::{
    cascade, check_move, find_matches, generate_with_attempts, hint, target_score, Board,
    GameState, GemIdSource, GemRng, MatchGroup, SequentialIds, SimpleRng, Swap,
};
use gem_cascade_types::{GameStatus, Position, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
use tracing::{debug, info, instrument, warn};

use crate::config::EngineConfig;
use crate::error::{EngineError, MoveRejection};
use crate::events::{EventBus, GameEngineEvent, Subscription};

/// Result of a swap request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub valid: bool,
    pub score_change: u32,
    /// Every match resolved by the move, cascade rounds included
    pub matches_found: Vec<MatchGroup>,
    /// Board after the move; the unchanged board for an invalid move
    pub new_board: Board,
    /// Number of cascade rounds (0 for an invalid move)
    pub combo_count: u32,
    pub rejection: Option<MoveRejection>,
    pub level_completed: bool,
}

impl MoveOutcome {
    fn rejected(board: &Board, reason: MoveRejection) -> Self {
        Self {
            valid: false,
            score_change: 0,
            matches_found: Vec::new(),
            new_board: board.clone(),
            combo_count: 0,
            rejection: Some(reason),
            level_completed: false,
        }
    }
}

/// What a `select_gem` call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Not playing, or the cell is off the board
    Ignored,
    Selected(Position),
    Cleared,
    /// The second cell was adjacent; a move was attempted
    Swapped(MoveOutcome),
}

struct EngineCore {
    state: GameState,
    rng: Box<dyn GemRng + Send>,
    ids: Box<dyn GemIdSource + Send>,
    selection: Option<Position>,
}

impl EngineCore {
    fn regenerate(&mut self, size: usize, max_attempts: u32) -> Board {
        generate_with_attempts(size, max_attempts, &mut self.rng, &mut self.ids).board
    }

    fn clear_selection(&mut self, events: &mut Vec<GameEngineEvent>) {
        if self.selection.take().is_some() {
            events.push(GameEngineEvent::SelectionChanged { selected: None });
        }
    }
}

struct Shared {
    config: EngineConfig,
    core: Mutex<EngineCore>,
    in_flight: AtomicBool,
    bus: EventBus,
}

/// Held while a move is being resolved and its events delivered
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Cloneable handle to one game session
#[derive(Clone)]
pub struct GameEngine {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for GameEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEngine")
            .field("config", &self.shared.config)
            .field("subscribers", &self.shared.bus.len())
            .finish_non_exhaustive()
    }
}

impl Default for GameEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl GameEngine {
    /// Engine with a seeded LCG and sequential gem ids
    ///
    /// Without a configured seed one is drawn from the OS and logged, so the session can
    /// be replayed.
    pub fn new(config: EngineConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        info!(seed, "engine seeded");
        Self::with_sources(config, SimpleRng::new(seed), SequentialIds::new())
    }

    /// Engine with caller-supplied randomness and gem ids
    pub fn with_sources<R, I>(config: EngineConfig, rng: R, ids: I) -> Self
    where
        R: GemRng + Send + 'static,
        I: GemIdSource + Send + 'static,
    {
        Self {
            shared: Arc::new(Shared {
                config,
                core: Mutex::new(EngineCore {
                    state: GameState::default(),
                    rng: Box::new(rng),
                    ids: Box::new(ids),
                    selection: None,
                }),
                in_flight: AtomicBool::new(false),
                bus: EventBus::default(),
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    fn lock_core(&self) -> MutexGuard<'_, EngineCore> {
        self.shared.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, events: Vec<GameEngineEvent>) {
        self.shared.bus.publish(events);
    }

    /// Queue `events` behind everything already committed, then release the lock and deliver
    fn commit(&self, core: MutexGuard<'_, EngineCore>, events: Vec<GameEngineEvent>) {
        let ticket = self.shared.bus.enqueue(events);
        drop(core);
        self.shared.bus.flush(ticket);
    }

    fn status(&self) -> GameStatus {
        self.lock_core().state.status
    }

    /// Start a new game on a freshly generated `size x size` board
    ///
    /// Returns false (and emits an `Error` event) if the size is out of range.
    #[instrument(skip(self))]
    pub fn initialize(&self, size: usize) -> bool {
        match self.start(size) {
            Ok(()) => true,
            Err(error) => {
                warn!(%error, "initialize refused");
                self.publish(vec![GameEngineEvent::Error { error }]);
                false
            }
        }
    }

    fn start(&self, size: usize) -> Result<(), EngineError> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(EngineError::InvalidBoardSize {
                size,
                min: MIN_BOARD_SIZE,
                max: MAX_BOARD_SIZE,
            });
        }

        let config = &self.shared.config;
        let mut core = self.lock_core();
        let board = core.regenerate(size, config.max_generation_attempts);
        core.state = GameState::new(board, config.starting_level);
        core.selection = None;
        let state = core.state.clone();
        info!(size, level = state.level, "game initialized");
        self.commit(core, vec![GameEngineEvent::Initialized { state }]);
        Ok(())
    }

    /// Start a new game on a caller-supplied board at the configured starting level
    pub fn load_board(&self, board: Board) -> Result<(), EngineError> {
        self.restore(GameState::new(board, self.shared.config.starting_level))
    }

    /// Replace the whole session state with `state`
    ///
    /// The board must be a full, settled grid within the supported size range, and the
    /// state must belong to a started game. Level 0 is read as level 1 and the target is
    /// recomputed from the level.
    pub fn restore(&self, mut state: GameState) -> Result<(), EngineError> {
        if state.status == GameStatus::Idle {
            return Err(EngineError::InvalidState {
                operation: "restore a game",
                status: GameStatus::Idle,
            });
        }
        let size = state.board.size();
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(EngineError::InvalidBoardSize {
                size,
                min: MIN_BOARD_SIZE,
                max: MAX_BOARD_SIZE,
            });
        }
        if !state.board.is_full() || !state.board.coordinates_consistent() {
            return Err(EngineError::InvalidBoard);
        }
        if !find_matches(&state.board).is_empty() {
            debug!("restore refused: board has unresolved matches");
            return Err(EngineError::InvalidBoard);
        }
        state.level = state.level.max(1);
        state.target_score = target_score(state.level);

        let mut core = self.lock_core();
        core.state = state.clone();
        core.selection = None;
        info!(size, level = state.level, status = %state.status, "state restored");
        self.commit(core, vec![GameEngineEvent::Initialized { state }]);
        Ok(())
    }

    /// Swap two gems and resolve the resulting cascade
    pub async fn make_move(&self, from: Position, to: Position) -> Result<MoveOutcome, EngineError> {
        self.try_move(from, to)
    }

    /// Synchronous form of [`GameEngine::make_move`]
    #[instrument(skip(self))]
    pub fn try_move(&self, from: Position, to: Position) -> Result<MoveOutcome, EngineError> {
        let Some(_flight) = InFlight::acquire(&self.shared.in_flight) else {
            debug!("move refused: another move is in flight");
            return Err(EngineError::MoveInProgress);
        };

        let mut guard = self.lock_core();
        let (result, events) = apply_move(&self.shared.config, &mut guard, from, to);
        self.commit(guard, events);
        result
    }

    /// Select a gem, or complete a swap with the already selected one
    pub fn select_gem(&self, pos: Position) -> Result<Selection, EngineError> {
        let mut events = Vec::new();
        let mut core = self.lock_core();
        if !core.state.is_playing() || !core.state.board.is_occupied(pos) {
            return Ok(Selection::Ignored);
        }
        let pending = core.selection;
        let (selection, swap_from) = match pending {
            Some(current) if current == pos => {
                core.clear_selection(&mut events);
                (Selection::Cleared, None)
            }
            Some(current) if current.is_adjacent(pos) => {
                core.clear_selection(&mut events);
                (Selection::Cleared, Some(current))
            }
            _ => {
                core.selection = Some(pos);
                events.push(GameEngineEvent::SelectionChanged {
                    selected: Some(pos),
                });
                (Selection::Selected(pos), None)
            }
        };
        self.commit(core, events);

        match swap_from {
            Some(from) => self.try_move(from, pos).map(Selection::Swapped),
            None => Ok(selection),
        }
    }

    /// Drop the pending selection. Returns false if there was none.
    pub fn deselect_gem(&self) -> bool {
        let mut events = Vec::new();
        let mut core = self.lock_core();
        core.clear_selection(&mut events);
        let changed = !events.is_empty();
        self.commit(core, events);
        changed
    }

    pub fn selection(&self) -> Option<Position> {
        self.lock_core().selection
    }

    /// Suggest a swap that produces a match
    pub fn show_hint(&self) -> Result<Swap, EngineError> {
        if self.shared.in_flight.load(Ordering::Acquire) {
            return Err(EngineError::InvalidState {
                operation: "show a hint during a move",
                status: self.status(),
            });
        }

        let mut guard = self.lock_core();
        let core = &mut *guard;
        if !core.state.is_playing() {
            return Err(EngineError::InvalidState {
                operation: "show a hint",
                status: core.state.status,
            });
        }
        let swap =
            hint::suggest(&core.state.board, &mut core.rng).ok_or(EngineError::NoMovesAvailable)?;
        debug!(from = ?swap.from, to = ?swap.to, "hint shown");
        self.commit(guard, vec![GameEngineEvent::HintShown { swap }]);
        Ok(swap)
    }

    /// Pause a game in progress. Returns false if nothing changed.
    pub fn pause(&self) -> bool {
        self.transition(GameStatus::Playing, GameStatus::Paused, GameEngineEvent::Paused)
    }

    /// Resume a paused game. Returns false if nothing changed.
    pub fn resume(&self) -> bool {
        self.transition(GameStatus::Paused, GameStatus::Playing, GameEngineEvent::Resumed)
    }

    fn transition(&self, from: GameStatus, to: GameStatus, event: GameEngineEvent) -> bool {
        let mut core = self.lock_core();
        if core.state.status != from {
            debug!(status = %core.state.status, wanted = %from, "transition ignored");
            return false;
        }
        core.state.status = to;
        info!(%from, %to, "status changed");
        self.commit(core, vec![event]);
        true
    }

    /// Restart the current level on a new board with the score zeroed
    #[instrument(skip(self))]
    pub fn reset(&self) -> Result<(), EngineError> {
        let config = &self.shared.config;
        let mut events = Vec::new();
        let mut core = self.lock_core();
        if core.state.status == GameStatus::Idle {
            return Err(EngineError::InvalidState {
                operation: "reset",
                status: GameStatus::Idle,
            });
        }
        let size = core.state.board.size();
        let board = core.regenerate(size, config.max_generation_attempts);
        let level = core.state.level;
        core.state = GameState::new(board, level);
        core.clear_selection(&mut events);

        events.push(GameEngineEvent::BoardChanged {
            board: core.state.board.clone(),
        });
        events.push(score_event(&core.state));
        info!(level, "game reset");
        self.commit(core, events);
        Ok(())
    }

    /// Start the level reached by the last completion
    #[instrument(skip(self))]
    pub fn next_level(&self) -> Result<(), EngineError> {
        let config = &self.shared.config;
        let mut events = Vec::new();
        let mut core = self.lock_core();
        if core.state.status != GameStatus::Completed {
            return Err(EngineError::InvalidState {
                operation: "start the next level",
                status: core.state.status,
            });
        }
        let size = core.state.board.size();
        core.state.board = core.regenerate(size, config.max_generation_attempts);
        core.state.clear_level_counters();
        core.state.status = GameStatus::Playing;
        core.clear_selection(&mut events);

        let (level, target_score) = (core.state.level, core.state.target_score);
        info!(level, target_score, "level started");
        events.push(GameEngineEvent::LevelStarted {
            level,
            target_score,
        });
        events.push(GameEngineEvent::BoardChanged {
            board: core.state.board.clone(),
        });
        self.commit(core, events);
        Ok(())
    }

    /// End the game as lost
    pub fn fail(&self, reason: impl Into<String>) -> Result<(), EngineError> {
        let reason = reason.into();
        let mut events = Vec::new();
        let mut core = self.lock_core();
        match core.state.status {
            GameStatus::Playing | GameStatus::Paused => {}
            status => {
                return Err(EngineError::InvalidState {
                    operation: "fail the game",
                    status,
                })
            }
        }
        core.state.status = GameStatus::Failed;
        core.clear_selection(&mut events);
        info!(%reason, score = core.state.score, "game over");
        events.push(GameEngineEvent::GameOver {
            reason,
            score: core.state.score,
            level: core.state.level,
        });
        self.commit(core, events);
        Ok(())
    }

    /// Snapshot of the current state
    pub fn get_game_state(&self) -> GameState {
        self.lock_core().state.clone()
    }

    /// Drop every subscriber and return to idle
    pub fn cleanup(&self) {
        self.shared.bus.clear();
        let mut core = self.lock_core();
        core.state = GameState::default();
        core.selection = None;
        info!("engine cleaned up");
    }

    pub fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&GameEngineEvent) + Send + Sync + 'static,
    {
        self.shared.bus.subscribe(handler)
    }

    pub fn subscriber_count(&self) -> usize {
        self.shared.bus.len()
    }
}

fn score_event(state: &GameState) -> GameEngineEvent {
    GameEngineEvent::ScoreUpdated {
        score: state.score,
        last_move_score: state.last_move_score,
        combo_multiplier: state.combo_multiplier,
    }
}

/// Validate, resolve and commit one swap
fn apply_move(
    config: &EngineConfig,
    core: &mut EngineCore,
    from: Position,
    to: Position,
) -> (Result<MoveOutcome, EngineError>, Vec<GameEngineEvent>) {
    if !core.state.is_playing() {
        let err = EngineError::InvalidState {
            operation: "make a move",
            status: core.state.status,
        };
        return (Err(err), Vec::new());
    }

    if let Err(reason) = check_move(&core.state.board, from, to) {
        debug!(reason = reason.as_str(), "move rejected");
        return (
            Ok(MoveOutcome::rejected(&core.state.board, reason.into())),
            Vec::new(),
        );
    }

    let mut board = core.state.board.clone();
    board.swap(from, to);
    let matches = find_matches(&board);
    if matches.is_empty() {
        debug!("move rejected: no match");
        return (
            Ok(MoveOutcome::rejected(&core.state.board, MoveRejection::NoMatch)),
            Vec::new(),
        );
    }

    let resolved = cascade::resolve(
        board,
        matches,
        0,
        config.max_cascade_rounds,
        &mut core.rng,
        &mut core.ids,
    );
    let outcome = match resolved {
        Ok(outcome) => outcome,
        Err(err) => {
            let error = EngineError::from(err);
            warn!(%error, "move abandoned");
            return (Err(error.clone()), vec![GameEngineEvent::Error { error }]);
        }
    };

    let combo_count = outcome.cascade_count();
    let total = outcome.total_score;
    let matches_found = outcome.all_matches();

    let state = &mut core.state;
    state.board = outcome.final_board;
    state.score = state.score.saturating_add(total);
    state.moves += 1;
    state.last_move_score = total;
    state.combo_multiplier = combo_count;

    let mut completed = None;
    if state.target_reached() {
        completed = Some(state.level);
        state.level += 1;
        state.target_score = target_score(state.level);
        state.status = GameStatus::Completed;
    }
    core.selection = None;

    debug!(
        score_change = total,
        combo_count,
        score = state.score,
        moves = state.moves,
        "move committed"
    );

    let result = MoveOutcome {
        valid: true,
        score_change: total,
        matches_found,
        new_board: state.board.clone(),
        combo_count,
        rejection: None,
        level_completed: completed.is_some(),
    };

    let mut events = vec![
        GameEngineEvent::MoveMade {
            from,
            to,
            outcome: result.clone(),
        },
        GameEngineEvent::BoardChanged {
            board: state.board.clone(),
        },
        score_event(state),
    ];
    if let Some(level) = completed {
        info!(level, score = state.score, "level completed");
        events.push(GameEngineEvent::LevelCompleted {
            level,
            score: state.score,
        });
    }

    (Ok(result), events)
}
