//! Typed engine events and the subscriber registry
//!
//! Handlers are called synchronously, in subscription order. Batches are delivered in
//! the order they were queued, one thread at a time: the caller that finds the outbox
//! idle delivers, other callers wait until their own batch has gone out. No lock is held
//! while a handler runs, so a handler may subscribe, unsubscribe or call back into the
//! engine. Events raised from inside a handler are delivered after the current batch.

use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::{self, ThreadId};

use gem_cascade_core::{Board, GameState, Swap};
use gem_cascade_types::Position;

use crate::engine::MoveOutcome;
use crate::error::EngineError;

/// Everything the engine tells its collaborators about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEngineEvent {
    Initialized {
        state: GameState,
    },
    MoveMade {
        from: Position,
        to: Position,
        outcome: MoveOutcome,
    },
    BoardChanged {
        board: Board,
    },
    ScoreUpdated {
        score: u32,
        last_move_score: u32,
        combo_multiplier: u32,
    },
    /// `level` is the level just finished
    LevelCompleted {
        level: u32,
        score: u32,
    },
    LevelStarted {
        level: u32,
        target_score: u32,
    },
    GameOver {
        reason: String,
        score: u32,
        level: u32,
    },
    HintShown {
        swap: Swap,
    },
    Paused,
    Resumed,
    SelectionChanged {
        selected: Option<Position>,
    },
    Error {
        error: EngineError,
    },
}

impl GameEngineEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            GameEngineEvent::Initialized { .. } => "initialized",
            GameEngineEvent::MoveMade { .. } => "move_made",
            GameEngineEvent::BoardChanged { .. } => "board_changed",
            GameEngineEvent::ScoreUpdated { .. } => "score_updated",
            GameEngineEvent::LevelCompleted { .. } => "level_completed",
            GameEngineEvent::LevelStarted { .. } => "level_started",
            GameEngineEvent::GameOver { .. } => "game_over",
            GameEngineEvent::HintShown { .. } => "hint_shown",
            GameEngineEvent::Paused => "paused",
            GameEngineEvent::Resumed => "resumed",
            GameEngineEvent::SelectionChanged { .. } => "selection_changed",
            GameEngineEvent::Error { .. } => "error",
        }
    }
}

type Handler = Arc<dyn Fn(&GameEngineEvent) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

#[derive(Default)]
struct Outbox {
    next_ticket: u64,
    /// Ticket of the last batch handed to the handlers
    delivered: u64,
    pending: VecDeque<(u64, Vec<GameEngineEvent>)>,
    drainer: Option<ThreadId>,
}

/// Ordered list of subscribers plus the queue of undelivered batches
#[derive(Default)]
pub(crate) struct EventBus {
    registry: Arc<Mutex<Registry>>,
    outbox: Mutex<Outbox>,
    progress: Condvar,
}

/// Marks the current thread as the one delivering; released even if a handler panics
struct Draining<'a>(&'a EventBus);

impl Drop for Draining<'_> {
    fn drop(&mut self) {
        self.0.lock_outbox().drainer = None;
        self.0.progress.notify_all();
    }
}

impl EventBus {
    pub(crate) fn subscribe<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&GameEngineEvent) + Send + Sync + 'static,
    {
        let mut reg = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let id = reg.next_id;
        reg.next_id += 1;
        reg.handlers.push((id, Arc::new(handler)));
        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    fn lock_outbox(&self) -> MutexGuard<'_, Outbox> {
        self.outbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue and deliver `events`
    pub(crate) fn publish(&self, events: Vec<GameEngineEvent>) {
        let ticket = self.enqueue(events);
        self.flush(ticket);
    }

    /// Queue a batch behind every batch queued before it and return its ticket
    ///
    /// An empty batch is not queued and gets ticket 0.
    pub(crate) fn enqueue(&self, events: Vec<GameEngineEvent>) -> u64 {
        if events.is_empty() {
            return 0;
        }
        let mut outbox = self.lock_outbox();
        outbox.next_ticket += 1;
        let ticket = outbox.next_ticket;
        outbox.pending.push_back((ticket, events));
        ticket
    }

    /// Return once the batch with `ticket` has been delivered
    ///
    /// A call made from a handler returns at once; the outer delivery loop picks the
    /// batch up after the current one.
    pub(crate) fn flush(&self, ticket: u64) {
        let me = thread::current().id();
        let mut outbox = self.lock_outbox();
        loop {
            if outbox.delivered >= ticket {
                return;
            }
            match outbox.drainer {
                Some(id) if id == me => return,
                Some(_) => {
                    outbox = self
                        .progress
                        .wait(outbox)
                        .unwrap_or_else(PoisonError::into_inner);
                }
                None => break,
            }
        }
        outbox.drainer = Some(me);
        drop(outbox);

        let _draining = Draining(self);
        loop {
            let next = self.lock_outbox().pending.pop_front();
            let Some((done, events)) = next else {
                break;
            };
            self.deliver(&events);
            self.lock_outbox().delivered = done;
            self.progress.notify_all();
        }
    }

    fn deliver(&self, events: &[GameEngineEvent]) {
        for event in events {
            let handlers: Vec<Handler> = {
                let reg = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
                reg.handlers.iter().map(|(_, h)| Arc::clone(h)).collect()
            };
            for handler in handlers {
                handler(event);
            }
        }
    }

    pub(crate) fn clear(&self) {
        let mut reg = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        reg.handlers.clear();
    }

    pub(crate) fn len(&self) -> usize {
        let reg = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        reg.handlers.len()
    }
}

/// Handle returned by `GameEngine::subscribe`
///
/// Dropping it does not unsubscribe; call [`Subscription::unsubscribe`].
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<Registry>>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the handler. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let mut reg = registry.lock().unwrap_or_else(PoisonError::into_inner);
        let before = reg.handlers.len();
        reg.handlers.retain(|(id, _)| *id != self.id);
        reg.handlers.len() != before
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("next_id", &self.next_id)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn delivers_in_order_to_all() {
        let bus = EventBus::default();
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b"] {
            let log = Arc::clone(&log);
            bus.subscribe(move |e| log.lock().unwrap().push(format!("{}:{}", tag, e.name())));
        }
        bus.publish(vec![GameEngineEvent::Paused, GameEngineEvent::Resumed]);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:paused", "b:paused", "a:resumed", "b:resumed"]
        );
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = EventBus::default();
        let hits = Arc::new(AtomicUsize::new(0));
        let h = Arc::clone(&hits);
        let sub = bus.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        bus.publish(vec![GameEngineEvent::Paused]);
        assert!(sub.unsubscribe());
        bus.publish(vec![GameEngineEvent::Paused]);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.len(), 0);
    }

    #[test]
    fn unsubscribe_after_clear_reports_false() {
        let bus = EventBus::default();
        let sub = bus.subscribe(|_| {});
        bus.clear();
        assert!(!sub.unsubscribe());
    }

    #[test]
    fn events_raised_during_delivery_follow_the_current_batch() {
        let bus = Arc::new(EventBus::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        let (inner, sink) = (Arc::clone(&bus), Arc::clone(&log));
        bus.subscribe(move |e| {
            sink.lock().unwrap().push(e.name());
            if let GameEngineEvent::Paused = e {
                inner.publish(vec![GameEngineEvent::Resumed]);
            }
        });
        bus.publish(vec![
            GameEngineEvent::Paused,
            GameEngineEvent::SelectionChanged { selected: None },
        ]);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["paused", "selection_changed", "resumed"]
        );
    }

    #[test]
    fn batches_from_other_threads_wait_their_turn() {
        let bus = Arc::new(EventBus::default());
        let log = Arc::new(Mutex::new(Vec::new()));
        let (inner, sink) = (Arc::clone(&bus), Arc::clone(&log));
        let other = Arc::new(Mutex::new(None));
        let handle_slot = Arc::clone(&other);
        bus.subscribe(move |e| {
            sink.lock().unwrap().push(e.name());
            if let GameEngineEvent::Paused = e {
                let bus = Arc::clone(&inner);
                let ticket = bus.enqueue(vec![GameEngineEvent::Resumed]);
                *handle_slot.lock().unwrap() = Some(thread::spawn(move || bus.flush(ticket)));
            }
        });

        bus.publish(vec![
            GameEngineEvent::Paused,
            GameEngineEvent::SelectionChanged { selected: None },
        ]);
        let handle = other.lock().unwrap().take().unwrap();
        handle.join().unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["paused", "selection_changed", "resumed"]
        );
    }

    #[test]
    fn handler_may_subscribe_during_delivery() {
        let bus = Arc::new(EventBus::default());
        let inner = Arc::clone(&bus);
        bus.subscribe(move |_| {
            inner.subscribe(|_| {});
        });
        bus.publish(vec![GameEngineEvent::Paused]);
        assert_eq!(bus.len(), 2);
    }
}
