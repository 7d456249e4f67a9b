//! Line protocol message definitions
//!
//! One JSON object per line in both directions, discriminated by `"type"`.
//!
//! Client → engine requests carry an optional `seq` that is echoed back in the
//! matching response. Engine → client lines are either a `response` or an `event`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use gem_cascade_core::{Board, GameState, MatchGroup};
use gem_cascade_engine::{EngineError, GameEngineEvent, MoveOutcome, Selection};
use gem_cascade_types::Position;

/// `[row, col]` on the wire
pub type WirePos = [usize; 2];

pub fn to_position(p: WirePos) -> Position {
    Position::new(p[0], p[1])
}

fn to_wire(p: Position) -> WirePos {
    [p.row, p.col]
}

/// Request payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    Initialize {
        #[serde(default)]
        size: Option<usize>,
    },
    Move {
        from: WirePos,
        to: WirePos,
    },
    Select {
        at: WirePos,
    },
    Deselect,
    Hint,
    Pause,
    Resume,
    Reset,
    NextLevel,
    Fail {
        #[serde(default)]
        reason: Option<String>,
    },
    State,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::Initialize { .. } => "initialize",
            Request::Move { .. } => "move",
            Request::Select { .. } => "select",
            Request::Deselect => "deselect",
            Request::Hint => "hint",
            Request::Pause => "pause",
            Request::Resume => "resume",
            Request::Reset => "reset",
            Request::NextLevel => "next_level",
            Request::Fail { .. } => "fail",
            Request::State => "state",
        }
    }
}

/// Parse one request line into its `seq` and payload
pub fn parse_request(line: &str) -> Result<(Option<u64>, Request), serde_json::Error> {
    let value: Value = serde_json::from_str(line)?;
    let seq = value.get("seq").and_then(Value::as_u64);
    let request = Request::deserialize(value)?;
    Ok((seq, request))
}

/// Recover `seq` from a line that did not parse as a request
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Error body of a failed response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireError {
    pub code: String,
    pub message: String,
}

impl From<&EngineError> for WireError {
    fn from(err: &EngineError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMessage {
    pub seq: Option<u64>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WireError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl ResponseMessage {
    pub fn success(seq: Option<u64>, result: Option<Value>) -> Self {
        Self {
            seq,
            ok: true,
            error: None,
            result,
        }
    }

    pub fn failure(seq: Option<u64>, code: &str, message: impl Into<String>) -> Self {
        Self {
            seq,
            ok: false,
            error: Some(WireError {
                code: code.to_string(),
                message: message.into(),
            }),
            result: None,
        }
    }

    pub fn engine_error(seq: Option<u64>, err: &EngineError) -> Self {
        Self {
            seq,
            ok: false,
            error: Some(err.into()),
            result: None,
        }
    }
}

/// Engine → client line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outbound {
    Response(ResponseMessage),
    Event { event: WireEvent },
}

impl Outbound {
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Board as one glyph string per row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireBoard {
    pub size: usize,
    pub rows: Vec<String>,
}

impl From<&Board> for WireBoard {
    fn from(board: &Board) -> Self {
        let rendered = board.to_string();
        Self {
            size: board.size(),
            rows: rendered.lines().map(str::to_string).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireState {
    pub status: &'static str,
    pub score: u32,
    pub level: u32,
    pub moves: u32,
    pub target_score: u32,
    pub combo_multiplier: u32,
    pub last_move_score: u32,
    pub board: WireBoard,
}

impl From<&GameState> for WireState {
    fn from(s: &GameState) -> Self {
        Self {
            status: s.status.as_str(),
            score: s.score,
            level: s.level,
            moves: s.moves,
            target_score: s.target_score,
            combo_multiplier: s.combo_multiplier,
            last_move_score: s.last_move_score,
            board: WireBoard::from(&s.board),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMatch {
    pub kind: &'static str,
    pub orientation: &'static str,
    pub cells: Vec<WirePos>,
}

impl From<&MatchGroup> for WireMatch {
    fn from(m: &MatchGroup) -> Self {
        Self {
            kind: m.kind.as_str(),
            orientation: m.orientation.as_str(),
            cells: m.positions().map(to_wire).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireOutcome {
    pub valid: bool,
    pub score_change: u32,
    pub combo_count: u32,
    pub matches: Vec<WireMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<&'static str>,
    pub level_completed: bool,
    pub board: WireBoard,
}

impl From<&MoveOutcome> for WireOutcome {
    fn from(o: &MoveOutcome) -> Self {
        Self {
            valid: o.valid,
            score_change: o.score_change,
            combo_count: o.combo_count,
            matches: o.matches_found.iter().map(WireMatch::from).collect(),
            rejection: o.rejection.map(|r| r.as_str()),
            level_completed: o.level_completed,
            board: WireBoard::from(&o.new_board),
        }
    }
}

/// Wire form of a `select` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "selection", rename_all = "snake_case")]
pub enum WireSelection {
    Ignored,
    Selected { at: WirePos },
    Cleared,
    Swapped { outcome: WireOutcome },
}

impl From<&Selection> for WireSelection {
    fn from(s: &Selection) -> Self {
        match s {
            Selection::Ignored => WireSelection::Ignored,
            Selection::Selected(at) => WireSelection::Selected { at: to_wire(*at) },
            Selection::Cleared => WireSelection::Cleared,
            Selection::Swapped(outcome) => WireSelection::Swapped {
                outcome: outcome.into(),
            },
        }
    }
}

/// Engine event payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WireEvent {
    Initialized {
        state: WireState,
    },
    MoveMade {
        from: WirePos,
        to: WirePos,
        outcome: WireOutcome,
    },
    BoardChanged {
        board: WireBoard,
    },
    ScoreUpdated {
        score: u32,
        last_move_score: u32,
        combo_multiplier: u32,
    },
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
        from: WirePos,
        to: WirePos,
    },
    Paused,
    Resumed,
    SelectionChanged {
        selected: Option<WirePos>,
    },
    Error {
        error: WireError,
    },
}

impl From<&GameEngineEvent> for WireEvent {
    fn from(event: &GameEngineEvent) -> Self {
        match event {
            GameEngineEvent::Initialized { state } => WireEvent::Initialized {
                state: state.into(),
            },
            GameEngineEvent::MoveMade { from, to, outcome } => WireEvent::MoveMade {
                from: to_wire(*from),
                to: to_wire(*to),
                outcome: outcome.into(),
            },
            GameEngineEvent::BoardChanged { board } => WireEvent::BoardChanged {
                board: board.into(),
            },
            GameEngineEvent::ScoreUpdated {
                score,
                last_move_score,
                combo_multiplier,
            } => WireEvent::ScoreUpdated {
                score: *score,
                last_move_score: *last_move_score,
                combo_multiplier: *combo_multiplier,
            },
            GameEngineEvent::LevelCompleted { level, score } => WireEvent::LevelCompleted {
                level: *level,
                score: *score,
            },
            GameEngineEvent::LevelStarted {
                level,
                target_score,
            } => WireEvent::LevelStarted {
                level: *level,
                target_score: *target_score,
            },
            GameEngineEvent::GameOver {
                reason,
                score,
                level,
            } => WireEvent::GameOver {
                reason: reason.clone(),
                score: *score,
                level: *level,
            },
            GameEngineEvent::HintShown { swap } => WireEvent::HintShown {
                from: to_wire(swap.from),
                to: to_wire(swap.to),
            },
            GameEngineEvent::Paused => WireEvent::Paused,
            GameEngineEvent::Resumed => WireEvent::Resumed,
            GameEngineEvent::SelectionChanged { selected } => WireEvent::SelectionChanged {
                selected: selected.map(to_wire),
            },
            GameEngineEvent::Error { error } => WireEvent::Error {
                error: error.into(),
            },
        }
    }
}
