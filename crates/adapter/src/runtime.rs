//! Adapter runtime
//!
//! Bridges the synchronous engine with an async line stream. Engine events and
//! request responses share one outbound channel, so every event raised while handling
//! a request is written before that request's response.

use serde::Serialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use gem_cascade_engine::{EngineError, GameEngine};
use gem_cascade_types::{MAX_BOARD_SIZE, MIN_BOARD_SIZE};

use crate::protocol::{
    extract_seq_best_effort, parse_request, to_position, Outbound, Request, ResponseMessage,
    WireEvent, WireOutcome, WireSelection, WireState,
};

/// Serve one client over `reader`/`writer` until the input ends
pub async fn serve<R, W>(engine: GameEngine, reader: R, writer: W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (out_tx, out_rx) = mpsc::unbounded_channel::<Outbound>();

    let events_tx = out_tx.clone();
    let subscription = engine.subscribe(move |event| {
        let _ = events_tx.send(Outbound::Event {
            event: WireEvent::from(event),
        });
    });

    let write_task = tokio::spawn(write_loop(writer, out_rx));
    info!("adapter serving");

    let mut lines = reader.lines();
    let read_result = loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break Ok(()),
            Err(e) => break Err(e),
        };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let response = match parse_request(trimmed) {
            Ok((seq, request)) => {
                debug!(seq, request = request.name(), "request");
                handle_request(&engine, seq, request).await
            }
            Err(err) => {
                warn!(error = %err, "unparseable request");
                ResponseMessage::failure(
                    extract_seq_best_effort(trimmed),
                    "invalid_request",
                    err.to_string(),
                )
            }
        };

        if out_tx.send(Outbound::Response(response)).is_err() {
            break Ok(());
        }
    };

    subscription.unsubscribe();
    drop(out_tx);
    write_task.await??;
    info!("adapter input closed");
    read_result?;
    Ok(())
}

/// Serve the process's stdin/stdout
pub async fn serve_stdio(engine: GameEngine) -> anyhow::Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    serve(engine, stdin, tokio::io::stdout()).await
}

async fn write_loop<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Outbound>) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = rx.recv().await {
        let mut line = msg.to_line()?;
        line.push('\n');
        writer.write_all(line.as_bytes()).await?;
        writer.flush().await?;
    }
    writer.shutdown().await?;
    Ok(())
}

fn to_value<T: Serialize>(value: T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

fn respond<T: Serialize>(seq: Option<u64>, result: Result<T, EngineError>) -> ResponseMessage {
    match result {
        Ok(value) => ResponseMessage::success(seq, to_value(value)),
        Err(err) => ResponseMessage::engine_error(seq, &err),
    }
}

async fn handle_request(engine: &GameEngine, seq: Option<u64>, request: Request) -> ResponseMessage {
    match request {
        Request::Initialize { size } => {
            let size = size.unwrap_or(engine.config().board_size);
            if engine.initialize(size) {
                let state = engine.get_game_state();
                ResponseMessage::success(seq, to_value(WireState::from(&state)))
            } else {
                let err = EngineError::InvalidBoardSize {
                    size,
                    min: MIN_BOARD_SIZE,
                    max: MAX_BOARD_SIZE,
                };
                ResponseMessage::engine_error(seq, &err)
            }
        }
        Request::Move { from, to } => {
            let result = engine.make_move(to_position(from), to_position(to)).await;
            respond(seq, result.map(|o| WireOutcome::from(&o)))
        }
        Request::Select { at } => {
            let result = engine.select_gem(to_position(at));
            respond(seq, result.map(|s| WireSelection::from(&s)))
        }
        Request::Deselect => {
            ResponseMessage::success(seq, Some(json!({ "changed": engine.deselect_gem() })))
        }
        Request::Hint => respond(
            seq,
            engine
                .show_hint()
                .map(|s| json!({ "from": [s.from.row, s.from.col], "to": [s.to.row, s.to.col] })),
        ),
        Request::Pause => ResponseMessage::success(seq, Some(json!({ "changed": engine.pause() }))),
        Request::Resume => {
            ResponseMessage::success(seq, Some(json!({ "changed": engine.resume() })))
        }
        Request::Reset => respond(seq, engine.reset()),
        Request::NextLevel => respond(seq, engine.next_level()),
        Request::Fail { reason } => respond(
            seq,
            engine.fail(reason.unwrap_or_else(|| "client request".to_string())),
        ),
        Request::State => {
            let state = engine.get_game_state();
            ResponseMessage::success(seq, to_value(WireState::from(&state)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gem_cascade_engine::EngineConfig;
    use tokio::io::{duplex, AsyncReadExt};

    async fn run_script(input: &str) -> Vec<Value> {
        let engine = GameEngine::new(EngineConfig::default().with_seed(99));
        let (client, server) = duplex(1 << 20);
        let (server_read, server_write) = tokio::io::split(server);
        let (mut client_read, mut client_write) = tokio::io::split(client);

        client_write.write_all(input.as_bytes()).await.unwrap();
        client_write.shutdown().await.unwrap();

        serve(engine, BufReader::new(server_read), server_write)
            .await
            .unwrap();

        let mut out = String::new();
        client_read.read_to_string(&mut out).await.unwrap();
        out.lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_then_state() {
        let out = run_script(
            "{\"type\":\"initialize\",\"seq\":1,\"size\":6}\n{\"type\":\"state\",\"seq\":2}\n",
        )
        .await;

        assert_eq!(out.len(), 3);
        assert_eq!(out[0]["type"], "event");
        assert_eq!(out[0]["event"]["type"], "initialized");
        assert_eq!(out[1]["type"], "response");
        assert_eq!(out[1]["seq"], 1);
        assert_eq!(out[1]["ok"], true);
        assert_eq!(out[1]["result"]["board"]["size"], 6);
        assert_eq!(out[2]["seq"], 2);
        assert_eq!(out[2]["result"]["status"], "playing");
    }

    #[tokio::test]
    async fn test_errors_are_responses() {
        let out = run_script(concat!(
            "{\"type\":\"hint\",\"seq\":1}\n",
            "{\"seq\":2,\"type\":\"warp\"}\n",
            "garbage\n",
            "\n",
            "{\"type\":\"initialize\",\"seq\":3,\"size\":40}\n",
        ))
        .await;

        assert_eq!(out[0]["seq"], 1);
        assert_eq!(out[0]["error"]["code"], "invalid_state");
        assert_eq!(out[1]["seq"], 2);
        assert_eq!(out[1]["error"]["code"], "invalid_request");
        assert_eq!(out[2]["seq"], Value::Null);
        assert_eq!(out[3]["event"]["type"], "error");
        assert_eq!(out[4]["seq"], 3);
        assert_eq!(out[4]["error"]["code"], "invalid_board_size");
        assert_eq!(out.len(), 5);
    }

    #[tokio::test]
    async fn test_pause_emits_event_before_response() {
        let out = run_script(concat!(
            "{\"type\":\"initialize\",\"seq\":1,\"size\":5}\n",
            "{\"type\":\"pause\",\"seq\":2}\n",
            "{\"type\":\"pause\",\"seq\":3}\n",
        ))
        .await;

        let tail: Vec<&Value> = out.iter().skip(2).collect();
        assert_eq!(tail[0]["event"]["type"], "paused");
        assert_eq!(tail[1]["seq"], 2);
        assert_eq!(tail[1]["result"]["changed"], true);
        assert_eq!(tail[2]["seq"], 3);
        assert_eq!(tail[2]["result"]["changed"], false);
    }
}
