// src/server/session.rs
//! One websocket connection is one dashboard session.

use futures_util::{FutureExt, SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::{
    binder::{InputChanged, ReactiveBinder},
    data::Table,
};

enum Incoming {
    Input(InputChanged),
    Close,
    Skip,
}

fn decode(msg: Result<Message, warp::Error>) -> Incoming {
    let msg = match msg {
        Ok(m) => m,
        Err(e) => {
            warn!("websocket receive failed: {}", e);
            return Incoming::Close;
        }
    };
    if msg.is_close() {
        return Incoming::Close;
    }
    let Ok(text) = msg.to_str() else {
        return Incoming::Skip;
    };
    match serde_json::from_str::<InputChanged>(text) {
        Ok(ev) => Incoming::Input(ev),
        Err(e) => {
            warn!(payload = text, "ignoring malformed input: {}", e);
            Incoming::Skip
        }
    }
}

/// Drive a session until the client goes away.
///
/// Messages are taken in arrival order. Whatever is already queued when the
/// binder becomes free is handled as one burst, so only the newest value is
/// computed.
pub async fn run(socket: WebSocket, table: Arc<Table>) {
    let (mut tx, mut rx) = socket.split();
    let mut binder = ReactiveBinder::new(table);
    info!("session opened");

    'session: while let Some(first) = rx.next().await {
        let mut closing = false;
        let mut burst = Vec::new();

        let mut pending = Some(first);
        while let Some(msg) = pending.take() {
            match decode(msg) {
                Incoming::Input(ev) => burst.push(ev),
                Incoming::Close => {
                    closing = true;
                    break;
                }
                Incoming::Skip => {}
            }
            // only what has already arrived; never wait here
            pending = rx.next().now_or_never().flatten();
        }

        if burst.len() > 1 {
            debug!(coalesced = burst.len(), "collapsing queued inputs");
        }
        if let Some(out) = binder.on_burst(burst) {
            let body = match serde_json::to_string(&out) {
                Ok(b) => b,
                Err(e) => {
                    error!("failed to encode outputs: {}", e);
                    continue;
                }
            };
            if let Err(e) = tx.send(Message::text(body)).await {
                warn!("websocket send failed: {}", e);
                break 'session;
            }
        }

        if closing {
            break;
        }
    }

    info!(last_seq = ?binder.last_applied(), "session closed");
}

#[cfg(test)]
mod tests {
    use crate::{config::AppConfig, data::AggregatedRecord, data::Table, server};
    use serde_json::Value;

    fn state() -> server::AppState {
        server::AppState::new(
            Table::new(
                vec![
                    AggregatedRecord {
                        state: "Idaho".into(),
                        ansi: 16,
                        affected_by: "Pesticides".into(),
                        year: 2015,
                        state_code: "ID".into(),
                        pct_impacted: Some(37.5),
                    },
                    AggregatedRecord {
                        state: "New Mexico".into(),
                        ansi: 35,
                        affected_by: "Varroa_mites".into(),
                        year: 2017,
                        state_code: "NM".into(),
                        pct_impacted: Some(41.0),
                    },
                ],
                "memory",
            ),
            AppConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_ws_round_trip() {
        let mut client = warp::test::ws()
            .path("/ws")
            .handshake(server::routes(state()))
            .await
            .expect("handshake");

        client
            .send_text(r#"{"seq": 1, "value": "Varroa_mites"}"#)
            .await;
        let msg = client.recv().await.expect("reply");
        let body: Value = serde_json::from_str(msg.to_str().unwrap()).unwrap();
        assert_eq!(body["seq"], 1);
        assert_eq!(
            body["status"],
            "The bee-killer chosen by user was: Varroa_mites"
        );
        assert_eq!(body["figure"]["data"][0]["name"], "New Mexico");
        assert_eq!(body["figure"]["data"][0]["x"][0], 2017);
    }

    #[tokio::test]
    async fn test_ws_ignores_garbage_then_answers() {
        let mut client = warp::test::ws()
            .path("/ws")
            .handshake(server::routes(state()))
            .await
            .expect("handshake");

        client.send_text("not json").await;
        client.send_text(r#"{"seq": 7, "value": "Pesticides"}"#).await;
        let msg = client.recv().await.expect("reply");
        let body: Value = serde_json::from_str(msg.to_str().unwrap()).unwrap();
        assert_eq!(body["seq"], 7);
        assert_eq!(body["figure"]["data"][0]["name"], "Idaho");
    }
}
