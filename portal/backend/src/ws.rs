//! WebSocket handling for real-time updates

use axum::extract::ws::{Message, WebSocket};
use console_realtime::{RealtimeChannel, RealtimeEvent, Subscription, Topic, WsMessage};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::time::{interval, Duration};
use crate::AppState;

/// Frames queued per socket before fan-out starts dropping
const OUTBOUND_CAPACITY: usize = 64;

fn frame(msg_type: &str, data: serde_json::Value) -> WsMessage {
    WsMessage {
        msg_type: msg_type.into(),
        data,
    }
}

async fn send(socket: &mut WebSocket, message: &WsMessage) -> bool {
    let text = match message.to_text() {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(error = %e, msg_type = %message.msg_type, "cannot encode frame");
            return true;
        }
    };
    socket.send(Message::Text(text)).await.is_ok()
}

/// Forward records-changed fan-out into a bounded per-socket queue.
/// A full queue drops the frame; clients only need the latest signal.
fn bridge(realtime: &RealtimeChannel, capacity: usize) -> (Subscription, mpsc::Receiver<WsMessage>) {
    let (tx, rx) = mpsc::channel::<WsMessage>(capacity);
    let subscription = realtime.bus().subscribe(Topic::RecordsChanged, move |event| {
        match tx.try_send(event.to_message()) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!("live client lagging, dropping records_changed frame");
            }
        }
    });
    (subscription, rx)
}

pub async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let welcome = RealtimeEvent::Connected.to_message();
    if !send(&mut socket, &frame(&welcome.msg_type, serde_json::json!({ "status": "ok" }))).await {
        return;
    }

    let (_subscription, mut rx) = bridge(&state.realtime, OUTBOUND_CAPACITY);
    tracing::debug!("live client attached");

    let mut ticker = interval(Duration::from_secs(state.config.heartbeat_secs.max(1)));
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !send(&mut socket, &frame("heartbeat", serde_json::json!({}))).await {
                    break;
                }
            }

            Some(message) = rx.recv() => {
                if !send(&mut socket, &message).await {
                    break;
                }
            }

            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let Ok(parsed) = WsMessage::parse(&text) else {
                            tracing::debug!("ignoring unparseable client frame");
                            continue;
                        };
                        let reply = match parsed.msg_type.as_str() {
                            "ping" => frame("pong", serde_json::json!({})),
                            "subscribe" => frame("subscribed", parsed.data),
                            _ => continue,
                        };
                        if !send(&mut socket, &reply).await {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "socket error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("live client detached");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_bridge_drops_when_client_lags() {
        let realtime = RealtimeChannel::new();
        let (_subscription, mut rx) = bridge(&realtime, 2);

        for n in 0..5 {
            realtime.notify_records_changed(json!({ "seq": n }));
        }

        assert_eq!(rx.recv().await.map(|m| m.data), Some(json!({ "seq": 0 })));
        assert_eq!(rx.recv().await.map(|m| m.data), Some(json!({ "seq": 1 })));
        assert!(rx.try_recv().is_err());

        // Room again once drained
        realtime.notify_records_changed(json!({ "seq": 5 }));
        assert_eq!(rx.recv().await.map(|m| m.msg_type), Some("records_changed".to_string()));
    }

    #[tokio::test]
    async fn test_bridge_released_with_subscription() {
        let realtime = RealtimeChannel::new();
        let (subscription, mut rx) = bridge(&realtime, 4);
        drop(subscription);

        assert_eq!(realtime.notify_records_changed(json!(null)), 0);
        assert!(rx.recv().await.is_none());
    }
}
