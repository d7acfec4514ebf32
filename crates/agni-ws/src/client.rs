use std::time::Duration;

use agni_core::MonitorClass;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::time::timeout;
use tracing::debug;

use crate::hub::HubHandle;

/// The reader exists solely to detect peer close/error; it never acts on
/// message content. Ticking at this interval bounds how quickly a dead
/// peer is noticed.
const READ_TICK: Duration = Duration::from_millis(500);
/// A write that doesn't complete within this deadline counts the client as
/// slow, same as a full outbound queue.
const WRITE_DEADLINE: Duration = Duration::from_secs(10);

/// Drives one upgraded WebSocket connection end to end: registers with the
/// hub, then runs a reader (peer-close detection only) concurrently with a
/// writer (drains the outbound queue, joining any backlog into a single
/// `\n`-separated text frame) until either side ends, then unregisters.
pub async fn run_client(socket: WebSocket, hub: HubHandle, class: MonitorClass) {
    let Some((id, mut outbound)) = hub.register(class).await else {
        return;
    };

    let (mut sink, mut stream) = socket.split();

    let reader = async {
        loop {
            match timeout(READ_TICK, stream.next()).await {
                Ok(None) => break,
                Ok(Some(Err(_))) => break,
                Ok(Some(Ok(Message::Close(_)))) => break,
                Ok(Some(Ok(_))) => continue,
                Err(_) => continue,
            }
        }
    };

    let writer = async {
        while let Some(first) = outbound.recv().await {
            let mut backlog = vec![first];
            while let Ok(next) = outbound.try_recv() {
                backlog.push(next);
            }
            let combined = backlog.join("\n");
            match timeout(WRITE_DEADLINE, sink.send(Message::Text(combined.into()))).await {
                Ok(Ok(())) => {}
                _ => break,
            }
        }
    };

    tokio::select! {
        _ = reader => {}
        _ = writer => {}
    }

    hub.unregister(class, id).await;
    debug!(class = class.as_str(), client = id, "ws client disconnected");
}
