use std::collections::HashMap;

use agni_core::MonitorClass;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// At most 20 live clients per broadcast class; the 21st registration is
/// silently dropped (no ACK channel back to the rejected client beyond the
/// `None` returned from [`HubHandle::register`]).
pub const MAX_CLIENTS_PER_CLASS: usize = 20;
const CLIENT_QUEUE_CAPACITY: usize = 256;

enum Command {
    Register {
        class: MonitorClass,
        outbound: mpsc::Sender<String>,
        reply: oneshot::Sender<Option<u64>>,
    },
    Unregister {
        class: MonitorClass,
        id: u64,
    },
    Broadcast {
        class: MonitorClass,
        message: String,
    },
    ClassCount {
        class: MonitorClass,
        reply: oneshot::Sender<usize>,
    },
    Stop,
}

/// A cheap, cloneable front for the hub's single selector task. Every
/// mutation (register/unregister/broadcast) is serialized through the one
/// command channel, so the hub has no shared mutable state outside its
/// own task — matching the "single selector loop" invariant.
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<Command>,
}

impl HubHandle {
    /// Registers a new client of `class`. Returns `None` if the class is at
    /// [`MAX_CLIENTS_PER_CLASS`] or the hub has already stopped — the caller
    /// closes the socket in that case.
    pub async fn register(&self, class: MonitorClass) -> Option<(u64, mpsc::Receiver<String>)> {
        let (outbound_tx, outbound_rx) = mpsc::channel(CLIENT_QUEUE_CAPACITY);
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Register {
                class,
                outbound: outbound_tx,
                reply: reply_tx,
            })
            .await
            .ok()?;
        reply_rx.await.ok().flatten().map(|id| (id, outbound_rx))
    }

    pub async fn unregister(&self, class: MonitorClass, id: u64) {
        let _ = self.commands.send(Command::Unregister { class, id }).await;
    }

    /// Fans `message` out to every live client of `class`. Clients whose
    /// outbound queue is full are evicted (queue dropped, which ends their
    /// writer loop) rather than blocking the broadcaster.
    pub async fn broadcast(&self, class: MonitorClass, message: impl Into<String>) {
        let _ = self
            .commands
            .send(Command::Broadcast {
                class,
                message: message.into(),
            })
            .await;
    }

    pub async fn class_count(&self, class: MonitorClass) -> usize {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .commands
            .send(Command::ClassCount {
                class,
                reply: reply_tx,
            })
            .await
            .is_err()
        {
            return 0;
        }
        reply_rx.await.unwrap_or(0)
    }

    pub async fn stop(&self) {
        let _ = self.commands.send(Command::Stop).await;
    }
}

/// Spawns the hub's selector task and returns a handle to it.
pub struct Hub;

impl Hub {
    pub fn spawn() -> (HubHandle, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<Command>(256);

        let task = tokio::spawn(async move {
            let mut tables: HashMap<MonitorClass, HashMap<u64, mpsc::Sender<String>>> =
                HashMap::new();
            for class in [MonitorClass::Activity, MonitorClass::Status, MonitorClass::Log] {
                tables.insert(class, HashMap::new());
            }
            let mut next_id: u64 = 0;

            while let Some(cmd) = rx.recv().await {
                match cmd {
                    Command::Register {
                        class,
                        outbound,
                        reply,
                    } => {
                        let table = tables.entry(class).or_default();
                        if table.len() >= MAX_CLIENTS_PER_CLASS {
                            debug!(class = class.as_str(), "rejecting registration at capacity");
                            let _ = reply.send(None);
                        } else {
                            let id = next_id;
                            next_id += 1;
                            table.insert(id, outbound);
                            let _ = reply.send(Some(id));
                        }
                    }
                    Command::Unregister { class, id } => {
                        if let Some(table) = tables.get_mut(&class) {
                            table.remove(&id);
                        }
                    }
                    Command::Broadcast { class, message } => {
                        if let Some(table) = tables.get_mut(&class) {
                            let mut evict = Vec::new();
                            for (id, outbound) in table.iter() {
                                if outbound.try_send(message.clone()).is_err() {
                                    evict.push(*id);
                                }
                            }
                            for id in evict {
                                warn!(class = class.as_str(), client = id, "evicting slow client");
                                table.remove(&id);
                            }
                        }
                    }
                    Command::ClassCount { class, reply } => {
                        let count = tables.get(&class).map(HashMap::len).unwrap_or(0);
                        let _ = reply.send(count);
                    }
                    Command::Stop => {
                        tables.clear();
                        break;
                    }
                }
            }
        });

        (HubHandle { commands: tx }, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn registers_up_to_the_class_cap_and_rejects_the_next() {
        let (hub, _task) = Hub::spawn();
        let mut registered = Vec::new();
        for _ in 0..MAX_CLIENTS_PER_CLASS {
            let reg = hub.register(MonitorClass::Status).await;
            assert!(reg.is_some());
            registered.push(reg.unwrap());
        }
        assert_eq!(hub.class_count(MonitorClass::Status).await, MAX_CLIENTS_PER_CLASS);

        let overflow = hub.register(MonitorClass::Status).await;
        assert!(overflow.is_none());
        assert_eq!(hub.class_count(MonitorClass::Status).await, MAX_CLIENTS_PER_CLASS);
    }

    #[tokio::test]
    async fn broadcast_only_reaches_clients_of_the_matching_class() {
        let (hub, _task) = Hub::spawn();
        let (status_id, mut status_rx) = hub.register(MonitorClass::Status).await.unwrap();
        let (_log_id, mut log_rx) = hub.register(MonitorClass::Log).await.unwrap();

        hub.broadcast(MonitorClass::Status, "status update").await;

        let received = status_rx.recv().await.unwrap();
        assert_eq!(received, "status update");

        hub.unregister(MonitorClass::Status, status_id).await;
        assert!(log_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn unregister_removes_the_client_from_its_class() {
        let (hub, _task) = Hub::spawn();
        let (id, _rx) = hub.register(MonitorClass::Activity).await.unwrap();
        assert_eq!(hub.class_count(MonitorClass::Activity).await, 1);

        hub.unregister(MonitorClass::Activity, id).await;
        assert_eq!(hub.class_count(MonitorClass::Activity).await, 0);
    }
}
