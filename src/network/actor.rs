//! Network actor - runs HTTP probes in the Tokio async runtime

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::{AbortHandle, JoinSet};

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::{create_client, execute_probe};

/// Network actor that processes probe commands
pub struct NetworkActor {
    client: reqwest::Client,
    timeout: Duration,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<u64>,
    abort_handles: HashMap<u64, AbortHandle>,
}

impl NetworkActor {
    pub fn new(response_tx: mpsc::UnboundedSender<NetworkResponse>, timeout: Duration) -> Self {
        NetworkActor {
            client: create_client(timeout),
            timeout,
            response_tx,
            active_requests: JoinSet::new(),
            abort_handles: HashMap::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::ExecuteProbe { id, request }) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();
                            let timeout = self.timeout;

                            let handle = self.active_requests.spawn(async move {
                                tracing::info!(id, url = %request.url, method = ?request.method, "Executing probe");
                                let result = execute_probe(&client, request, timeout, id).await;
                                tracing::info!(id, "Probe completed");
                                let _ = response_tx.send(result);
                                id
                            });
                            self.abort_handles.insert(id, handle);
                        }

                        Some(NetworkCommand::CancelProbe(id)) => {
                            if let Some(handle) = self.abort_handles.remove(&id) {
                                tracing::info!(id, "Cancelling probe");
                                handle.abort();
                                let _ = self.response_tx.send(NetworkResponse::Cancelled { id });
                            }
                        }

                        Some(NetworkCommand::Shutdown) | None => {
                            self.active_requests.abort_all();
                            break;
                        }
                    }
                }

                Some(result) = self.active_requests.join_next() => {
                    if let Ok(id) = result {
                        self.abort_handles.remove(&id);
                    }
                }
            }
        }
    }
}
