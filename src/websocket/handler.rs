use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{accept_async, WebSocketStream};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use log::{debug, info, warn, error};

use crate::chat::ClientHandle;
use crate::config::OUTBOUND_QUEUE_SIZE;
use crate::server::AppState;

pub struct WebSocketHandler {
    state: AppState,
    peer_addr: String,
}

impl WebSocketHandler {
    pub fn new(state: AppState, peer_addr: String) -> Self {
        Self {
            state,
            peer_addr,
        }
    }

    pub async fn handle_connection(self, stream: TcpStream) {
        let ws_stream = match accept_async(stream).await {
            Ok(ws) => ws,
            Err(e) => {
                error!("WebSocket handshake failed for {}: {:?}", self.peer_addr, e);
                return;
            }
        };

        self.handle_websocket_connection(ws_stream).await;
    }

    async fn handle_websocket_connection(&self, ws_stream: WebSocketStream<TcpStream>) {
        let (write, read) = ws_stream.split();
        let (outbox_tx, outbox_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE_SIZE);

        // Write task - drains this client's outbound queue
        let write_task = self.spawn_write_task(write, outbox_rx);

        let registration = self.state.registry.enroll(ClientHandle::new(self.peer_addr.clone(), outbox_tx));
        info!("WebSocket connection established - {} from {} ({} connected)",
              registration.name(), self.peer_addr, self.state.registry.len());

        self.read_messages(read, registration.name()).await;

        // Dropping the registration releases the last long-lived sender,
        // so the write task flushes what is queued and then exits.
        drop(registration);
        if let Err(e) = write_task.await {
            error!("Write task for {} failed: {:?}", self.peer_addr, e);
        }

        info!("WebSocket connection closed - {} ({} connected)", self.peer_addr, self.state.registry.len());
    }

    fn spawn_write_task(
        &self,
        mut write: SplitSink<WebSocketStream<TcpStream>, Message>,
        mut outbox: mpsc::Receiver<String>,
    ) -> JoinHandle<()> {
        let peer_addr = self.peer_addr.clone();

        tokio::spawn(async move {
            while let Some(message) = outbox.recv().await {
                if let Err(e) = write.send(Message::Text(message)).await {
                    warn!("Error sending message to {}: {:?}", peer_addr, e);
                    return;
                }
            }

            if let Err(e) = write.close().await {
                debug!("Closing socket for {}: {:?}", peer_addr, e);
            }
        })
    }

    /// Messages are dispatched one at a time, in arrival order.
    async fn read_messages(&self, mut read: SplitStream<WebSocketStream<TcpStream>>, name: &str) {
        while let Some(msg_result) = read.next().await {
            match msg_result {
                Ok(Message::Text(text)) => {
                    debug!("Received text message from {}: {}", name, text);
                    self.state.dispatcher.dispatch(name, &text).await;
                }
                Ok(Message::Close(close_frame)) => {
                    info!("Received close frame from {}: {:?}", name, close_frame);
                    break;
                }
                Ok(Message::Ping(_)) => {
                    debug!("Received ping from {}", name);
                }
                Ok(Message::Pong(_)) => {
                    debug!("Received pong from {}", name);
                }
                Ok(Message::Binary(data)) => {
                    warn!("Ignoring binary message from {}: {} bytes", name, data.len());
                }
                Ok(Message::Frame(_)) => {
                    debug!("Received raw frame from {}", name);
                }
                Err(WsError::ConnectionClosed) | Err(WsError::AlreadyClosed) => break,
                Err(e) => {
                    warn!("Error reading message from {}: {:?}", name, e);
                    break;
                }
            }
        }
    }
}
