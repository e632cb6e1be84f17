// WebSocket transport carrying JSON text frames

use futures_util::{SinkExt, StreamExt};
use log::debug;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::session::{Transport, TransportError};
use crate::types::{ClientMessage, ServerMessage};

pub struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsTransport {
    pub async fn connect(uri: &str) -> Result<Self, TransportError> {
        let (stream, _) = connect_async(uri)
            .await
            .map_err(|e| TransportError::Other(e.to_string()))?;
        debug!("Connected to {}", uri);
        Ok(WsTransport { stream })
    }
}

impl Transport for WsTransport {
    async fn send(&mut self, msg: &ClientMessage) -> Result<(), TransportError> {
        let text = serde_json::to_string(msg)?;
        self.stream
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::Other(e.to_string()))
    }

    async fn recv(&mut self) -> Result<ServerMessage, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(serde_json::from_str(&text)?),
                Some(Ok(Message::Binary(bytes))) => return Ok(serde_json::from_slice(&bytes)?),
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::Closed),
                // Ping/pong are answered by tungstenite itself
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::Other(e.to_string())),
            }
        }
    }
}
