//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::{net::SocketAddr, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tipchat_server::ui::{realtime::RealtimeConfig, serve};
use tokio::{net::TcpStream, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, client::IntoClientRequest, http::HeaderValue},
};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Server bound to an ephemeral local port, stopped on drop.
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let handle = tokio::spawn(async move {
            serve(listener, RealtimeConfig::default(), std::future::pending())
                .await
                .expect("Server failed");
        });

        Self { addr, handle }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self, tip_id: &str) -> String {
        format!("ws://{}/ws/{}", self.addr, tip_id)
    }

    /// Open a socket as `user_id` and wait until it is a room member.
    ///
    /// The server only starts reading after the connection has joined its
    /// room, so the pong answering our ping confirms membership without
    /// writing anything to history.
    pub async fn join(&self, user_id: &str, tip_id: &str) -> WsClient {
        let mut request = self
            .ws_url(tip_id)
            .into_client_request()
            .expect("Failed to build request");
        request.headers_mut().insert(
            "x-user-id",
            HeaderValue::from_str(user_id).expect("Invalid header value"),
        );
        let (mut ws, _) = connect_async(request).await.expect("Failed to connect");

        ws.send(Message::Ping(b"joined".to_vec().into()))
            .await
            .expect("Failed to send ping");
        tokio::time::timeout(FRAME_TIMEOUT, async {
            loop {
                match ws.next().await {
                    Some(Ok(Message::Pong(_))) => return,
                    Some(Ok(_)) => continue,
                    other => panic!("Socket ended before pong: {other:?}"),
                }
            }
        })
        .await
        .expect("Timed out waiting for pong");
        ws
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

pub async fn send_json(ws: &mut WsClient, value: serde_json::Value) {
    ws.send(Message::text(value.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Read frames until one matches `predicate`, skipping the rest.
pub async fn expect_frame<P>(ws: &mut WsClient, predicate: P) -> serde_json::Value
where
    P: Fn(&serde_json::Value) -> bool,
{
    tokio::time::timeout(FRAME_TIMEOUT, async {
        loop {
            let msg = ws
                .next()
                .await
                .expect("Socket closed")
                .expect("Socket error");
            if let Message::Text(text) = msg {
                let frame: serde_json::Value =
                    serde_json::from_str(text.as_str()).expect("Frame is not JSON");
                if predicate(&frame) {
                    return frame;
                }
            }
        }
    })
    .await
    .expect("Timed out waiting for frame")
}

/// Assert that no text frame arrives within `wait`.
pub async fn expect_silence(ws: &mut WsClient, wait: Duration) {
    let result = tokio::time::timeout(wait, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return Some(text.as_str().to_string()),
                Some(Ok(_)) => continue,
                _ => return None,
            }
        }
    })
    .await;

    if let Ok(Some(frame)) = result {
        panic!("Unexpected frame: {frame}");
    }
}
