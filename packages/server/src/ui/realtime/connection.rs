//! One client's WebSocket, split into an inbound and an outbound loop.

use std::{
    fmt,
    future::Future,
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
};

use async_trait::async_trait;
use axum::extract::ws::Message as WsMessage;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::{
    sync::{Mutex as AsyncMutex, mpsc},
    time::Instant,
};
use tokio_util::sync::CancellationToken;

use crate::domain::{TipId, UserId};

use super::{TransportError, hub::Hub};

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique connection identifier, assigned at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Receives every frame read from a connection.
///
/// Supplied once when the connection starts serving.
#[async_trait]
pub trait FrameHandler: Send + Sync {
    async fn handle(&self, raw: &str, conn: &Connection);
}

/// Shared handle of a live connection.
///
/// Rooms hold it for membership; the two loops hold it to learn when the
/// connection has been closed. Closing is done through the cancellation
/// token, which both loops watch.
pub struct Connection {
    id: ConnectionId,
    user_id: UserId,
    tip_id: TipId,
    outbound: mpsc::Sender<String>,
    last_active: Mutex<Instant>,
    cancel: CancellationToken,
}

impl Connection {
    /// Create a connection bound to a verified user and a tip room.
    ///
    /// Returns the receiving end of the outbound queue, to be handed to
    /// [`run_outbound`].
    pub fn new(
        user_id: UserId,
        tip_id: TipId,
        outbound_capacity: usize,
    ) -> (Arc<Self>, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(outbound_capacity.max(1));
        let conn = Self {
            id: ConnectionId::next(),
            user_id,
            tip_id,
            outbound: tx,
            last_active: Mutex::new(Instant::now()),
            cancel: CancellationToken::new(),
        };
        (Arc::new(conn), rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn tip_id(&self) -> &TipId {
        &self.tip_id
    }

    /// Try to queue a frame for this client without waiting.
    ///
    /// A full queue drops the frame. Returns whether it was queued.
    pub fn enqueue(&self, frame: String) -> bool {
        match self.outbound.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(conn = %self.id, user_id = %self.user_id, "outbound queue full, frame dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Close the connection. Idempotent.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the connection has been closed.
    pub async fn closed(&self) {
        self.cancel.cancelled().await
    }

    /// Run `fut` unless the connection closes first, in which case `None` is
    /// returned and `fut` is dropped.
    pub async fn until_closed<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            out = fut => Some(out),
        }
    }

    pub fn touch(&self) {
        *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    pub fn last_active(&self) -> Instant {
        *self
            .last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("tip_id", &self.tip_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Write half of a socket.
///
/// Every write goes through the lock, so the outbound loop and a closing
/// writer never interleave on the sink.
pub struct SocketWriter<K> {
    sink: AsyncMutex<K>,
}

impl<K> SocketWriter<K>
where
    K: Sink<WsMessage> + Unpin,
    K::Error: fmt::Display,
{
    pub fn new(sink: K) -> Self {
        Self {
            sink: AsyncMutex::new(sink),
        }
    }

    pub async fn send_text(&self, frame: String) -> Result<(), TransportError> {
        let mut sink = self.sink.lock().await;
        sink.send(WsMessage::Text(frame.into()))
            .await
            .map_err(|e| TransportError::Write(e.to_string()))
    }

    /// Send a close frame and shut the sink. Errors are ignored; the peer may
    /// already be gone.
    pub async fn close(&self) {
        let mut sink = self.sink.lock().await;
        let _ = sink.send(WsMessage::Close(None)).await;
        let _ = sink.close().await;
    }
}

/// Read frames until the socket ends, errors, or the connection is closed.
///
/// Returns `Ok(())` for an orderly end. The caller owns the room membership
/// and must leave the room afterwards.
pub async fn run_inbound<S, E>(
    conn: Arc<Connection>,
    mut stream: S,
    handler: Arc<dyn FrameHandler>,
) -> Result<(), TransportError>
where
    S: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: fmt::Display,
{
    loop {
        let next = tokio::select! {
            _ = conn.closed() => return Ok(()),
            next = stream.next() => next,
        };

        match next {
            None => return Ok(()),
            Some(Err(e)) => return Err(TransportError::Read(e.to_string())),
            Some(Ok(WsMessage::Text(text))) => {
                conn.touch();
                tracing::debug!(conn = %conn.id(), "received frame: {}", text.as_str());
                handler.handle(text.as_str(), &conn).await;
            }
            Some(Ok(WsMessage::Binary(bytes))) => {
                conn.touch();
                match std::str::from_utf8(&bytes) {
                    Ok(text) => handler.handle(text, &conn).await,
                    Err(_) => tracing::warn!(conn = %conn.id(), "ignoring non-UTF-8 binary frame"),
                }
            }
            Some(Ok(WsMessage::Close(_))) => {
                tracing::info!(conn = %conn.id(), "client requested close");
                return Ok(());
            }
            Some(Ok(_)) => {
                // ping/pong are answered by the protocol layer
                conn.touch();
            }
        }
    }
}

/// Drain the outbound queue into the socket until the connection closes or a
/// write fails. The socket is closed on exit either way.
pub async fn run_outbound<K>(
    conn: Arc<Connection>,
    mut rx: mpsc::Receiver<String>,
    writer: Arc<SocketWriter<K>>,
) -> Result<(), TransportError>
where
    K: Sink<WsMessage> + Unpin,
    K::Error: fmt::Display,
{
    let result = loop {
        let frame = tokio::select! {
            biased;
            _ = conn.closed() => break Ok(()),
            frame = rx.recv() => frame,
        };

        let Some(frame) = frame else {
            break Ok(());
        };
        if let Err(e) = writer.send_text(frame).await {
            break Err(e);
        }
    };

    writer.close().await;
    // A failed write must also stop the inbound loop.
    conn.close();
    result
}

/// Serve one connection for its whole lifetime.
///
/// Joins the connection's room, spawns the outbound loop, runs the inbound
/// loop on the current task, then leaves the room.
pub async fn serve<S, E, K>(
    hub: Arc<Hub>,
    handler: Arc<dyn FrameHandler>,
    conn: Arc<Connection>,
    rx: mpsc::Receiver<String>,
    stream: S,
    sink: K,
) where
    S: Stream<Item = Result<WsMessage, E>> + Unpin,
    E: fmt::Display,
    K: Sink<WsMessage> + Unpin + Send + 'static,
    K::Error: fmt::Display,
{
    let room = hub.join_room(conn.clone());
    tracing::info!(
        conn = %conn.id(),
        user_id = %conn.user_id(),
        tip_id = %conn.tip_id(),
        members = room.len(),
        "connection joined room"
    );

    let writer = Arc::new(SocketWriter::new(sink));
    let outbound = tokio::spawn(run_outbound(conn.clone(), rx, writer));

    if let Err(e) = run_inbound(conn.clone(), stream, handler).await {
        tracing::error!(conn = %conn.id(), "{}", e);
    }

    room.leave(&conn);
    match outbound.await {
        Ok(Err(e)) => tracing::error!(conn = %conn.id(), "{}", e),
        Err(e) => tracing::error!(conn = %conn.id(), "outbound task failed: {}", e),
        Ok(Ok(())) => {}
    }
    tracing::info!(
        conn = %conn.id(),
        user_id = %conn.user_id(),
        tip_id = %conn.tip_id(),
        quiet_for_ms = conn.last_active().elapsed().as_millis() as u64,
        "connection left room"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::mpsc as chan;
    use std::time::Duration;

    struct Echo;

    #[async_trait]
    impl FrameHandler for Echo {
        async fn handle(&self, raw: &str, conn: &Connection) {
            conn.enqueue(format!("echo:{raw}"));
        }
    }

    fn connection(capacity: usize) -> (Arc<Connection>, mpsc::Receiver<String>) {
        Connection::new(
            UserId::new("u1".to_string()).unwrap(),
            TipId::new("t1".to_string()).unwrap(),
            capacity,
        )
    }

    #[test]
    fn test_connection_ids_are_unique() {
        // テスト項目: 接続ごとに異なる ID が振られる
        let (a, _rx_a) = connection(1);
        let (b, _rx_b) = connection(1);
        assert_ne!(a.id(), b.id());
    }

    #[tokio::test]
    async fn test_enqueue_drops_when_full() {
        // テスト項目: キューが満杯の場合、ブロックせずにフレームが破棄される
        // given (前提条件):
        let (conn, mut rx) = connection(1);

        // when (操作):
        let first = conn.enqueue("a".to_string());
        let second = conn.enqueue("b".to_string());

        // then (期待する結果):
        assert!(first);
        assert!(!second);
        assert_eq!(rx.recv().await.as_deref(), Some("a"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_until_closed_abandons_work() {
        // テスト項目: 接続が閉じられると実行中の処理は破棄される
        // given (前提条件):
        let (conn, _rx) = connection(1);
        conn.close();

        // when (操作):
        let out = conn.until_closed(std::future::pending::<()>()).await;

        // then (期待する結果):
        assert!(out.is_none());
        assert!(conn.is_closed());
    }

    #[tokio::test]
    async fn test_inbound_feeds_handler_and_ends_on_stream_end() {
        // テスト項目: 受信ループがフレームをハンドラに渡し、ストリーム終了で正常終了する
        // given (前提条件):
        let (conn, mut rx) = connection(8);
        let (in_tx, in_rx) = chan::unbounded::<Result<WsMessage, std::io::Error>>();
        in_tx
            .unbounded_send(Ok(WsMessage::Text("hello".into())))
            .unwrap();
        drop(in_tx);

        // when (操作):
        let result = run_inbound(conn.clone(), in_rx, Arc::new(Echo)).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await.as_deref(), Some("echo:hello"));
    }

    #[tokio::test]
    async fn test_inbound_read_error_is_transport_error() {
        // テスト項目: 読み取りエラーで受信ループが TransportError を返して終了する
        // given (前提条件):
        let (conn, _rx) = connection(8);
        let (in_tx, in_rx) = chan::unbounded::<Result<WsMessage, std::io::Error>>();
        in_tx
            .unbounded_send(Err(std::io::Error::other("reset")))
            .unwrap();

        // when (操作):
        let result = run_inbound(conn, in_rx, Arc::new(Echo)).await;

        // then (期待する結果):
        assert!(matches!(result, Err(TransportError::Read(_))));
    }

    #[tokio::test]
    async fn test_inbound_stops_when_closed() {
        // テスト項目: 接続のクローズで受信ループが終了する
        // given (前提条件):
        let (conn, _rx) = connection(8);
        let (_in_tx, in_rx) = chan::unbounded::<Result<WsMessage, std::io::Error>>();
        let task = tokio::spawn(run_inbound(conn.clone(), in_rx, Arc::new(Echo)));

        // when (操作):
        conn.close();

        // then (期待する結果):
        let result = tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("inbound loop did not stop")
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_outbound_writes_queued_frames_and_closes_socket() {
        // テスト項目: 送信ループがキューのフレームを書き込み、クローズ時にソケットを閉じる
        // given (前提条件):
        let (conn, rx) = connection(8);
        let (out_tx, mut out_rx) = chan::unbounded::<WsMessage>();
        let writer = Arc::new(SocketWriter::new(out_tx));
        let task = tokio::spawn(run_outbound(conn.clone(), rx, writer));

        // when (操作):
        conn.enqueue("one".to_string());
        let first = out_rx.next().await;
        conn.close();
        let result = task.await.unwrap();

        // then (期待する結果):
        assert!(matches!(first, Some(WsMessage::Text(t)) if t.as_str() == "one"));
        assert!(result.is_ok());
        assert!(matches!(out_rx.next().await, Some(WsMessage::Close(None))));
        assert!(out_rx.next().await.is_none());
    }

    #[tokio::test]
    async fn test_outbound_write_error_closes_connection() {
        // テスト項目: 書き込みエラーで送信ループが終了し、接続もクローズされる
        // given (前提条件):
        let (conn, rx) = connection(8);
        let (out_tx, out_rx) = chan::unbounded::<WsMessage>();
        drop(out_rx);
        let writer = Arc::new(SocketWriter::new(out_tx));
        conn.enqueue("lost".to_string());

        // when (操作):
        let result = run_outbound(conn.clone(), rx, writer).await;

        // then (期待する結果):
        assert!(matches!(result, Err(TransportError::Write(_))));
        assert!(conn.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inbound_frame_refreshes_last_active() {
        // テスト項目: フレームを受信すると接続の最終アクティブ時刻が更新される
        // given (前提条件):
        let (conn, _rx) = connection(8);
        let before = conn.last_active();
        tokio::time::advance(Duration::from_secs(30)).await;
        let (in_tx, in_rx) = chan::unbounded::<Result<WsMessage, std::io::Error>>();
        in_tx
            .unbounded_send(Ok(WsMessage::Text("hello".into())))
            .unwrap();
        drop(in_tx);

        // when (操作):
        run_inbound(conn.clone(), in_rx, Arc::new(Echo)).await.unwrap();

        // then (期待する結果):
        assert_eq!(conn.last_active() - before, Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_serve_leaves_room_and_closes_socket_when_inbound_ends() {
        // テスト項目: 受信側が終了すると、ルームから外れ、接続がクローズされ、ソケットに Close が送られる
        // given (前提条件):
        let hub = Arc::new(Hub::new(crate::ui::realtime::RealtimeConfig::default()));
        let (conn, rx) = connection(8);
        let (in_tx, in_rx) = chan::unbounded::<Result<WsMessage, std::io::Error>>();
        let (out_tx, mut out_rx) = chan::unbounded::<WsMessage>();
        let task = tokio::spawn(serve(
            hub.clone(),
            Arc::new(Echo),
            conn.clone(),
            rx,
            in_rx,
            out_tx,
        ));

        in_tx
            .unbounded_send(Ok(WsMessage::Text("hi".into())))
            .unwrap();
        let echoed = out_rx.next().await;
        let room = hub.room(conn.tip_id()).expect("room should exist");
        assert!(matches!(echoed, Some(WsMessage::Text(t)) if t.as_str() == "echo:hi"));
        assert!(room.contains(conn.id()));

        // when (操作):
        drop(in_tx);
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("serve did not finish")
            .unwrap();

        // then (期待する結果):
        assert!(!room.contains(conn.id()));
        assert!(conn.is_closed());
        assert!(matches!(out_rx.next().await, Some(WsMessage::Close(None))));
        assert!(out_rx.next().await.is_none());
    }
}
