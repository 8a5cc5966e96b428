//! WebSocket relay integration tests.

mod fixtures;

use std::time::Duration;

use fixtures::{TestServer, expect_frame, expect_silence, send_json};
use futures_util::SinkExt;
use tokio_tungstenite::{connect_async, tungstenite};

const QUIET: Duration = Duration::from_millis(300);

#[tokio::test]
async fn test_upgrade_without_identity_is_unauthorized() {
    // テスト項目: X-User-Id ヘッダーなしの接続は 401 で拒否される
    // given (前提条件):
    let server = TestServer::start().await;

    // when (操作):
    let result = connect_async(server.ws_url("t1")).await;

    // then (期待する結果):
    match result {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 401),
        other => panic!("Expected HTTP 401, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_send_is_broadcast_to_room_only() {
    // テスト項目: send は同じルームの全員（送信者含む）に同一フレームで届き、他ルームには届かない
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = server.join("u1", "t1").await;
    let mut b = server.join("u2", "t1").await;
    let mut c = server.join("u3", "t2").await;

    // when (操作):
    send_json(
        &mut a,
        serde_json::json!({"type": "send", "tip_id": "t1", "content": "hi"}),
    )
    .await;

    // then (期待する結果):
    let to_a = expect_frame(&mut a, |f| f["content"] == "hi").await;
    let to_b = expect_frame(&mut b, |f| f["content"] == "hi").await;
    assert_eq!(to_a, to_b);
    assert_eq!(to_a["type"], "send");
    assert_eq!(to_a["tip_id"], "t1");
    assert!(to_a["message_id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(to_a["timestamp"].is_i64());
    expect_silence(&mut c, QUIET).await;
}

#[tokio::test]
async fn test_edit_by_non_author_is_not_broadcast() {
    // テスト項目: 投稿者以外の edit は誰にも配信されず、接続も維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = server.join("u1", "t1").await;
    let mut b = server.join("u2", "t1").await;
    send_json(&mut a, serde_json::json!({"type": "send", "content": "hi"})).await;
    let sent = expect_frame(&mut a, |f| f["content"] == "hi").await;
    expect_frame(&mut b, |f| f["content"] == "hi").await;

    // when (操作):
    send_json(
        &mut b,
        serde_json::json!({"type": "edit", "message_id": sent["message_id"], "content": "x"}),
    )
    .await;

    // then (期待する結果):
    expect_silence(&mut a, QUIET).await;
    expect_silence(&mut b, QUIET).await;

    send_json(&mut b, serde_json::json!({"type": "send", "content": "still here"})).await;
    expect_frame(&mut a, |f| f["content"] == "still here").await;
}

#[tokio::test]
async fn test_author_edit_then_delete() {
    // テスト項目: 投稿者の edit / delete は全員に配信され、削除後の edit は無視される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = server.join("u1", "t1").await;
    let mut b = server.join("u2", "t1").await;
    send_json(&mut a, serde_json::json!({"type": "send", "content": "hi"})).await;
    let sent = expect_frame(&mut a, |f| f["content"] == "hi").await;
    expect_frame(&mut b, |f| f["content"] == "hi").await;
    let id = sent["message_id"].clone();

    // when (操作): 編集
    send_json(
        &mut a,
        serde_json::json!({"type": "edit", "message_id": id, "content": "hello"}),
    )
    .await;

    // then (期待する結果):
    for ws in [&mut a, &mut b] {
        let edited = expect_frame(ws, |f| f["type"] == "edit").await;
        assert_eq!(edited["message_id"], id);
        assert_eq!(edited["new_content"], "hello");
        assert!(edited["edited_at"].is_i64());
    }

    // when (操作): 削除
    send_json(&mut a, serde_json::json!({"type": "delete", "message_id": id})).await;

    // then (期待する結果):
    for ws in [&mut a, &mut b] {
        let deleted = expect_frame(ws, |f| f["type"] == "delete").await;
        assert_eq!(deleted["message_id"], id);
        assert!(deleted["deleted_at"].is_i64());
    }

    // when (操作): 削除後の編集
    send_json(
        &mut a,
        serde_json::json!({"type": "edit", "message_id": id, "content": "y"}),
    )
    .await;

    // then (期待する結果):
    expect_silence(&mut a, QUIET).await;
    expect_silence(&mut b, QUIET).await;
}

#[tokio::test]
async fn test_disconnect_does_not_affect_remaining_members() {
    // テスト項目: メンバーが切断しても、残ったメンバーは送受信を続けられる
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = server.join("u1", "t1").await;
    let mut b = server.join("u2", "t1").await;

    // when (操作):
    b.close(None).await.expect("Failed to close");
    drop(b);
    send_json(&mut a, serde_json::json!({"type": "send", "content": "anyone?"})).await;

    // then (期待する結果):
    let frame = expect_frame(&mut a, |f| f["content"] == "anyone?").await;
    assert_eq!(frame["type"], "send");
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    // テスト項目: 不正なフレームは無視され、接続は維持される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut a = server.join("u1", "t1").await;

    // when (操作):
    a.send(tungstenite::Message::text("not json"))
        .await
        .expect("Failed to send");
    send_json(&mut a, serde_json::json!({"type": "send", "tip_id": "t2", "content": "x"})).await;
    expect_silence(&mut a, QUIET).await;
    send_json(&mut a, serde_json::json!({"type": "send", "content": "ok"})).await;

    // then (期待する結果):
    expect_frame(&mut a, |f| f["content"] == "ok").await;
}
