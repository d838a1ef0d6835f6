use std::time::Duration;

use crate::fixtures::test_app::TestApp;
use bson::oid::ObjectId;
use futures::{SinkExt, StreamExt};
use peopledesk_services::chat::ConversationId;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(app: &TestApp, token: &str) -> Socket {
    let (socket, _) = connect_async(app.ws_url(token)).await.unwrap();
    socket
}

/// Reads frames until one of the wanted type arrives.
async fn next_of_type(socket: &mut Socket, wanted: &str) -> Value {
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(frame) = socket.next().await {
            if let Message::Text(text) = frame.unwrap() {
                let event: Value = serde_json::from_str(text.as_str()).unwrap();
                if event["type"] == wanted {
                    return event;
                }
            }
        }
        panic!("socket closed before a {} event", wanted);
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for {}", wanted))
}

async fn send(socket: &mut Socket, event: Value) {
    socket
        .send(Message::Text(event.to_string().into()))
        .await
        .unwrap();
}

async fn subscribe(socket: &mut Socket, topic: &str) {
    send(socket, serde_json::json!({ "type": "subscribe", "data": { "topic": topic } })).await;
    let ack = next_of_type(socket, "subscribed").await;
    assert_eq!(ack["data"]["topic"], topic);
}

#[tokio::test]
async fn rejects_bad_token() {
    let Some(app) = TestApp::spawn().await else { return };
    assert!(connect_async(app.ws_url("not-a-token")).await.is_err());
}

#[tokio::test]
async fn collection_changes_reach_subscribers() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;

    let mut socket = connect(&app, &company.member.access_token).await;
    let hello = next_of_type(&mut socket, "connected").await;
    assert_eq!(hello["data"]["user_id"], company.member.id.as_str());

    subscribe(&mut socket, "employees").await;
    let id = app
        .create_employee(&company.admin.access_token, "Ines", "Duarte")
        .await;

    let event = next_of_type(&mut socket, "collection:changed").await;
    assert_eq!(event["data"]["collection"], "employees");
    assert_eq!(event["data"]["op"], "created");
    assert_eq!(event["data"]["id"], id.as_str());
    assert_eq!(event["data"]["document"]["full_name"], "Ines Duarte");
}

#[tokio::test]
async fn unknown_topics_are_refused() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let stranger = app.register_user("eve@acme.test", "Eve").await;
    let conversation = ConversationId::direct(
        ObjectId::parse_str(&company.admin.id).unwrap(),
        ObjectId::parse_str(&company.member.id).unwrap(),
    )
    .unwrap();

    let mut socket = connect(&app, &stranger.access_token).await;
    next_of_type(&mut socket, "connected").await;

    send(
        &mut socket,
        serde_json::json!({ "type": "subscribe", "data": { "topic": conversation.topic() } }),
    )
    .await;
    let error = next_of_type(&mut socket, "error").await;
    assert_eq!(error["data"]["message"], "Unknown or forbidden topic");

    send(&mut socket, serde_json::json!({ "type": "ping" })).await;
    next_of_type(&mut socket, "pong").await;
}

#[tokio::test]
async fn chat_message_notification_and_read_receipt() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let (alice, bob) = (&company.admin, &company.member);
    let conversation = ConversationId::direct(
        ObjectId::parse_str(&alice.id).unwrap(),
        ObjectId::parse_str(&bob.id).unwrap(),
    )
    .unwrap();

    let mut alice_socket = connect(&app, &alice.access_token).await;
    next_of_type(&mut alice_socket, "connected").await;
    subscribe(&mut alice_socket, &conversation.topic()).await;

    let mut bob_socket = connect(&app, &bob.access_token).await;
    next_of_type(&mut bob_socket, "connected").await;
    subscribe(&mut bob_socket, &conversation.topic()).await;

    let sent: Value = app
        .auth_post(&format!("/api/chat/{}/message", conversation), &alice.access_token)
        .json(&serde_json::json!({ "text": "Can you review the contract?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let message = next_of_type(&mut bob_socket, "chat:message").await;
    assert_eq!(message["data"]["id"], sent["id"]);

    let notification = next_of_type(&mut bob_socket, "notification").await;
    assert_eq!(notification["data"]["message_id"], sent["id"]);
    assert_eq!(notification["data"]["title"], alice.display_name.as_str());

    send(
        &mut bob_socket,
        serde_json::json!({
            "type": "chat:read",
            "data": { "conversation_id": conversation.to_string() },
        }),
    )
    .await;

    let receipt = next_of_type(&mut alice_socket, "chat:read").await;
    assert_eq!(receipt["data"]["reader_id"], bob.id.as_str());
    assert_eq!(receipt["data"]["count"], 1);
}
