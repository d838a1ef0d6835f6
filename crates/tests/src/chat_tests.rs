use crate::fixtures::test_app::TestApp;
use bson::oid::ObjectId;
use peopledesk_services::chat::ConversationId;
use serde_json::Value;

fn direct(a: &str, b: &str) -> String {
    ConversationId::direct(
        ObjectId::parse_str(a).unwrap(),
        ObjectId::parse_str(b).unwrap(),
    )
    .unwrap()
    .to_string()
}

#[tokio::test]
async fn direct_message_read_receipts() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let (alice, bob) = (&company.admin, &company.member);
    let conversation = direct(&alice.id, &bob.id);

    let resp = app
        .auth_post(&format!("/api/chat/{}/message", conversation), &alice.access_token)
        .json(&serde_json::json!({ "text": "Payroll closes Friday" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let sent: Value = resp.json().await.unwrap();
    assert_eq!(sent["conversation_id"], conversation.as_str());
    assert!(sent["read_at"].is_null());

    let history: Value = app
        .auth_get(&format!("/api/chat/{}/message", conversation), &bob.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let items = history["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["text"], "Payroll closes Friday");
    assert_eq!(items[0]["sender_name"], alice.display_name.as_str());

    let unread: Value = app
        .auth_get("/api/chat/unread", &bob.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unread["total"], 1);
    assert_eq!(unread["items"][0]["conversation_id"], conversation.as_str());

    // the sender's own message never counts as unread
    let sender_unread: Value = app
        .auth_get("/api/chat/unread", &alice.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(sender_unread["total"], 0);

    let marked: Value = app
        .auth_post(&format!("/api/chat/{}/read", conversation), &bob.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(marked["updated"], 1);

    let history: Value = app
        .auth_get(&format!("/api/chat/{}/message", conversation), &alice.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(history["items"][0]["read_at"].is_string());
    assert_eq!(history["items"][0]["read_by"][0], bob.id.as_str());

    let unread: Value = app
        .auth_get("/api/chat/unread", &bob.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unread["total"], 0);
}

#[tokio::test]
async fn outsiders_cannot_read_direct_conversations() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let stranger = app.register_user("eve@acme.test", "Eve").await;
    let conversation = direct(&company.admin.id, &company.member.id);

    let resp = app
        .auth_get(&format!("/api/chat/{}/message", conversation), &stranger.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_post(&format!("/api/chat/{}/message", conversation), &stranger.access_token)
        .json(&serde_json::json!({ "text": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;

    let resp = app
        .auth_post("/api/chat/general/message", &company.member.access_token)
        .json(&serde_json::json!({ "text": "   " }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["fields"]["text"].is_array());
}

#[tokio::test]
async fn general_chat_is_shared_and_deletable_by_sender() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;

    let sent: Value = app
        .auth_post("/api/chat/general/message", &company.member.access_token)
        .json(&serde_json::json!({ "text": "Lunch at noon?" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let path = format!("/api/chat/general/message/{}", sent["id"].as_str().unwrap());

    let unread: Value = app
        .auth_get("/api/chat/unread", &company.admin.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(unread["items"][0]["conversation_id"], "general");

    let resp = app
        .auth_delete(&path, &company.admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_delete(&path, &company.member.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);
}
