use crate::fixtures::{seed::PASSWORD, test_app::TestApp};
use serde_json::Value;

#[tokio::test]
async fn first_account_is_admin_and_later_ones_are_employees() {
    let Some(app) = TestApp::spawn().await else { return };

    let first = app.register_user("first@acme.test", "First User").await;
    let second = app.register_user("second@acme.test", "Second User").await;

    assert_eq!(first.role, "admin");
    assert_eq!(second.role, "employee");
    assert_eq!(second.display_name, "Second User");
}

#[tokio::test]
async fn register_rejects_invalid_fields() {
    let Some(app) = TestApp::spawn().await else { return };

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "not-an-email",
            "display_name": "Al",
            "password": "short",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "validation");
    assert!(json["fields"]["email"].is_array());
    assert!(json["fields"]["password"].is_array());
    assert!(json["fields"].get("display_name").is_none());
}

#[tokio::test]
async fn register_duplicate_email_conflicts() {
    let Some(app) = TestApp::spawn().await else { return };

    app.register_user("dup@acme.test", "Dup One").await;

    let resp = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({
            "email": "DUP@acme.test",
            "display_name": "Dup Two",
            "password": PASSWORD,
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let Some(app) = TestApp::spawn().await else { return };

    app.register_user("carol@acme.test", "Carol").await;

    let resp = app
        .client
        .post(app.url("/api/auth/login"))
        .json(&serde_json::json!({ "email": "carol@acme.test", "password": "WrongPass1!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);

    let user = app.login_user("carol@acme.test", PASSWORD).await;
    assert_eq!(user.email, "carol@acme.test");
}

#[tokio::test]
async fn me_requires_a_token() {
    let Some(app) = TestApp::spawn().await else { return };

    let resp = reqwest::Client::new()
        .get(app.url("/api/auth/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn profile_settings_can_be_updated() {
    let Some(app) = TestApp::spawn().await else { return };

    let user = app.register_user("dave@acme.test", "Dave").await;

    let resp = app
        .auth_put("/api/auth/me", &user.access_token)
        .json(&serde_json::json!({
            "display_name": "David",
            "desktop_notifications": false,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let me: Value = app
        .auth_get("/api/auth/me", &user.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["display_name"], "David");
    assert_eq!(me["desktop_notifications"], false);
}

#[tokio::test]
async fn refresh_issues_new_tokens() {
    let Some(app) = TestApp::spawn().await else { return };

    let user = app.register_user("erin@acme.test", "Erin").await;

    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": user.refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["user"]["id"], user.id);

    // an access token is not a refresh token
    let resp = app
        .client
        .post(app.url("/api/auth/refresh"))
        .json(&serde_json::json!({ "refresh_token": user.access_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn avatar_upload_sets_profile_picture() {
    let Some(app) = TestApp::spawn().await else { return };

    let user = app.register_user("fay@acme.test", "Fay").await;

    let part = reqwest::multipart::Part::bytes(vec![0x89, b'P', b'N', b'G'])
        .file_name("me.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    let resp = app
        .auth_post("/api/auth/me/avatar", &user.access_token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let me: Value = resp.json().await.unwrap();
    let url = me["avatar_url"].as_str().unwrap();
    assert!(url.starts_with(&format!("/api/storage/avatars/{}/", user.id)));
    assert!(url.ends_with("-me.png"));

    let bytes = app
        .auth_get(url, &user.access_token)
        .send()
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    assert_eq!(&bytes[..], &[0x89, b'P', b'N', b'G']);
}
