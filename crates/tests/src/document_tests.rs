use crate::fixtures::test_app::TestApp;
use serde_json::Value;

const POLICY: &[u8] = b"Remote work policy v3";

async fn upload_policy(app: &TestApp, token: &str) -> Value {
    let part = reqwest::multipart::Part::bytes(POLICY.to_vec())
        .file_name("remote work.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let form = reqwest::multipart::Form::new()
        .text("category", "policy")
        .part("file", part);

    let resp = app
        .auth_post("/api/document/upload", token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    resp.json().await.unwrap()
}

#[tokio::test]
async fn upload_then_save_metadata_and_download() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let token = &company.member.access_token;

    let upload = upload_policy(&app, token).await;
    let key = upload["key"].as_str().unwrap();
    assert!(key.starts_with("documents/policy/"));
    assert!(key.ends_with("-remote_work.pdf"));
    assert_eq!(upload["size"], POLICY.len());

    let resp = app
        .auth_post("/api/document", token)
        .json(&serde_json::json!({
            "file_name": upload["file_name"],
            "file_type": upload["content_type"],
            "file_size": upload["size"],
            "category": "policy",
            "description": "Applies from June",
            "storage_key": key,
            "checksum": upload["checksum"],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let document: Value = resp.json().await.unwrap();
    assert_eq!(document["uploader_name"], "Sam Member");
    assert_eq!(document["download_url"], format!("/api/storage/{}", key));

    let listed: Value = app
        .auth_get("/api/document?category=policy", &company.admin.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listed["items"].as_array().unwrap().len(), 1);

    let other: Value = app
        .auth_get("/api/document?category=payslip", token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(other["items"].as_array().unwrap().is_empty());

    let resp = app
        .auth_get(document["download_url"].as_str().unwrap(), token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(resp.headers()["content-type"], "application/pdf");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), POLICY);
}

#[tokio::test]
async fn metadata_needs_an_uploaded_object() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;

    let resp = app
        .auth_post("/api/document", &company.member.access_token)
        .json(&serde_json::json!({
            "file_name": "ghost.pdf",
            "file_type": "application/pdf",
            "file_size": 10,
            "storage_key": "documents/other/missing-ghost.pdf",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["fields"]["storage_key"].is_array());
}

#[tokio::test]
async fn metadata_size_must_match_upload() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let token = &company.member.access_token;
    let upload = upload_policy(&app, token).await;

    for claimed in [u64::MAX, POLICY.len() as u64 + 1] {
        let resp = app
            .auth_post("/api/document", token)
            .json(&serde_json::json!({
                "file_name": upload["file_name"],
                "file_type": upload["content_type"],
                "file_size": claimed,
                "storage_key": upload["key"],
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status().as_u16(), 422);
        let json: Value = resp.json().await.unwrap();
        assert!(json["fields"]["file_size"].is_array());
    }

    let listed: Value = app
        .auth_get("/api/document", token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listed["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn only_uploader_or_admin_may_delete() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let outsider = app.register_user("kim@acme.test", "Kim").await;

    let upload = upload_policy(&app, &company.member.access_token).await;
    let document: Value = app
        .auth_post("/api/document", &company.member.access_token)
        .json(&serde_json::json!({
            "file_name": upload["file_name"],
            "file_type": upload["content_type"],
            "file_size": upload["size"],
            "storage_key": upload["key"],
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let path = format!("/api/document/{}", document["id"].as_str().unwrap());

    let resp = app
        .auth_delete(&path, &outsider.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_delete(&path, &company.admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let resp = app
        .auth_get(document["download_url"].as_str().unwrap(), &outsider.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
