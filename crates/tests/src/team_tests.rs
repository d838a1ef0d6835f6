use crate::fixtures::test_app::TestApp;
use serde_json::Value;

#[tokio::test]
async fn team_copies_member_names() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let token = &company.admin.access_token;

    let a = app.create_employee(token, "Rosa", "Parks").await;
    let b = app.create_employee(token, "Yuri", "Gagarin").await;

    let resp = app
        .auth_post("/api/team", token)
        .json(&serde_json::json!({
            "name": "Platform",
            "description": "Core services",
            "member_ids": [b, a],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let team: Value = resp.json().await.unwrap();
    assert_eq!(team["member_count"], 2);
    assert_eq!(team["members"][0]["name"], "Yuri Gagarin");
    assert_eq!(team["members"][1]["name"], "Rosa Parks");

    let id = team["id"].as_str().unwrap();
    let updated: Value = app
        .auth_put(&format!("/api/team/{}", id), token)
        .json(&serde_json::json!({ "name": "Platform", "member_ids": [a] }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["member_count"], 1);
    assert_eq!(updated["members"][0]["id"], a.as_str());

    let resp = app
        .auth_delete(&format!("/api/team/{}", id), &company.member.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let resp = app
        .auth_delete(&format!("/api/team/{}", id), token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let list: Value = app
        .auth_get("/api/team", token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(list["items"].as_array().unwrap().is_empty());

    let resp = app
        .auth_get(&format!("/api/team/{}", id), token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    // members survive their team
    let resp = app
        .auth_get(&format!("/api/employee/{}", a), token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn team_members_must_exist() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;

    let resp = app
        .auth_post("/api/team", &company.admin.access_token)
        .json(&serde_json::json!({
            "name": "Ghosts",
            "member_ids": [bson::oid::ObjectId::new().to_hex(), "not-an-id"],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["fields"]["member_ids"].is_array());

    let list: Value = app
        .auth_get("/api/team", &company.member.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(list["items"].as_array().unwrap().is_empty());
}
