use crate::fixtures::test_app::TestApp;
use chrono::{Duration, Utc};
use serde_json::Value;

fn leave_body(employee_id: &str, start_offset: i64, end_offset: i64) -> Value {
    let today = Utc::now().date_naive();
    serde_json::json!({
        "employee_id": employee_id,
        "leave_type": "annual",
        "start_date": (today + Duration::days(start_offset)).to_string(),
        "end_date": (today + Duration::days(end_offset)).to_string(),
        "reason": "Family trip abroad",
    })
}

#[tokio::test]
async fn end_before_start_is_rejected_on_end_date() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let employee = app
        .create_employee(&company.admin.access_token, "Nia", "Okafor")
        .await;

    let resp = app
        .auth_post("/api/leave-request", &company.member.access_token)
        .json(&leave_body(&employee, 10, 5))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["fields"]["end_date"].is_array());

    let list: Value = app
        .auth_get("/api/leave-request", &company.admin.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unknown_employee_is_a_field_error() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;

    let resp = app
        .auth_post("/api/leave-request", &company.member.access_token)
        .json(&leave_body(&bson::oid::ObjectId::new().to_hex(), 1, 2))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["fields"]["employee_id"].is_array());
}

#[tokio::test]
async fn request_is_pending_then_decided_by_admin() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let employee = app
        .create_employee(&company.admin.access_token, "Kofi", "Mensah")
        .await;

    let resp = app
        .auth_post("/api/leave-request", &company.member.access_token)
        .json(&leave_body(&employee, 3, 7))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["status"], "pending");
    assert_eq!(created["employee_name"], "Kofi Mensah");
    assert_eq!(created["duration_days"], 5);
    let id = created["id"].as_str().unwrap();

    // employees cannot decide
    let resp = app
        .auth_put(
            &format!("/api/leave-request/{}/status", id),
            &company.member.access_token,
        )
        .json(&serde_json::json!({ "status": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // rejection needs a reason
    let resp = app
        .auth_put(
            &format!("/api/leave-request/{}/status", id),
            &company.admin.access_token,
        )
        .json(&serde_json::json!({ "status": "rejected" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["fields"]["rejection_reason"].is_array());

    let resp = app
        .auth_put(
            &format!("/api/leave-request/{}/status", id),
            &company.admin.access_token,
        )
        .json(&serde_json::json!({ "status": "approved" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let decided: Value = resp.json().await.unwrap();
    assert_eq!(decided["status"], "approved");
    assert_eq!(decided["processed_by"], company.admin.id.as_str());
    assert!(decided["processed_at"].is_string());

    let approved: Value = app
        .auth_get("/api/leave-request?status=approved", &company.member.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(approved["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn submitter_may_withdraw_only_while_pending() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let employee = app
        .create_employee(&company.admin.access_token, "Lena", "Berg")
        .await;

    let mut ids = Vec::new();
    for _ in 0..2 {
        let created: Value = app
            .auth_post("/api/leave-request", &company.member.access_token)
            .json(&leave_body(&employee, 1, 2))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(created["id"].as_str().unwrap().to_string());
    }

    let resp = app
        .auth_delete(
            &format!("/api/leave-request/{}", ids[0]),
            &company.member.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    app.auth_put(
        &format!("/api/leave-request/{}/status", ids[1]),
        &company.admin.access_token,
    )
    .json(&serde_json::json!({ "status": "approved" }))
    .send()
    .await
    .unwrap();

    let resp = app
        .auth_delete(
            &format!("/api/leave-request/{}", ids[1]),
            &company.member.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // a decided request keeps its dates
    let resp = app
        .auth_put(
            &format!("/api/leave-request/{}", ids[1]),
            &company.member.access_token,
        )
        .json(&leave_body(&employee, 2, 4))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "conflict");
    assert_eq!(json["message"], "Only pending leave requests can be edited");

    let approved: Value = app
        .auth_get("/api/leave-request?status=approved", &company.admin.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(approved["items"][0]["duration_days"], 2);

    let resp = app
        .auth_delete(
            &format!("/api/leave-request/{}", ids[1]),
            &company.admin.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 204);
}
