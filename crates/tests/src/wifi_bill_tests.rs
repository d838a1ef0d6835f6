use crate::fixtures::test_app::TestApp;
use chrono::{Duration, Utc};
use serde_json::Value;

fn bill_body(due_offset: i64) -> Value {
    let due = Utc::now().date_naive() + Duration::days(due_offset);
    serde_json::json!({
        "provider": "FiberNet",
        "account_number": "ACC-1001",
        "amount": 89.5,
        "billing_month": due.format("%Y-%m").to_string(),
        "due_date": due.to_string(),
    })
}

#[tokio::test]
async fn past_due_bill_reads_overdue_until_paid() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let token = &company.admin.access_token;

    let resp = app
        .auth_post("/api/wifi-bill", token)
        .json(&bill_body(-3))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let bill: Value = resp.json().await.unwrap();
    assert_eq!(bill["status"], "overdue");

    let list: Value = app
        .auth_get("/api/wifi-bill", &company.member.access_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["items"][0]["status"], "overdue");
    assert_eq!(list["outstanding_amount"], 89.5);

    let resp = app
        .auth_post(
            &format!("/api/wifi-bill/{}/pay", bill["id"].as_str().unwrap()),
            &company.member.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    let paid: Value = app
        .auth_post(&format!("/api/wifi-bill/{}/pay", bill["id"].as_str().unwrap()), token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(paid["status"], "paid");
    assert_eq!(paid["payment_date"], Utc::now().date_naive().to_string());

    let list: Value = app
        .auth_get("/api/wifi-bill", token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list["outstanding_amount"], 0.0);
}

#[tokio::test]
async fn bill_fields_are_validated() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let token = &company.admin.access_token;

    let mut body = bill_body(10);
    body["billing_month"] = "May 2024".into();
    body["amount"] = 0.into();
    let resp = app
        .auth_post("/api/wifi-bill", token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["fields"]["billing_month"].is_array());
    assert!(json["fields"]["amount"].is_array());

    let mut body = bill_body(10);
    body["status"] = "paid".into();
    let resp = app
        .auth_post("/api/wifi-bill", token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 422);
    let json: Value = resp.json().await.unwrap();
    assert!(json["fields"]["payment_date"].is_array());
}

#[tokio::test]
async fn bill_update_and_delete() {
    let Some(app) = TestApp::spawn().await else { return };
    let company = app.seed_company().await;
    let token = &company.admin.access_token;

    let bill: Value = app
        .auth_post("/api/wifi-bill", token)
        .json(&bill_body(5))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let path = format!("/api/wifi-bill/{}", bill["id"].as_str().unwrap());

    let mut body = bill_body(5);
    body["amount"] = 120.0.into();
    body["provider"] = "AirLink".into();
    let updated: Value = app
        .auth_put(&path, token)
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["provider"], "AirLink");
    assert_eq!(updated["amount"], 120.0);
    assert_eq!(updated["status"], "pending");

    let resp = app.auth_delete(&path, token).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 204);

    let list: Value = app
        .auth_get("/api/wifi-bill", token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(list["items"].as_array().unwrap().is_empty());
}
