use serde_json::Value;

use super::test_app::TestApp;

pub struct SeededUser {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// The first account (admin) plus one regular employee account.
pub struct SeededCompany {
    pub admin: SeededUser,
    pub member: SeededUser,
}

pub const PASSWORD: &str = "Password123!";

fn seeded_user(json: &Value) -> SeededUser {
    SeededUser {
        id: json["user"]["id"].as_str().unwrap().to_string(),
        email: json["user"]["email"].as_str().unwrap().to_string(),
        display_name: json["user"]["display_name"].as_str().unwrap().to_string(),
        role: json["user"]["role"].as_str().unwrap().to_string(),
        access_token: json["access_token"].as_str().unwrap().to_string(),
        refresh_token: json["refresh_token"].as_str().unwrap().to_string(),
    }
}

impl TestApp {
    /// Register a user and return their auth info.
    pub async fn register_user(&self, email: &str, display_name: &str) -> SeededUser {
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({
                "email": email,
                "display_name": display_name,
                "password": PASSWORD,
            }))
            .send()
            .await
            .expect("Register request failed");

        assert_eq!(resp.status().as_u16(), 201, "Register failed for {}", email);
        let json: Value = resp.json().await.expect("Failed to parse register response");
        seeded_user(&json)
    }

    /// Login a user and return their auth info.
    pub async fn login_user(&self, email: &str, password: &str) -> SeededUser {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Login request failed");

        assert!(
            resp.status().is_success(),
            "Login failed: {}",
            resp.text().await.unwrap_or_default()
        );
        let json: Value = resp.json().await.expect("Failed to parse login response");
        seeded_user(&json)
    }

    pub async fn seed_company(&self) -> SeededCompany {
        let admin = self.register_user("hr@acme.test", "Harriet Admin").await;
        let member = self.register_user("sam@acme.test", "Sam Member").await;
        SeededCompany { admin, member }
    }

    /// Create an employee through the API and return its id.
    pub async fn create_employee(&self, token: &str, first: &str, last: &str) -> String {
        let resp = self
            .auth_post("/api/employee", token)
            .json(&employee_body(first, last))
            .send()
            .await
            .expect("Create employee failed");

        assert_eq!(
            resp.status().as_u16(),
            201,
            "Create employee failed: {}",
            resp.text().await.unwrap_or_default()
        );
        let json: Value = resp.json().await.unwrap();
        json["id"].as_str().unwrap().to_string()
    }

    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }
}

pub fn employee_body(first: &str, last: &str) -> Value {
    serde_json::json!({
        "first_name": first,
        "last_name": last,
        "email": format!("{}.{}@acme.test", first.to_lowercase(), last.to_lowercase()),
        "phone": "+1 555 0100",
        "position": "Engineer",
        "department": "Engineering",
        "hire_date": "2022-03-01",
        "salary": 85000.0,
        "status": "active",
    })
}
