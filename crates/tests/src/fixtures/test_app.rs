use mongodb::Database;
use peopledesk_api::{build_router, state::AppState};
use peopledesk_config::Settings;
use peopledesk_db::{connection::open_client, indexes::ensure_indexes};
use std::net::SocketAddr;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A running test application with its own MongoDB database and storage
/// directory.
pub struct TestApp {
    pub addr: SocketAddr,
    pub base_url: String,
    pub db: Database,
    pub settings: Settings,
    pub client: reqwest::Client,
    _storage: TempDir,
}

impl TestApp {
    /// Spawn a new test server connected to the test MongoDB.
    ///
    /// Uses `PEOPLEDESK__DATABASE__URL` when set, otherwise
    /// mongodb://localhost:27017. Each test gets a unique database name.
    /// Returns `None` when no MongoDB answers, so callers can skip.
    pub async fn spawn() -> Option<Self> {
        Self::spawn_with_settings(|_| {}).await
    }

    /// Spawn a test server with customized settings.
    pub async fn spawn_with_settings(mutator: impl FnOnce(&mut Settings)) -> Option<Self> {
        let db_name = format!("peopledesk_test_{}", uuid::Uuid::new_v4().simple());
        let storage = tempfile::tempdir().expect("Failed to create storage dir");

        let mut settings = Settings::load().unwrap_or_else(|_| test_settings());
        settings.database.name = db_name.clone();
        settings.storage.root = storage.path().to_string_lossy().into_owned();
        settings.ai.api_key = None;
        settings.database.server_selection_timeout_secs = Some(2);
        mutator(&mut settings);

        let mongo_client = match open_client(&settings.database).await {
            Ok(client) => client,
            Err(e) => {
                eprintln!("skipping: no MongoDB reachable at {}: {}", settings.database.url, e);
                return None;
            }
        };

        let db = mongo_client.database(&db_name);
        ensure_indexes(&db).await.expect("Failed to create indexes");

        let app = build_router(AppState::new(db.clone(), settings.clone()));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to build HTTP client");

        Some(Self {
            addr,
            base_url: format!("http://{}", addr),
            db,
            settings,
            client,
            _storage: storage,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn ws_url(&self, token: &str) -> String {
        format!("ws://{}/ws?token={}", self.addr, token)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let db = self.db.clone();
        // Best effort cleanup: drop the test database
        tokio::spawn(async move {
            let _ = db.drop().await;
        });
    }
}

fn test_settings() -> Settings {
    Settings {
        app: peopledesk_config::AppSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec![],
        },
        database: peopledesk_config::DatabaseSettings {
            url: "mongodb://localhost:27017".to_string(),
            name: "peopledesk_test".to_string(),
            max_pool_size: Some(5),
            min_pool_size: Some(1),
            server_selection_timeout_secs: Some(2),
        },
        jwt: peopledesk_config::JwtSettings {
            secret: "test-secret-key-for-jwt-signing-minimum-32-chars".to_string(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 604800,
            issuer: "peopledesk".to_string(),
        },
        storage: peopledesk_config::StorageSettings {
            root: std::env::temp_dir()
                .join("peopledesk-test")
                .to_string_lossy()
                .into_owned(),
            max_upload_bytes: 1024 * 1024,
        },
        ai: peopledesk_config::AiSettings {
            api_key: None,
            endpoint: "http://127.0.0.1:9/v1/messages".to_string(),
            model: "test-model".to_string(),
            max_tokens: 256,
        },
        chat: peopledesk_config::ChatSettings {
            page_limit: 50,
            notification_dedup_capacity: 100,
        },
        listing: peopledesk_config::ListingSettings { fetch_limit: 100 },
    }
}
