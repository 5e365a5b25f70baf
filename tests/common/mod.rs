use std::net::SocketAddr;

use chrono::Duration;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use notedesk::config::{AdminCredentials, Config};
use notedesk::services::accounts;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "adminadmin";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Login and return the session body + status.
    pub async fn login(&self, username: &str, password: &str) -> (Value, StatusCode) {
        self.post(
            "/login",
            &json!({ "username": username, "password": password }),
        )
        .await
    }

    /// Access token of the default admin.
    pub async fn admin_token(&self) -> String {
        let (body, status) = self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "admin login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Register a user through the admin API.
    pub async fn register(
        &self,
        admin_token: &str,
        username: &str,
        password: &str,
        r_password: &str,
    ) -> (Value, StatusCode) {
        self.post_auth(
            "/reg-user",
            admin_token,
            &json!({ "username": username, "password": password, "r_password": r_password }),
        )
        .await
    }

    /// Register a user with role `user` and return their access token.
    pub async fn user_token(&self, username: &str) -> String {
        let admin = self.admin_token().await;
        let (body, status) = self.register(&admin, username, "password123", "password123").await;
        assert_eq!(status, StatusCode::OK, "register failed: {body}");

        let (body, status) = self.login(username, "password123").await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Create notes under a dashboard, return the response JSON.
    pub async fn create_notes(&self, token: &str, dashboard_title: &str, notes: &[&str]) -> Value {
        let (body, status) = self
            .post_auth(
                "/create-notes",
                token,
                &json!({ "dashboard_title": dashboard_title, "notes": notes }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create notes failed: {body}");
        body
    }

    /// List notes via the query string.
    pub async fn list_notes(&self, token: &str, dashboard_title: &str) -> (Value, StatusCode) {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("dashboard_title", dashboard_title)
            .finish();
        self.get_auth(&format!("/get-notes?{query}"), token).await
    }

    /// Make an unauthenticated POST request with JSON body.
    pub async fn post(&self, path: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let db_name = format!("notedesk_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 64 * 1024,
        log_level: "warn".to_string(),
        access_token_ttl: Duration::minutes(15),
        refresh_token_ttl: Duration::days(2),
        default_admin: AdminCredentials {
            username: ADMIN_USERNAME.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        },
    };

    let state = notedesk::build_state(pool.clone(), config);
    accounts::ensure_default_admin(state.users.as_ref(), &state.config.default_admin)
        .await
        .expect("Failed to create default admin");

    let app = notedesk::build_app(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_name,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
