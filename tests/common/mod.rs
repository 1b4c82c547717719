//! Shared helpers for integration tests
#![allow(dead_code)]

use account_api::configuration::{
    get_configuration, DatabaseSettings, JwtSettings, PasswordSettings,
};
use account_api::repository::{
    InMemoryUserRepository, PgUserRepository, User, UserFilter, UserRepository,
};
use account_api::startup::run;
use serde_json::{json, Value};
use sqlx::{Connection, Executor, PgConnection, PgPool};
use std::net::TcpListener;
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub repository: Arc<dyn UserRepository>,
    pub jwt_config: JwtSettings,
    pub client: reqwest::Client,
}

pub fn test_jwt_config() -> JwtSettings {
    JwtSettings {
        access_token_secret: "integration-access-secret-0123456789".to_string(),
        refresh_token_secret: "integration-refresh-secret-0123456789".to_string(),
        access_token_expiry: 900,
        refresh_token_expiry: 604800,
        issuer: "account_api_test".to_string(),
    }
}

/// App backed by the in-memory store
pub async fn spawn_app() -> TestApp {
    spawn_app_with(Arc::new(InMemoryUserRepository::new()))
}

/// App backed by a freshly created and migrated Postgres database
pub async fn spawn_pg_app() -> TestApp {
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.database.database_name = uuid::Uuid::new_v4().to_string();
    let connection_pool = configure_database(&configuration.database).await;

    spawn_app_with(Arc::new(PgUserRepository::new(connection_pool)))
}

pub async fn configure_database(config: &DatabaseSettings) -> PgPool {
    let mut connection = PgConnection::connect(&config.connection_string_without_db())
        .await
        .expect("Failed to connect to Postgres");
    connection
        .execute(&*format!(r#"CREATE DATABASE "{}";"#, config.database_name))
        .await
        .expect("Failed to create database.");

    let connection_pool = PgPool::connect(&config.connection_string())
        .await
        .expect("Failed to connect to Postgres.");
    sqlx::migrate!("./migrations")
        .run(&connection_pool)
        .await
        .expect("Failed to migrate the database.");
    connection_pool
}

fn spawn_app_with(repository: Arc<dyn UserRepository>) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let jwt_config = test_jwt_config();
    let password_config = PasswordSettings {
        hash_cost: 4, // bcrypt minimum cost (bcrypt::MIN_COST is private)
    };

    let server = run(
        listener,
        repository.clone(),
        jwt_config.clone(),
        password_config,
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        repository,
        jwt_config,
        client: reqwest::Client::new(),
    }
}

pub fn user_body(email: &str, password: &str) -> Value {
    json!({
        "firstname": "Ursula",
        "lastname": "Le Guin",
        "email": email,
        "password": password,
        "phone": "+1 555 0100"
    })
}

/// Value of the `jid` cookie from a `Set-Cookie` header, if any
pub fn refresh_cookie_value(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| {
            value
                .split(';')
                .next()
                .and_then(|pair| pair.trim().strip_prefix("jid="))
                .map(str::to_string)
        })
}

impl TestApp {
    pub async fn post_user(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}/users", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(&format!("{}/login", &self.address))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn get_users(&self) -> Vec<Value> {
        self.client
            .get(&format!("{}/users", &self.address))
            .send()
            .await
            .expect("Failed to execute request.")
            .json()
            .await
            .expect("Failed to parse response")
    }

    pub async fn get_bye(&self, authorization: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(&format!("{}/bye", &self.address));
        if let Some(value) = authorization {
            request = request.header("Authorization", value);
        }
        request.send().await.expect("Failed to execute request.")
    }

    pub async fn post_refresh(&self, cookie: Option<&str>) -> reqwest::Response {
        let mut request = self.client.post(&format!("{}/refresh_token", &self.address));
        if let Some(value) = cookie {
            request = request.header("Cookie", format!("jid={}", value));
        }
        request.send().await.expect("Failed to execute request.")
    }

    /// Create a user through the API and return the stored record
    pub async fn create_test_user(&self, email: &str, password: &str) -> User {
        let response = self.post_user(&user_body(email, password)).await;
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["success"], true, "user creation failed for {}", email);

        self.stored_user(email).await.expect("Created user not found")
    }

    pub async fn stored_user(&self, email: &str) -> Option<User> {
        self.repository
            .find_one(UserFilter::Email(email.to_string()))
            .await
            .expect("Repository lookup failed")
    }

    /// Log in and return `(access_token, refresh_token)`
    pub async fn login_tokens(&self, email: &str, password: &str) -> (String, String) {
        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());

        let refresh = refresh_cookie_value(&response).expect("No jid cookie set");
        let body: Value = response.json().await.expect("Failed to parse response");
        let access = body["accessToken"]
            .as_str()
            .expect("No access token in response")
            .to_string();

        (access, refresh)
    }
}
