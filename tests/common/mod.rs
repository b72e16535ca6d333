#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use migration::MigratorTrait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use tourism_backend::{
    config::Config,
    entities::user,
    routes::{api_routes, with_app_layers},
    AppState,
};

pub struct TestApp {
    pub router: Router,
    pub db: DatabaseConnection,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }

    /// The `data` member of the envelope.
    pub fn data(&self) -> Value {
        self.json()["data"].clone()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).to_string()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_routes(Router::new()).await
    }

    /// The full application with `extra` routes mounted under the same layers.
    pub async fn with_routes(extra: Router<AppState>) -> Self {
        // A single pooled connection keeps the in-memory database alive and shared.
        let mut options = ConnectOptions::new("sqlite::memory:");
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let db = Database::connect(options).await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();

        let state = AppState::new(db.clone(), Config::for_database("sqlite::memory:"));
        TestApp {
            router: with_app_layers(api_routes().merge(extra), state),
            db,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
        }
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            headers,
            bytes,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::GET, uri, token, None, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::POST, uri, token, Some(body), None).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(Method::PATCH, uri, token, Some(body), None).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(Method::DELETE, uri, token, None, None).await
    }

    /// Registers and logs in; returns `(token, user_id)`.
    pub async fn user(&self, email: &str) -> (String, String) {
        let response = self
            .post(
                "/api/users",
                None,
                json!({ "email": email, "password": "secret-password", "name": "Test User" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());

        let response = self
            .post(
                "/api/users/token",
                None,
                json!({ "email": email, "password": "secret-password" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.text());

        let data = response.data();
        (
            data["token"].as_str().unwrap().to_string(),
            data["user_id"].as_str().unwrap().to_string(),
        )
    }

    /// A logged-in staff account.
    pub async fn staff(&self, email: &str) -> String {
        let (token, _) = self.user(email).await;

        let account = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .unwrap()
            .unwrap();
        let mut active: user::ActiveModel = account.into();
        active.is_staff = Set(true);
        active.update(&self.db).await.unwrap();

        token
    }

    /// Creates a catalog row as staff and returns its id.
    pub async fn create(&self, staff: &str, uri: &str, body: Value) -> String {
        let response = self.post(uri, Some(staff), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
        response.data()["id"].as_str().unwrap().to_string()
    }
}
