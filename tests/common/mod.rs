use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tienda_api::{
    auth::{AuthService, Role},
    config::AppConfig,
    db,
    entities::{customer, product},
    events,
    handlers::AppServices,
    AppState,
};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

const TEST_JWT_SECRET: &str =
    "integration_test_jwt_secret_value_padded_to_at_least_64_characters!!";

/// Test harness: real router, real migrations, file-backed SQLite.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    auth_service: Arc<AuthService>,
    _event_task: tokio::task::JoinHandle<()>,
    _db_dir: TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test db");
        let db_path = db_dir.path().join("tienda_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auto_migrate = true;
        // A single pooled connection serializes transactions, which makes
        // the concurrency tests deterministic on SQLite.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let db_arc = Arc::new(pool);
        let (event_sender, event_rx) = events::event_channel();
        let event_task = tokio::spawn(events::process_events(event_rx));
        let event_sender = Arc::new(event_sender);

        let auth_service = Arc::new(AuthService::new(&cfg.jwt_secret, cfg.jwt_expiration));
        let services = AppServices::new(db_arc.clone(), &cfg, event_sender.clone());

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = tienda_api::app_router(
            state.clone(),
            auth_service.clone(),
            CorsLayer::permissive(),
        );

        Self {
            router,
            state,
            auth_service,
            _event_task: event_task,
            _db_dir: db_dir,
        }
    }

    /// Mint a bearer token for an arbitrary principal.
    pub fn mint_token(&self, user_id: Uuid, role: Role) -> String {
        self.auth_service
            .issue_token(user_id, role)
            .expect("mint test token")
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Seed a catalog product directly into the database.
    pub async fn seed_product(&self, name: &str, price: Decimal, stock: i32) -> product::Model {
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            price: Set(price),
            stock: Set(stock),
            age_restricted: Set(false),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed product for tests")
    }

    /// Seed a customer profile, optionally linked to an auth principal.
    pub async fn seed_customer(&self, user_id: Option<Uuid>) -> customer::Model {
        customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            first_name: Set("Ana".to_string()),
            last_name: Set("García".to_string()),
            email: Set(format!("{}@example.com", Uuid::new_v4())),
            phone: Set(Some("3000000000".to_string())),
            city: Set(Some("Valledupar".to_string())),
            created_at: Set(Utc::now()),
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed customer for tests")
    }

    /// Re-read a product's current stock.
    pub async fn product_stock(&self, product_id: Uuid) -> i32 {
        use sea_orm::EntityTrait;
        product::Entity::find_by_id(product_id)
            .one(self.state.db.as_ref())
            .await
            .expect("query product")
            .expect("product exists")
            .stock
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

/// Read a response body as JSON alongside its status.
pub async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    };
    (status, json)
}
