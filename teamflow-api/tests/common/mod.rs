/// Shared test harness for router-level tests
///
/// Builds the full router over a lazily-connected pool, so any request
/// path that is rejected before touching storage (authentication,
/// authorization, validation) can be exercised without a running
/// database.

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use teamflow_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, DatabaseConfig, JwtConfig},
};
use teamflow_shared::{
    auth::jwt::{self, Claims},
    mail::LogMailer,
    models::user::UserRole,
};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

/// Test context holding the router and token factory
pub struct TestContext {
    pub app: axum::Router,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                // Never connected; requests under test fail before storage
                url: "postgresql://localhost:1/teamflow_test".to_string(),
                max_connections: 1,
            },
            jwt: JwtConfig {
                secret: TEST_JWT_SECRET.to_string(),
            },
        };

        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect_lazy(&config.database.url)
            .expect("lazy pool");

        let state = AppState::new(pool, config, Arc::new(LogMailer));

        Self {
            app: build_router(state),
        }
    }

    /// Builds a bearer header value for a fresh user of the given role
    pub fn auth_header(&self, role: UserRole) -> String {
        let claims = Claims::new(Uuid::new_v4(), format!("{:?}@example.com", role), role);
        let token = jwt::create_token(&claims, TEST_JWT_SECRET).expect("token");
        format!("Bearer {}", token)
    }
}
