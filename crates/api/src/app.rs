use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use sqlx::PgPool;
use tower::ServiceBuilder;

use wareflow_infra::{InMemoryStore, InventoryStore, MasterData, PostgresStore, SlipEngine};

use crate::middleware::{AuthState, auth_middleware};
use crate::token::HsTokenDecoder;

pub mod dto;
pub mod errors;
pub mod routes;

/// Application services shared by all routes.
///
/// Both store backends implement [`InventoryStore`], so the services are
/// type-erased behind one `Arc<dyn _>` and the backend is chosen at startup.
pub struct AppServices {
    pub engine: SlipEngine<Arc<dyn InventoryStore>>,
    pub masterdata: MasterData<Arc<dyn InventoryStore>>,
    pub store: Arc<dyn InventoryStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self {
            engine: SlipEngine::new(store.clone()),
            masterdata: MasterData::new(store.clone()),
            store,
        }
    }
}

/// Build the full application router.
///
/// `DATABASE_URL` selects the Postgres backend; without it the in-memory
/// store is used (dev/test).
pub async fn build_app(jwt_secret: String) -> Router {
    let store: Arc<dyn InventoryStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = PgPool::connect(&url)
                .await
                .expect("failed to connect to Postgres");
            tracing::info!("using Postgres store");
            Arc::new(PostgresStore::new(pool))
        }
        Err(_) => {
            tracing::info!("DATABASE_URL not set; using in-memory store");
            Arc::new(InMemoryStore::new())
        }
    };

    let services = Arc::new(AppServices::new(store));

    let auth_state = AuthState {
        decoder: Arc::new(HsTokenDecoder::new(&jwt_secret)),
    };

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(
            routes::router().layer(
                ServiceBuilder::new()
                    .layer(axum::middleware::from_fn_with_state(
                        auth_state,
                        auth_middleware,
                    ))
                    .layer(Extension(services)),
            ),
        )
}
