//! HTTP server assembly: wires the configured stores, invoker, and filter
//! pipeline into an axum [`Router`] and serves it.

use crate::config::GatewayServerConfig;
use crate::handler::{handle_web_action, AppState};
use crate::pipeline::FilterPipeline;
use axum::{
    response::IntoResponse,
    routing::{any, get},
    Router,
};
use gateway_kernel::gateway::{EntityStore, IdentityStore};
use std::sync::Arc;

pub struct GatewayServer {
    router: Router,
    config: GatewayServerConfig,
}

impl GatewayServer {
    pub fn new(
        config: GatewayServerConfig,
        identity_store: Arc<dyn IdentityStore>,
        entity_store: Arc<dyn EntityStore>,
        invoker: Arc<dyn crate::invoke::Invoker>,
    ) -> Self {
        // Throttle state (owner-keyed quota windows) is shared across both
        // routes — an owner's quota is spent the same way regardless of
        // which route the caller used to invoke it.
        let throttle = Arc::new(crate::throttle::ThrottleFilter::new(gateway_kernel::gateway::ThrottleConfig::new(
            config.throttle_max_activations,
            config.throttle_window_ms,
        )));

        let main_state = Arc::new(AppState {
            config: config.clone(),
            variant: crate::merge::ApiVariant::Main,
            identity_store: identity_store.clone(),
            entity_store: entity_store.clone(),
            invoker: invoker.clone(),
            filters: FilterPipeline::new(vec![
                Arc::new(crate::gate::ExportGateFilter),
                throttle.clone(),
                Arc::new(crate::logging::LoggingFilter),
            ]),
        });

        let main_route = format!("{}/{{*tail}}", config.api_prefix);

        let mut router: Router<()> = Router::new()
            .route("/healthz", get(health))
            .merge(Router::new().route(&main_route, any(handle_web_action)).with_state(main_state));

        if config.experimental_enabled {
            let experimental_state = Arc::new(AppState {
                config: config.clone(),
                variant: crate::merge::ApiVariant::Experimental,
                identity_store,
                entity_store,
                invoker,
                filters: FilterPipeline::new(vec![
                    Arc::new(crate::gate::ExportGateFilter),
                    throttle,
                    Arc::new(crate::logging::LoggingFilter),
                ]),
            });
            let experimental_route = format!("{}/{{*tail}}", config.experimental_api_prefix);
            router = router.merge(
                Router::new()
                    .route(&experimental_route, any(handle_web_action))
                    .with_state(experimental_state),
            );
        }

        Self { router, config }
    }

    pub fn into_router(self) -> Router {
        self.router
    }

    pub async fn serve(self) -> std::io::Result<()> {
        let addr = self.config.socket_addr();
        tracing::info!(%addr, "action gateway listening");
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, self.router).await
    }
}

async fn health() -> impl IntoResponse {
    axum::http::StatusCode::OK
}
