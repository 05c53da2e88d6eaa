use action_gateway::{GatewayServer, GatewayServerConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayServerConfig::load();
    if let Err(e) = config.to_kernel_config() {
        tracing::error!(error = %e, "invalid gateway configuration");
        std::process::exit(1);
    }

    let identity_store = Arc::new(action_gateway::stores::InMemoryIdentityStore::new());
    let entity_store = Arc::new(action_gateway::stores::InMemoryEntityStore::new());
    let invoker = Arc::new(action_gateway::invoke::EchoInvoker);

    let server = GatewayServer::new(config, identity_store, entity_store, invoker);
    server.serve().await
}
