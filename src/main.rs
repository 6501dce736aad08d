use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use sitegen::api::{self, AppState};
use sitegen::config::Config;
use sitegen::provision::Provisioner;
use sitegen::resolve::Resolver;
use sitegen::store::{PostgrestStore, TenantStore};
use sitegen::subdomain::Classifier;
use sitegen::{Error, Server};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sitegen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().inspect_err(|e| tracing::error!("{e}"))?;
    let http = config.http_client()?;

    let store: Arc<dyn TenantStore> = Arc::new(PostgrestStore::new(http.clone(), &config.datastore));
    let provisioner = Provisioner::from_config(&config, &http, Arc::clone(&store));
    let resolver = Resolver::new(
        Arc::clone(&store),
        Classifier::new(config.reserved_subdomains.iter().cloned()),
    );

    tracing::info!(root_domain = %config.root_domain, table = %config.datastore.table, "starting sitegen");

    let state = Arc::new(AppState { provisioner, resolver, store });
    Server::bind(config.addr).serve(api::router(state)).await
}
