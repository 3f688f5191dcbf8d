use std::sync::Arc;

use lambda_read_adapter::{
    api::{self, AppState},
    backend::LambdaInvoker,
    config::Config,
    logging, metrics,
    region::{DefaultRegionResolver, RegionResolver, StaticRegion},
    Result,
};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = Config::from_args();

    if let Err(e) = logging::init_logger(&config.log_level) {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(config).await {
        error!(error = %e, "Exiting");
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<()> {
    metrics::init_metrics();
    let addrs = config.listen_addrs()?;

    // Resolved once; every request reads it from the shared state.
    let resolver: Box<dyn RegionResolver> = match config.region.clone() {
        Some(region) => Box::new(StaticRegion(region)),
        None => Box::new(DefaultRegionResolver::from_env()),
    };
    let region = resolver.resolve().await?;
    info!(region = %region, "Using AWS region");

    let invoker = LambdaInvoker::new(&region).await;
    let state = AppState::new(region, Arc::new(invoker));

    let listener = api::bind(&addrs).await?;
    api::start_server(listener, state).await
}
