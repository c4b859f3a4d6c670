use std::io::{Error, ErrorKind};

use products_api::configuration::get_configuration;
use products_api::startup::{build_state, run};
use products_api::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let settings =
        get_configuration().map_err(|err| Error::new(ErrorKind::InvalidInput, err))?;

    let subscriber = get_subscriber("products-api".into(), settings.log_level.clone());
    init_subscriber(subscriber).map_err(|err| Error::new(ErrorKind::Other, err))?;

    let state = build_state(&settings.database).map_err(|err| Error::new(ErrorKind::Other, err))?;

    tracing::info!(
        "Starting HTTP server on http://{}:{}",
        settings.server.host,
        settings.server.port
    );
    run(&settings.server, state)?.await
}
