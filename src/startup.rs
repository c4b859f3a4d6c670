use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::configuration::{DatabaseSettings, ServerSettings, StorageBackend};
use crate::db::connection::{init_pool, run_migrations};
use crate::db::{
    CategoryRepository, InMemoryRepository, PgRepository, ProductRepository, RepositoryError,
};
use crate::links::{LinkGenerator, RouteLinkGenerator};
use crate::{mock_data, routes};

/// Collaborators shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub links: Arc<dyn LinkGenerator>,
}

impl AppState {
    pub fn new<R>(repository: Arc<R>) -> Self
    where
        R: ProductRepository + CategoryRepository + 'static,
    {
        AppState {
            products: repository.clone(),
            categories: repository,
            links: Arc::new(RouteLinkGenerator),
        }
    }

    pub fn with_links(mut self, links: Arc<dyn LinkGenerator>) -> Self {
        self.links = links;
        self
    }
}

pub fn build_state(settings: &DatabaseSettings) -> Result<AppState, RepositoryError> {
    match settings.backend {
        StorageBackend::Postgres => {
            let pool = init_pool(settings)?;
            run_migrations(&pool)?;
            Ok(AppState::new(Arc::new(PgRepository::new(pool))))
        }
        StorageBackend::Memory => {
            let repository = InMemoryRepository::new();
            mock_data::seed(&repository)?;
            tracing::info!("Using seeded in-memory store");
            Ok(AppState::new(Arc::new(repository)))
        }
    }
}

pub fn run(settings: &ServerSettings, state: AppState) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .expose_headers(["X-Total-Count", "page-size", "Location"])
            .max_age(3600);

        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .app_data(state.clone())
            .configure(routes::configure)
    })
    .bind((settings.host.as_str(), settings.port))?
    .run();

    Ok(server)
}
