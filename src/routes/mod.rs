pub mod categories;
pub mod products;

use actix_web::web;

use crate::errors::ApiError;
use crate::links::route_name;

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected request body");
        ApiError::Validation(err.to_string()).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected query string");
        ApiError::Validation(err.to_string()).into()
    })
}

/// Registers every resource under a `"{controller}.{route}"` name so links can be
/// generated for it.
pub fn configure(cfg: &mut web::ServiceConfig) {
    use products::CONTROLLER_NAME as PRODUCTS;

    cfg.app_data(json_config())
        .app_data(query_config())
        .service(
            web::scope("/api/products")
                .service(
                    web::resource("")
                        .name(&route_name(PRODUCTS, products::LIST))
                        .route(web::get().to(products::list))
                        .route(web::post().to(products::create)),
                )
                .service(
                    web::resource("/GetByName/{name}")
                        .name(&route_name(PRODUCTS, products::GET_BY_NAME))
                        .route(web::get().to(products::get_by_name)),
                )
                .service(
                    web::resource("/{id}")
                        .name(&route_name(PRODUCTS, products::GET_BY_ID))
                        .route(web::get().to(products::get_by_id))
                        .route(web::put().to(products::update))
                        .route(web::delete().to(products::delete)),
                )
                .service(
                    web::resource("/{id}/thumbnail")
                        .name(&route_name(PRODUCTS, products::GET_THUMBNAIL))
                        .route(web::get().to(products::get_thumbnail)),
                ),
        )
        .service(
            web::scope("/api/categories").service(
                web::resource("/{id}")
                    .name(&route_name(categories::CONTROLLER_NAME, categories::GET_BY_ID))
                    .route(web::get().to(categories::get_by_id)),
            ),
        );
}
