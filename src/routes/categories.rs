use actix_web::{web, HttpResponse};

use crate::errors::ApiError;
use crate::models::CategoryView;
use crate::startup::AppState;

pub const CONTROLLER_NAME: &str = "categories";
pub const GET_BY_ID: &str = "get_by_id";

/// Target of the `self` link on a product.
#[tracing::instrument(name = "Get category by id.", skip(state))]
pub async fn get_by_id(
    state: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let repository = state.categories.clone();
    let category = web::block(move || repository.get(id))
        .await??
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(CategoryView::from(category)))
}
