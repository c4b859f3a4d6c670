use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};

use crate::db::{NewProduct, RepositoryResult};
use crate::errors::ApiError;
use crate::models::{Link, ProductDetail, ProductForm, ProductListItem, ProductView};
use crate::odata::{ODataQuery, QueryOptions};
use crate::routes::categories;
use crate::startup::AppState;

pub const CONTROLLER_NAME: &str = "products";
pub const LIST: &str = "list";
pub const GET_BY_NAME: &str = "get_by_name";
pub const GET_BY_ID: &str = "get_by_id";
pub const GET_THUMBNAIL: &str = "get_thumbnail";

/// Advertised in the `page-size` header. Paging itself is driven by `$top`/`$skip`.
pub const PAGE_SIZE: usize = 5;

#[tracing::instrument(name = "List products.", skip(state))]
pub async fn list(
    state: web::Data<AppState>,
    options: web::Query<QueryOptions>,
) -> Result<HttpResponse, ApiError> {
    let query = ODataQuery::parse(&options)?;

    let repository = state.products.clone();
    let products = web::block(move || repository.list()).await??;

    let rows = products
        .iter()
        .map(|details| serde_json::to_value(ProductListItem::from(details)))
        .collect::<Result<Vec<_>, _>>()?;
    let outcome = query.apply(rows, ProductListItem::PROPERTIES)?;
    tracing::debug!(total = outcome.total, returned = outcome.rows.len(), "Products listed");

    Ok(HttpResponse::Ok()
        .insert_header(("X-Total-Count", outcome.total.to_string()))
        .insert_header(("page-size", PAGE_SIZE.to_string()))
        .json(outcome.rows))
}

/// Returns the first product in id order. `name` is not used for matching;
/// clients of this route rely on that, so it stays until they move to `$filter`.
#[tracing::instrument(name = "Get product by name.", skip(state))]
pub async fn get_by_name(
    state: web::Data<AppState>,
    name: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    tracing::warn!(name = %name, "GetByName ignores the requested name");

    let repository = state.products.clone();
    let first = web::block(move || repository.list())
        .await??
        .into_iter()
        .next()
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().json(ProductView::from(&first.product)))
}

#[tracing::instrument(name = "Get product by id.", skip(state, req))]
pub async fn get_by_id(
    state: web::Data<AppState>,
    req: HttpRequest,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let repository = state.products.clone();
    let details = web::block(move || repository.get(id))
        .await??
        .ok_or(ApiError::NotFound)?;

    let category_url = details.product.product_category_id.and_then(|category_id| {
        state.links.absolute_url(
            &req,
            categories::GET_BY_ID,
            categories::CONTROLLER_NAME,
            &[category_id.to_string()],
        )
    });
    let category = details.category_name().map(str::to_string);

    let mut links = Vec::new();
    if category.as_deref().is_some_and(|name| !name.is_empty()) {
        links.push(Link::get_self(category_url));
    }

    let product = details.product;
    Ok(HttpResponse::Ok().json(ProductDetail {
        color: product.color,
        list_price: product.list_price,
        modified_date: product.modified_date,
        name: product.name,
        category,
        links,
    }))
}

#[tracing::instrument(name = "Get product thumbnail.", skip(state))]
pub async fn get_thumbnail(
    state: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let repository = state.products.clone();
    let thumbnail = web::block(move || repository.get(id))
        .await??
        .and_then(|details| details.product.thumbnail_photo)
        .ok_or(ApiError::NotFound)?;

    Ok(HttpResponse::Ok().content_type("image/jpeg").body(thumbnail))
}

#[tracing::instrument(name = "Create product.", skip(state, req))]
pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    form: web::Json<ProductForm>,
) -> Result<HttpResponse, ApiError> {
    let form = form.into_inner();
    if let Err(errors) = form.check() {
        tracing::debug!(%errors, "Rejected product form");
        return Err(ApiError::Validation(errors));
    }

    let repository = state.products.clone();
    let new_product = NewProduct::from(form.clone());
    let id = web::block(move || repository.add(new_product)).await??;
    tracing::info!(product_id = id, "Product created");

    let mut response = HttpResponse::Created();
    if let Some(location) =
        state
            .links
            .absolute_url(&req, GET_BY_ID, CONTROLLER_NAME, &[id.to_string()])
    {
        response.insert_header((header::LOCATION, location));
    }
    Ok(response.json(form))
}

/// Applies `name` and `color` from the form; every other stored field is kept.
#[tracing::instrument(name = "Update product.", skip(state))]
pub async fn update(
    state: web::Data<AppState>,
    id: web::Path<i32>,
    form: web::Json<ProductForm>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let form = form.into_inner();
    if let Err(errors) = form.check() {
        tracing::debug!(%errors, "Rejected product form");
        return Err(ApiError::Validation(errors));
    }

    let repository = state.products.clone();
    let found = web::block(move || -> RepositoryResult<bool> {
        let Some(details) = repository.get(id)? else {
            return Ok(false);
        };
        let mut product = details.product;
        product.name = form.name;
        product.color = form.color;
        repository.update(id, &product)?;
        Ok(true)
    })
    .await??;

    if !found {
        return Err(ApiError::NotFound);
    }
    tracing::info!(product_id = id, "Product updated");
    Ok(HttpResponse::Ok().finish())
}

#[tracing::instrument(name = "Delete product.", skip(state))]
pub async fn delete(
    state: web::Data<AppState>,
    id: web::Path<i32>,
) -> Result<HttpResponse, ApiError> {
    let id = id.into_inner();
    let repository = state.products.clone();
    let found = web::block(move || -> RepositoryResult<bool> {
        if repository.get(id)?.is_none() {
            return Ok(false);
        }
        repository.delete(id)?;
        Ok(true)
    })
    .await??;

    if !found {
        return Err(ApiError::NotFound);
    }
    tracing::info!(product_id = id, "Product deleted");
    Ok(HttpResponse::Ok().finish())
}
