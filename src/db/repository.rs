use diesel::prelude::*;
use diesel::r2d2::PoolError;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use thiserror::Error;

use crate::db::connection::PgPool;
use crate::db::models::*;
use crate::db::schema::*;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database query failed: {0}")]
    Query(#[from] DieselError),

    /// A write referenced a missing row or duplicated a unique value.
    #[error("{0}")]
    Constraint(String),

    #[error("could not get a database connection: {0}")]
    Pool(#[from] PoolError),

    #[error("migration failed: {0}")]
    Migration(String),

    #[error("in-memory store lock poisoned")]
    Poisoned,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence operations the products controller depends on.
///
/// Calls block; run them on the blocking pool from async handlers.
pub trait ProductRepository: Send + Sync {
    /// All products with model, category and parent category loaded, ordered by id.
    fn list(&self) -> RepositoryResult<Vec<ProductDetails>>;

    fn get(&self, id: i32) -> RepositoryResult<Option<ProductDetails>>;

    /// Persists a new product and returns its generated id.
    fn add(&self, product: NewProduct) -> RepositoryResult<i32>;

    /// Overwrites the stored row with `product`. Returns the number of rows touched.
    fn update(&self, id: i32, product: &Product) -> RepositoryResult<usize>;

    fn delete(&self, id: i32) -> RepositoryResult<usize>;
}

pub trait CategoryRepository: Send + Sync {
    fn get(&self, id: i32) -> RepositoryResult<Option<CategoryDetails>>;
}

type ProductRow = (Product, Option<ProductModel>, Option<ProductCategory>);

type JoinedProducts = diesel::dsl::LeftJoin<
    diesel::dsl::LeftJoin<products::table, product_models::table>,
    product_categories::table,
>;

/// Products with their optional model and category; loads as `ProductRow`.
fn joined_products() -> JoinedProducts {
    products::table
        .left_join(product_models::table)
        .left_join(product_categories::table)
}

/// Foreign-key and unique violations come from the request body, not the server.
fn write_error(err: DieselError) -> RepositoryError {
    match err {
        DieselError::DatabaseError(
            DatabaseErrorKind::ForeignKeyViolation | DatabaseErrorKind::UniqueViolation,
            info,
        ) => RepositoryError::Constraint(info.message().to_string()),
        other => RepositoryError::Query(other),
    }
}

/// Distinct parent category ids referenced by `rows`, ascending.
fn parent_ids(rows: &[ProductRow]) -> Vec<i32> {
    let mut ids: Vec<i32> = rows
        .iter()
        .filter_map(|(_, _, category)| category.as_ref()?.parent_product_category_id)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

fn attach_parents(
    rows: Vec<ProductRow>,
    parents: &HashMap<i32, ProductCategory>,
) -> Vec<ProductDetails> {
    rows.into_iter()
        .map(|(product, model, category)| {
            let parent_category = category
                .as_ref()
                .and_then(|c| c.parent_product_category_id)
                .and_then(|parent_id| parents.get(&parent_id).cloned());
            ProductDetails {
                product,
                model,
                category,
                parent_category,
            }
        })
        .collect()
}

pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn load_parents(
        conn: &mut PgConnection,
        rows: Vec<ProductRow>,
    ) -> RepositoryResult<Vec<ProductDetails>> {
        let ids = parent_ids(&rows);
        let parents: HashMap<i32, ProductCategory> = if ids.is_empty() {
            HashMap::new()
        } else {
            product_categories::table
                .filter(product_categories::id.eq_any(ids))
                .load::<ProductCategory>(conn)?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        Ok(attach_parents(rows, &parents))
    }
}

impl ProductRepository for PgRepository {
    fn list(&self) -> RepositoryResult<Vec<ProductDetails>> {
        let conn = &mut self.pool.get()?;
        let rows = joined_products()
            .order(products::id.asc())
            .load::<ProductRow>(conn)?;

        Self::load_parents(conn, rows)
    }

    fn get(&self, id: i32) -> RepositoryResult<Option<ProductDetails>> {
        let conn = &mut self.pool.get()?;
        let row = joined_products()
            .filter(products::id.eq(id))
            .first::<ProductRow>(conn)
            .optional()?;

        match row {
            Some(row) => Ok(Self::load_parents(conn, vec![row])?.pop()),
            None => Ok(None),
        }
    }

    fn add(&self, product: NewProduct) -> RepositoryResult<i32> {
        let conn = &mut self.pool.get()?;
        let id = diesel::insert_into(products::table)
            .values(&product)
            .returning(products::id)
            .get_result::<i32>(conn)
            .map_err(write_error)?;
        Ok(id)
    }

    fn update(&self, id: i32, product: &Product) -> RepositoryResult<usize> {
        let conn = &mut self.pool.get()?;
        let updated = diesel::update(products::table.find(id))
            .set(product)
            .execute(conn)
            .map_err(write_error)?;
        Ok(updated)
    }

    fn delete(&self, id: i32) -> RepositoryResult<usize> {
        let conn = &mut self.pool.get()?;
        let deleted = diesel::delete(products::table.find(id)).execute(conn)?;
        Ok(deleted)
    }
}

impl CategoryRepository for PgRepository {
    fn get(&self, id: i32) -> RepositoryResult<Option<CategoryDetails>> {
        let conn = &mut self.pool.get()?;
        let category = match product_categories::table
            .find(id)
            .first::<ProductCategory>(conn)
            .optional()?
        {
            Some(category) => category,
            None => return Ok(None),
        };

        let parent = match category.parent_product_category_id {
            Some(parent_id) => product_categories::table
                .find(parent_id)
                .first::<ProductCategory>(conn)
                .optional()?,
            None => None,
        };

        Ok(Some(CategoryDetails { category, parent }))
    }
}
