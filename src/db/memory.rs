use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::db::models::*;
use crate::db::repository::{
    CategoryRepository, ProductRepository, RepositoryError, RepositoryResult,
};

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<i32, Product>,
    models: BTreeMap<i32, ProductModel>,
    categories: BTreeMap<i32, ProductCategory>,
    next_product_id: i32,
}

/// In-memory store used by the `memory` backend and the test suite.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    tables: RwLock<Tables>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| RepositoryError::Poisoned)
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| RepositoryError::Poisoned)
    }

    pub fn insert_category(&self, category: ProductCategory) -> RepositoryResult<()> {
        self.write()?.categories.insert(category.id, category);
        Ok(())
    }

    pub fn insert_model(&self, model: ProductModel) -> RepositoryResult<()> {
        self.write()?.models.insert(model.id, model);
        Ok(())
    }

    /// Stores a product under its own id, bumping the id sequence past it.
    pub fn insert_product(&self, product: Product) -> RepositoryResult<()> {
        let mut tables = self.write()?;
        tables.next_product_id = tables.next_product_id.max(product.id);
        tables.products.insert(product.id, product);
        Ok(())
    }

    pub fn product_count(&self) -> RepositoryResult<usize> {
        Ok(self.read()?.products.len())
    }
}

impl Tables {
    /// Mirrors the foreign-key and unique constraints of the `products` table.
    fn check_constraints(
        &self,
        id: Option<i32>,
        product_number: &str,
        category_id: Option<i32>,
        model_id: Option<i32>,
    ) -> RepositoryResult<()> {
        if let Some(category_id) = category_id.filter(|c| !self.categories.contains_key(c)) {
            return Err(RepositoryError::Constraint(format!(
                "product category {} does not exist",
                category_id
            )));
        }
        if let Some(model_id) = model_id.filter(|m| !self.models.contains_key(m)) {
            return Err(RepositoryError::Constraint(format!(
                "product model {} does not exist",
                model_id
            )));
        }
        if self
            .products
            .values()
            .any(|p| Some(p.id) != id && p.product_number == product_number)
        {
            return Err(RepositoryError::Constraint(format!(
                "product number '{}' already exists",
                product_number
            )));
        }
        Ok(())
    }

    fn details(&self, product: &Product) -> ProductDetails {
        let model = product
            .product_model_id
            .and_then(|id| self.models.get(&id).cloned());
        let category = product
            .product_category_id
            .and_then(|id| self.categories.get(&id).cloned());
        let parent_category = category
            .as_ref()
            .and_then(|c| c.parent_product_category_id)
            .and_then(|id| self.categories.get(&id).cloned());

        ProductDetails {
            product: product.clone(),
            model,
            category,
            parent_category,
        }
    }
}

impl ProductRepository for InMemoryRepository {
    fn list(&self) -> RepositoryResult<Vec<ProductDetails>> {
        let tables = self.read()?;
        Ok(tables.products.values().map(|p| tables.details(p)).collect())
    }

    fn get(&self, id: i32) -> RepositoryResult<Option<ProductDetails>> {
        let tables = self.read()?;
        Ok(tables.products.get(&id).map(|p| tables.details(p)))
    }

    fn add(&self, product: NewProduct) -> RepositoryResult<i32> {
        let mut tables = self.write()?;
        tables.check_constraints(
            None,
            &product.product_number,
            product.product_category_id,
            product.product_model_id,
        )?;
        tables.next_product_id += 1;
        let id = tables.next_product_id;
        tables.products.insert(id, product.into_product(id));

        tracing::debug!(product_id = id, "Stored product in memory");
        Ok(id)
    }

    fn update(&self, id: i32, product: &Product) -> RepositoryResult<usize> {
        let mut tables = self.write()?;
        if !tables.products.contains_key(&id) {
            return Ok(0);
        }
        tables.check_constraints(
            Some(id),
            &product.product_number,
            product.product_category_id,
            product.product_model_id,
        )?;
        match tables.products.get_mut(&id) {
            Some(stored) => {
                *stored = Product {
                    id,
                    ..product.clone()
                };
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete(&self, id: i32) -> RepositoryResult<usize> {
        let mut tables = self.write()?;
        Ok(usize::from(tables.products.remove(&id).is_some()))
    }
}

impl CategoryRepository for InMemoryRepository {
    fn get(&self, id: i32) -> RepositoryResult<Option<CategoryDetails>> {
        let tables = self.read()?;
        Ok(tables.categories.get(&id).map(|category| CategoryDetails {
            category: category.clone(),
            parent: category
                .parent_product_category_id
                .and_then(|parent_id| tables.categories.get(&parent_id).cloned()),
        }))
    }
}
