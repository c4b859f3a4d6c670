use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;
use crate::db::schema::{product_categories, product_models, products};

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = product_categories)]
pub struct ProductCategory {
    pub id: i32,
    pub parent_product_category_id: Option<i32>,
    pub name: String,
    pub rowguid: Uuid,
    pub modified_date: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = product_categories)]
pub struct NewProductCategory {
    pub parent_product_category_id: Option<i32>,
    pub name: String,
    pub rowguid: Uuid,
    pub modified_date: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = product_models)]
pub struct ProductModel {
    pub id: i32,
    pub name: String,
    pub catalog_description: Option<String>,
    pub rowguid: Uuid,
    pub modified_date: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = product_models)]
pub struct NewProductModel {
    pub name: String,
    pub catalog_description: Option<String>,
    pub rowguid: Uuid,
    pub modified_date: NaiveDateTime,
}

/// Column order must match `schema::products`.
#[derive(Queryable, Identifiable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub product_number: String,
    pub color: Option<String>,
    pub standard_cost: f64,
    pub list_price: f64,
    pub size: Option<String>,
    pub weight: Option<f64>,
    pub product_category_id: Option<i32>,
    pub product_model_id: Option<i32>,
    pub sell_start_date: NaiveDateTime,
    pub sell_end_date: Option<NaiveDateTime>,
    pub thumbnail_photo: Option<Vec<u8>>,
    pub rowguid: Uuid,
    pub modified_date: NaiveDateTime,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = products)]
pub struct NewProduct {
    pub name: String,
    pub product_number: String,
    pub color: Option<String>,
    pub standard_cost: f64,
    pub list_price: f64,
    pub size: Option<String>,
    pub weight: Option<f64>,
    pub product_category_id: Option<i32>,
    pub product_model_id: Option<i32>,
    pub sell_start_date: NaiveDateTime,
    pub sell_end_date: Option<NaiveDateTime>,
    pub thumbnail_photo: Option<Vec<u8>>,
    pub rowguid: Uuid,
    pub modified_date: NaiveDateTime,
}

impl NewProduct {
    pub fn into_product(self, id: i32) -> Product {
        Product {
            id,
            name: self.name,
            product_number: self.product_number,
            color: self.color,
            standard_cost: self.standard_cost,
            list_price: self.list_price,
            size: self.size,
            weight: self.weight,
            product_category_id: self.product_category_id,
            product_model_id: self.product_model_id,
            sell_start_date: self.sell_start_date,
            sell_end_date: self.sell_end_date,
            thumbnail_photo: self.thumbnail_photo,
            rowguid: self.rowguid,
            modified_date: self.modified_date,
        }
    }
}

/// A product with its model, category and the category's parent loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub product: Product,
    pub model: Option<ProductModel>,
    pub category: Option<ProductCategory>,
    pub parent_category: Option<ProductCategory>,
}

impl ProductDetails {
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    pub fn parent_category_name(&self) -> Option<&str> {
        self.parent_category.as_ref().map(|c| c.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDetails {
    pub category: ProductCategory,
    pub parent: Option<ProductCategory>,
}
