use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use uuid::Uuid;

use crate::db::{CategoryDetails, NewProduct, Product, ProductDetails};

/// Product view-model accepted by create and update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    #[validate(min_length = 1)]
    #[validate(max_length = 50)]
    pub name: String,
    #[validate(min_length = 1)]
    #[validate(max_length = 25)]
    pub product_number: String,
    #[validate(max_length = 15)]
    pub color: Option<String>,
    #[validate(max_length = 5)]
    pub size: Option<String>,
    #[validate(minimum = 0.0)]
    pub weight: Option<f64>,
    #[validate(minimum = 0.0)]
    pub standard_cost: f64,
    #[validate(minimum = 0.0)]
    pub list_price: f64,
    pub sell_start_date: NaiveDateTime,
    pub sell_end_date: Option<NaiveDateTime>,
    pub product_category_id: Option<i32>,
    pub product_model_id: Option<i32>,
}

impl ProductForm {
    /// Field rules plus the checks that span fields.
    pub fn check(&self) -> Result<(), String> {
        self.validate().map_err(|errors| errors.to_string())?;

        if self.name.trim().is_empty() {
            return Err("Product name cannot be empty".to_string());
        }
        if let Some(end) = self.sell_end_date {
            if end < self.sell_start_date {
                return Err("sellEndDate must not precede sellStartDate".to_string());
            }
        }
        Ok(())
    }
}

impl From<ProductForm> for NewProduct {
    fn from(form: ProductForm) -> Self {
        NewProduct {
            name: form.name,
            product_number: form.product_number,
            color: form.color,
            standard_cost: form.standard_cost,
            list_price: form.list_price,
            size: form.size,
            weight: form.weight,
            product_category_id: form.product_category_id,
            product_model_id: form.product_model_id,
            sell_start_date: form.sell_start_date,
            sell_end_date: form.sell_end_date,
            thumbnail_photo: None,
            rowguid: Uuid::new_v4(),
            modified_date: Utc::now().naive_utc(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub name: Option<String>,
    pub parent_category: Option<String>,
}

/// Flat record served by the list endpoint.
///
/// `name` is the product model's name, and the model's catalog description is
/// served twice, as `description` and `catalog`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListItem {
    pub rowguid: Uuid,
    pub sell_end_date: Option<NaiveDateTime>,
    pub sell_start_date: NaiveDateTime,
    pub size: Option<String>,
    pub color: Option<String>,
    pub standard_cost: f64,
    pub weight: Option<f64>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub catalog: Option<String>,
    pub category: CategorySummary,
}

impl ProductListItem {
    /// Top-level JSON keys, in the form `$select` resolves them.
    pub const PROPERTIES: &'static [&'static str] = &[
        "rowguid",
        "sellEndDate",
        "sellStartDate",
        "size",
        "color",
        "standardCost",
        "weight",
        "name",
        "description",
        "catalog",
        "category",
    ];
}

impl From<&ProductDetails> for ProductListItem {
    fn from(details: &ProductDetails) -> Self {
        let product = &details.product;
        let catalog = details
            .model
            .as_ref()
            .and_then(|m| m.catalog_description.clone());

        ProductListItem {
            rowguid: product.rowguid,
            sell_end_date: product.sell_end_date,
            sell_start_date: product.sell_start_date,
            size: product.size.clone(),
            color: product.color.clone(),
            standard_cost: product.standard_cost,
            weight: product.weight,
            name: details.model.as_ref().map(|m| m.name.clone()),
            description: catalog.clone(),
            catalog,
            category: CategorySummary {
                name: details.category_name().map(str::to_string),
                parent_category: details.parent_category_name().map(str::to_string),
            },
        }
    }
}

/// Stored product without its thumbnail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
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
    pub rowguid: Uuid,
    pub modified_date: NaiveDateTime,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        ProductView {
            id: product.id,
            name: product.name.clone(),
            product_number: product.product_number.clone(),
            color: product.color.clone(),
            standard_cost: product.standard_cost,
            list_price: product.list_price,
            size: product.size.clone(),
            weight: product.weight,
            product_category_id: product.product_category_id,
            product_model_id: product.product_model_id,
            sell_start_date: product.sell_start_date,
            sell_end_date: product.sell_end_date,
            rowguid: product.rowguid,
            modified_date: product.modified_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: Option<String>,
    pub rel: String,
    pub method: String,
}

impl Link {
    pub fn get_self(href: Option<String>) -> Self {
        Link {
            href,
            rel: "self".to_string(),
            method: "GET".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    pub color: Option<String>,
    pub list_price: f64,
    pub modified_date: NaiveDateTime,
    pub name: String,
    pub category: Option<String>,
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub id: i32,
    pub name: String,
    pub parent_category: Option<String>,
}

impl From<CategoryDetails> for CategoryView {
    fn from(details: CategoryDetails) -> Self {
        CategoryView {
            id: details.category.id,
            name: details.category.name,
            parent_category: details.parent.map(|p| p.name),
        }
    }
}
