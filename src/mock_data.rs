use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::db::{InMemoryRepository, Product, ProductCategory, ProductModel, RepositoryResult};

/// Smallest well-formed JPEG (SOI, APP0, EOI) served as a placeholder thumbnail.
pub const PLACEHOLDER_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00, 0x01, 0x01, 0x00, 0x00,
    0x01, 0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];

fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

pub(crate) fn category(id: i32, parent: Option<i32>, name: &str) -> ProductCategory {
    ProductCategory {
        id,
        parent_product_category_id: parent,
        name: name.to_string(),
        rowguid: Uuid::from_u128(0x1000 + u128::from(id.unsigned_abs())),
        modified_date: date(2008, 6, 1),
    }
}

pub(crate) fn model(id: i32, name: &str, catalog_description: Option<&str>) -> ProductModel {
    ProductModel {
        id,
        name: name.to_string(),
        catalog_description: catalog_description.map(str::to_string),
        rowguid: Uuid::from_u128(0x2000 + u128::from(id.unsigned_abs())),
        modified_date: date(2008, 6, 1),
    }
}

pub fn init_mock_products() -> Vec<Product> {
    vec![
        Product {
            id: 680,
            name: "HL Road Frame - Black, 58".to_string(),
            product_number: "FR-R92B-58".to_string(),
            color: Some("Black".to_string()),
            standard_cost: 1059.31,
            list_price: 1431.5,
            size: Some("58".to_string()),
            weight: Some(1016.04),
            product_category_id: Some(18),
            product_model_id: Some(6),
            sell_start_date: date(2002, 6, 1),
            sell_end_date: None,
            thumbnail_photo: None,
            rowguid: Uuid::from_u128(0x3000 + 680),
            modified_date: date(2008, 3, 11),
        },
        Product {
            id: 749,
            name: "Road-150 Red, 62".to_string(),
            product_number: "BK-R93R-62".to_string(),
            color: Some("Red".to_string()),
            standard_cost: 2171.29,
            list_price: 3578.27,
            size: Some("62".to_string()),
            weight: Some(6803.85),
            product_category_id: Some(6),
            product_model_id: Some(25),
            sell_start_date: date(2005, 7, 1),
            sell_end_date: Some(date(2006, 7, 1)),
            thumbnail_photo: Some(PLACEHOLDER_JPEG.to_vec()),
            rowguid: Uuid::from_u128(0x3000 + 749),
            modified_date: date(2008, 3, 11),
        },
        Product {
            id: 771,
            name: "Mountain-100 Silver, 38".to_string(),
            product_number: "BK-M82S-38".to_string(),
            color: Some("Silver".to_string()),
            standard_cost: 1912.15,
            list_price: 3399.99,
            size: Some("38".to_string()),
            weight: Some(9230.56),
            product_category_id: Some(5),
            product_model_id: Some(19),
            sell_start_date: date(2005, 7, 1),
            sell_end_date: Some(date(2006, 7, 1)),
            thumbnail_photo: Some(PLACEHOLDER_JPEG.to_vec()),
            rowguid: Uuid::from_u128(0x3000 + 771),
            modified_date: date(2008, 3, 11),
        },
        Product {
            id: 1001,
            name: "Workshop Sample".to_string(),
            product_number: "WS-0001".to_string(),
            color: None,
            standard_cost: 12.0,
            list_price: 20.0,
            size: None,
            weight: None,
            product_category_id: None,
            product_model_id: None,
            sell_start_date: date(2008, 1, 1),
            sell_end_date: None,
            thumbnail_photo: None,
            rowguid: Uuid::from_u128(0x3000 + 1001),
            modified_date: date(2008, 3, 11),
        },
    ]
}

/// Loads a small catalogue into `repository`: two root categories with
/// sub-categories, three models, and products with and without a category.
pub fn seed(repository: &InMemoryRepository) -> RepositoryResult<()> {
    for c in [
        category(1, None, "Bikes"),
        category(2, None, "Components"),
        category(5, Some(1), "Mountain Bikes"),
        category(6, Some(1), "Road Bikes"),
        category(18, Some(2), "Road Frames"),
    ] {
        repository.insert_category(c)?;
    }

    for m in [
        model(6, "HL Road Frame", Some("Our lightest and best quality aluminum frame.")),
        model(19, "Mountain-100", Some("Top-of-the-line competition mountain bike.")),
        model(25, "Road-150", None),
    ] {
        repository.insert_model(m)?;
    }

    for product in init_mock_products() {
        repository.insert_product(product)?;
    }
    Ok(())
}
