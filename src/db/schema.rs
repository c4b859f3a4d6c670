diesel::table! {
    product_categories (id) {
        id -> Int4,
        parent_product_category_id -> Nullable<Int4>,
        name -> Varchar,
        rowguid -> Uuid,
        modified_date -> Timestamp,
    }
}

diesel::table! {
    product_models (id) {
        id -> Int4,
        name -> Varchar,
        catalog_description -> Nullable<Text>,
        rowguid -> Uuid,
        modified_date -> Timestamp,
    }
}

diesel::table! {
    products (id) {
        id -> Int4,
        name -> Varchar,
        product_number -> Varchar,
        color -> Nullable<Varchar>,
        standard_cost -> Float8,
        list_price -> Float8,
        size -> Nullable<Varchar>,
        weight -> Nullable<Float8>,
        product_category_id -> Nullable<Int4>,
        product_model_id -> Nullable<Int4>,
        sell_start_date -> Timestamp,
        sell_end_date -> Nullable<Timestamp>,
        thumbnail_photo -> Nullable<Bytea>,
        rowguid -> Uuid,
        modified_date -> Timestamp,
    }
}

diesel::joinable!(products -> product_categories (product_category_id));
diesel::joinable!(products -> product_models (product_model_id));

diesel::allow_tables_to_appear_in_same_query!(
    product_categories,
    product_models,
    products,
);
