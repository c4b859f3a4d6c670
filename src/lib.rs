pub mod configuration;
pub mod db;
pub mod errors;
pub mod links;
pub mod mock_data;
pub mod models;
pub mod odata;
pub mod routes;
pub mod startup;
pub mod telemetry;
