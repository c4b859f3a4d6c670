pub mod connection;
pub mod memory;
pub mod models;
pub mod repository;
pub mod schema;

pub use memory::InMemoryRepository;
pub use models::*;
pub use repository::*;
