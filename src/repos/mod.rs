pub mod error;
pub mod product_repo;
pub mod user_repo;

pub use product_repo::{ProductRecord, ProductRepo};
pub use user_repo::{UserRecord, UserRepo};
