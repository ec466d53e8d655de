pub mod categories;
pub mod chat;
pub mod db;
pub mod models;
pub mod preferences;
pub mod receipts;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
