pub mod api_keys;
pub mod database;
pub mod reviews;
pub mod schema;

pub use database::{Database, Session, StorageError};
pub use reviews::{NewReview, Review, ReviewPatch};
