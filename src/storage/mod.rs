mod schema;
mod statuses;
mod types;

pub use schema::Database;
pub use types::DatabaseError;
