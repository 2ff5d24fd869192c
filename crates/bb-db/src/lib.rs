pub mod comment_repo;
pub mod exclusion_repo;
pub mod pr_repo;
pub mod repo_repo;
pub mod schema;
pub mod store;
pub mod util;

pub use crate::store::DbStore;
