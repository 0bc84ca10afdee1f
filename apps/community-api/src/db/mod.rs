pub mod memory;
pub mod pg;
pub mod pool;
pub mod schema;
pub mod store;

pub use memory::MemoryCommunityStore;
pub use pg::PgCommunityStore;
pub use store::{CommunityStore, StoreError};
