pub mod http;
pub mod storage;

pub use http::HttpApiClient;
pub use storage::{FileSessionStore, MemorySessionStore};
