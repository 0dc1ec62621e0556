pub mod store;

pub use store::SessionStoreClient;
