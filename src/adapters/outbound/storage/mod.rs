/// Storage adapters for diagram images and exported reports
mod http_object_store;
mod presign_cache;

pub use http_object_store::HttpObjectStore;
pub use presign_cache::CachingObjectStore;
