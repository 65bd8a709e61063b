//! Object storage for generated and uploaded images
//!
//! Uploads image bytes to a public-read bucket (Supabase Storage) and mints
//! the public URLs stored in history records.

pub mod keys;
pub mod mock;
pub mod supabase;

pub use mock::MockObjectStore;
pub use supabase::SupabaseStorageClient;

use crate::models::StoredObject;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload `data` under `key` (leading slashes stripped).
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<StoredObject>;

    /// Public URL for `key`. Pure URL construction, no network call.
    fn get(&self, key: &str) -> StoredObject;

    async fn delete(&self, key: &str) -> Result<()>;
}
