//! The recipe embedding store.
//!
//! Recipes live in the `recipes` table with one vector per recipe in
//! `recipes_vec`. [`retriever::RecipeRetriever`] turns the store into the
//! assistant's retrieval collaborator.

pub mod retriever;
pub mod search;
pub mod stats;
pub mod store;
pub mod types;

/// Convert an f32 embedding slice to raw bytes for sqlite-vec.
pub fn embedding_to_bytes(embedding: &[f32]) -> &[u8] {
    unsafe {
        std::slice::from_raw_parts(
            embedding.as_ptr() as *const u8,
            std::mem::size_of_val(embedding),
        )
    }
}
