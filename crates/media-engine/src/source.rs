//! Where alignment data comes from

use audioreader_core::{Alignment, BookId, LoadResult};

/// Delivers a book's alignment data
///
/// Implementations only fetch and parse; the controller validates.
#[allow(async_fn_in_trait)]
pub trait BookSource {
    async fn load(&self, book_id: &BookId) -> LoadResult<Alignment>;
}
