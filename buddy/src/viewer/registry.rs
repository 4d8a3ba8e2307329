use crate::models::{Chunk, ChunkId};

/// Chunks of the document currently on screen, in reading order.
///
/// A registry is never merged into; a new fetch builds a new one.
#[derive(Debug, Clone, Default)]
pub struct ChunkRegistry {
    chunks: Vec<Chunk>,
}

impl ChunkRegistry {
    pub fn new(chunks: Vec<Chunk>) -> Self {
        Self { chunks }
    }

    pub fn all(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn by_page(&self, page: u32) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter().filter(move |chunk| chunk.page == page)
    }

    pub fn get(&self, id: ChunkId) -> Option<&Chunk> {
        self.chunks.iter().find(|chunk| chunk.id == id)
    }

    /// Distinct pages that carry at least one chunk, ascending.
    pub fn pages(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = self.chunks.iter().map(|chunk| chunk.page).collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoundingBox, ClusterId};

    fn chunk(id: u32, page: u32) -> Chunk {
        Chunk::new(
            ChunkId(id),
            page,
            BoundingBox::new(0.0, f64::from(id), 10.0, f64::from(id) + 5.0).unwrap(),
            format!("chunk {id}"),
            ClusterId(0),
        )
        .unwrap()
    }

    fn ids<'a>(chunks: impl Iterator<Item = &'a Chunk>) -> Vec<u32> {
        chunks.map(|c| c.id.0).collect()
    }

    #[test]
    fn test_by_page_membership() {
        let registry = ChunkRegistry::new(vec![chunk(0, 1), chunk(1, 2), chunk(2, 1), chunk(3, 3)]);

        for c in registry.all() {
            assert!(registry.by_page(c.page).any(|other| other.id == c.id));
            for page in registry.pages() {
                if page != c.page {
                    assert!(!registry.by_page(page).any(|other| other.id == c.id));
                }
            }
        }
    }

    #[test]
    fn test_by_page_preserves_source_order() {
        let registry = ChunkRegistry::new(vec![chunk(5, 1), chunk(2, 1), chunk(9, 2), chunk(1, 1)]);
        assert_eq!(ids(registry.by_page(1)), vec![5, 2, 1]);
        assert_eq!(ids(registry.all().iter()), vec![5, 2, 9, 1]);
    }

    #[test]
    fn test_empty_registry_answers_empty() {
        let registry = ChunkRegistry::default();
        assert!(registry.is_empty());
        assert_eq!(registry.by_page(1).count(), 0);
        assert!(registry.get(ChunkId(0)).is_none());
        assert!(registry.pages().is_empty());
    }

    #[test]
    fn test_pages_are_distinct_and_sorted() {
        let registry = ChunkRegistry::new(vec![chunk(0, 3), chunk(1, 1), chunk(2, 3), chunk(3, 2)]);
        assert_eq!(registry.pages(), vec![1, 2, 3]);
        assert_eq!(registry.get(ChunkId(2)).map(|c| c.page), Some(3));
    }
}
