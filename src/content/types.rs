use std::sync::Arc;

/// One literary sample from the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceWork {
    pub id: u32,
    pub title: String,
    pub author: String,
    pub content: String,
}

impl SourceWork {
    pub fn new(
        id: u32,
        title: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            author: author.into(),
            content: content.into(),
        }
    }
}

/// Ordered, read-only collection of works. Clones share the same storage.
#[derive(Debug, Clone)]
pub struct Catalog {
    works: Arc<[SourceWork]>,
}

impl Catalog {
    pub fn new(works: Vec<SourceWork>) -> Self {
        Self {
            works: works.into(),
        }
    }

    /// The bundled catalog of public-domain openings.
    pub fn builtin() -> Self {
        super::catalog::BUILTIN.clone()
    }

    pub fn works(&self) -> &[SourceWork] {
        &self.works
    }

    pub fn len(&self) -> usize {
        self.works.len()
    }

    pub fn is_empty(&self) -> bool {
        self.works.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
