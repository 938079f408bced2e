use crate::domain::Category;
use crate::router::ResourceAddress;

/// One remote category mirrored into a local replace-all index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncTarget {
    /// Name used in logs, config sections and the CLI
    pub tag: String,
    pub category: Category,
    /// Remote list endpoint under `movie/`
    pub endpoint: String,
}

impl SyncTarget {
    pub fn popular() -> Self {
        Self {
            tag: "popular".into(),
            category: Category::Popular,
            endpoint: "popular".into(),
        }
    }

    pub fn top_rated() -> Self {
        Self {
            tag: "top_rated".into(),
            category: Category::TopRated,
            endpoint: "top_rated".into(),
        }
    }

    pub fn defaults() -> Vec<Self> {
        vec![Self::popular(), Self::top_rated()]
    }

    pub fn address(&self) -> ResourceAddress {
        ResourceAddress::Index(self.category)
    }
}
