//! Read-only view of the product catalog

use async_trait::async_trait;
use std::collections::HashMap;

pub type ProductId = u64;

/// Owner of the authoritative product titles
#[async_trait]
pub trait ProductCatalog: Send + Sync
{   async fn product_title(&self, id: ProductId) -> Option<String>;
}

/// Map-backed catalog
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog
{   titles: HashMap<ProductId, String>
}

impl InMemoryCatalog
{   pub fn new() -> Self
    {   Self::default()
    }

    pub fn with_product(
      mut self
    , id: ProductId
    , title: impl Into<String>
    ) -> Self
    {   self.titles.insert(id, title.into());
        self
    }
}

#[async_trait]
impl ProductCatalog for InMemoryCatalog
{   async fn product_title(&self, id: ProductId) -> Option<String>
    {   self.titles.get(&id).cloned()
    }
}
