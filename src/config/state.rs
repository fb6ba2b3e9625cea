// Application state module
// Everything a request handler needs, shared behind one Arc

use crate::cache::PageCache;
use crate::loader::PageLoader;
use crate::store::SharedStore;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Page loaders over the configured backend
    pub loader: PageLoader,
    /// Statically generated pages of the cached namespace
    pub pages: PageCache,
}

impl AppState {
    pub fn new(config: Config, store: SharedStore) -> Self {
        let loader = PageLoader::new(store, config.pages.clone());
        let pages = PageCache::new(loader.fallback());
        Self {
            config,
            loader,
            pages,
        }
    }
}
