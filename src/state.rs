use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::hosting::{DocumentHost, HttpDocumentHost, LinkResolver};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub resolver: Arc<LinkResolver>,
    pub max_batch: i64,
}

impl AppState {
    pub fn from_config(config: &Config, store: Store) -> Self {
        let host = config.hosting.as_ref().map(|h| {
            Arc::new(HttpDocumentHost::new(&h.url, h.token.clone())) as Arc<dyn DocumentHost>
        });
        let resolver = LinkResolver::new(&config.public_url, host, config.hosting_timeout);

        Self {
            store,
            resolver: Arc::new(resolver),
            max_batch: config.max_batch,
        }
    }
}
