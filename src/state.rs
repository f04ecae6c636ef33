use std::sync::Arc;

use crate::store::EventStore;
use crate::uploads::UploadAuthorizer;

/// Collaborators shared by every handler, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub uploads: Arc<dyn UploadAuthorizer>,
    pub page_size: usize,
}

impl AppState {
    pub fn new(
        store: Arc<dyn EventStore>,
        uploads: Arc<dyn UploadAuthorizer>,
        page_size: usize,
    ) -> Self {
        Self {
            store,
            uploads,
            page_size,
        }
    }
}
