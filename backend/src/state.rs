use std::sync::Arc;

use crate::catalog::CatalogClient;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogClient>,
}
