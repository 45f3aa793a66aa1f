use std::sync::Arc;

use be_auth_core::JwtConfig;
use be_pricing::SharedCatalog;

pub struct AppState {
    pub catalog: SharedCatalog,
    pub jwt_config: Arc<JwtConfig>,
}
