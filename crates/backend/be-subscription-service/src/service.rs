use std::sync::Arc;

use be_auth_core::JwtConfig;
use be_remote_db::DatabaseManager;

pub struct AppState {
    pub db: Arc<DatabaseManager>,
    pub jwt_config: Arc<JwtConfig>,
}
