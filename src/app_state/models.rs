use crate::db::postgres::postgres_service::PostgresService;
use crate::env_config::models::app_setting::AppSettings;
use crate::services::broadcast::job::BroadcastJob;
use crate::services::inbound::handler::InboundMessageHandler;

use std::sync::Arc;

pub struct AppState {
    pub settings: Arc<AppSettings>,
    pub postgres_service: Arc<PostgresService>,
    pub broadcast_job: Arc<BroadcastJob>,
    pub inbound_handler: Arc<InboundMessageHandler>,
}
