mod cron;
mod health;
mod webhook;

pub use cron::cron_job;
pub use health::{health_api, health_db};
pub use webhook::webhook;
