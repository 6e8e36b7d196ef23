pub mod broadcast;
pub mod inbound;
pub mod notifications;
pub mod rates;
