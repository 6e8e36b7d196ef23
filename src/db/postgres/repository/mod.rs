pub mod fx_rate_repository;
pub mod health_check_repository;
pub mod user_repository;
