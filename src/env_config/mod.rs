pub mod build_config;
pub mod build_env;
pub mod errors;
pub mod models;
