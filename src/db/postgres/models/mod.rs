pub mod fx_rate;
pub mod user;
