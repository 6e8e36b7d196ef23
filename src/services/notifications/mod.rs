pub mod dispatcher;
pub mod sink;
