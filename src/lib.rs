pub mod chain;
pub mod claimer;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod logger;
pub mod recorder;
pub mod retry;
pub mod utils;
