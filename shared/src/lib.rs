pub mod balance;
pub mod circulation;
pub mod client;
pub mod error;
pub mod id;
pub mod log_config;
pub mod ser;
pub mod token;
pub mod utils;
