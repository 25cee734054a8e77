pub mod services;
pub mod time;
pub mod wallet_manager;
