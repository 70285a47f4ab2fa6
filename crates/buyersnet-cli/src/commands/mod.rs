pub mod config;
pub mod gate;
pub mod notify;
pub mod permissions;
