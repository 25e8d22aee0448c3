pub mod client;
pub mod cooldown;
pub mod protocol;
pub mod server;
