pub mod notifications;
pub mod server;
pub mod version;
pub mod watchdog;
pub mod web;
