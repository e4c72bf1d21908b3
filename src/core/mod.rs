pub mod auth;
pub mod backup;
pub mod cart;
pub mod log;
pub mod orders;
pub mod password;
pub mod reports;
pub mod routing;
