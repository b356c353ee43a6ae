pub mod client_ip;
pub mod jwt;
pub mod validate;
