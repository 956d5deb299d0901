pub mod claims;
pub mod dto;
pub mod guard;
pub mod jwt;
pub mod password;
pub mod principal;
pub mod roles;
pub mod services;
