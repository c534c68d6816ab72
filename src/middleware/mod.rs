// Middleware for admin authentication, CORS, client address resolution

pub mod auth;
pub mod client_ip;
pub mod cors;

pub use auth::*;
pub use client_ip::*;
pub use cors::*;
