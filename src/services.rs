pub mod audit;
pub mod auth;
pub mod content_service;
pub mod permission_service;
pub mod role_service;
pub mod token;
pub mod user_service;
