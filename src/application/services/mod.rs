//! Application services - Business logic orchestration

pub mod admin_service;
pub mod message_service;

pub use admin_service::AdminService;
pub use message_service::MessageService;
