pub mod agent;
pub mod conversation;
pub mod log_entry;
pub mod message;
pub mod poetry;
pub mod request;
pub mod user;
