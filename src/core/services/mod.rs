pub mod api_client;
pub mod log_mirror;
pub mod logger;
pub mod request_pipeline;
