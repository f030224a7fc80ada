pub mod console;
pub mod kv_store;
pub mod navigator;
pub mod session;
pub mod transport;
