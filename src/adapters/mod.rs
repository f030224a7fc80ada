pub mod console;
pub mod navigation;
pub mod session;
pub mod storage;
pub mod transport;
