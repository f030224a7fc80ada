pub mod file_kv_store;
