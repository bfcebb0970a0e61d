pub mod emails;
pub mod kv;
