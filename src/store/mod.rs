pub mod categories;
pub mod kv;
pub mod lock;
pub mod repo;
pub mod streak;
pub mod tasks;
