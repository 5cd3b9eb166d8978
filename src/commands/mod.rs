pub mod add;
pub mod advise;
pub mod category;
pub mod config;
pub mod delete;
pub mod edit;
pub mod init;
pub mod list;
pub mod show;
pub mod streak;
pub mod summary;
pub mod toggle;
