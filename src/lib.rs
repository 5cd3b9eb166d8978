pub mod advisor;
pub mod clock;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod output;
pub mod store;
pub mod task_id;
