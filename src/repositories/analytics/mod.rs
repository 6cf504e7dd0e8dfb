pub mod action_log_repo;

pub use action_log_repo::{ActionLogRepository, MongoActionLogRepository};
