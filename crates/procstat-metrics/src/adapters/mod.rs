//! Built-in type collectors.

pub mod jobs;
pub mod process;
pub mod worker_pool;

pub use jobs::JobCollector;
pub use process::ProcessCollector;
pub use worker_pool::WorkerPoolCollector;
