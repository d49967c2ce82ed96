pub mod orchestrator;
pub mod task;

pub use orchestrator::{DownloadOrchestrator, InstallOptions};
pub use task::{DownloadTask, TaskQueue};
