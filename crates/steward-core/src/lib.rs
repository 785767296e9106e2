pub mod analysis;
pub mod archive;
pub mod config;
pub mod engine;
pub mod error;
pub mod hasher;
pub mod index;
pub mod journal;
pub mod platform;
pub mod progress;
pub mod reorganize;
pub mod revert;
pub mod scanner;
pub mod storage;

pub use config::AppConfig;
pub use engine::Steward;
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
