// Library surface for the binary and for headless integration tests.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod keys;
pub mod lesson;
pub mod matcher;
pub mod progress;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod tutor;
pub mod ui;

pub use error::{Error, Result};
