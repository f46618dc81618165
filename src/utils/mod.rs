//! Cross-platform utilities and helpers
//!
//! - [`fs`] - scratch directories, recursive copies and executable permissions

pub mod fs;

pub use fs::{WorkDir, copy_dir_all, ensure_dir, make_executable, remove_dir_all};
