pub(crate) mod browser;
mod storage;

pub use browser::{BrowserLauncher, BrowserOptions, ChromeLauncher, ControlState, Session};
pub use storage::fs_store::FileSystemStore;
