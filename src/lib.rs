pub mod args;
pub mod convert;
pub mod dialog;
pub mod installer;
pub mod logging;
pub mod process;
pub mod prompt;
pub mod shortcut;
pub mod supervisor;
pub mod wstr;

#[cfg(windows)]
pub mod registry;
