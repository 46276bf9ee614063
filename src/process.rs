//! Child process creation with redirected streams and a hidden window.

use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Child, Command, Stdio};

/// Launch `program` with one argument, all three standard streams piped and,
/// on Windows, no console window of its own.
pub fn launch_hidden(program: &Path, arg: &Path) -> Result<Child> {
    let mut command = Command::new(program);
    command
        .arg(arg)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        use windows::Win32::System::Threading::CREATE_NO_WINDOW;
        command.creation_flags(CREATE_NO_WINDOW.0);
    }
    command
        .spawn()
        .with_context(|| format!("failed to start \"{}\"", program.display()))
}
