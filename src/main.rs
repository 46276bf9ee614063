// Windows-only launcher lives in src/windows_main.rs
#[cfg(windows)]
mod windows_main;

// Windows entry point calls into module
#[cfg(windows)]
fn main() -> std::process::ExitCode {
    windows_main::main()
}

// Non-Windows stub builds cleanly and informs the user.
#[cfg(not(windows))]
fn main() {
    println!("cvmd2html integrates with the Windows shell. Build on Windows to run.");
}
