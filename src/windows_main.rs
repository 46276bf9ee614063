#![cfg(windows)]

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use cvmd2html::args::{InvocationIntent, usage};
use cvmd2html::dialog::{MessageBoxPrompter, Prompter};
use cvmd2html::registry::WinRegistry;
use cvmd2html::supervisor::{ConversionSupervisor, RunState, expected_link};
use cvmd2html::{installer, logging, shortcut};

pub fn main() -> ExitCode {
    let _guard = logging::init("cvmd2html");

    let argv: Vec<String> = std::env::args().skip(1).collect();
    let intent = InvocationIntent::from_args(&argv);
    tracing::info!(?intent, "dispatching");

    let mut prompter = MessageBoxPrompter;
    let launcher = match std::env::current_exe() {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(error = %e, "cannot resolve own path");
            prompter.alert("Unable to determine the launcher's own location.");
            return ExitCode::FAILURE;
        }
    };

    match intent {
        InvocationIntent::Convert(markdown) => convert(&mut prompter, &launcher, &markdown),
        InvocationIntent::Install { no_icon } => {
            report(&mut prompter, install(&launcher, !no_icon))
        }
        InvocationIntent::Uninstall => report(&mut prompter, uninstall(&launcher)),
        InvocationIntent::Help => {
            prompter.alert(usage());
            ExitCode::FAILURE
        }
    }
}

fn convert(prompter: &mut MessageBoxPrompter, launcher: &Path, markdown: &Path) -> ExitCode {
    let outcome = ConversionSupervisor::new(prompter).run(launcher, markdown);
    match outcome {
        Ok(RunState::Succeeded) => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "supervised run broke down");
            prompter.alert(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// Rewrite the shortcut artifact first, then the registry values, so a stale
/// or corrupted link never survives an install.
fn install(launcher: &Path, with_icon: bool) -> Result<()> {
    let com = shortcut::ComSession::new()?;
    shortcut::save(&com, &expected_link(launcher), &shortcut::link_path(launcher))?;
    installer::install(&mut WinRegistry, launcher, with_icon)
}

fn uninstall(launcher: &Path) -> Result<()> {
    installer::uninstall(&mut WinRegistry)?;
    shortcut::remove(launcher)?;
    Ok(())
}

fn report(prompter: &mut MessageBoxPrompter, result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "shell verb maintenance failed");
            prompter.alert(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
