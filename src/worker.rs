//! The converter child process.
//!
//! Runs one markdown conversion in console mode. Interactive questions go out
//! on stdout as lines whose last line ends with `?`, and the answer comes
//! back as one `Yes`/`No` line on stdin; the supervising launcher relays that
//! exchange to modal dialogs. Failures are written to stderr between `--`
//! sentinels so the supervisor can cut them out of any surrounding stream
//! noise.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use cvmd2html::convert::{self, ConvertError};
use cvmd2html::dialog::Prompter;
use cvmd2html::logging;

/// Speaks the supervisor wire protocol on the standard streams.
struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn confirm(&mut self, message: &str) -> bool {
        let mut stdout = std::io::stdout().lock();
        for line in message.lines() {
            let _ = writeln!(stdout, "{line}");
        }
        let _ = stdout.flush();
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        answer.trim().eq_ignore_ascii_case("yes")
    }

    fn alert(&mut self, message: &str) {
        fail(message);
    }
}

fn fail(message: &str) {
    let mut stderr = std::io::stderr().lock();
    let _ = write!(stderr, "--{message}--");
    let _ = stderr.flush();
}

fn main() -> ExitCode {
    let _guard = logging::init("cvmd2html-worker");

    let Some(markdown) = std::env::args().nth(1).map(PathBuf::from) else {
        fail("No markdown file path was given.");
        return ExitCode::FAILURE;
    };
    tracing::info!(markdown = %markdown.display(), "converting");

    match convert::convert_file(&markdown, &mut ConsolePrompter) {
        Ok(output) => {
            tracing::info!(output = %output.display(), "conversion written");
            ExitCode::SUCCESS
        }
        // The user said No; they need no further dialog.
        Err(ConvertError::Cancelled) => {
            tracing::info!("overwrite declined");
            ExitCode::FAILURE
        }
        Err(e) => {
            tracing::error!(error = %e, "conversion failed");
            fail(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
