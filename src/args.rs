use std::path::PathBuf;

/// The one action a single run performs, parsed once from the raw command
/// line and immutable afterwards. Anything malformed collapses to `Help`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationIntent {
    /// Convert the given markdown file.
    Convert(PathBuf),
    /// Install the shell verb, optionally without its icon value.
    Install { no_icon: bool },
    /// Remove the shell verb and all of its subkeys.
    Uninstall,
    /// Show usage and exit with code 1.
    Help,
}

impl InvocationIntent {
    /// Parse the arguments following the executable path. Verb matching is
    /// case-insensitive and at most one argument is accepted.
    pub fn from_args(args: &[String]) -> InvocationIntent {
        match args {
            [] => InvocationIntent::Install { no_icon: false },
            [arg] => Self::from_single(arg),
            _ => InvocationIntent::Help,
        }
    }

    fn from_single(arg: &str) -> InvocationIntent {
        let lower = arg.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("/markdown") {
            if !rest.is_empty() && !rest.starts_with(':') {
                return InvocationIntent::Help;
            }
            // The path keeps its casing; only the verb prefix and the
            // optional colon are stripped.
            let path = &arg[arg.len() - rest.len()..];
            let path = path.strip_prefix(':').unwrap_or(path);
            if path.is_empty() {
                return InvocationIntent::Help;
            }
            return InvocationIntent::Convert(PathBuf::from(path));
        }
        match lower.as_str() {
            "/set" => InvocationIntent::Install { no_icon: false },
            "/set:noicon" => InvocationIntent::Install { no_icon: true },
            "/unset" => InvocationIntent::Uninstall,
            _ => InvocationIntent::Help,
        }
    }
}

/// Usage text shown by the Help intent and on malformed invocations.
pub fn usage() -> &'static str {
    "The MarkdownToHtml shortcut launcher.\n\
     It starts the shortcut menu target process in a hidden window.\n\n\
     Syntax:\n\
     \x20 cvmd2html /Markdown:<markdown file path>\n\
     \x20 cvmd2html [/Set[:NoIcon]]\n\
     \x20 cvmd2html /Unset\n\
     \x20 cvmd2html /Help\n\n\
     <markdown file path>  The selected markdown's file path.\n\
     \x20                Set  Configure the shortcut menu in the registry.\n\
     \x20             NoIcon  Specifies that the icon is not configured.\n\
     \x20              Unset  Removes the shortcut menu.\n\
     \x20               Help  Show the help doc."
}
