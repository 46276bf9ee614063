//! The markdown-to-HTML conversion itself, console/dialog agnostic.

use crate::dialog::Prompter;
use pulldown_cmark::{Options, Parser, html};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{fs, io};
use thiserror::Error;

/// Everything that can go wrong in one direct conversion, each variant
/// carrying the exact message shown to the user.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("\"{0}\" is not a markdown (.md) file.")]
    NotMarkdown(PathBuf),
    #[error("File \"{0}\" is not found.")]
    FileNotFound(PathBuf),
    #[error("Access to the path \"{0}\" is denied.")]
    AccessDenied(PathBuf),
    #[error("\"{0}\" cannot be overwritten because it is a directory.")]
    IsDirectory(PathBuf),
    #[error("Unspecified error trying to read from \"{path}\".")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unspecified error trying to write to \"{path}\".")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The user declined to overwrite the existing output file.
    #[error("conversion cancelled")]
    Cancelled,
}

/// Render a markdown document to an HTML fragment with all extensions on.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::all());
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Swap a (case-insensitive) `.md` extension for `.html`. The extension swap
/// is the only transformation ever applied to the selected path.
pub fn html_output_path(markdown: &Path) -> Result<PathBuf, ConvertError> {
    let is_md = markdown
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("md"));
    if !is_md {
        return Err(ConvertError::NotMarkdown(markdown.to_path_buf()));
    }
    Ok(markdown.with_extension("html"))
}

/// One direct conversion run: read, render, confirm overwrite, write.
///
/// "No" to the overwrite question aborts before any write is attempted, and
/// any answer other than an explicit Yes is treated the same way.
pub fn convert_file(markdown: &Path, prompter: &mut dyn Prompter) -> Result<PathBuf, ConvertError> {
    let output = html_output_path(markdown)?;
    let content = read_markdown(markdown)?;
    if output.is_dir() {
        return Err(ConvertError::IsDirectory(output));
    }
    if output.is_file()
        && !prompter.confirm(&format!(
            "The file \"{}\" already exists.\n\nDo you want to overwrite it?",
            output.display()
        ))
    {
        return Err(ConvertError::Cancelled);
    }
    write_html(&output, &markdown_to_html(&content))?;
    Ok(output)
}

fn read_markdown(path: &Path) -> Result<String, ConvertError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConvertError::FileNotFound(path.to_path_buf()),
        ErrorKind::PermissionDenied => ConvertError::AccessDenied(path.to_path_buf()),
        _ => ConvertError::ReadFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

fn write_html(path: &Path, content: &str) -> Result<(), ConvertError> {
    fs::write(path, content).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => ConvertError::AccessDenied(path.to_path_buf()),
        _ => ConvertError::WriteFailed {
            path: path.to_path_buf(),
            source: e,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Scripted {
        answer: bool,
        confirms: Vec<String>,
    }

    impl Scripted {
        fn new(answer: bool) -> Self {
            Self {
                answer,
                confirms: Vec::new(),
            }
        }
    }

    impl Prompter for Scripted {
        fn confirm(&mut self, message: &str) -> bool {
            self.confirms.push(message.to_string());
            self.answer
        }
        fn alert(&mut self, _message: &str) {}
    }

    #[test]
    fn output_path_swaps_only_the_extension() {
        assert_eq!(
            html_output_path(Path::new("readme.md")).unwrap(),
            PathBuf::from("readme.html")
        );
        assert_eq!(
            html_output_path(Path::new("notes.MD")).unwrap(),
            PathBuf::from("notes.html")
        );
    }

    #[test]
    fn non_markdown_extension_is_rejected() {
        assert!(matches!(
            html_output_path(Path::new("readme.txt")),
            Err(ConvertError::NotMarkdown(_))
        ));
        assert!(matches!(
            html_output_path(Path::new("readme")),
            Err(ConvertError::NotMarkdown(_))
        ));
    }

    #[test]
    fn renders_basic_markdown() {
        let html = markdown_to_html("# Title\n\nSome *text*.");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<em>text</em>"));
    }

    #[test]
    fn converts_into_sibling_html_file() {
        let dir = tempfile::tempdir().unwrap();
        let md = dir.path().join("doc.md");
        fs::write(&md, "# Hello").unwrap();
        let mut prompter = Scripted::new(true);
        let out = convert_file(&md, &mut prompter).unwrap();
        assert_eq!(out, dir.path().join("doc.html"));
        assert!(fs::read_to_string(out).unwrap().contains("<h1>Hello</h1>"));
        // Fresh output file, so nothing was asked.
        assert!(prompter.confirms.is_empty());
    }

    #[test]
    fn overwrite_is_confirmed_and_yes_proceeds() {
        let dir = tempfile::tempdir().unwrap();
        let md = dir.path().join("doc.md");
        let out = dir.path().join("doc.html");
        fs::write(&md, "new").unwrap();
        fs::write(&out, "old").unwrap();
        let mut prompter = Scripted::new(true);
        convert_file(&md, &mut prompter).unwrap();
        assert_eq!(prompter.confirms.len(), 1);
        assert!(prompter.confirms[0].ends_with("Do you want to overwrite it?"));
        assert!(fs::read_to_string(&out).unwrap().contains("new"));
    }

    #[test]
    fn declining_overwrite_leaves_the_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let md = dir.path().join("doc.md");
        let out = dir.path().join("doc.html");
        fs::write(&md, "new").unwrap();
        fs::write(&out, "old").unwrap();
        let mut prompter = Scripted::new(false);
        let err = convert_file(&md, &mut prompter).unwrap_err();
        assert!(matches!(err, ConvertError::Cancelled));
        assert_eq!(fs::read_to_string(&out).unwrap(), "old");
    }

    #[test]
    fn directory_output_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let md = dir.path().join("doc.md");
        fs::write(&md, "x").unwrap();
        fs::create_dir(dir.path().join("doc.html")).unwrap();
        let mut prompter = Scripted::new(true);
        assert!(matches!(
            convert_file(&md, &mut prompter).unwrap_err(),
            ConvertError::IsDirectory(_)
        ));
    }

    #[test]
    fn missing_input_is_classified() {
        let dir = tempfile::tempdir().unwrap();
        let md = dir.path().join("absent.md");
        let mut prompter = Scripted::new(true);
        assert!(matches!(
            convert_file(&md, &mut prompter).unwrap_err(),
            ConvertError::FileNotFound(_)
        ));
    }
}
