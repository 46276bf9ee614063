//! The launcher's shortcut artifact.
//!
//! One `.lnk` file lives next to the launcher executable and points at the
//! converter binary. It is created whole at install time and validated before
//! every supervised run; a stale link is rewritten in full, never patched.

use std::path::{Path, PathBuf};

/// Worker argument template; the shell-style placeholder is substituted by
/// the supervisor at launch time.
pub const ARGUMENT_TEMPLATE: &str = "\"%1\"";

/// A launcher shortcut: target, fixed argument template, icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicLink {
    pub target_path: PathBuf,
    pub arguments: String,
    pub icon_path: PathBuf,
}

impl DynamicLink {
    /// The expected link contents recomputed from the current executable
    /// locations.
    pub fn expected(worker: &Path, launcher: &Path) -> Self {
        Self {
            target_path: worker.to_path_buf(),
            arguments: ARGUMENT_TEMPLATE.to_string(),
            icon_path: launcher.to_path_buf(),
        }
    }

    /// Case-insensitive comparison of target and argument string. A link
    /// that fails this check is stale and must not be launched through
    /// unmodified.
    pub fn matches(&self, expected: &DynamicLink) -> bool {
        let eq_path = |a: &Path, b: &Path| {
            a.to_string_lossy()
                .eq_ignore_ascii_case(&b.to_string_lossy())
        };
        eq_path(&self.target_path, &expected.target_path)
            && self.arguments.eq_ignore_ascii_case(&expected.arguments)
    }
}

/// Decide how one run launches through the cached link: a stored link that
/// passes validation supplies the launch target as-is; a stale, unreadable
/// or absent link forces a full rewrite to `expected` and the run launches
/// the expected target instead.
pub fn resolve_launch(stored: Option<DynamicLink>, expected: &DynamicLink) -> (PathBuf, bool) {
    match stored {
        Some(link) if link.matches(expected) => (link.target_path, false),
        _ => (expected.target_path.clone(), true),
    }
}

/// Where the shortcut file lives: next to the launcher, named after the
/// worker binary.
pub fn link_path(launcher: &Path) -> PathBuf {
    launcher.with_file_name("cvmd2html-worker.lnk")
}

/// Remove the shortcut file; an absent file is success.
pub fn remove(launcher: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(link_path(launcher)) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(windows)]
pub use win::{ComSession, load, save};

#[cfg(windows)]
mod win {
    use super::DynamicLink;
    use crate::wstr::{from_utf16_buf, to_utf16};
    use anyhow::{Context, Result};
    use std::path::{Path, PathBuf};
    use windows::Win32::System::Com::{
        CLSCTX_INPROC_SERVER, COINIT_APARTMENTTHREADED, CoCreateInstance, CoInitializeEx,
        CoUninitialize, IPersistFile,
    };
    use windows::Win32::UI::Shell::{IShellLinkW, ShellLink};
    use windows::core::{Interface, PCWSTR};

    /// Scoped COM apartment: initialized once on construction, uninitialized
    /// exactly once on drop, whatever the exit path.
    pub struct ComSession(());

    impl ComSession {
        pub fn new() -> Result<Self> {
            unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED).ok()? };
            Ok(Self(()))
        }
    }

    impl Drop for ComSession {
        fn drop(&mut self) {
            unsafe { CoUninitialize() };
        }
    }

    /// Write the whole link file from `link`, replacing any previous one.
    pub fn save(_com: &ComSession, link: &DynamicLink, path: &Path) -> Result<()> {
        unsafe {
            let shell: IShellLinkW = CoCreateInstance(&ShellLink, None, CLSCTX_INPROC_SERVER)
                .context("create ShellLink instance")?;
            let target = to_utf16(&link.target_path.to_string_lossy());
            let args = to_utf16(&link.arguments);
            let icon = to_utf16(&link.icon_path.to_string_lossy());
            shell.SetPath(PCWSTR(target.as_ptr()))?;
            shell.SetArguments(PCWSTR(args.as_ptr()))?;
            shell.SetIconLocation(PCWSTR(icon.as_ptr()), 0)?;
            let persist: IPersistFile = shell.cast()?;
            let file = to_utf16(&path.to_string_lossy());
            persist
                .Save(PCWSTR(file.as_ptr()), true.into())
                .with_context(|| format!("save shortcut {}", path.display()))?;
        }
        Ok(())
    }

    /// Read back a link file's target, arguments and icon.
    pub fn load(_com: &ComSession, path: &Path) -> Result<DynamicLink> {
        unsafe {
            let shell: IShellLinkW = CoCreateInstance(&ShellLink, None, CLSCTX_INPROC_SERVER)
                .context("create ShellLink instance")?;
            let persist: IPersistFile = shell.cast()?;
            let file = to_utf16(&path.to_string_lossy());
            persist
                .Load(PCWSTR(file.as_ptr()), windows::Win32::System::Com::STGM_READ)
                .with_context(|| format!("load shortcut {}", path.display()))?;

            let mut target = [0u16; 260];
            shell.GetPath(&mut target, std::ptr::null_mut(), 0)?;
            let mut args = [0u16; 1024];
            shell.GetArguments(&mut args)?;
            let mut icon = [0u16; 260];
            let mut icon_index = 0i32;
            shell.GetIconLocation(&mut icon, &mut icon_index)?;

            Ok(DynamicLink {
                target_path: PathBuf::from(from_utf16_buf(&target)),
                arguments: from_utf16_buf(&args),
                icon_path: PathBuf::from(from_utf16_buf(&icon)),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn expected() -> DynamicLink {
        DynamicLink::expected(
            Path::new(r"C:\Tools\cvmd2html-worker.exe"),
            Path::new(r"C:\Tools\cvmd2html.exe"),
        )
    }

    #[test]
    fn identical_links_match() {
        assert!(expected().matches(&expected()));
    }

    #[test]
    fn matching_ignores_case() {
        let stored = DynamicLink {
            target_path: PathBuf::from(r"c:\tools\CVMD2HTML-WORKER.EXE"),
            arguments: "\"%1\"".to_string(),
            icon_path: PathBuf::from(r"C:\Other\icon.exe"),
        };
        // Icon differences do not invalidate the link; target casing does not
        // either.
        assert!(stored.matches(&expected()));
    }

    #[test]
    fn wrong_target_or_arguments_is_stale() {
        let mut stored = expected();
        stored.target_path = PathBuf::from(r"C:\Elsewhere\other.exe");
        assert!(!stored.matches(&expected()));

        let mut stored = expected();
        stored.arguments = "/Markdown:\"%1\"".to_string();
        assert!(!stored.matches(&expected()));
    }

    #[test]
    fn valid_stored_link_supplies_the_launch_target() {
        let stored = DynamicLink {
            target_path: PathBuf::from(r"c:\tools\CVMD2HTML-WORKER.EXE"),
            arguments: "\"%1\"".to_string(),
            icon_path: PathBuf::from(r"C:\Tools\cvmd2html.exe"),
        };
        let (target, rebuild) = resolve_launch(Some(stored), &expected());
        assert_eq!(target, PathBuf::from(r"c:\tools\CVMD2HTML-WORKER.EXE"));
        assert!(!rebuild);
    }

    #[test]
    fn stale_link_is_rebuilt_and_never_launched_through() {
        let mut stored = expected();
        stored.target_path = PathBuf::from(r"C:\Elsewhere\other.exe");
        let (target, rebuild) = resolve_launch(Some(stored), &expected());
        assert_eq!(target, expected().target_path);
        assert!(rebuild);
    }

    #[test]
    fn absent_link_is_recreated() {
        let (target, rebuild) = resolve_launch(None, &expected());
        assert_eq!(target, expected().target_path);
        assert!(rebuild);
    }

    #[test]
    #[cfg(windows)]
    fn link_file_sits_next_to_the_launcher() {
        assert_eq!(
            link_path(Path::new(r"C:\Tools\cvmd2html.exe")),
            PathBuf::from(r"C:\Tools\cvmd2html-worker.lnk")
        );
    }

    #[test]
    fn removing_an_absent_link_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        remove(&dir.path().join("cvmd2html.exe")).unwrap();
    }
}
