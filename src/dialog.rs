//! The user-facing dialog seam.
//!
//! Everything that needs to ask or tell the user something goes through
//! [`Prompter`], so the conversion and supervision logic never touches a
//! window handle directly and tests can script the user's answers.

/// Blocking user interaction: a Yes/No question or an acknowledge-only notice.
pub trait Prompter {
    /// Ask a Yes/No question; returns true for Yes.
    fn confirm(&mut self, message: &str) -> bool;
    /// Show an error message with a single acknowledgement control.
    fn alert(&mut self, message: &str);
}

#[cfg(windows)]
pub use win::MessageBoxPrompter;

#[cfg(windows)]
mod win {
    use super::Prompter;
    use crate::wstr::to_utf16;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::WindowsAndMessaging::{
        IDYES, MB_ICONERROR, MB_ICONWARNING, MB_OK, MB_YESNO, MessageBoxW,
    };
    use windows::core::PCWSTR;

    const CAPTION: &str = "Convert to HTML";

    /// Modal message boxes on the desktop, caption "Convert to HTML".
    #[derive(Debug, Default)]
    pub struct MessageBoxPrompter;

    impl Prompter for MessageBoxPrompter {
        fn confirm(&mut self, message: &str) -> bool {
            let text = to_utf16(message);
            let caption = to_utf16(CAPTION);
            let answer = unsafe {
                MessageBoxW(
                    HWND::default(),
                    PCWSTR(text.as_ptr()),
                    PCWSTR(caption.as_ptr()),
                    MB_YESNO | MB_ICONWARNING,
                )
            };
            answer == IDYES
        }

        fn alert(&mut self, message: &str) {
            let text = to_utf16(message);
            let caption = to_utf16(CAPTION);
            unsafe {
                MessageBoxW(
                    HWND::default(),
                    PCWSTR(text.as_ptr()),
                    PCWSTR(caption.as_ptr()),
                    MB_OK | MB_ICONERROR,
                );
            }
        }
    }
}
