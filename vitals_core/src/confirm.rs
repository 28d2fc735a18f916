//! Confirmation requests before destructive actions.

use crate::Result;

/// Asks the user to accept or reject an action
///
/// Takes `&mut self`, so only one request can be pending at a time.
pub trait Confirm {
    fn confirm(&mut self, title: &str, message: &str) -> Result<bool>;
}

/// Answers every request the same way without asking
#[derive(Clone, Copy, Debug)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&mut self, title: &str, _message: &str) -> Result<bool> {
        tracing::debug!("Auto-answering '{}' with {}", title, self.0);
        Ok(self.0)
    }
}

/// Run `action` only if the request is accepted
///
/// Returns `None` when the user declines.
pub fn confirm_then<C, T, F>(
    confirm: &mut C,
    title: &str,
    message: &str,
    action: F,
) -> Result<Option<T>>
where
    C: Confirm + ?Sized,
    F: FnOnce() -> Result<T>,
{
    if confirm.confirm(title, message)? {
        action().map(Some)
    } else {
        tracing::info!("'{}' declined", title);
        Ok(None)
    }
}
