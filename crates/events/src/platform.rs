//! Platform notification surface.
//!
//! The host environment may be able to pop up a `(title, body)` alert. The
//! notification center treats this as best-effort: an unsupported surface or
//! a refused permission is skipped quietly and never fails the caller.

use std::sync::Mutex;

/// Permission state of the platform surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not yet decided; the surface may ask the user.
    Default,
}

/// Errors raised when displaying an alert.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Platform notifications are not supported")]
    Unsupported,

    #[error("Failed to display notification: {0}")]
    Display(String),
}

/// Capability to display alerts outside the application.
pub trait PlatformNotifier: Send + Sync {
    /// Current permission without prompting.
    fn permission(&self) -> Permission;

    /// Ask for permission and return the answer.
    fn request_permission(&self) -> Permission;

    /// Display an alert.
    fn show(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

/// Show an alert if permitted, asking first when undecided.
///
/// Returns `true` if the alert was displayed.
pub fn surface(notifier: &dyn PlatformNotifier, title: &str, body: &str) -> bool {
    let permission = match notifier.permission() {
        Permission::Default => notifier.request_permission(),
        other => other,
    };

    if permission != Permission::Granted {
        tracing::debug!(?permission, title, "Platform notification not permitted, skipping");
        return false;
    }

    match notifier.show(title, body) {
        Ok(()) => true,
        Err(NotifyError::Unsupported) => {
            tracing::debug!(title, "Platform notifications unsupported, skipping");
            false
        }
        Err(e) => {
            tracing::warn!(error = %e, title, "Failed to show platform notification");
            false
        }
    }
}

// ---------------------------------------------------------------------------
// LogNotifier
// ---------------------------------------------------------------------------

/// Headless surface that writes alerts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl PlatformNotifier for LogNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn show(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(title, body, "Notification");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// DisabledNotifier
// ---------------------------------------------------------------------------

/// Surface for environments without platform notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledNotifier;

impl PlatformNotifier for DisabledNotifier {
    fn permission(&self) -> Permission {
        Permission::Denied
    }

    fn request_permission(&self) -> Permission {
        Permission::Denied
    }

    fn show(&self, _title: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Unsupported)
    }
}

// ---------------------------------------------------------------------------
// MemoryNotifier
// ---------------------------------------------------------------------------

/// An alert captured by [`MemoryNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownAlert {
    pub title: String,
    pub body: String,
}

struct MemoryNotifierState {
    permission: Permission,
    /// Answer given when permission is requested while undecided.
    prompt_answer: Permission,
    prompts: usize,
    shown: Vec<ShownAlert>,
}

/// In-process surface that keeps displayed alerts in a list.
///
/// Lets an embedding UI drain alerts itself, and lets the permission flow be
/// driven explicitly.
pub struct MemoryNotifier {
    state: Mutex<MemoryNotifierState>,
}

impl MemoryNotifier {
    /// A surface whose permission is already `permission`.
    pub fn new(permission: Permission) -> Self {
        Self::with_prompt(permission, permission)
    }

    /// A surface in `permission` that answers `prompt_answer` when asked.
    pub fn with_prompt(permission: Permission, prompt_answer: Permission) -> Self {
        Self {
            state: Mutex::new(MemoryNotifierState {
                permission,
                prompt_answer,
                prompts: 0,
                shown: Vec::new(),
            }),
        }
    }

    /// Alerts displayed so far, oldest first.
    pub fn shown(&self) -> Vec<ShownAlert> {
        self.lock().shown.clone()
    }

    /// Remove and return all displayed alerts.
    pub fn drain(&self) -> Vec<ShownAlert> {
        std::mem::take(&mut self.lock().shown)
    }

    /// How many times permission was requested.
    pub fn prompts(&self) -> usize {
        self.lock().prompts
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryNotifierState> {
        // A panic while holding the guard cannot leave the list half-updated.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PlatformNotifier for MemoryNotifier {
    fn permission(&self) -> Permission {
        self.lock().permission
    }

    fn request_permission(&self) -> Permission {
        let mut state = self.lock();
        state.prompts += 1;
        if state.permission == Permission::Default {
            state.permission = state.prompt_answer;
        }
        state.permission
    }

    fn show(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.lock().shown.push(ShownAlert {
            title: title.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
