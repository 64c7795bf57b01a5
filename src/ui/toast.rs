/// Default time a toast stays on screen.
pub const TOAST_DURATION_MS: u64 = 2500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn info(message: impl Into<String>) -> Self {
        Toast {
            level: ToastLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Toast {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// One-line transient feedback. A single slot: showing a toast while one
/// is live replaces it and restarts the timer.
#[derive(Debug, Default)]
pub struct ToastHost {
    live: Option<(Toast, u64)>,
}

impl ToastHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, toast: Toast, now_ms: u64) {
        self.live = Some((toast, now_ms + TOAST_DURATION_MS));
    }

    /// Expires the live toast once its deadline passes.
    pub fn tick(&mut self, now_ms: u64) {
        if let Some((_, deadline)) = &self.live {
            if now_ms >= *deadline {
                self.live = None;
            }
        }
    }

    pub fn current(&self) -> Option<&Toast> {
        self.live.as_ref().map(|(toast, _)| toast)
    }
}
