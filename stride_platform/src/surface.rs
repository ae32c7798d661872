//! Foreground surface implementations.

use stride_traits::ForegroundSurface;

/// Renders the foreground notification as structured log lines. Stands in
/// for a real platform notification channel; the displayed content is
/// informational only.
pub struct LogSurface {
    title: String,
    text: String,
    established: bool,
}

impl LogSurface {
    /// `text` is a template; `{steps}` is replaced with the current count.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            established: false,
        }
    }
}

impl ForegroundSurface for LogSurface {
    fn establish(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Idempotent: re-establishing an existing surface is a no-op.
        if !self.established {
            tracing::info!(title = %self.title, "foreground surface established");
            self.established = true;
        }
        Ok(())
    }

    fn update(&mut self, steps_today: u32) {
        let body = self.text.replace("{steps}", &steps_today.to_string());
        tracing::info!(title = %self.title, notification = %body, "notification updated");
    }

    fn dismiss(&mut self) {
        if self.established {
            tracing::info!(title = %self.title, "foreground surface dismissed");
            self.established = false;
        }
    }
}
