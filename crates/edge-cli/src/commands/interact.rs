use crate::theme::CliTheme;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};

pub fn confirm<T>(prompt: T, default: bool) -> Result<bool, std::io::Error>
where
    T: std::fmt::Display,
{
    let theme = CliTheme::default();
    Confirm::with_theme(&theme)
        .with_prompt(prompt.to_string())
        .default(default)
        .interact()
}

/// Spinner that becomes a no-op when output should stay quiet, e.g. in JSON
/// mode.
pub struct OptionalProgressBar {
    bar: Option<ProgressBar>,
}

impl OptionalProgressBar {
    pub fn new_spinner(visible: bool) -> Self {
        Self {
            bar: visible.then(ProgressBar::new_spinner),
        }
    }

    pub fn enable_steady_tick(&self, ms: core::time::Duration) {
        if let Some(pb) = self.bar.as_ref() {
            pb.enable_steady_tick(ms)
        }
    }

    pub fn set_style(&self, style: ProgressStyle) {
        if let Some(pb) = self.bar.as_ref() {
            pb.set_style(style)
        }
    }

    pub fn set_message(&self, msg: String) {
        if let Some(pb) = self.bar.as_ref() {
            pb.set_message(msg)
        }
    }

    pub fn finish_and_clear(&self) {
        if let Some(pb) = self.bar.as_ref() {
            pb.finish_and_clear()
        }
    }
}

pub fn start_spinner(msg: &str, visible: bool) -> OptionalProgressBar {
    let pb = OptionalProgressBar::new_spinner(visible);
    pb.enable_steady_tick(core::time::Duration::from_millis(200));

    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷", "✔"])
        .template("{spinner:.green} {msg}")
    {
        pb.set_style(style);
    }
    pb.set_message(msg.into());
    pb
}
