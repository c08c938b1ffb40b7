use dialoguer::console::{style, Style, StyledObject};
use dialoguer::theme::Theme;
use std::fmt;
use std::io::IsTerminal;

/// Colour is disabled when `NO_COLOR` or `EDGE_NO_COLOR` is set, or when
/// `TERM=dumb`.
fn has_color_env_vars() -> bool {
    std::env::var("NO_COLOR").is_ok()
        || std::env::var("EDGE_NO_COLOR").is_ok()
        || std::env::var("TERM")
            .map(|term_mode| term_mode == "dumb")
            .unwrap_or(false)
}

/// Prompt styling for the confirmation prompts the CLI shows on stderr.
pub struct CliTheme {
    pub prompt_style: Style,
    pub prompt_prefix: StyledObject<String>,
    pub prompt_suffix: StyledObject<String>,
    pub success_prefix: StyledObject<String>,
    pub success_suffix: StyledObject<String>,
    pub error_prefix: StyledObject<String>,
    pub error_style: Style,
    pub hint_style: Style,
    pub values_style: Style,
}

impl Default for CliTheme {
    fn default() -> CliTheme {
        if !std::io::stderr().is_terminal() || has_color_env_vars() {
            CliTheme {
                prompt_style: Style::new().for_stderr(),
                prompt_prefix: style("?".to_string()).for_stderr(),
                prompt_suffix: style("›".to_string()).for_stderr(),
                success_prefix: style("✔".to_string()).for_stderr(),
                success_suffix: style("·".to_string()).for_stderr(),
                error_prefix: style("✘".to_string()).for_stderr(),
                error_style: Style::new().for_stderr(),
                hint_style: Style::new().for_stderr(),
                values_style: Style::new().for_stderr(),
            }
        } else {
            CliTheme {
                prompt_style: Style::new().for_stderr().bold(),
                prompt_prefix: style("?".to_string()).for_stderr().yellow(),
                prompt_suffix: style("›".to_string()).for_stderr().black().bright(),
                success_prefix: style("✔".to_string()).for_stderr().green(),
                success_suffix: style("·".to_string()).for_stderr().black().bright(),
                error_prefix: style("✘".to_string()).for_stderr().red(),
                error_style: Style::new().for_stderr().red(),
                hint_style: Style::new().for_stderr().black().bright(),
                values_style: Style::new().for_stderr().cyan(),
            }
        }
    }
}

impl Theme for CliTheme {
    fn format_prompt(&self, f: &mut dyn fmt::Write, prompt: &str) -> fmt::Result {
        if !prompt.is_empty() {
            write!(
                f,
                "{} {} ",
                &self.prompt_prefix,
                self.prompt_style.apply_to(prompt)
            )?;
        }

        write!(f, "{}", &self.prompt_suffix)
    }

    fn format_error(&self, f: &mut dyn fmt::Write, err: &str) -> fmt::Result {
        write!(
            f,
            "{} {}",
            &self.error_prefix,
            self.error_style.apply_to(err)
        )
    }

    fn format_confirm_prompt(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        default: Option<bool>,
    ) -> fmt::Result {
        if !prompt.is_empty() {
            write!(
                f,
                "{} {} ",
                &self.prompt_prefix,
                self.prompt_style.apply_to(prompt)
            )?;
        }

        let hint = match default {
            None => "(y/n)",
            Some(true) => "(Y/n)",
            Some(false) => "(y/N)",
        };
        write!(
            f,
            "{} {}",
            self.hint_style.apply_to(hint),
            &self.prompt_suffix
        )
    }

    fn format_confirm_prompt_selection(
        &self,
        f: &mut dyn fmt::Write,
        prompt: &str,
        selection: Option<bool>,
    ) -> fmt::Result {
        if !prompt.is_empty() {
            write!(
                f,
                "{} {} ",
                &self.success_prefix,
                self.prompt_style.apply_to(prompt)
            )?;
        }

        match selection.map(|b| if b { "yes" } else { "no" }) {
            Some(selection) => write!(
                f,
                "{} {}",
                &self.success_suffix,
                self.values_style.apply_to(selection)
            ),
            None => write!(f, "{}", &self.success_suffix),
        }
    }
}
