//! Prompt theme and terminal styles shared by interactive prompts.

use console::{style, Style};
use dialoguer::theme::ColorfulTheme;

/// Returns a `ColorfulTheme` with webpipe's prompt styling.
///
/// Everything renders on stderr so stdout stays clean for piped data.
pub fn webpipe_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("?".to_string()).for_stderr().cyan(),
        prompt_style: Style::new().for_stderr().bold(),
        prompt_suffix: style("›".to_string()).for_stderr().bright().black(),
        active_item_prefix: style("▸".to_string()).for_stderr().cyan(),
        active_item_style: Style::new().for_stderr().cyan(),
        success_prefix: style("✓".to_string()).for_stderr().green(),
        success_suffix: style("·".to_string()).for_stderr().bright().black(),
        error_prefix: style("✗".to_string()).for_stderr().red(),
        error_style: Style::new().for_stderr().red(),
        values_style: Style::new().for_stderr().green(),
        ..ColorfulTheme::default()
    }
}

/// Whether prompts can be shown (stderr is an interactive terminal).
pub fn is_interactive() -> bool {
    console::Term::stderr().is_term()
}

pub fn dim() -> Style {
    Style::new().for_stderr().dim()
}

pub fn warn() -> Style {
    Style::new().for_stderr().yellow()
}
