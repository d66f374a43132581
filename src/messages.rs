use std::path::Path;

use anstyle::{AnsiColor, Reset, RgbColor, Style};

/// Raw RGB accent shared by all informational output
pub const ACCENT_RGB: (u8, u8, u8) = (207, 106, 76);

const PRIMARY_COLOR: Style = Style::new().fg_color(Some(anstyle::Color::Rgb(RgbColor(
    ACCENT_RGB.0,
    ACCENT_RGB.1,
    ACCENT_RGB.2,
))));
const DIM: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::BrightBlack)));
const ERROR_COLOR: Style = Style::new().fg_color(Some(anstyle::Color::Ansi(AnsiColor::Red)));

fn paint(style: Style, text: &str, color: bool) -> String {
    if color {
        format!("{style}{text}{Reset}")
    } else {
        text.to_string()
    }
}

/// The line announcing which command runs where, e.g. `❱ npm run -w pkgs/foo build (in /ws)`.
#[must_use]
pub fn format_run_message(command_line: &str, root: &Path, color: bool) -> String {
    format!(
        "{} {} {}",
        paint(PRIMARY_COLOR, "❱", color),
        command_line,
        paint(DIM, &format!("(in {})", root.display()), color)
    )
}

/// A fatal error line, e.g. `✘ Failed to find workspace root`.
#[must_use]
pub fn format_error_message(message: &str, color: bool) -> String {
    format!("{} {message}", paint(ERROR_COLOR, "✘", color))
}
