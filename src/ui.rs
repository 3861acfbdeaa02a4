use crate::notification::{Notification, Variant};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use parking_lot::Mutex;
use std::fmt::Write;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// Studio palette
// ═══════════════════════════════════════════════════════════════════════════════

// RGB tuple constants for use with the `colored` crate's `.truecolor()` method
pub mod rgb {
    pub const ELECTRIC_PURPLE: (u8, u8, u8) = (225, 53, 255);
    pub const NEON_CYAN: (u8, u8, u8) = (128, 255, 234);
    pub const CORAL: (u8, u8, u8) = (255, 106, 193);
    pub const ELECTRIC_YELLOW: (u8, u8, u8) = (241, 250, 140);
    pub const SUCCESS_GREEN: (u8, u8, u8) = (80, 250, 123);
    pub const ERROR_RED: (u8, u8, u8) = (255, 99, 99);
    pub const DIM_WHITE: (u8, u8, u8) = (180, 180, 190);
    pub const DEEP_PURPLE: (u8, u8, u8) = (189, 147, 249);
}

/// Track quiet mode state
static QUIET_MODE: std::sync::LazyLock<Mutex<bool>> =
    std::sync::LazyLock::new(|| Mutex::new(false));

/// Width used when wrapping assistant replies
const WRAP_WIDTH: usize = 88;

/// Enable or disable quiet mode
pub fn set_quiet_mode(enabled: bool) {
    *QUIET_MODE.lock() = enabled;
}

/// Check if quiet mode is enabled
pub fn is_quiet_mode() -> bool {
    *QUIET_MODE.lock()
}

pub fn create_spinner(message: &str) -> ProgressBar {
    if is_quiet_mode() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("✦✧✶✷✸✹✺✻✼✽")
            .template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn print_info(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.cyan().bold());
    }
}

pub fn print_warning(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.yellow().bold());
    }
}

pub fn print_error(message: &str) {
    // Errors print even in quiet mode
    let (r, g, b) = rgb::ERROR_RED;
    eprintln!("{}", message.truecolor(r, g, b).bold());
}

pub fn print_success(message: &str) {
    if !is_quiet_mode() {
        println!("{}", message.green().bold());
    }
}

pub fn print_version(version: &str) {
    if !is_quiet_mode() {
        println!(
            "🔮 {} {} {}",
            gradient_text("AI Studio"),
            "version".cyan(),
            version.green()
        );
    }
}

/// Print a notification the way the web UI would toast it
pub fn print_notification(notification: &Notification) {
    match notification.variant {
        Variant::Destructive => {
            if notification.description.is_empty() {
                print_error(&notification.title);
            } else {
                print_error(&format!("{}: {}", notification.title, notification.description));
            }
        }
        Variant::Default => {
            if is_quiet_mode() {
                return;
            }
            let (r, g, b) = rgb::SUCCESS_GREEN;
            let (dr, dg, db) = rgb::DIM_WHITE;
            if notification.description.is_empty() {
                println!("{}", notification.title.truecolor(r, g, b).bold());
            } else {
                println!(
                    "{} {}",
                    notification.title.truecolor(r, g, b).bold(),
                    notification.description.truecolor(dr, dg, db)
                );
            }
        }
    }
}

/// Print an assistant reply, wrapping prose but leaving code fences intact
pub fn print_reply(label: &str, reply: &str) {
    let (r, g, b) = rgb::ELECTRIC_PURPLE;
    println!("{}", label.truecolor(r, g, b).bold());
    println!("{}", wrap_reply(reply, WRAP_WIDTH));
}

/// Wrap the prose lines of `reply` to `width`, copying fenced code verbatim
pub fn wrap_reply(reply: &str, width: usize) -> String {
    let mut out = String::with_capacity(reply.len());
    let mut in_fence = false;
    for (i, line) in reply.split('\n').enumerate() {
        if i > 0 {
            out.push('\n');
        }
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            out.push_str(line);
        } else if in_fence || line.is_empty() {
            out.push_str(line);
        } else {
            out.push_str(&textwrap::fill(line, width));
        }
    }
    out
}

/// Print a simple message (respects quiet mode)
pub fn print_message(message: &str) {
    if !is_quiet_mode() {
        println!("{message}");
    }
}

/// Print an empty line (respects quiet mode)
pub fn print_newline() {
    if !is_quiet_mode() {
        println!();
    }
}

/// Color at `step` of `steps` on the line from `from` to `to`
fn blend(from: (u8, u8, u8), to: (u8, u8, u8), step: usize, steps: usize) -> (u8, u8, u8) {
    if steps <= 1 {
        return from;
    }
    let span = steps - 1;
    let mix = |a: u8, b: u8| {
        let (a, b) = (usize::from(a), usize::from(b));
        let value = (a * (span - step) + b * step) / span;
        u8::try_from(value).unwrap_or(u8::MAX)
    };
    (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Each character of `text` shaded from Electric Purple to Neon Cyan
pub fn gradient_text(text: &str) -> String {
    let steps = text.chars().count();
    text.chars()
        .enumerate()
        .fold(String::new(), |mut out, (i, c)| {
            let (r, g, b) = blend(rgb::ELECTRIC_PURPLE, rgb::NEON_CYAN, i, steps);
            let _ = write!(out, "{}", c.to_string().truecolor(r, g, b));
            out
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_reply_keeps_code_fences() {
        let reply = "Here's an example related to coding:\n\n```python\ndef fibonacci(n):\n    a, b = 0, 1\n```\n\nDone.";
        assert_eq!(wrap_reply(reply, 10).matches("```").count(), 2);
        assert!(wrap_reply(reply, 10).contains("    a, b = 0, 1"));
    }

    #[test]
    fn test_wrap_reply_wraps_prose() {
        let wrapped = wrap_reply("one two three four five", 9);
        assert!(wrapped.lines().all(|l| l.chars().count() <= 9));
    }

    #[test]
    fn test_gradient_empty_text() {
        assert!(gradient_text("").is_empty());
    }

    #[test]
    fn test_blend_endpoints() {
        let (from, to) = (rgb::ELECTRIC_PURPLE, rgb::NEON_CYAN);
        assert_eq!(blend(from, to, 0, 9), from);
        assert_eq!(blend(from, to, 8, 9), to);
        assert_eq!(blend(from, to, 0, 1), from);
        assert_eq!(blend((0, 0, 0), (200, 100, 50), 1, 3), (100, 50, 25));
    }
}
