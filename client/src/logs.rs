use std::fmt::Display;

use colored::{
    Color,
    Colorize,
};

#[derive(strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    fn color(&self) -> LogColor {
        match self {
            Self::Info => LogColor::Info,
            Self::Success => LogColor::Highlight,
            Self::Warning => LogColor::Warning,
            Self::Error => LogColor::Error,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum LogColor {
    Highlight,
    Label,
    Error,
    Warning,
    Info,
    Gray,
}

impl From<LogColor> for Color {
    fn from(value: LogColor) -> Color {
        match value {
            LogColor::Highlight => Color::TrueColor { r: 80, g: 200, b: 120 },
            LogColor::Label => Color::TrueColor { r: 90, g: 140, b: 200 },
            LogColor::Error => Color::TrueColor { r: 230, g: 60, b: 60 },
            LogColor::Warning => Color::TrueColor { r: 210, g: 140, b: 0 },
            LogColor::Info => Color::TrueColor { r: 70, g: 130, b: 220 },
            LogColor::Gray => Color::TrueColor { r: 160, g: 160, b: 160 },
        }
    }
}

fn log(level: Level, label: impl Display, msg: impl Display) {
    println!(
        "[{}] {} {}",
        level.to_string().color(level.color()),
        label.to_string().color(LogColor::Label),
        msg.to_string().bright_black()
    );
}

pub fn log_info(label: impl Display, msg: impl Display) {
    log(Level::Info, label, msg)
}

pub fn log_success(label: impl Display, msg: impl Display) {
    log(Level::Success, label, msg)
}

pub fn log_warning(label: impl Display, msg: impl Display) {
    log(Level::Warning, label, msg)
}

pub fn log_error(label: impl Display, msg: impl Display) {
    log(Level::Error, label, msg)
}

/// A bare key/value line, for summaries under a leveled header.
pub fn log_kv(key: impl Display, value: impl Display) {
    println!(
        "  {} {}",
        format!("{key}:").color(LogColor::Gray),
        value
    );
}

pub fn log_divider() {
    println!("--------------------------------------------------------------------------------");
}
