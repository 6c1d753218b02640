use colored::Colorize;
use rust_decimal::Decimal;
use std::fmt;
use std::io::IsTerminal;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
    Separator,
}

/// Turns colour off for pipes and `--no-color`.
pub fn configure_colors(disabled: bool) {
    if disabled || !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

fn label(kind: MessageKind) -> Option<&'static str> {
    match kind {
        MessageKind::Info => Some("INFO"),
        MessageKind::Success => Some("OK"),
        MessageKind::Warning => Some("WARNING"),
        MessageKind::Error => Some("ERROR"),
        MessageKind::Section | MessageKind::Separator => None,
    }
}

pub fn style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let base = match (kind, label(kind)) {
        (MessageKind::Section, _) => format!("=== {} ===", text.trim()),
        (MessageKind::Separator, _) => String::from("----------------------------------------"),
        (_, Some(label)) => format!("{label}: {text}"),
        (_, None) => text,
    };
    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info | MessageKind::Separator => base,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{formatted}"),
        MessageKind::Error => eprintln!("{formatted}"),
        _ => println!("{formatted}"),
    }
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn separator() {
    print(MessageKind::Separator, "");
}

/// Left-aligned label followed by a value, as used in summary blocks.
pub fn field(label: &str, value: impl fmt::Display) {
    println!("  {:<18} {}", format!("{label}:"), value);
}

/// Colours a right-minus-left difference: red when it moves the wrong way.
pub fn delta(value: Decimal, rendered: String, higher_is_worse: bool) -> String {
    if value.is_zero() {
        return rendered;
    }
    if (value > Decimal::ZERO) == higher_is_worse {
        rendered.red().to_string()
    } else {
        rendered.green().to_string()
    }
}
