//! Terminal output for the wright CLI.
//!
//! Status lines start with a colored symbol. Success and info go to stdout;
//! warnings and errors go to stderr so `--json` output stays parseable.

use std::time::Duration;

use anyhow::Context;
use owo_colors::{AnsiColors, OwoColorize, Stream};

pub mod symbols {
  pub const SUCCESS: &str = "✓";
  pub const ERROR: &str = "✗";
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";
  pub const ARROW: &str = "→";
}

#[derive(Debug, Clone, Copy)]
enum Status {
  Success,
  Error,
  Warning,
  Info,
}

impl Status {
  fn symbol(self) -> &'static str {
    match self {
      Status::Success => symbols::SUCCESS,
      Status::Error => symbols::ERROR,
      Status::Warning => symbols::WARNING,
      Status::Info => symbols::INFO,
    }
  }

  fn color(self) -> AnsiColors {
    match self {
      Status::Success => AnsiColors::Green,
      Status::Error => AnsiColors::Red,
      Status::Warning => AnsiColors::Yellow,
      Status::Info => AnsiColors::Blue,
    }
  }

  fn stream(self) -> Stream {
    match self {
      Status::Success | Status::Info => Stream::Stdout,
      Status::Error | Status::Warning => Stream::Stderr,
    }
  }
}

fn print_status(status: Status, message: &str) {
  let stream = status.stream();
  let color = status.color();
  let symbol = status.symbol();
  let colored = symbol.if_supports_color(stream, |s| s.color(color));

  match stream {
    Stream::Stdout => println!("{} {}", colored, message),
    // problems color the whole line
    _ => eprintln!("{} {}", colored, message.if_supports_color(stream, |s| s.color(color))),
  }
}

pub fn print_success(message: &str) {
  print_status(Status::Success, message);
}

pub fn print_error(message: &str) {
  print_status(Status::Error, message);
}

pub fn print_warning(message: &str) {
  print_status(Status::Warning, message);
}

pub fn print_info(message: &str) {
  print_status(Status::Info, message);
}

/// One entry of a listing, e.g. a task name.
pub fn print_item(item: &str) {
  println!(
    "  {} {}",
    symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    item
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
  println!("{}", json);
  Ok(())
}

/// Short human-readable duration: `50ms`, `1.50s`, `2m 5s`.
pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  match secs {
    0 => format!("{}ms", duration.subsec_millis()),
    1..60 => format!("{}.{:02}s", secs, duration.subsec_millis() / 10),
    _ => format!("{}m {}s", secs / 60, secs % 60),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn durations() {
    assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
    assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
    assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
  }

  #[test]
  fn problems_go_to_stderr() {
    assert!(matches!(Status::Error.stream(), Stream::Stderr));
    assert!(matches!(Status::Warning.stream(), Stream::Stderr));
    assert!(matches!(Status::Success.stream(), Stream::Stdout));
  }

  #[test]
  fn every_status_prints() {
    for status in [Status::Success, Status::Error, Status::Warning, Status::Info] {
      print_status(status, "message");
    }
  }
}
