//! Tracing subscriber for personalizer runs.
//!
//! Three kinds of event share one pipeline: stage headers, per-action
//! results, and everything else. Each is told apart by its target and
//! rendered once for the console and once for the run log. Structured
//! fields (`actions = 3`) are kept and appended as `key=value`.
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::sync::Mutex;

use tracing::Level;
use tracing::field::{Field, Visit};

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Target of stage headers.
pub(super) const STAGE_TARGET: &str = "personalizer::stage";

/// Target of per-action results, carrying `action` and `status` fields.
pub(super) const ACTION_TARGET: &str = "personalizer::action";

/// Message plus every other field of one event, in recording order.
#[derive(Debug, Default, PartialEq, Eq)]
struct EventFields {
    message: String,
    fields: Vec<(&'static str, String)>,
}

impl EventFields {
    fn of(event: &tracing::Event<'_>) -> Self {
        let mut fields = Self::default();
        event.record(&mut fields);
        fields
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// The message followed by ` key=value` for each field.
    fn line(&self) -> String {
        let mut out = self.message.clone();
        for (name, value) in &self.fields {
            let _ = write!(out, " {name}={value}");
        }
        out
    }
}

impl Visit for EventFields {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.fields.push((field.name(), format!("{value:?}")));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.fields.push((field.name(), value.to_string()));
        }
    }
}

/// `[status] action` with the optional detail, for action events.
fn action_line(fields: &EventFields) -> String {
    let status = fields.get("status").unwrap_or("?");
    let action = fields.get("action").unwrap_or("<unnamed>");
    match fields.get("detail") {
        Some(detail) => format!("[{status}] {action} ({detail})"),
        None => format!("[{status}] {action}"),
    }
}

/// Console rendering of one event, ANSI styled, without the newline.
fn console_line(level: Level, target: &str, fields: &EventFields) -> String {
    if target == ACTION_TARGET {
        let colour = match fields.get("status") {
            Some("ok") => "\x1b[32m",
            Some("failed") => "\x1b[31m",
            Some("skipped" | "stopped" | "unverified") => "\x1b[33m",
            _ => "\x1b[2m",
        };
        return format!("  {colour}{}\x1b[0m", action_line(fields));
    }
    let text = fields.line();
    match level {
        Level::ERROR => format!("\x1b[31mERROR\x1b[0m {text}"),
        Level::WARN => format!("\x1b[33mWARN\x1b[0m  {text}"),
        Level::INFO if target == STAGE_TARGET => format!("\x1b[1;34m==>\x1b[0m \x1b[1m{text}\x1b[0m"),
        Level::INFO => format!("  {text}"),
        _ => format!("  \x1b[2m{text}\x1b[0m"),
    }
}

/// Run log rendering of one event: plain text, after the timestamp.
fn file_line(level: Level, target: &str, fields: &EventFields) -> String {
    if target == ACTION_TARGET {
        return format!("    {}", action_line(fields));
    }
    let text = strip_ansi(&fields.line());
    match level {
        Level::INFO if target == STAGE_TARGET => format!("==> {text}"),
        Level::ERROR => format!("    [error] {text}"),
        Level::WARN => format!("    [warn] {text}"),
        Level::DEBUG | Level::TRACE => format!("    [debug] {text}"),
        _ => format!("    {text}"),
    }
}

/// Appends every event to the run log for one command.
///
/// Always records `DEBUG` and above, whatever the console verbosity.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Start a fresh log for `command` and return a layer appending to it.
    ///
    /// Returns `None` if the cache directory or file is unavailable.
    pub(super) fn new(command: &str) -> Option<Self> {
        let path = log_file_path(command)?;
        let version = option_env!("PERSONALIZER_VERSION")
            .unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!(
            "# Personalizer {version} {command} started {} UTC\n",
            format_utc_datetime(),
        );
        fs::write(&path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(&path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let metadata = event.metadata();
        let line = file_line(*metadata.level(), metadata.target(), &EventFields::of(event));
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "[{}] {line}", format_utc_time()).ok();
        }
    }
}

struct ConsoleFormat;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let line = console_line(*metadata.level(), metadata.target(), &EventFields::of(event));
        writeln!(writer, "{line}")
    }
}

/// Install the global [`tracing`] subscriber.
///
/// The console shows `INFO` and up on stdout, or `DEBUG` with `verbose`, which
/// also lists each action result as it happens. Warnings and errors go to
/// stderr. The run log at `$XDG_CACHE_HOME/personalizer/<command>.log`
/// always gets `DEBUG` and up. Call once at startup.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(make_writer)
        .with_filter(console_level);
    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}
