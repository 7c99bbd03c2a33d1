//! ---
//! osr_section: "03-logging"
//! osr_subsection: "module"
//! osr_type: "source"
//! osr_scope: "code"
//! osr_description: "Structured logging context and helpers."
//! osr_version: "v0.1.0"
//! osr_owner: "tbd"
//! ---
#![warn(missing_docs)]

use tracing::Level;

pub mod macros;

/// Structured logging context propagated by the convenience macros.
#[derive(Debug, Default, Clone)]
pub struct LogContext<'a> {
    /// Regression test name (e.g. `absorption_chillers`).
    pub test: Option<&'a str>,
    /// OpenStudio version of the result being processed.
    pub version: Option<&'a str>,
    /// Custom tag of the result file, when present.
    pub tag: Option<&'a str>,
    /// CLI command driving the work.
    pub command: Option<&'a str>,
}

impl<'a> LogContext<'a> {
    /// Create an empty logging context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a test name.
    pub fn with_test(mut self, test: &'a str) -> Self {
        self.test = Some(test);
        self
    }

    /// Attach an OpenStudio version.
    pub fn with_version(mut self, version: &'a str) -> Self {
        self.version = Some(version);
        self
    }

    /// Attach a custom tag.
    pub fn with_tag(mut self, tag: &'a str) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Attach the command name.
    pub fn with_command(mut self, command: &'a str) -> Self {
        self.command = Some(command);
        self
    }
}

/// Outcome used when emitting report lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// The step completed and produced its artefact.
    Success,
    /// The step failed; the command is about to abort.
    Fault,
}

impl ReportOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            ReportOutcome::Success => "success",
            ReportOutcome::Fault => "fault",
        }
    }

    fn level(&self) -> Level {
        match self {
            ReportOutcome::Success => Level::INFO,
            ReportOutcome::Fault => Level::ERROR,
        }
    }
}

/// Emit a standardized report event with a success/fault outcome.
pub fn log_report_event(
    context: Option<&LogContext>,
    event: &str,
    message: &str,
    outcome: ReportOutcome,
) {
    let ctx = context.cloned().unwrap_or_default();
    // tracing::event! needs a const level, hence the match.
    match outcome.level() {
        Level::ERROR => tracing::event!(
            Level::ERROR,
            event,
            outcome = outcome.as_str(),
            test = ctx.test.unwrap_or(""),
            version = ctx.version.unwrap_or(""),
            tag = ctx.tag.unwrap_or(""),
            command = ctx.command.unwrap_or(""),
            message = %message
        ),
        _ => tracing::event!(
            Level::INFO,
            event,
            outcome = outcome.as_str(),
            test = ctx.test.unwrap_or(""),
            version = ctx.version.unwrap_or(""),
            tag = ctx.tag.unwrap_or(""),
            command = ctx.command.unwrap_or(""),
            message = %message
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::{fmt as subscriber_fmt, prelude::*, EnvFilter, Registry};

    fn init() {
        let _ = Registry::default()
            .with(EnvFilter::new("debug"))
            .with(subscriber_fmt::layer().with_test_writer())
            .try_init();
    }

    #[test]
    fn macros_emit_without_panic() {
        init();
        let ctx = LogContext::new()
            .with_test("baseline_sys01")
            .with_version("3.7.0");
        osr_info!(context = ctx.clone(), "parsed result file");
        osr_debug!("debug message");
        osr_warn!(context = ctx, "no openstudio_results step in {}", "x.osw");
    }

    #[test]
    fn report_event_helper_emits() {
        init();
        let ctx = LogContext::new().with_command("heatmap");
        log_report_event(
            Some(&ctx),
            "report.heatmap",
            "heatmap written",
            ReportOutcome::Success,
        );
        log_report_event(None, "report.heatmap", "render failed", ReportOutcome::Fault);
    }
}
