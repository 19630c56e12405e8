use std::fmt;
use std::rc::Rc;

use serde::Serialize;

use crate::runtime::Clock;

/// Where an uncaught error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Window `error` event.
    Uncaught,
    /// Window `unhandledrejection` event.
    UnhandledRejection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Page the error happened on.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub url: String,
    pub user_agent: String,
}

/// One unexpected runtime error. Never shown to visitors.
///
/// Serializes to the payload shape an external collector expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub location: Option<SourceLocation>,
    pub stack: Option<String>,
    #[serde(flatten)]
    pub page: PageContext,
    pub observed_at_unix_millis: u64,
}

impl ErrorReport {
    pub fn uncaught(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Uncaught,
            message: message.into(),
            location: None,
            stack: None,
            page: PageContext::default(),
            observed_at_unix_millis: 0,
        }
    }

    pub fn unhandled_rejection(reason: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::UnhandledRejection,
            message: reason.into(),
            location: None,
            stack: None,
            page: PageContext::default(),
            observed_at_unix_millis: 0,
        }
    }

    /// Attaches a location; an empty file name means the host had none.
    pub fn at(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        let file = file.into();
        if !file.is_empty() {
            self.location = Some(SourceLocation { file, line, column });
        }
        self
    }

    /// Attaches a stack trace; blank traces are dropped.
    pub fn with_stack(mut self, stack: Option<String>) -> Self {
        self.stack = stack.filter(|stack| !stack.trim().is_empty());
        self
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.kind {
            ErrorKind::Uncaught => "uncaught error",
            ErrorKind::UnhandledRejection => "unhandled rejection",
        };
        write!(f, "{label}: {}", self.message)?;
        if let Some(location) = &self.location {
            write!(f, " ({}:{}:{})", location.file, location.line, location.column)?;
        }
        Ok(())
    }
}

/// Sink for unexpected runtime errors.
pub trait ErrorReporter {
    fn report(&self, report: &ErrorReport);
}

/// Writes reports to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, report: &ErrorReport) {
        tracing::error!(
            kind = ?report.kind,
            url = %report.page.url,
            at = report.observed_at_unix_millis,
            stack = report.stack.as_deref().unwrap_or_default(),
            "{}",
            report
        );
    }
}

/// Stamps reports with the page context and the time they were observed
/// before handing them to the configured reporter.
pub struct ErrorMonitor {
    reporter: Rc<dyn ErrorReporter>,
    clock: Rc<dyn Clock>,
    page: PageContext,
}

impl ErrorMonitor {
    pub fn new(reporter: Rc<dyn ErrorReporter>, clock: Rc<dyn Clock>, page: PageContext) -> Self {
        Self {
            reporter,
            clock,
            page,
        }
    }

    pub fn page(&self) -> &PageContext {
        &self.page
    }

    pub fn record(&self, mut report: ErrorReport) {
        report.page = self.page.clone();
        report.observed_at_unix_millis = self.clock.now_unix_millis();
        self.reporter.report(&report);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::runtime::testing::FixedClock;

    #[test]
    fn display_includes_location_when_known() {
        let report = ErrorReport::uncaught("x is not defined").at("main.js", 12, 7);
        assert_eq!(
            report.to_string(),
            "uncaught error: x is not defined (main.js:12:7)"
        );

        let report = ErrorReport::unhandled_rejection("timeout").at("", 0, 0);
        assert_eq!(report.location, None);
        assert_eq!(report.to_string(), "unhandled rejection: timeout");
    }

    #[derive(Default)]
    struct RecordingReporter {
        reports: RefCell<Vec<ErrorReport>>,
    }

    impl ErrorReporter for RecordingReporter {
        fn report(&self, report: &ErrorReport) {
            self.reports.borrow_mut().push(report.clone());
        }
    }

    fn monitor(reporter: &Rc<RecordingReporter>) -> ErrorMonitor {
        ErrorMonitor::new(
            reporter.clone(),
            Rc::new(FixedClock::at(1_700_000_000_000)),
            PageContext {
                url: "https://example.jp/about".to_string(),
                user_agent: "test-agent".to_string(),
            },
        )
    }

    #[test]
    fn monitor_stamps_page_and_time() {
        let reporter = Rc::new(RecordingReporter::default());
        let monitor = monitor(&reporter);

        monitor.record(
            ErrorReport::uncaught("x is not defined")
                .at("main.js", 3, 9)
                .with_stack(Some("ReferenceError\n    at main.js:3:9".to_string())),
        );
        monitor.record(ErrorReport::unhandled_rejection("timeout").with_stack(Some("  ".to_string())));

        let reports = reporter.reports.borrow();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].page.url, "https://example.jp/about");
        assert_eq!(reports[0].page.user_agent, "test-agent");
        assert_eq!(reports[0].observed_at_unix_millis, 1_700_000_000_000);
        assert!(reports[0].stack.as_deref().is_some_and(|stack| stack.starts_with("ReferenceError")));
        assert_eq!(reports[1].kind, ErrorKind::UnhandledRejection);
        assert_eq!(reports[1].stack, None);
    }

    #[test]
    fn report_serializes_as_flat_payload() {
        let reporter = Rc::new(RecordingReporter::default());
        monitor(&reporter).record(ErrorReport::uncaught("boom").at("app.js", 1, 2));

        let value = serde_json::to_value(&reporter.reports.borrow()[0]).unwrap();
        assert_eq!(value["kind"], "uncaught");
        assert_eq!(value["message"], "boom");
        assert_eq!(value["location"]["file"], "app.js");
        assert_eq!(value["userAgent"], "test-agent");
        assert_eq!(value["url"], "https://example.jp/about");
        assert_eq!(value["observedAtUnixMillis"], 1_700_000_000_000_u64);
        assert!(value["stack"].is_null());
    }
}
