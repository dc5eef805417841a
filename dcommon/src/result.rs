use std::io::Write;

/// A message to be displayed to the user, such as an error or warning.
///
/// Reports carry no source spans: declarations are checked from already-structured input,
/// so a report names the declaration it concerns in its message instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The severity of the report.
    pub kind: ReportKind,
    /// A short machine-readable identifier, such as `sort-depends-on-indices`.
    pub code: Option<String>,
    /// The message to display to the user, if present.
    pub message: Option<String>,
    /// A final note to display to the user, if present.
    pub note: Option<String>,
}

impl Report {
    pub fn new(kind: ReportKind) -> Self {
        Self {
            kind,
            code: None,
            message: None,
            note: None,
        }
    }

    pub fn with_code(mut self, code: impl ToString) -> Self {
        self.code = Some(code.to_string());
        self
    }

    pub fn with_message(mut self, message: impl ToString) -> Self {
        self.message = Some(message.to_string());
        self
    }

    pub fn with_note(mut self, note: impl ToString) -> Self {
        self.note = Some(note.to_string());
        self
    }

    /// Writes this report to the given stream.
    /// With the `console` feature, the severity is coloured if the terminal supports it.
    pub fn render(&self, mut stream: impl Write) -> std::io::Result<()> {
        let severity = match self.kind {
            ReportKind::Error => "error",
            ReportKind::Warning => "warning",
        };
        #[cfg(feature = "console")]
        let severity = {
            let style = match self.kind {
                ReportKind::Error => console::Style::new().red().bold(),
                ReportKind::Warning => console::Style::new().yellow().bold(),
            };
            style.for_stderr().apply_to(severity).to_string()
        };

        write!(stream, "{}", severity)?;
        if let Some(code) = &self.code {
            write!(stream, "[{}]", code)?;
        }
        match &self.message {
            Some(message) => writeln!(stream, ": {}", message)?,
            None => writeln!(stream)?,
        }
        if let Some(note) = &self.note {
            writeln!(stream, "  = note: {}", note)?;
        }
        Ok(())
    }
}

/// <https://rustc-dev-guide.rust-lang.org/diagnostics.html#diagnostic-levels>
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Error,
    Warning,
}

/// Short for "diagnostic result".
///
/// A module keeps being checked after one of its declarations fails,
/// so we need a result type that can carry error reports while still
/// retaining an 'Ok' state, as far as the rest of the code is aware.
///
/// If no reports are provided, this does not allocate, and has roughly the same cost as a normal `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "errors must be reported to the user"]
pub struct Dr<T> {
    /// If this is `None`, then the computation failed. Error messages will be contained inside `reports`.
    /// If this is `Some`, then the computation succeeded, but there may still be some messages (e.g. warnings
    /// or errors) inside `reports`.
    value: Option<T>,
    reports: Vec<Report>,
}

impl<T> Dr<T> {
    /// The computation succeeded with no messages.
    pub fn ok(value: T) -> Self {
        Self {
            value: Some(value),
            reports: Vec::new(),
        }
    }

    /// The computation failed. An error message is mandatory if the computation failed.
    pub fn fail(report: Report) -> Self {
        assert!(report.kind == ReportKind::Error);
        Self {
            value: None,
            reports: vec![report],
        }
    }

    /// Apply an infallible operation to the value inside this result. If the operation could fail, use [`Dr::bind`] instead.
    pub fn map<F, U>(self, f: F) -> Dr<U>
    where
        F: FnOnce(T) -> U,
    {
        Dr {
            value: self.value.map(f),
            reports: self.reports,
        }
    }

    /// A monadic bind operation that consumes this diagnostic result and uses the value it contains, if it exists,
    /// to produce a new diagnostic result.
    pub fn bind<F, U>(mut self, f: F) -> Dr<U>
    where
        F: FnOnce(T) -> Dr<U>,
    {
        match self.value {
            Some(value) => {
                let mut result = f(value);
                self.reports.append(&mut result.reports);
                Dr {
                    value: result.value,
                    reports: self.reports,
                }
            }
            None => Dr {
                value: None,
                reports: self.reports,
            },
        }
    }

    /// Appends a report to this diagnostic result, regardless of whether the result succeeded or failed.
    pub fn with(mut self, report: Report) -> Self {
        self.reports.push(report);
        self
    }

    /// Converts a failed diagnostic into a successful diagnostic by wrapping
    /// the contained value in an `Option`.
    pub fn unfail(self) -> Dr<Option<T>> {
        Dr {
            value: Some(self.value),
            reports: self.reports,
        }
    }

    /// Combines a list of diagnostic results into a single result by binding them all together.
    /// Any failed diagnostics will be excluded from the output, but their error messages will remain.
    /// Therefore, this function will never fail - it might just produce an empty list as its output.
    pub fn sequence_unfail(results: impl IntoIterator<Item = Dr<T>>) -> Dr<Vec<T>> {
        results.into_iter().fold(Dr::ok(Vec::new()), |acc, i| {
            acc.bind(|mut list| {
                i.unfail().bind(|i| {
                    if let Some(i) = i {
                        list.push(i);
                    }
                    Dr::ok(list)
                })
            })
        })
    }

    /// Returns true if there was an error report.
    /// A result without a value always has one.
    pub fn errored(&self) -> bool {
        self.reports
            .iter()
            .any(|report| report.kind == ReportKind::Error)
    }

    /// Retrieves the value for inspection.
    pub fn value(&self) -> &Option<T> {
        &self.value
    }

    /// Retrieves the list of reports.
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    /// If there were any errors, panic.
    /// Useful for tests.
    pub fn assert_ok(&self) {
        if self.errored() {
            panic!("diagnostic result contained errors: {:#?}", self.reports);
        }
    }

    /// If there were no errors, return the underlying value.
    /// Useful for tests.
    pub fn unwrap(self) -> T {
        self.assert_ok();
        match self.value {
            Some(value) => value,
            None => panic!("diagnostic result failed without an error report"),
        }
    }

    /// If there were no errors, panic.
    /// Useful for tests.
    pub fn assert_errored(&self) {
        if !self.errored() {
            panic!(
                "diagnostic result was supposed to contain errors, reports were: {:#?}",
                self.reports
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn sequence_keeps_errors_of_failed_items() {
        let results = vec![
            Dr::ok(1),
            Dr::fail(Report::new(ReportKind::Error).with_code("boom")),
            Dr::ok(3).with(Report::new(ReportKind::Warning)),
        ];
        let combined = Dr::sequence_unfail(results);
        assert!(combined.errored());
        assert_eq!(combined.value(), &Some(vec![1, 3]));
        assert_eq!(combined.reports().len(), 2);
    }

    #[test]
    fn bind_stops_at_failure_but_keeps_reports() {
        let warned = Dr::ok(2).with(Report::new(ReportKind::Warning).with_code("first"));
        let doubled = warned.bind(|value| Dr::ok(value * 2));
        assert_eq!(doubled.value(), &Some(4));
        assert_eq!(doubled.reports().len(), 1);

        let failed: Dr<i32> = Dr::fail(Report::new(ReportKind::Error).with_code("boom"));
        let skipped = failed.bind(|_| -> Dr<i32> { panic!("bound a failed result") });
        assert_eq!(skipped.value(), &None);
        assert_eq!(skipped.reports()[0].code.as_deref(), Some("boom"));
    }

    #[test]
    fn render_includes_code_and_note() {
        let report = Report::new(ReportKind::Error)
            .with_code("prop-must-be-singleton")
            .with_message("datatype `Two` lives in Prop")
            .with_note("it has 2 constructors");
        let mut out = Vec::new();
        report.render(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[prop-must-be-singleton]"));
        assert!(text.contains("note: it has 2 constructors"));
    }
}
