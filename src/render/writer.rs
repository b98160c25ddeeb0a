use std::io::{self, Write};
use std::sync::Mutex;

use crate::domain::Statement;

use super::StatementFormatter;

/// Sink for account statements.
pub trait StatementWriter {
    fn write(&self, statement: &Statement) -> io::Result<()>;
}

/// Formats a statement and prints each line, in order, to the wrapped output.
#[derive(Debug)]
pub struct PrintStatementWriter<F, W> {
    formatter: F,
    out: Mutex<W>,
}

impl<F: StatementFormatter, W: Write> PrintStatementWriter<F, W> {
    pub fn new(formatter: F, out: W) -> Self {
        Self {
            formatter,
            out: Mutex::new(out),
        }
    }

    /// Give back the output, e.g. to inspect a buffer.
    pub fn into_inner(self) -> io::Result<W> {
        self.out
            .into_inner()
            .map_err(|_| io::Error::other("statement output lock poisoned"))
    }
}

impl<F: StatementFormatter, W: Write> StatementWriter for PrintStatementWriter<F, W> {
    fn write(&self, statement: &Statement) -> io::Result<()> {
        let lines = self.formatter.format(statement);
        if lines.is_empty() {
            return Ok(());
        }

        let mut out = self
            .out
            .lock()
            .map_err(|_| io::Error::other("statement output lock poisoned"))?;
        for line in &lines {
            writeln!(out, "{}", line)?;
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use chrono::NaiveDate;
    use uuid::Uuid;

    use super::*;

    struct CannedFormatter {
        lines: Vec<String>,
        calls: Cell<usize>,
    }

    impl CannedFormatter {
        fn new(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                calls: Cell::new(0),
            }
        }
    }

    impl StatementFormatter for &CannedFormatter {
        fn format(&self, _statement: &Statement) -> Vec<String> {
            self.calls.set(self.calls.get() + 1);
            self.lines.clone()
        }
    }

    fn statement() -> Statement {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Statement::new(Uuid::new_v4(), Vec::new(), date)
    }

    #[test]
    fn test_writes_nothing_when_formatter_yields_nothing() {
        let formatter = CannedFormatter::new(&[]);
        let writer = PrintStatementWriter::new(&formatter, Vec::new());

        writer.write(&statement()).unwrap();

        assert_eq!(formatter.calls.get(), 1);
        assert!(writer.into_inner().unwrap().is_empty());
    }

    #[test]
    fn test_writes_single_line() {
        let formatter = CannedFormatter::new(&["hello world"]);
        let writer = PrintStatementWriter::new(&formatter, Vec::new());

        writer.write(&statement()).unwrap();

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out, "hello world\n");
    }

    #[test]
    fn test_writes_lines_in_order() {
        let formatter = CannedFormatter::new(&["hello", "world"]);
        let writer = PrintStatementWriter::new(&formatter, Vec::new());

        writer.write(&statement()).unwrap();

        let out = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        assert_eq!(out, "hello\nworld\n");
        assert_eq!(formatter.calls.get(), 1);
    }
}
