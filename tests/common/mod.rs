// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use bank_ledger::application::BankService;
use bank_ledger::domain::{Amount, Clock};
use bank_ledger::render::{PrintStatementWriter, TabularStatementFormatter};
use bank_ledger::storage::SqliteRepository;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::TempDir;

pub type TestService =
    BankService<SqliteRepository, PrintStatementWriter<TabularStatementFormatter, SharedBuffer>, SteppingClock>;

/// Output sink whose clones share one buffer, so tests can read what the service printed.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Clock that moves forward by a fixed step every time it is read.
#[derive(Debug)]
pub struct SteppingClock {
    next: Mutex<NaiveDateTime>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: NaiveDateTime, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> NaiveDateTime {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + self.step;
        now
    }
}

/// Helper to create a test service with a temporary database.
/// The clock starts at 2024-01-01 00:00:00 and advances 10 minutes per reading.
pub async fn test_service() -> Result<(TestService, SharedBuffer, TempDir)> {
    test_service_with_clock(SteppingClock::new(
        parse_datetime("2024-01-01 00:00:00"),
        Duration::minutes(10),
    ))
    .await
}

pub async fn test_service_with_clock(
    clock: SteppingClock,
) -> Result<(TestService, SharedBuffer, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let repo = SqliteRepository::init(&format!("sqlite:{}?mode=rwc", db_path.display())).await?;

    let out = SharedBuffer::default();
    let writer = PrintStatementWriter::new(TabularStatementFormatter::new(), out.clone());

    Ok((BankService::new(repo, writer, clock), out, temp_dir))
}

/// Helper to parse a `YYYY-MM-DD HH:MM:SS` string
pub fn parse_datetime(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn parse_date(value: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

pub fn amount(value: &str) -> Amount {
    value.parse().unwrap()
}
