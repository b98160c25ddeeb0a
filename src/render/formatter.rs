use std::fmt;

use chrono::{NaiveDateTime, TimeZone, Utc};

use crate::domain::{
    Amount, Operation, Statement, current_balance, latest_operation, sort_most_recent_first,
};

const COLUMN_SEPARATOR: &str = " | ";
const FRAME_LEFT: &str = "| ";
const FRAME_RIGHT: &str = " |";

/// strftime equivalent of `dd-MM-yyyy HH:mm:ss`.
const DATE_FORMAT: &str = "%d-%m-%Y %H:%M:%S";
/// Rendered width of [`DATE_FORMAT`].
const DATE_TIME_LENGTH: usize = 19;
const OPERATION_TYPE_LENGTH: usize = 10;
const AMOUNT_LENGTH: usize = 24;

const LINE_LENGTH: usize =
    OPERATION_TYPE_LENGTH + DATE_TIME_LENGTH + AMOUNT_LENGTH + COLUMN_SEPARATOR.len() * 2;

/// Turns a statement into display lines.
pub trait StatementFormatter {
    fn format(&self, statement: &Statement) -> Vec<String>;
}

/// Fixed-width table, every line framed by `| ` and ` |`.
///
/// ```text
/// | ----------------------------------------------------------- |
/// | STATEMENT OF ACCOUNT N°00000000-0000-0000-0000-000000000000 |
/// |                     01-01-2024 00:00:00                     |
/// |                         BALANCE 0.00                        |
/// | ----------------------------------------------------------- |
/// ```
///
/// Non-empty statements continue with a `TYPE | DATE | AMOUNT` table, newest operation first.
/// Dates are stored as UTC and shown in `zone` (UTC unless built with [`Self::in_zone`]).
#[derive(Debug, Clone, Copy)]
pub struct TabularStatementFormatter<Z = Utc> {
    zone: Z,
}

impl TabularStatementFormatter {
    pub fn new() -> Self {
        Self { zone: Utc }
    }
}

impl Default for TabularStatementFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl<Z> TabularStatementFormatter<Z>
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    pub fn in_zone(zone: Z) -> Self {
        Self { zone }
    }

    fn format_date(&self, date: &NaiveDateTime) -> String {
        self.zone
            .from_utc_datetime(date)
            .format(DATE_FORMAT)
            .to_string()
    }

    fn build_headers(&self, statement: &Statement) -> Vec<String> {
        let title = format!("STATEMENT OF ACCOUNT N°{}", statement.account_id);
        let date = self.format_date(&statement.date);
        let balance = format!(
            "BALANCE {}",
            statement_balance(statement).to_currency_string()
        );

        [separator(), title, date, balance]
            .iter()
            .map(|line| frame(&center(line, LINE_LENGTH)))
            .collect()
    }

    fn format_operation(&self, operation: &Operation) -> String {
        let date = self.format_date(&operation.date);
        [
            left(operation.operation_type.as_str(), OPERATION_TYPE_LENGTH),
            center(&date, DATE_TIME_LENGTH),
            right(&operation.amount.to_currency_string(), AMOUNT_LENGTH),
        ]
        .join(COLUMN_SEPARATOR)
    }
}

impl<Z> StatementFormatter for TabularStatementFormatter<Z>
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    fn format(&self, statement: &Statement) -> Vec<String> {
        let mut lines = self.build_headers(statement);
        lines.push(frame(&separator()));

        if !statement.is_empty() {
            lines.push(frame(&operations_header()));
            lines.push(frame(&separator()));

            let mut operations = statement.operations.clone();
            sort_most_recent_first(&mut operations);
            lines.extend(
                operations
                    .iter()
                    .map(|operation| frame(&self.format_operation(operation))),
            );

            lines.push(frame(&separator()));
        }

        lines
    }
}

fn separator() -> String {
    "-".repeat(LINE_LENGTH)
}

/// Balance of the latest operation by date, not of the last one listed.
fn statement_balance(statement: &Statement) -> Amount {
    current_balance(latest_operation(&statement.operations))
}

fn operations_header() -> String {
    [
        left("TYPE", OPERATION_TYPE_LENGTH),
        center("DATE", DATE_TIME_LENGTH),
        right("AMOUNT", AMOUNT_LENGTH),
    ]
    .join(COLUMN_SEPARATOR)
}

fn frame(value: &str) -> String {
    format!("{FRAME_LEFT}{value}{FRAME_RIGHT}")
}

// std width padding counts chars, so `°` takes a single column
fn left(value: &str, width: usize) -> String {
    format!("{value:<width$}")
}

fn right(value: &str, width: usize) -> String {
    format!("{value:>width$}")
}

/// Centers `value` in `width` columns. Odd padding first appends one space to the
/// value, then left-pads by half of the (now even) padding and fills the rest on
/// the right. Values at least `width` long are returned unchanged.
fn center(value: &str, width: usize) -> String {
    let length = value.chars().count();
    if length >= width {
        return value.to_string();
    }

    let mut value = value.to_string();
    let mut remaining = width - length;
    if remaining % 2 == 1 {
        remaining += 1;
        value.push(' ');
    }

    let left_padded = format!("{}{}", " ".repeat(remaining / 2), value);
    format!("{:<width$}", left_padded)
}
