// Presentation of account statements: pure formatting plus an output sink.

mod formatter;
mod writer;

pub use formatter::*;
pub use writer::*;
