mod amount;
mod client;
mod clock;
mod ledger;
mod operation;
mod statement;

pub use amount::*;
pub use client::*;
pub use clock::*;
pub use ledger::*;
pub use operation::*;
pub use statement::*;
