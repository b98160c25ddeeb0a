use super::{Amount, Operation};

/// Most recent operation by date. On equal dates the first one encountered wins.
pub fn latest_operation(operations: &[Operation]) -> Option<&Operation> {
    operations.iter().reduce(|latest, operation| {
        if operation.date > latest.date {
            operation
        } else {
            latest
        }
    })
}

/// Balance carried by the latest operation, or zero for an empty ledger.
/// The balance is never stored anywhere else: the log is the source of truth.
pub fn current_balance(latest: Option<&Operation>) -> Amount {
    latest
        .map(|operation| operation.balance.clone())
        .unwrap_or_else(Amount::zero)
}

/// Stable sort, newest first. Operations sharing a date keep their relative order.
pub fn sort_most_recent_first(operations: &mut [Operation]) {
    operations.sort_by(|a, b| b.date.cmp(&a.date));
}
