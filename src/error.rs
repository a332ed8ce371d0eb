//! Error taxonomy for user-facing economic operations.

use thiserror::Error;

/// Failure reasons surfaced by ledger operations.
///
/// Every variant carries the numeric payload a caller needs to render a
/// useful message or retry with a corrected amount. Internal event-engine
/// failures never surface here; they degrade to per-event no-ops.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EconomyError {
    /// Non-positive or out-of-range monetary input.
    #[error("invalid amount: {amount}")]
    InvalidAmount { amount: i64 },

    /// Cash or bank balance too low for the requested debit.
    #[error("insufficient funds: need ${needed}, have ${have}")]
    InsufficientFunds { needed: i64, have: i64 },

    /// Selling more units than currently owned.
    #[error("insufficient holdings: want {requested}, have {held}")]
    InsufficientHoldings { requested: u32, held: u32 },

    /// Loan identifier not present in the loan book.
    #[error("unknown loan #{loan_id}")]
    UnknownLoan { loan_id: u32 },

    /// Loan principal or cargo size beyond the configured ceiling.
    #[error("limit exceeded: requested {requested}, ceiling {ceiling}")]
    LimitExceeded { requested: i64, ceiling: i64 },

    /// Investment trading locked until the wealth gate is met.
    #[error("trading locked: wealth ${wealth} below unlock threshold ${threshold}")]
    TradingLocked { wealth: i64, threshold: i64 },

    /// Item not present in the relevant catalogue or price table.
    #[error("unknown item: {name}")]
    UnknownItem { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_payloads() {
        let err = EconomyError::InsufficientFunds {
            needed: 500,
            have: 120,
        };
        assert_eq!(err.to_string(), "insufficient funds: need $500, have $120");

        let err = EconomyError::TradingLocked {
            wealth: 10_000,
            threshold: 60_000,
        };
        assert!(err.to_string().contains("60000"));
    }
}
