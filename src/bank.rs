//! Bank ledger: account, loan book, and daily interest accrual.
//!
//! Loan interest keeps a per-loan fractional carry so sub-unit accruals
//! are never dropped. Bank interest deliberately does not: each call
//! credits whole units and discards the fraction.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::BankConfig;
use crate::error::EconomyError;
use crate::state::GameState;

/// Kind of a bank ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxKind {
    Deposit,
    Withdraw,
    Interest,
    Dividend,
}

/// One bank ledger entry. `balance_after` is the account balance once
/// the amount has been applied, so the history replays arithmetically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankTransaction {
    pub kind: TxKind,
    pub amount: i64,
    pub balance_after: i64,
    pub title: String,
    pub day: u32,
    pub ts: String,
}

/// Savings account with its full transaction history.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BankAccount {
    pub balance: i64,
    pub transactions: Vec<BankTransaction>,
}

impl BankAccount {
    // Callers mutate `balance` first; the record snapshots the result.
    fn record(&mut self, kind: TxKind, amount: i64, title: &str, day: u32, ts: &str) {
        self.transactions.push(BankTransaction {
            kind,
            amount,
            balance_after: self.balance,
            title: title.to_string(),
            day,
            ts: ts.to_string(),
        });
    }
}

/// One loan, open or settled. `carry` holds the sub-unit interest not
/// yet capitalized into `remaining`; `repaid` accumulates every payment
/// so `repaid + remaining` always equals principal plus capitalized
/// interest. Settled loans stay in the book as audit records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: u32,
    pub principal: i64,
    pub apr: f64,
    pub remaining: i64,
    #[serde(default)]
    pub repaid: i64,
    #[serde(default)]
    pub carry: f64,
    pub day_taken: u32,
}

impl Loan {
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.remaining > 0
    }
}

fn draw_rate(range: (f64, f64), fallback: f64, rng: &mut impl Rng) -> f64 {
    if range.0 > 0.0 && range.0 <= range.1 {
        rng.gen_range(range.0..=range.1)
    } else {
        fallback
    }
}

/// Redraws the daily loan APR offer.
pub fn randomize_loan_offer(state: &mut GameState, cfg: &BankConfig, rng: &mut impl Rng) {
    state.loan_apr_offer = draw_rate(cfg.loan_apr_range, cfg.loan_apr_fallback, rng);
}

/// Moves cash into the account.
pub fn deposit(state: &mut GameState, amount: i64) -> Result<(), EconomyError> {
    if amount <= 0 {
        return Err(EconomyError::InvalidAmount { amount });
    }
    if amount > state.cash {
        return Err(EconomyError::InsufficientFunds {
            needed: amount,
            have: state.cash,
        });
    }
    state.cash -= amount;
    state.bank.balance += amount;
    let (day, ts) = (state.clock.day, state.clock.timestamp());
    state
        .bank
        .record(TxKind::Deposit, amount, "Personal savings", day, &ts);
    state
        .messages
        .info(&ts, "bank", &format!("Deposited ${amount}"));
    Ok(())
}

/// Moves account funds back into cash.
pub fn withdraw(state: &mut GameState, amount: i64) -> Result<(), EconomyError> {
    if amount <= 0 {
        return Err(EconomyError::InvalidAmount { amount });
    }
    if amount > state.bank.balance {
        return Err(EconomyError::InsufficientFunds {
            needed: amount,
            have: state.bank.balance,
        });
    }
    state.bank.balance -= amount;
    state.cash += amount;
    let (day, ts) = (state.clock.day, state.clock.timestamp());
    state
        .bank
        .record(TxKind::Withdraw, amount, "Personal withdrawal", day, &ts);
    state
        .messages
        .info(&ts, "bank", &format!("Withdrew ${amount}"));
    Ok(())
}

/// Credits the account outside the deposit path. Used by interest,
/// dividends, and windfall events.
pub fn credit(state: &mut GameState, kind: TxKind, amount: i64, title: &str) {
    if amount <= 0 {
        return;
    }
    state.bank.balance += amount;
    let (day, ts) = (state.clock.day, state.clock.timestamp());
    state.bank.record(kind, amount, title, day, &ts);
}

/// Accrues one day of savings interest.
///
/// The APR is redrawn from the configured range on every call and only
/// whole units are credited. The sub-unit remainder is discarded, not
/// carried, so small balances can sit interest-free.
pub fn accrue_bank_interest(
    state: &mut GameState,
    cfg: &BankConfig,
    rng: &mut impl Rng,
) -> i64 {
    let apr = draw_rate(cfg.bank_apr_range, cfg.bank_apr_fallback, rng);
    state.bank_apr = apr;
    if state.bank.balance <= 0 {
        return 0;
    }
    // The tiny bias keeps whole-unit results from flooring away on
    // float dust (10_000 * 0.0365 / 365 must credit exactly 1).
    #[allow(clippy::cast_possible_truncation)]
    let interest = ((state.bank.balance as f64) * apr / 365.0 + 1e-9).floor() as i64;
    if interest > 0 {
        credit(state, TxKind::Interest, interest, "Savings interest");
        let ts = state.clock.timestamp();
        state
            .messages
            .info(&ts, "bank", &format!("Interest credited: ${interest}"));
    }
    interest
}

/// Issues a loan at the current daily offer rate.
///
/// The commission is deducted from the disbursed cash; the borrower
/// still owes the full principal. Returns the cash actually received.
pub fn issue_loan(
    state: &mut GameState,
    cfg: &BankConfig,
    amount: i64,
) -> Result<i64, EconomyError> {
    if amount <= 0 {
        return Err(EconomyError::InvalidAmount { amount });
    }
    if amount > cfg.loan_max_amount {
        return Err(EconomyError::LimitExceeded {
            requested: amount,
            ceiling: cfg.loan_max_amount,
        });
    }
    let open_loans = state.loans.iter().filter(|l| l.is_open()).count();
    let rate = if open_loans >= cfg.loan_commission_threshold {
        cfg.loan_commission_rate_high
    } else {
        cfg.loan_commission_rate
    };
    #[allow(clippy::cast_possible_truncation)]
    let commission = ((amount as f64) * rate).round() as i64;
    let disbursed = amount - commission;
    let apr = if state.loan_apr_offer > 0.0 {
        state.loan_apr_offer
    } else {
        cfg.loan_apr_fallback
    };

    let id = state.next_loan_id;
    state.next_loan_id += 1;
    let day = state.clock.day;
    state.loans.push(Loan {
        id,
        principal: amount,
        apr,
        remaining: amount,
        repaid: 0,
        carry: 0.0,
        day_taken: day,
    });
    state.cash += disbursed;
    let ts = state.clock.timestamp();
    state.messages.info(
        &ts,
        "bank",
        &format!(
            "Loan #{id} issued: ${amount} at {:.1}% APR, ${commission} commission",
            apr * 100.0
        ),
    );
    Ok(disbursed)
}

/// Accrues one day of interest on every open loan.
///
/// Each loan earns `remaining * apr / 365`; the whole part capitalizes
/// into `remaining` and the fraction stays in the loan's carry.
pub fn accrue_loan_interest(state: &mut GameState) {
    for loan in &mut state.loans {
        if !loan.is_open() {
            continue;
        }
        loan.carry += (loan.remaining as f64) * loan.apr / 365.0;
        #[allow(clippy::cast_possible_truncation)]
        let whole = loan.carry.floor() as i64;
        if whole > 0 {
            loan.remaining += whole;
            loan.carry -= whole as f64;
        }
    }
}

/// Repays part or all of a loan from cash.
///
/// Paying more than is owed is an error, not a clamp. Settled loans
/// remain in the book with `remaining` at zero. Returns the amount paid.
pub fn repay(state: &mut GameState, loan_id: u32, amount: i64) -> Result<i64, EconomyError> {
    let idx = state
        .loans
        .iter()
        .position(|l| l.id == loan_id)
        .ok_or(EconomyError::UnknownLoan { loan_id })?;
    if amount <= 0 || amount > state.loans[idx].remaining {
        return Err(EconomyError::InvalidAmount { amount });
    }
    if amount > state.cash {
        return Err(EconomyError::InsufficientFunds {
            needed: amount,
            have: state.cash,
        });
    }
    state.cash -= amount;
    state.loans[idx].remaining -= amount;
    state.loans[idx].repaid += amount;
    let closed = !state.loans[idx].is_open();
    let ts = state.clock.timestamp();
    let text = if closed {
        format!("Loan #{loan_id} repaid in full (${amount})")
    } else {
        format!("Paid ${amount} toward loan #{loan_id}")
    };
    state.messages.info(&ts, "bank", &text);
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cities::default_cities;
    use crate::state::GameState;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn fresh_state() -> GameState {
        let mut state = GameState::new(default_cities(), 50);
        state.cash = 5000;
        state
    }

    #[test]
    fn deposit_and_withdraw_move_cash() {
        let mut state = fresh_state();
        deposit(&mut state, 3000).unwrap();
        assert_eq!(state.cash, 2000);
        assert_eq!(state.bank.balance, 3000);

        withdraw(&mut state, 1000).unwrap();
        assert_eq!(state.cash, 3000);
        assert_eq!(state.bank.balance, 2000);
        assert_eq!(state.bank.transactions.len(), 2);
    }

    #[test]
    fn deposit_rejects_bad_amounts() {
        let mut state = fresh_state();
        assert!(matches!(
            deposit(&mut state, 0),
            Err(EconomyError::InvalidAmount { amount: 0 })
        ));
        assert!(matches!(
            deposit(&mut state, 9999),
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert_eq!(state.cash, 5000);
    }

    #[test]
    fn bank_interest_floors_to_whole_units() {
        let mut state = fresh_state();
        let cfg = BankConfig {
            bank_apr_range: (0.0365, 0.0365),
            ..BankConfig::default()
        };
        state.bank.balance = 10_000;
        let mut rng = SmallRng::seed_from_u64(1);
        let earned = accrue_bank_interest(&mut state, &cfg, &mut rng);
        assert_eq!(earned, 1);
        assert_eq!(state.bank.balance, 10_001);
    }

    #[test]
    fn bank_interest_discards_fraction() {
        let mut state = fresh_state();
        let cfg = BankConfig {
            bank_apr_range: (0.0365, 0.0365),
            ..BankConfig::default()
        };
        // 500 * 0.0365 / 365 = 0.05: below one unit, nothing credited.
        state.bank.balance = 500;
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..10 {
            assert_eq!(accrue_bank_interest(&mut state, &cfg, &mut rng), 0);
        }
        assert_eq!(state.bank.balance, 500);
    }

    #[test]
    fn invalid_apr_range_uses_fallback() {
        let mut state = fresh_state();
        let cfg = BankConfig {
            bank_apr_range: (0.5, 0.1),
            bank_apr_fallback: 0.0365,
            ..BankConfig::default()
        };
        state.bank.balance = 20_000;
        let mut rng = SmallRng::seed_from_u64(3);
        let earned = accrue_bank_interest(&mut state, &cfg, &mut rng);
        assert_eq!(earned, 2);
    }

    #[test]
    fn loan_carry_accumulates_then_capitalizes() {
        let mut state = fresh_state();
        state.loan_apr_offer = 0.10;
        let cfg = BankConfig::default();
        issue_loan(&mut state, &cfg, 10_000).unwrap();

        // 10_000 * 0.10 / 365 = 2.739...: two whole units on day one.
        accrue_loan_interest(&mut state);
        assert_eq!(state.loans[0].remaining, 10_002);
        assert!(state.loans[0].carry > 0.7 && state.loans[0].carry < 0.75);

        accrue_loan_interest(&mut state);
        assert_eq!(state.loans[0].remaining, 10_005);
    }

    #[test]
    fn commission_reduces_disbursement_not_principal() {
        let mut state = fresh_state();
        state.loan_apr_offer = 0.10;
        let cfg = BankConfig::default();
        let disbursed = issue_loan(&mut state, &cfg, 10_000).unwrap();
        assert_eq!(disbursed, 9000);
        assert_eq!(state.cash, 5000 + 9000);
        assert_eq!(state.loans[0].remaining, 10_000);
    }

    #[test]
    fn commission_tier_rises_with_loan_count() {
        let mut state = fresh_state();
        state.loan_apr_offer = 0.10;
        let cfg = BankConfig {
            loan_commission_threshold: 2,
            ..BankConfig::default()
        };
        assert_eq!(issue_loan(&mut state, &cfg, 1000).unwrap(), 900);
        assert_eq!(issue_loan(&mut state, &cfg, 1000).unwrap(), 900);
        // Third loan crosses the threshold.
        assert_eq!(issue_loan(&mut state, &cfg, 1000).unwrap(), 700);
    }

    #[test]
    fn loan_ceiling_enforced() {
        let mut state = fresh_state();
        let cfg = BankConfig::default();
        let err = issue_loan(&mut state, &cfg, 10_001).unwrap_err();
        assert_eq!(
            err,
            EconomyError::LimitExceeded {
                requested: 10_001,
                ceiling: 10_000
            }
        );
        assert!(state.loans.is_empty());
    }

    #[test]
    fn repay_rejects_overpayment() {
        let mut state = fresh_state();
        state.cash = 20_000;
        state.loan_apr_offer = 0.10;
        let cfg = BankConfig::default();
        issue_loan(&mut state, &cfg, 1000).unwrap();
        let id = state.loans[0].id;

        let err = repay(&mut state, id, 5000).unwrap_err();
        assert_eq!(err, EconomyError::InvalidAmount { amount: 5000 });
        assert_eq!(state.loans[0].remaining, 1000);

        let paid = repay(&mut state, id, 1000).unwrap();
        assert_eq!(paid, 1000);
        assert_eq!(state.total_debt(), 0);
    }

    #[test]
    fn settled_loans_stay_in_the_book() {
        let mut state = fresh_state();
        state.cash = 20_000;
        state.loan_apr_offer = 0.10;
        let cfg = BankConfig::default();
        issue_loan(&mut state, &cfg, 1000).unwrap();
        let id = state.loans[0].id;

        repay(&mut state, id, 400).unwrap();
        repay(&mut state, id, 600).unwrap();
        assert_eq!(state.loans.len(), 1);
        assert!(!state.loans[0].is_open());
        assert_eq!(state.loans[0].repaid, 1000);

        // Further payments against the settled loan are invalid.
        assert!(matches!(
            repay(&mut state, id, 1),
            Err(EconomyError::InvalidAmount { amount: 1 })
        ));
    }

    #[test]
    fn repaid_plus_remaining_tracks_principal_and_interest() {
        let mut state = fresh_state();
        state.cash = 50_000;
        state.loan_apr_offer = 0.10;
        let cfg = BankConfig::default();
        issue_loan(&mut state, &cfg, 10_000).unwrap();
        let id = state.loans[0].id;

        for _ in 0..7 {
            accrue_loan_interest(&mut state);
        }
        let interest = state.loans[0].remaining - state.loans[0].principal;
        assert_eq!(interest, 19);

        repay(&mut state, id, 4000).unwrap();
        repay(&mut state, id, 6019).unwrap();
        let loan = &state.loans[0];
        assert_eq!(loan.repaid + loan.remaining, loan.principal + interest);
        assert_eq!(loan.remaining, 0);
    }

    #[test]
    fn transactions_record_resulting_balance() {
        let mut state = fresh_state();
        deposit(&mut state, 3000).unwrap();
        withdraw(&mut state, 1000).unwrap();
        credit(&mut state, TxKind::Interest, 7, "Savings interest");
        credit(&mut state, TxKind::Dividend, 50, "Dividend: NTR");

        // Replaying the history arithmetically lands on every snapshot.
        let mut running = 0i64;
        for tx in &state.bank.transactions {
            running = match tx.kind {
                TxKind::Deposit | TxKind::Interest | TxKind::Dividend => running + tx.amount,
                TxKind::Withdraw => running - tx.amount,
            };
            assert_eq!(tx.balance_after, running);
        }
        assert_eq!(running, state.bank.balance);
        assert_eq!(state.bank.transactions.last().map(|t| t.balance_after), Some(2057));
    }

    #[test]
    fn settled_loans_do_not_count_toward_commission_tier() {
        let mut state = fresh_state();
        state.cash = 50_000;
        state.loan_apr_offer = 0.10;
        let cfg = BankConfig {
            loan_commission_threshold: 2,
            ..BankConfig::default()
        };
        for _ in 0..2 {
            issue_loan(&mut state, &cfg, 1000).unwrap();
        }
        let ids: Vec<u32> = state.loans.iter().map(|l| l.id).collect();
        for id in ids {
            repay(&mut state, id, 1000).unwrap();
        }
        // Both loans are settled, so the base rate still applies.
        assert_eq!(issue_loan(&mut state, &cfg, 1000).unwrap(), 900);
    }

    #[test]
    fn repay_unknown_loan_fails() {
        let mut state = fresh_state();
        assert_eq!(
            repay(&mut state, 77, 100).unwrap_err(),
            EconomyError::UnknownLoan { loan_id: 77 }
        );
    }
}
