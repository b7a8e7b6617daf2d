use chrono::{DateTime, Utc};

use crate::user::{TransactionKind, TransactionStatus, UserState};

/// Read-only aggregations over the ledger for the wallet screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalletSummary {
    pub balance: u32,
    pub pending_total: u32,
    pub earned_today: u32,
}

impl WalletSummary {
    pub fn for_user(user: &UserState, now: DateTime<Utc>) -> Self {
        Self {
            balance: user.balance(),
            pending_total: pending_total(user),
            earned_today: earned_on_day(user, now),
        }
    }
}

/// Sum of all transactions still awaiting settlement.
pub fn pending_total(user: &UserState) -> u32 {
    user.history()
        .iter()
        .filter(|tx| tx.status == TransactionStatus::Pending)
        .fold(0u32, |acc, tx| acc.saturating_add(tx.amount))
}

/// Coins earned on `now`'s UTC calendar day.
pub fn earned_on_day(user: &UserState, now: DateTime<Utc>) -> u32 {
    user.history()
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Earning && tx.date.date_naive() == now.date_naive())
        .fold(0u32, |acc, tx| acc.saturating_add(tx.amount))
}

/// Lifetime coins earned, regardless of day.
pub fn total_earned(user: &UserState) -> u32 {
    user.history()
        .iter()
        .filter(|tx| tx.kind == TransactionKind::Earning)
        .fold(0u32, |acc, tx| acc.saturating_add(tx.amount))
}
