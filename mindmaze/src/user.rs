use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const GUEST_USERNAME: &str = "Guest Player";
pub const LEVEL_REWARD_COINS: u32 = 100;
pub const REWARD_LEVEL_INTERVAL: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Earning,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected,
}

/// One ledger entry. Immutable once created; earnings settle instantly,
/// withdrawals stay `Pending` until an external settlement process (out of
/// scope here) would resolve them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: Uuid,
    pub amount: u32,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub date: DateTime<Utc>,
    /// Destination description, present only for withdrawals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawError {
    /// The requested amount exceeds the current balance.
    InsufficientFunds,
    /// Withdrawals must move a positive number of coins.
    ZeroAmount,
}

/// Result of completing a round: the committed level plus any coin bonus
/// that landed in the same transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelAdvance {
    pub new_level: u32,
    pub reward: Option<u32>,
}

/// The canonical player state. There is exactly one writer: the app owner
/// mutates it through the operations below and persists it after each change.
/// `history` is newest-first and append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    #[serde(default = "default_version")]
    version: u32,
    balance: u32,
    level: u32,
    total_games_played: u32,
    history: Vec<Transaction>,
    username: String,
    is_logged_in: bool,
}

fn default_version() -> u32 {
    1
}

impl Default for UserState {
    fn default() -> Self {
        Self {
            version: default_version(),
            balance: 0,
            level: 1,
            total_games_played: 0,
            history: Vec::new(),
            username: GUEST_USERNAME.to_string(),
            is_logged_in: false,
        }
    }
}

impl UserState {
    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn total_games_played(&self) -> u32 {
        self.total_games_played
    }

    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn is_logged_in(&self) -> bool {
        self.is_logged_in
    }

    /// Credit `amount` coins as an instantly-completed earning. Zero amounts
    /// are refused.
    pub fn add_earning(&mut self, amount: u32, now: DateTime<Utc>) -> Option<Uuid> {
        if amount == 0 {
            return None;
        }
        let tx = Transaction {
            id: Uuid::new_v4(),
            amount,
            kind: TransactionKind::Earning,
            status: TransactionStatus::Completed,
            date: now,
            method: None,
        };
        let id = tx.id;
        self.history.insert(0, tx);
        self.balance = self.balance.saturating_add(amount);
        Some(id)
    }

    /// Debit `amount` coins immediately and record a pending withdrawal to
    /// `method`. On error nothing changes.
    pub fn record_withdrawal(
        &mut self,
        amount: u32,
        method: &str,
        now: DateTime<Utc>,
    ) -> Result<Uuid, WithdrawError> {
        if amount == 0 {
            return Err(WithdrawError::ZeroAmount);
        }
        if amount > self.balance {
            return Err(WithdrawError::InsufficientFunds);
        }
        let tx = Transaction {
            id: Uuid::new_v4(),
            amount,
            kind: TransactionKind::Withdrawal,
            status: TransactionStatus::Pending,
            date: now,
            method: Some(method.to_string()),
        };
        let id = tx.id;
        self.history.insert(0, tx);
        self.balance -= amount;
        Ok(id)
    }

    /// Commit a won round: bonus, level counter, and play count land as one
    /// transition. Eligibility is decided from the level about to be
    /// assigned, before the counter moves.
    pub fn advance_level(&mut self, now: DateTime<Utc>) -> LevelAdvance {
        let next_level = self.level.saturating_add(1);
        let reward = (next_level > 1 && (next_level - 1) % REWARD_LEVEL_INTERVAL == 0)
            .then_some(LEVEL_REWARD_COINS);
        if let Some(amount) = reward {
            self.add_earning(amount, now);
        }
        self.level = next_level;
        self.total_games_played = self.total_games_played.saturating_add(1);
        LevelAdvance { new_level: next_level, reward }
    }

    /// Adopt a username and mark the session logged in. Blank names are
    /// refused. Purely cosmetic: no credentials are involved anywhere.
    pub fn log_in(&mut self, username: &str) -> bool {
        let username = username.trim();
        if username.is_empty() {
            return false;
        }
        self.username = username.to_string();
        self.is_logged_in = true;
        true
    }

    pub fn log_out(&mut self) {
        self.username = GUEST_USERNAME.to_string();
        self.is_logged_in = false;
    }

    /// Net sum of the ledger: earnings minus withdrawals, regardless of
    /// settlement status (withdrawals debit at request time).
    pub fn ledger_balance(&self) -> u32 {
        let net = self.history.iter().fold(0i64, |acc, tx| match tx.kind {
            TransactionKind::Earning => acc + i64::from(tx.amount),
            TransactionKind::Withdrawal => acc - i64::from(tx.amount),
        });
        net.max(0) as u32
    }

    pub fn set_level_for_test(&mut self, level: u32) {
        self.level = level.max(1);
    }
}

/// Whether winning `level` grants the coin bonus (shown as the "reward
/// level" banner in the game screen).
pub fn is_reward_level(level: u32) -> bool {
    level > 0 && level % REWARD_LEVEL_INTERVAL == 0
}
