use serde::{Deserialize, Serialize};

/// Minimum coins a withdrawal request may move.
pub const MIN_WITHDRAWAL: u32 = 2_000;

/// Destination accounts shorter than this are rejected by the form.
pub const MIN_ACCOUNT_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawMethod {
    Bkash,
    Nagad,
    Paypal,
    Rocket,
}

impl WithdrawMethod {
    pub const ALL: [WithdrawMethod; 4] = [
        WithdrawMethod::Bkash,
        WithdrawMethod::Nagad,
        WithdrawMethod::Paypal,
        WithdrawMethod::Rocket,
    ];

    /// Display name for the method picker.
    pub fn label(self) -> &'static str {
        match self {
            WithdrawMethod::Bkash => "bKash",
            WithdrawMethod::Nagad => "Nagad",
            WithdrawMethod::Paypal => "PayPal",
            WithdrawMethod::Rocket => "Rocket",
        }
    }

    /// Lowercase key used in the recorded destination string.
    pub fn key(self) -> &'static str {
        match self {
            WithdrawMethod::Bkash => "bkash",
            WithdrawMethod::Nagad => "nagad",
            WithdrawMethod::Paypal => "paypal",
            WithdrawMethod::Rocket => "rocket",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawFormError {
    BelowMinimum,
    OverBalance,
    AccountTooShort,
}

/// A filled-in withdrawal form, validated before it reaches the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub amount: u32,
    pub method: WithdrawMethod,
    pub account: String,
}

impl WithdrawRequest {
    pub fn validate(&self, balance: u32) -> Result<(), WithdrawFormError> {
        if self.amount < MIN_WITHDRAWAL {
            return Err(WithdrawFormError::BelowMinimum);
        }
        if self.amount > balance {
            return Err(WithdrawFormError::OverBalance);
        }
        if self.account.len() < MIN_ACCOUNT_LEN {
            return Err(WithdrawFormError::AccountTooShort);
        }
        Ok(())
    }

    /// Destination string recorded on the ledger entry, e.g.
    /// `"bkash: 01712345678"`.
    pub fn destination(&self) -> String {
        format!("{}: {}", self.method.key(), self.account)
    }
}

/// Progress toward the withdrawal threshold, as a 0-100 percentage.
pub fn threshold_progress_percent(balance: u32) -> u32 {
    (balance.saturating_mul(100) / MIN_WITHDRAWAL).min(100)
}
