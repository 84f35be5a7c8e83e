//! Data models for account management

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::money::Money;

/// Externally supplied account identifier.
///
/// `Ord` is the canonical lock order used by the transfer engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(i64);

impl AccountId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Raw value (for SQL binding and API output)
    #[inline]
    pub fn get(&self) -> i64 {
        self.0
    }

    /// Ids are positive; zero and negatives never name an account
    pub fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Account record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub account_id: AccountId,
    pub balance: Money,
    /// Bumped on every balance write
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// New account at version 1
    pub fn new(account_id: AccountId, balance: Money, now: DateTime<Utc>) -> Self {
        Self {
            account_id,
            balance,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Subtract `amount`. Returns `None` (and leaves `self` untouched) on
    /// arithmetic overflow; the sufficiency check belongs to the caller.
    pub fn debit(&mut self, amount: Money, now: DateTime<Utc>) -> Option<()> {
        let balance = self.balance.checked_sub(amount)?;
        self.apply(balance, now);
        Some(())
    }

    /// Add `amount`. Returns `None` (and leaves `self` untouched) on overflow.
    pub fn credit(&mut self, amount: Money, now: DateTime<Utc>) -> Option<()> {
        let balance = self.balance.checked_add(amount)?;
        self.apply(balance, now);
        Some(())
    }

    fn apply(&mut self, balance: Money, now: DateTime<Utc>) {
        self.balance = balance;
        self.version += 1;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::DEFAULT_SCALE;

    fn money(s: &str) -> Money {
        Money::parse(s, DEFAULT_SCALE).unwrap()
    }

    #[test]
    fn test_account_id_order_and_validity() {
        assert!(AccountId::new(1) < AccountId::new(2));
        assert!(AccountId::new(7).is_valid());
        assert!(!AccountId::new(0).is_valid());
        assert!(!AccountId::new(-3).is_valid());
        assert_eq!(AccountId::new(42).to_string(), "42");
    }

    #[test]
    fn test_debit_credit_bump_metadata() {
        let created = Utc::now();
        let mut account = Account::new(AccountId::new(1), money("1000.00"), created);
        assert_eq!(account.version, 1);

        let later = created + chrono::Duration::seconds(5);
        account.debit(money("100.00"), later).unwrap();
        assert_eq!(account.balance.to_string(), "900.00");
        assert_eq!(account.version, 2);
        assert_eq!(account.updated_at, later);
        assert_eq!(account.created_at, created);

        account.credit(money("0.50"), later).unwrap();
        assert_eq!(account.balance.to_string(), "900.50");
        assert_eq!(account.version, 3);
    }

    #[test]
    fn test_serialize_shape() {
        let now = Utc::now();
        let account = Account::new(AccountId::new(9), money("1.5"), now);
        let json = serde_json::to_value(&account).unwrap();
        assert_eq!(json["account_id"], 9);
        assert_eq!(json["balance"], "1.50");
    }
}
