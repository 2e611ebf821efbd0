use serde::Serialize;
use crate::api::models::UserId;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct UserAccount {
    pub id: UserId,
    pub name: String,
    pub balance: f64
}

/// One `id, name, balance` line of the ledger file. The balance text is kept
/// as read so untouched records are written back unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct LedgerRecord {
    pub account: UserAccount,
    balance_text: String
}

impl LedgerRecord {
    /// `None` for blank or corrupt lines.
    pub fn parse(line: &str) -> Option<LedgerRecord> {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() != 3 || fields[0].is_empty() {
            return None;
        }
        let balance = fields[2].parse::<f64>().ok().filter(|balance| balance.is_finite())?;
        Some(LedgerRecord {
            account: UserAccount {
                id: UserId::from(fields[0]),
                name: fields[1].to_string(),
                balance
            },
            balance_text: fields[2].to_string()
        })
    }

    pub fn set_balance(&mut self, balance: f64) {
        self.account.balance = balance;
        self.balance_text = format_balance(balance);
    }

    pub fn to_line(&self) -> String {
        format!("{}, {}, {}", self.account.id, self.account.name, self.balance_text)
    }
}

/// Whole numbers keep one decimal place (`75.0`), everything else prints as is.
pub fn format_balance(balance: f64) -> String {
    if balance.fract() == 0.0 {
        format!("{:.1}", balance)
    } else {
        format!("{}", balance)
    }
}
