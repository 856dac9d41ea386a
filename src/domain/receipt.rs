use super::machine::Machine;
use super::outcome::Outcome;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

pub const RECEIPT_CURRENCY: &str = "USD";
pub const MASKED_CARD: &str = "**** 4567";

/// Summary handed to the receipt view after a successful vend.
#[derive(Debug, Clone, PartialEq)]
pub struct Receipt {
    pub machine_name: String,
    pub quantity: u32,
    pub amount: String,
    pub card_masked_pan: String,
}

impl Receipt {
    /// Builds a receipt for a completed session. Failed outcomes have none.
    pub fn for_outcome(machine: &Machine, outcome: &Outcome) -> Option<Self> {
        match outcome {
            Outcome::Completed { amount, .. } => Some(Self {
                machine_name: machine.name.clone(),
                quantity: 1,
                amount: format_amount(*amount),
                card_masked_pan: MASKED_CARD.to_string(),
            }),
            Outcome::Failed(_) => None,
        }
    }
}

fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{} {:.2}", RECEIPT_CURRENCY, rounded)
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x{} {} {}",
            self.machine_name, self.quantity, self.amount, self.card_masked_pan
        )
    }
}
