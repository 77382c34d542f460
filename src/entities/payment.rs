//! Payment entity - Money received against an invoice.
//!
//! Each payment has an `invoice_id`, amount, method, processor fee, optional notes, the
//! time it was taken, and the id of the user who recorded it (`processed_by`).

use crate::errors::Error;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How a payment was made.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash in hand
    #[sea_orm(string_value = "CASH")]
    Cash,
    /// Paper check
    #[sea_orm(string_value = "CHECK")]
    Check,
    /// Credit or debit card
    #[sea_orm(string_value = "CARD")]
    Card,
    /// Wire or ACH transfer
    #[sea_orm(string_value = "BANK_TRANSFER")]
    BankTransfer,
    /// `PayPal`
    #[sea_orm(string_value = "PAYPAL")]
    PayPal,
    /// Venmo
    #[sea_orm(string_value = "VENMO")]
    Venmo,
}

impl PaymentMethod {
    /// Display label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Check => "Check",
            Self::Card => "Card",
            Self::BankTransfer => "Bank Transfer",
            Self::PayPal => "PayPal",
            Self::Venmo => "Venmo",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Accepts both stored codes (`BANK_TRANSFER`) and form labels (`Bank Transfer`,
/// `Credit Card`, `Debit Card`), ignoring case.
impl FromStr for PaymentMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "cash" => Ok(Self::Cash),
            "check" | "cheque" => Ok(Self::Check),
            "card" | "creditcard" | "debitcard" => Ok(Self::Card),
            "banktransfer" => Ok(Self::BankTransfer),
            "paypal" => Ok(Self::PayPal),
            "venmo" => Ok(Self::Venmo),
            _ => Err(Error::validation(format!("Unknown payment method: {s}"))),
        }
    }
}

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    /// Invoice the payment was applied to
    pub invoice_id: String,
    /// Amount received in dollars
    pub amount: f64,
    /// How the money arrived
    pub method: PaymentMethod,
    /// Fee charged by the card or transfer processor
    pub processor_fee: f64,
    /// Free-form note (e.g., "Deposit payment")
    pub notes: Option<String>,
    /// When the payment was recorded
    pub timestamp: DateTimeUtc,
    /// User id of whoever recorded it
    pub processed_by: String,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each payment belongs to one invoice
    #[sea_orm(
        belongs_to = "super::invoice::Entity",
        from = "Column::InvoiceId",
        to = "super::invoice::Column::Id"
    )]
    Invoice,
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_stored_codes() {
        assert_eq!("CASH".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!(
            "BANK_TRANSFER".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
    }

    #[test]
    fn test_parse_form_labels() {
        assert_eq!(
            "Credit Card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Card
        );
        assert_eq!(
            "Debit Card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Card
        );
        assert_eq!("PayPal".parse::<PaymentMethod>().unwrap(), PaymentMethod::PayPal);
        assert_eq!(
            " bank transfer ".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
    }

    #[test]
    fn test_parse_unknown_method() {
        let result = "Bitcoin".parse::<PaymentMethod>();
        assert!(matches!(result, Err(Error::Validation { .. })));
    }
}
