//! Payment details and checkout field validation.
//!
//! The payment form has one input group per [`PaymentMethod`]. Exactly one
//! group is active at a time; only its fields are read and validated. The
//! same rules run in the client (before any request is sent) and in the
//! server (before any order is written).

use core::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::status::PaymentMethod;

/// Net-banking bank codes accepted at checkout, with display names.
pub const SUPPORTED_BANKS: &[(&str, &str)] = &[
    ("sbi", "State Bank of India"),
    ("hdfc", "HDFC Bank"),
    ("icici", "ICICI Bank"),
    ("axis", "Axis Bank"),
    ("kotak", "Kotak Mahindra Bank"),
];

/// Wallet providers accepted at checkout, with display names.
pub const SUPPORTED_WALLETS: &[(&str, &str)] = &[
    ("paytm", "Paytm"),
    ("phonepe", "PhonePe"),
    ("amazon_pay", "Amazon Pay"),
    ("mobikwik", "MobiKwik"),
];

const CARD_NUMBER_DIGITS: usize = 16;
const MOBILE_DIGITS: usize = 10;
const MAX_ADDRESS_LENGTH: usize = 500;

/// A field in the active payment group failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentError {
    #[error("Card number must be {CARD_NUMBER_DIGITS} digits")]
    InvalidCardNumber,
    #[error("Please enter the name on the card")]
    MissingCardHolder,
    #[error("Expiry must be in MM/YY format")]
    InvalidExpiry,
    #[error("Card has expired")]
    CardExpired,
    #[error("CVV must be 3 or 4 digits")]
    InvalidCvv,
    #[error("Please enter a valid UPI ID (e.g. name@bank)")]
    InvalidUpiId,
    #[error("Please select your bank")]
    UnsupportedBank,
    #[error("Please select a wallet")]
    UnsupportedWallet,
    #[error("Mobile number must be {MOBILE_DIGITS} digits")]
    InvalidMobile,
}

/// The delivery address failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("Please enter a delivery address")]
    Empty,
    #[error("Delivery address must be at most {MAX_ADDRESS_LENGTH} characters")]
    TooLong,
}

/// Any checkout field failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckoutValidationError {
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// A trimmed, non-empty delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryAddress(String);

impl DeliveryAddress {
    /// Parse a delivery address.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError`] if the address is blank or too long.
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }
        if s.chars().count() > MAX_ADDRESS_LENGTH {
            return Err(AddressError::TooLong);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Method-specific payment fields, tagged by `method` on the wire.
///
/// ```json
/// {"method": "upi", "upi_id": "shopper@okbank"}
/// ```
///
/// `Debug` redacts card data.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum PaymentDetails {
    Card {
        card_number: String,
        card_holder: String,
        expiry: String,
        cvv: String,
    },
    Upi {
        upi_id: String,
    },
    NetBanking {
        bank: String,
    },
    Wallet {
        provider: String,
        mobile: String,
    },
    CashOnDelivery,
}

impl fmt::Debug for PaymentDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Card { card_holder, .. } => f
                .debug_struct("Card")
                .field("card_number", &"[REDACTED]")
                .field("card_holder", card_holder)
                .field("expiry", &"[REDACTED]")
                .field("cvv", &"[REDACTED]")
                .finish(),
            Self::Upi { upi_id } => f.debug_struct("Upi").field("upi_id", upi_id).finish(),
            Self::NetBanking { bank } => f.debug_struct("NetBanking").field("bank", bank).finish(),
            Self::Wallet { provider, mobile } => f
                .debug_struct("Wallet")
                .field("provider", provider)
                .field("mobile", mobile)
                .finish(),
            Self::CashOnDelivery => f.write_str("CashOnDelivery"),
        }
    }
}

impl PaymentDetails {
    /// The method this group belongs to.
    #[must_use]
    pub const fn method(&self) -> PaymentMethod {
        match self {
            Self::Card { .. } => PaymentMethod::Card,
            Self::Upi { .. } => PaymentMethod::Upi,
            Self::NetBanking { .. } => PaymentMethod::NetBanking,
            Self::Wallet { .. } => PaymentMethod::Wallet,
            Self::CashOnDelivery => PaymentMethod::CashOnDelivery,
        }
    }

    /// Validate the fields of this group.
    ///
    /// `today` decides whether a card expiry is in the past.
    ///
    /// # Errors
    ///
    /// Returns the first [`PaymentError`] found, checking fields in form order.
    pub fn validate(&self, today: NaiveDate) -> Result<(), PaymentError> {
        match self {
            Self::Card {
                card_number,
                card_holder,
                expiry,
                cvv,
            } => {
                if card_digits(card_number).len() != CARD_NUMBER_DIGITS {
                    return Err(PaymentError::InvalidCardNumber);
                }
                if card_holder.trim().is_empty() {
                    return Err(PaymentError::MissingCardHolder);
                }
                let (year, month) = parse_expiry(expiry)?;
                if (year, month) < (today.year(), today.month()) {
                    return Err(PaymentError::CardExpired);
                }
                let cvv = cvv.trim();
                if !(3..=4).contains(&cvv.len()) || !is_all_digits(cvv) {
                    return Err(PaymentError::InvalidCvv);
                }
                Ok(())
            }
            Self::Upi { upi_id } => {
                if is_valid_upi_id(upi_id.trim()) {
                    Ok(())
                } else {
                    Err(PaymentError::InvalidUpiId)
                }
            }
            Self::NetBanking { bank } => {
                if SUPPORTED_BANKS.iter().any(|(code, _)| *code == bank.trim()) {
                    Ok(())
                } else {
                    Err(PaymentError::UnsupportedBank)
                }
            }
            Self::Wallet { provider, mobile } => {
                if !SUPPORTED_WALLETS
                    .iter()
                    .any(|(code, _)| *code == provider.trim())
                {
                    return Err(PaymentError::UnsupportedWallet);
                }
                let mobile = mobile.trim();
                if mobile.len() != MOBILE_DIGITS || !is_all_digits(mobile) {
                    return Err(PaymentError::InvalidMobile);
                }
                Ok(())
            }
            Self::CashOnDelivery => Ok(()),
        }
    }

    /// Non-sensitive reference stored with the payment record.
    ///
    /// Cards keep only the last four digits.
    #[must_use]
    pub fn reference(&self) -> Option<String> {
        match self {
            Self::Card { card_number, .. } => {
                let digits = card_digits(card_number);
                let last4: String = digits.chars().skip(digits.len().saturating_sub(4)).collect();
                Some(format!("•••• {last4}"))
            }
            Self::Upi { upi_id } => Some(upi_id.trim().to_owned()),
            Self::NetBanking { bank } => Some(bank.trim().to_owned()),
            Self::Wallet { provider, .. } => Some(provider.trim().to_owned()),
            Self::CashOnDelivery => None,
        }
    }
}

/// Flat payment form fields as posted by the HTML payment form.
///
/// Every group's inputs are present in the form; [`Self::into_details`]
/// picks only the ones belonging to the selected method.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentFields {
    #[serde(default)]
    pub card_number: String,
    #[serde(default)]
    pub card_holder: String,
    #[serde(default)]
    pub expiry: String,
    #[serde(default)]
    pub cvv: String,
    #[serde(default)]
    pub upi_id: String,
    #[serde(default)]
    pub bank: String,
    #[serde(default)]
    pub wallet_provider: String,
    #[serde(default)]
    pub wallet_mobile: String,
}

impl PaymentFields {
    /// Keep only the active group's fields.
    #[must_use]
    pub fn into_details(self, method: PaymentMethod) -> PaymentDetails {
        match method {
            PaymentMethod::Card => PaymentDetails::Card {
                card_number: self.card_number,
                card_holder: self.card_holder,
                expiry: self.expiry,
                cvv: self.cvv,
            },
            PaymentMethod::Upi => PaymentDetails::Upi {
                upi_id: self.upi_id,
            },
            PaymentMethod::NetBanking => PaymentDetails::NetBanking { bank: self.bank },
            PaymentMethod::Wallet => PaymentDetails::Wallet {
                provider: self.wallet_provider,
                mobile: self.wallet_mobile,
            },
            PaymentMethod::CashOnDelivery => PaymentDetails::CashOnDelivery,
        }
    }
}

/// Card number with separators removed. Any other non-digit empties it.
fn card_digits(number: &str) -> String {
    let stripped: String = number
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    if is_all_digits(&stripped) {
        stripped
    } else {
        String::new()
    }
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn parse_expiry(expiry: &str) -> Result<(i32, u32), PaymentError> {
    let (month, year) = expiry
        .trim()
        .split_once('/')
        .ok_or(PaymentError::InvalidExpiry)?;
    if month.len() != 2 || year.len() != 2 || !is_all_digits(month) || !is_all_digits(year) {
        return Err(PaymentError::InvalidExpiry);
    }
    let month: u32 = month.parse().map_err(|_| PaymentError::InvalidExpiry)?;
    let year: i32 = year.parse().map_err(|_| PaymentError::InvalidExpiry)?;
    if !(1..=12).contains(&month) {
        return Err(PaymentError::InvalidExpiry);
    }
    Ok((2000 + year, month))
}

fn is_valid_upi_id(upi_id: &str) -> bool {
    let Some((name, handle)) = upi_id.split_once('@') else {
        return false;
    };
    !name.is_empty()
        && !handle.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        && handle.chars().all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn card(number: &str, expiry: &str, cvv: &str) -> PaymentDetails {
        PaymentDetails::Card {
            card_number: number.to_string(),
            card_holder: "Asha Rao".to_string(),
            expiry: expiry.to_string(),
            cvv: cvv.to_string(),
        }
    }

    #[test]
    fn test_card_accepts_spaced_number() {
        assert_eq!(card("4242 4242 4242 4242", "12/28", "123").validate(today()), Ok(()));
        assert_eq!(card("4242-4242-4242-4242", "10/26", "1234").validate(today()), Ok(()));
    }

    #[test]
    fn test_card_number_length() {
        assert_eq!(
            card("4242 4242 4242", "12/28", "123").validate(today()),
            Err(PaymentError::InvalidCardNumber)
        );
        assert_eq!(
            card("4242 4242 4242 424a", "12/28", "123").validate(today()),
            Err(PaymentError::InvalidCardNumber)
        );
    }

    #[test]
    fn test_card_expiry_format_and_past() {
        assert_eq!(
            card("4242424242424242", "1228", "123").validate(today()),
            Err(PaymentError::InvalidExpiry)
        );
        assert_eq!(
            card("4242424242424242", "13/28", "123").validate(today()),
            Err(PaymentError::InvalidExpiry)
        );
        assert_eq!(
            card("4242424242424242", "09/26", "123").validate(today()),
            Err(PaymentError::CardExpired)
        );
    }

    #[test]
    fn test_card_holder_and_cvv() {
        let details = PaymentDetails::Card {
            card_number: "4242424242424242".to_string(),
            card_holder: "  ".to_string(),
            expiry: "12/28".to_string(),
            cvv: "123".to_string(),
        };
        assert_eq!(details.validate(today()), Err(PaymentError::MissingCardHolder));
        assert_eq!(
            card("4242424242424242", "12/28", "12").validate(today()),
            Err(PaymentError::InvalidCvv)
        );
    }

    #[test]
    fn test_upi_ids() {
        let upi = |id: &str| PaymentDetails::Upi {
            upi_id: id.to_string(),
        };
        assert_eq!(upi("asha.rao@okhdfc").validate(today()), Ok(()));
        assert_eq!(upi("asha").validate(today()), Err(PaymentError::InvalidUpiId));
        assert_eq!(upi("@okhdfc").validate(today()), Err(PaymentError::InvalidUpiId));
        assert_eq!(upi("asha@ok1").validate(today()), Err(PaymentError::InvalidUpiId));
    }

    #[test]
    fn test_bank_and_wallet_choices() {
        let bank = PaymentDetails::NetBanking {
            bank: "hdfc".to_string(),
        };
        assert_eq!(bank.validate(today()), Ok(()));

        let unknown = PaymentDetails::NetBanking {
            bank: String::new(),
        };
        assert_eq!(unknown.validate(today()), Err(PaymentError::UnsupportedBank));

        let wallet = PaymentDetails::Wallet {
            provider: "paytm".to_string(),
            mobile: "98765 4321".to_string(),
        };
        assert_eq!(wallet.validate(today()), Err(PaymentError::InvalidMobile));
    }

    #[test]
    fn test_only_active_group_is_read() {
        let fields = PaymentFields {
            card_number: "not a card".to_string(),
            upi_id: "asha@okaxis".to_string(),
            ..PaymentFields::default()
        };
        let details = fields.into_details(PaymentMethod::Upi);
        assert_eq!(details.method(), PaymentMethod::Upi);
        assert_eq!(details.validate(today()), Ok(()));
    }

    #[test]
    fn test_cash_on_delivery_needs_nothing() {
        let details = PaymentFields::default().into_details(PaymentMethod::CashOnDelivery);
        assert_eq!(details.validate(today()), Ok(()));
        assert_eq!(details.reference(), None);
    }

    #[test]
    fn test_card_reference_is_masked() {
        let details = card("4242 4242 4242 1881", "12/28", "123");
        assert_eq!(details.reference().unwrap(), "•••• 1881");
        let debug = format!("{details:?}");
        assert!(!debug.contains("4242"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_wire_format_is_tagged() {
        let details: PaymentDetails =
            serde_json::from_str(r#"{"method":"net_banking","bank":"sbi"}"#).unwrap();
        assert_eq!(details.method(), PaymentMethod::NetBanking);

        let cod: PaymentDetails = serde_json::from_str(r#"{"method":"cash_on_delivery"}"#).unwrap();
        assert_eq!(cod, PaymentDetails::CashOnDelivery);
    }

    #[test]
    fn test_delivery_address() {
        assert_eq!(DeliveryAddress::parse("   "), Err(AddressError::Empty));
        assert_eq!(
            DeliveryAddress::parse(&"x".repeat(501)),
            Err(AddressError::TooLong)
        );
        assert_eq!(
            DeliveryAddress::parse(" 12 Market Road, Pune ").unwrap().as_str(),
            "12 Market Road, Pune"
        );
    }
}
