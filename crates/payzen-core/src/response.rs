//! Inbound Platform Notification
//!
//! Immutable key/value record sent by the platform after a payment or a
//! subscription event, with typed accessors and the success/pending
//! classification the reconciler branches on.

use std::collections::HashMap;

/// Platform transaction status vocabulary
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionStatus {
    Initial,
    Authorised,
    AuthorisedToValidate,
    Captured,
    WaitingAuthorisation,
    WaitingAuthorisationToValidate,
    UnderVerification,
    Refused,
    Abandoned,
    Expired,
    Cancelled,
}

impl TransactionStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "INITIAL" => Some(TransactionStatus::Initial),
            "AUTHORISED" => Some(TransactionStatus::Authorised),
            "AUTHORISED_TO_VALIDATE" => Some(TransactionStatus::AuthorisedToValidate),
            "CAPTURED" => Some(TransactionStatus::Captured),
            "WAITING_AUTHORISATION" => Some(TransactionStatus::WaitingAuthorisation),
            "WAITING_AUTHORISATION_TO_VALIDATE" => {
                Some(TransactionStatus::WaitingAuthorisationToValidate)
            }
            "UNDER_VERIFICATION" => Some(TransactionStatus::UnderVerification),
            "REFUSED" => Some(TransactionStatus::Refused),
            "ABANDONED" => Some(TransactionStatus::Abandoned),
            "EXPIRED" => Some(TransactionStatus::Expired),
            "CANCELLED" => Some(TransactionStatus::Cancelled),
            _ => None,
        }
    }

    /// Payment went through (or will be captured automatically)
    pub fn is_accepted(self) -> bool {
        matches!(
            self,
            TransactionStatus::Authorised
                | TransactionStatus::AuthorisedToValidate
                | TransactionStatus::Captured
        )
    }

    /// Payment is still being decided by the platform
    pub fn is_pending(self) -> bool {
        matches!(
            self,
            TransactionStatus::Initial
                | TransactionStatus::WaitingAuthorisation
                | TransactionStatus::WaitingAuthorisationToValidate
                | TransactionStatus::UnderVerification
        )
    }
}

/// Inbound notification record
#[derive(Clone, Debug)]
pub struct PaymentResponse {
    params: HashMap<String, String>,
}

impl PaymentResponse {
    pub fn from_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.params.get(field).map(String::as_str)
    }

    /// Platform result code; "00" means the operation was accepted
    pub fn result(&self) -> Option<&str> {
        self.get("result")
    }

    pub fn transaction_status(&self) -> Option<TransactionStatus> {
        self.get("trans_status").and_then(TransactionStatus::parse)
    }

    /// Online subscription identifier assigned by the platform
    pub fn subscription_id(&self) -> Option<&str> {
        self.get("subscription")
    }

    /// Recurring amount in minor units of `sub_currency`
    pub fn sub_amount(&self) -> Option<&str> {
        self.get("sub_amount")
    }

    pub fn sub_currency(&self) -> Option<&str> {
        self.get("sub_currency")
    }

    /// Subscription effect date, `YYYYMMDD`
    pub fn sub_effect_date(&self) -> Option<&str> {
        self.get("sub_effect_date")
    }

    /// 1-based index of the recurrence this notification reports
    pub fn recurrence_number(&self) -> Option<&str> {
        self.get("recurrence_number")
    }

    pub fn currency(&self) -> Option<&str> {
        self.get("currency")
    }

    pub fn is_successful(&self) -> bool {
        self.result() == Some("00")
            && self.transaction_status().is_some_and(TransactionStatus::is_accepted)
    }

    pub fn is_pending_payment(&self) -> bool {
        self.transaction_status().is_some_and(TransactionStatus::is_pending)
    }
}
