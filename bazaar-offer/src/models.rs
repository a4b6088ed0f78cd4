use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Bargain status. `Accepted` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BargainStatus {
    Pending,
    Accepted,
    Rejected,
}

impl BargainStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BargainStatus::Pending)
    }
}

impl fmt::Display for BargainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BargainStatus::Pending => "pending",
            BargainStatus::Accepted => "accepted",
            BargainStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// A user taking part in a negotiation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Party {
    pub id: String,
    pub name: String,
}

impl Party {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A buyer's offer on a listing, answered by its seller.
///
/// Product name, original price and both identities are copied when the
/// request is made and are never refreshed from the catalog afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BargainRequest {
    pub id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub original_price: u64,
    pub offered_price: u64,
    pub buyer_id: String,
    pub buyer_name: String,
    pub seller_id: String,
    pub seller_name: String,
    pub status: BargainStatus,
    pub message: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub responded_at: Option<DateTime<Utc>>,
}

impl BargainRequest {
    /// Discount asked for, in whole percent of the original price.
    pub fn discount_percent(&self) -> f64 {
        if self.original_price == 0 {
            return 0.0;
        }
        (self.original_price - self.offered_price.min(self.original_price)) as f64 * 100.0
            / self.original_price as f64
    }

    /// Move a pending request to its terminal state.
    ///
    /// Returns the current status unchanged as `Err` when already resolved.
    pub(crate) fn resolve(&mut self, accept: bool) -> Result<(), BargainStatus> {
        if self.status.is_terminal() {
            return Err(self.status);
        }
        self.status = if accept {
            BargainStatus::Accepted
        } else {
            BargainStatus::Rejected
        };
        self.responded_at = Some(Utc::now());
        Ok(())
    }
}
