//! Promotion records
//!
//! The typed row held by the store, and its rendered external form.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Output layout for expirations (offset and zone are dropped)
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One promotional entry
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion {
    /// Opaque key, unique within one loaded dataset
    pub id: String,

    /// Non-negative price at full precision
    pub price: f64,

    /// Absolute expiration, keeping the offset it was uploaded with
    pub expiration: DateTime<FixedOffset>,
}

impl Promotion {
    pub fn new(id: impl Into<String>, price: f64, expiration: DateTime<FixedOffset>) -> Self {
        Self {
            id: id.into(),
            price,
            expiration,
        }
    }

    /// Price with exactly two fractional digits
    pub fn display_price(&self) -> String {
        format!("{:.2}", self.price)
    }

    /// Expiration as wall-clock time in its own offset
    pub fn display_expiration(&self) -> String {
        self.expiration.format(DISPLAY_FORMAT).to_string()
    }

    pub fn render(&self) -> PromotionView {
        PromotionView::from(self)
    }
}

/// Rendered promotion, as sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionView {
    pub id: String,
    pub price: String,
    pub expiration_date: String,
}

impl From<&Promotion> for PromotionView {
    fn from(promotion: &Promotion) -> Self {
        Self {
            id: promotion.id.clone(),
            price: promotion.display_price(),
            expiration_date: promotion.display_expiration(),
        }
    }
}
