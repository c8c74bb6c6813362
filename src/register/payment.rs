use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::planning::ShopId;
use crate::register::RegisterError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Check,
    Other,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Espèces",
            PaymentMethod::Card => "Carte",
            PaymentMethod::Check => "Chèque",
            PaymentMethod::Other => "Autre",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub label: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
}

impl LineItem {
    pub fn new(label: impl Into<String>, unit_price_cents: i64, quantity: u32) -> Self {
        Self {
            label: label.into(),
            unit_price_cents,
            quantity,
        }
    }

    pub fn total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity as i64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<ShopId>,
    pub items: Vec<LineItem>,
    pub method: PaymentMethod,
    pub total_cents: i64,
}

impl Payment {
    pub fn new(
        items: Vec<LineItem>,
        method: PaymentMethod,
        shop_id: Option<ShopId>,
        timestamp: DateTime<Utc>,
    ) -> Result<Self, RegisterError> {
        if items.is_empty() {
            return Err(RegisterError::EmptyPayment);
        }
        if let Some(item) = items.iter().find(|item| item.quantity == 0) {
            return Err(RegisterError::InvalidQuantity(item.label.clone()));
        }

        let total_cents = items.iter().map(LineItem::total_cents).sum();
        Ok(Self {
            id: Uuid::new_v4(),
            timestamp,
            shop_id,
            items,
            method,
            total_cents,
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub count: usize,
    pub total_cents: i64,
}

pub fn totals_by_method(payments: &[Payment]) -> Vec<MethodTotal> {
    let mut totals: BTreeMap<PaymentMethod, MethodTotal> = BTreeMap::new();
    for payment in payments {
        let entry = totals.entry(payment.method).or_insert(MethodTotal {
            method: payment.method,
            count: 0,
            total_cents: 0,
        });
        entry.count += 1;
        entry.total_cents += payment.total_cents;
    }
    totals.into_values().collect()
}
