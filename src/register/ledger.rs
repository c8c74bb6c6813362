use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::register::payment::{totals_by_method, MethodTotal, Payment};
use crate::register::RegisterError;
use crate::storage::keys::{DAILY_REPORTS, PAYMENT_HISTORY, Z_NUMBER};
use crate::storage::kv::{get_json, set_json, KeyValueStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub z_number: u64,
    pub date: NaiveDate,
    pub payment_count: usize,
    pub totals_by_method: Vec<MethodTotal>,
    pub grand_total_cents: i64,
}

pub struct CashRegister<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> CashRegister<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    pub fn history(&self) -> Result<Vec<Payment>, RegisterError> {
        Ok(get_json(&self.store, PAYMENT_HISTORY)?.unwrap_or_default())
    }

    pub fn record_payment(&mut self, payment: Payment) -> Result<(), RegisterError> {
        let mut history = self.history()?;
        info!(
            id = %payment.id,
            method = ?payment.method,
            total_cents = payment.total_cents,
            "recording payment"
        );
        history.push(payment);
        set_json(&mut self.store, PAYMENT_HISTORY, &history)?;
        Ok(())
    }

    pub fn payments_on(&self, date: NaiveDate) -> Result<Vec<Payment>, RegisterError> {
        Ok(self
            .history()?
            .into_iter()
            .filter(|payment| payment.date() == date)
            .collect())
    }

    pub fn daily_reports(&self) -> Result<Vec<DailyReport>, RegisterError> {
        Ok(get_json(&self.store, DAILY_REPORTS)?.unwrap_or_default())
    }

    pub fn current_z_number(&self) -> Result<u64, RegisterError> {
        Ok(get_json(&self.store, Z_NUMBER)?.unwrap_or(1))
    }

    pub fn close_day(&mut self, date: NaiveDate) -> Result<DailyReport, RegisterError> {
        let mut reports = self.daily_reports()?;
        if let Some(existing) = reports.iter().find(|report| report.date == date) {
            return Ok(existing.clone());
        }

        let payments = self.payments_on(date)?;
        let z_number = self.current_z_number()?;
        let report = DailyReport {
            z_number,
            date,
            payment_count: payments.len(),
            totals_by_method: totals_by_method(&payments),
            grand_total_cents: payments.iter().map(|p| p.total_cents).sum(),
        };

        reports.push(report.clone());
        set_json(&mut self.store, DAILY_REPORTS, &reports)?;
        set_json(&mut self.store, Z_NUMBER, &(z_number + 1))?;
        info!(z_number, %date, total_cents = report.grand_total_cents, "closed register day");
        Ok(report)
    }
}
