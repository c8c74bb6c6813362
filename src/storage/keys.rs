use std::sync::OnceLock;

use regex::Regex;

use crate::planning::{ShopId, WeekKey};

pub const SHOPS: &str = "planning_shops";
pub const PAYMENT_HISTORY: &str = "paymentHistory";
pub const DAILY_REPORTS: &str = "dailyReports";
pub const Z_NUMBER: &str = "zNumber";

const PLANNING_PREFIX: &str = "planning_";
const SELECTED_PREFIX: &str = "selected_employees_";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanningKey {
    Planning { shop_id: ShopId, week: WeekKey },
    SelectedEmployees { shop_id: ShopId, week: WeekKey },
}

pub fn planning_key(shop_id: &str, week: WeekKey) -> String {
    format!("{}{}_{}", PLANNING_PREFIX, shop_id, week)
}

pub fn selected_employees_key(shop_id: &str, week: WeekKey) -> String {
    format!("{}{}_{}", SELECTED_PREFIX, shop_id, week)
}

fn week_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(planning|selected_employees)_(.+)_(\d{4}-\d{2}-\d{2})$")
            .expect("static pattern is valid")
    })
}

/// Splits a per-week key back into its shop id and week. Shop ids may
/// themselves contain underscores.
pub fn parse_planning_key(key: &str) -> Option<PlanningKey> {
    let captures = week_key_pattern().captures(key)?;
    let shop_id = captures.get(2)?.as_str().to_string();
    let week: WeekKey = captures.get(3)?.as_str().parse().ok()?;

    match captures.get(1)?.as_str() {
        "planning" => Some(PlanningKey::Planning { shop_id, week }),
        _ => Some(PlanningKey::SelectedEmployees { shop_id, week }),
    }
}

pub fn is_app_key(key: &str) -> bool {
    key == SHOPS
        || key == PAYMENT_HISTORY
        || key == DAILY_REPORTS
        || key == Z_NUMBER
        || parse_planning_key(key).is_some()
}
