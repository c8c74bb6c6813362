use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::planning::{
    Employee, EmployeeTable, PlanningData, Shop, ShopConfig, ShopId, WeekData, WeekKey,
    CURRENT_VERSION,
};

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Invalid backup file: missing '{0}'")]
    MissingField(&'static str),
    #[error("Invalid backup file: unsupported version '{0}'")]
    InvalidVersion(String),
    #[error("Failed to access backup file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopRecord {
    pub id: ShopId,
    pub name: String,
    pub config: ShopConfig,
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub weeks: BTreeMap<WeekKey, WeekData>,
}

/// Employees are repeated under every shop that lists them. Those listed
/// under no shop go in the top-level `employees`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,
    pub shops: Vec<ShopRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub employees: Vec<Employee>,
}

impl BackupDocument {
    pub fn from_planning(data: &PlanningData, export_date: Option<DateTime<Utc>>) -> Self {
        let shops = data
            .shops
            .iter()
            .map(|shop| ShopRecord {
                id: shop.id.clone(),
                name: shop.name.clone(),
                config: shop.config.clone(),
                employees: data.employees.roster_of(shop).cloned().collect(),
                weeks: shop.weeks.clone(),
            })
            .collect();

        let listed: BTreeSet<&str> = data
            .shops
            .iter()
            .flat_map(|shop| shop.roster.iter().map(String::as_str))
            .collect();
        let employees = data
            .employees
            .iter()
            .filter(|employee| !listed.contains(employee.id.as_str()))
            .cloned()
            .collect();

        Self {
            version: data.version.clone(),
            export_date,
            shops,
            employees,
        }
    }

    pub fn into_planning(self) -> PlanningData {
        let mut employees = EmployeeTable::default();
        let mut shops = Vec::with_capacity(self.shops.len());

        for record in self.shops {
            let mut shop = Shop::new(record.id, record.name, record.config);
            shop.weeks = record.weeks;
            for employee in record.employees {
                shop.add_to_roster(&employee.id);
                employees.merge(employee);
            }
            shops.push(shop);
        }
        for employee in self.employees {
            employees.merge(employee);
        }

        PlanningData {
            version: self.version,
            shops,
            employees,
        }
    }
}

pub fn export_json(data: &PlanningData, export_date: DateTime<Utc>) -> Result<String, BackupError> {
    let document = BackupDocument::from_planning(data, Some(export_date));
    Ok(serde_json::to_string_pretty(&document)?)
}

pub fn import_json(content: &str) -> Result<PlanningData, BackupError> {
    let mut value: Value = serde_json::from_str(content)?;

    let version = match value.get("version") {
        Some(Value::String(version)) => version.clone(),
        Some(Value::Number(version)) => format!("{:.1}", version.as_f64().unwrap_or(0.0)),
        _ => return Err(BackupError::MissingField("version")),
    };
    if !value.get("shops").is_some_and(Value::is_array) {
        return Err(BackupError::MissingField("shops"));
    }
    value["version"] = Value::String(version.clone());

    let document: BackupDocument = serde_json::from_value(value)?;
    let document = migrate(document)?;
    info!(version = %document.version, shops = document.shops.len(), "imported planning backup");
    Ok(document.into_planning())
}

fn migrate(document: BackupDocument) -> Result<BackupDocument, BackupError> {
    let version: f64 = document
        .version
        .parse()
        .map_err(|_| BackupError::InvalidVersion(document.version.clone()))?;
    let current: f64 = CURRENT_VERSION.parse().unwrap_or(2.0);

    if version < current {
        warn!(version = %document.version, "legacy backup format, importing as is");
    }
    Ok(document)
}

pub fn export_to_file(data: &PlanningData, path: &Path) -> Result<(), BackupError> {
    let content = export_json(data, Utc::now())?;
    std::fs::write(path, content)?;
    info!(path = %path.display(), "exported planning backup");
    Ok(())
}

pub fn import_from_file(path: &Path) -> Result<PlanningData, BackupError> {
    let content = std::fs::read_to_string(path)?;
    import_json(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::{mark_leave, set_day_slots, DaySlots};
    use chrono::{Days, NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use tempfile::tempdir;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn sample_planning() -> PlanningData {
        let (data, nice) = PlanningData::new().add_shop("Nice", ShopConfig::default());
        let (data, cannes) = data.add_shop("Cannes", ShopConfig::default());
        let (data, lea) = data.add_employee("Léa", &[&nice, &cannes]).unwrap();
        let (data, hugo) = data.add_employee("Hugo", &[&cannes]).unwrap();
        let data = set_day_slots(&data, &nice, &lea, date(2025, 7, 28), vec![true, true, false, true]).unwrap();
        let data = set_day_slots(&data, &cannes, &hugo, date(2025, 8, 5), vec![false, true]).unwrap();
        mark_leave(&data, &cannes, &lea, date(2025, 8, 6)).unwrap()
    }

    #[test]
    fn export_then_import_is_lossless() {
        let data = sample_planning();
        let now = Utc.with_ymd_and_hms(2025, 8, 10, 18, 0, 0).unwrap();

        let json = export_json(&data, now).unwrap();
        let imported = import_json(&json).unwrap();

        assert_eq!(imported, data);
    }

    #[test]
    fn export_repeats_shared_employees_under_each_shop() {
        let data = sample_planning();
        let document = BackupDocument::from_planning(&data, None);

        let counts: Vec<usize> = document.shops.iter().map(|s| s.employees.len()).collect();

        assert_eq!(counts, vec![1, 2]);
    }

    #[test]
    fn export_writes_leave_marker_and_camel_case_fields() {
        let data = sample_planning();
        let now = Utc.with_ymd_and_hms(2025, 8, 10, 18, 0, 0).unwrap();

        let value: Value = serde_json::from_str(&export_json(&data, now).unwrap()).unwrap();

        assert!(value.get("exportDate").is_some());
        assert!(value["shops"][0]["config"].get("timeSlots").is_some());
        assert!(value.to_string().contains("Congé ☀️"));
    }

    #[test]
    fn import_merges_employee_authorizations() {
        let json = r#"{
            "version": "2.0",
            "shops": [
                {
                    "id": "nice",
                    "name": "Nice",
                    "config": {"timeSlots": ["09:00", "09:30"], "interval": 30, "startTime": "09:00", "endTime": "10:00"},
                    "employees": [{"id": "emp_1", "name": "Léa", "canWorkIn": ["nice"]}]
                },
                {
                    "id": "cannes",
                    "name": "Cannes",
                    "config": {"timeSlots": ["09:00", "09:30"], "interval": 30, "startTime": "09:00", "endTime": "10:00"},
                    "employees": [{"id": "emp_1", "name": "Léa", "canWorkIn": ["cannes"]}],
                    "weeks": {
                        "2025-07-28": {
                            "planning": {"emp_1": {"2025-07-28": [true, false], "2025-07-29": "Congé ☀️"}},
                            "selectedEmployees": ["emp_1"]
                        }
                    }
                }
            ]
        }"#;

        let data = import_json(json).unwrap();

        assert_eq!(data.employees.len(), 1);
        assert_eq!(data.employee("emp_1").unwrap().can_work_in, vec!["nice", "cannes"]);
        let week = data.shop("cannes").unwrap().week(WeekKey::new(date(2025, 7, 28)).unwrap()).unwrap();
        assert_eq!(week.day("emp_1", date(2025, 7, 29)), Some(&DaySlots::Leave));
    }

    #[test]
    fn employee_without_shop_survives_round_trip() {
        let (data, nice) = PlanningData::new().add_shop("Nice", ShopConfig::default());
        let (data, _) = data.add_employee("Léa", &[&nice]).unwrap();
        let (data, hugo) = data.add_employee("Hugo", &[] as &[&str]).unwrap();
        let now = Utc.with_ymd_and_hms(2025, 8, 10, 18, 0, 0).unwrap();

        let json = export_json(&data, now).unwrap();
        let imported = import_json(&json).unwrap();

        assert_eq!(imported, data);
        assert_eq!(imported.employee(&hugo).unwrap().name, "Hugo");
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["employees"][0]["id"], hugo.as_str());
    }

    #[test]
    fn export_omits_top_level_employees_when_all_are_listed() {
        let value = serde_json::to_value(BackupDocument::from_planning(&sample_planning(), None)).unwrap();
        assert!(value.get("employees").is_none());
    }

    #[test]
    fn import_with_zero_interval_is_rejected() {
        let json = r#"{
            "version": "2.0",
            "shops": [{
                "id": "nice",
                "name": "Nice",
                "config": {"timeSlots": [], "interval": 0, "startTime": "09:00", "endTime": "10:00"}
            }]
        }"#;

        let err = import_json(json).unwrap_err();

        assert!(matches!(err, BackupError::InvalidJson(_)));
        assert!(err.to_string().contains("interval must be positive"));
    }

    #[test]
    fn import_with_slots_not_matching_hours_is_rejected() {
        let json = r#"{
            "version": "2.0",
            "shops": [{
                "id": "nice",
                "name": "Nice",
                "config": {"timeSlots": ["09:00", "09:15"], "interval": 30, "startTime": "09:00", "endTime": "10:00"}
            }]
        }"#;

        assert!(matches!(import_json(json), Err(BackupError::InvalidJson(_))));
    }

    #[test]
    fn import_without_version_is_rejected() {
        let result = import_json(r#"{"shops": []}"#);
        assert!(matches!(result, Err(BackupError::MissingField("version"))));
    }

    #[test]
    fn import_without_shops_array_is_rejected() {
        let result = import_json(r#"{"version": "2.0", "shops": {}}"#);
        assert!(matches!(result, Err(BackupError::MissingField("shops"))));
    }

    #[test]
    fn import_of_malformed_json_is_rejected() {
        let result = import_json("{ not json");
        assert!(matches!(result, Err(BackupError::InvalidJson(_))));
    }

    #[test]
    fn import_with_non_monday_week_is_rejected() {
        let json = r#"{
            "version": "2.0",
            "shops": [{
                "id": "nice",
                "name": "Nice",
                "config": {"timeSlots": ["09:00", "09:30"], "interval": 30, "startTime": "09:00", "endTime": "10:00"},
                "weeks": {"2025-07-29": {}}
            }]
        }"#;

        assert!(matches!(import_json(json), Err(BackupError::InvalidJson(_))));
    }

    #[test]
    fn numeric_legacy_version_is_accepted() {
        let data = import_json(r#"{"version": 1.5, "shops": []}"#).unwrap();
        assert_eq!(data.version, "1.5");
    }

    #[test]
    fn unparsable_version_is_rejected() {
        let result = import_json(r#"{"version": "latest", "shops": []}"#);
        assert!(matches!(result, Err(BackupError::InvalidVersion(v)) if v == "latest"));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("planning.json");
        let data = sample_planning();

        export_to_file(&data, &path).unwrap();
        let imported = import_from_file(&path).unwrap();

        assert_eq!(imported, data);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = import_from_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(BackupError::Io(_))));
    }

    fn planning_from(shop_count: usize, employees: &[(Vec<bool>, Vec<bool>)]) -> PlanningData {
        let monday = date(2025, 7, 28);
        let mut data = PlanningData::new();
        let mut shop_ids = Vec::new();
        for index in 0..shop_count {
            let (next, id) = data.add_shop(&format!("Shop {}", index), ShopConfig::default());
            data = next;
            shop_ids.push(id);
        }

        for (index, (membership, slots)) in employees.iter().enumerate() {
            let shops: Vec<&String> = shop_ids
                .iter()
                .zip(membership)
                .filter(|(_, listed)| **listed)
                .map(|(id, _)| id)
                .collect();
            let (next, employee) = data.add_employee(&format!("Employee {}", index), &shops).unwrap();
            data = next;
            if let Some(shop) = shops.first() {
                let day = monday.checked_add_days(Days::new(index as u64 % 7)).unwrap();
                data = set_day_slots(&data, shop, &employee, day, slots.clone()).unwrap();
            }
        }
        data
    }

    proptest! {
        #[test]
        fn export_then_import_round_trips(
            shop_count in 1usize..4,
            employees in proptest::collection::vec(
                (
                    proptest::collection::vec(any::<bool>(), 3),
                    proptest::collection::vec(any::<bool>(), 0..6),
                ),
                0..6,
            ),
        ) {
            let data = planning_from(shop_count, &employees);
            let now = Utc.with_ymd_and_hms(2025, 8, 10, 18, 0, 0).unwrap();

            let imported = import_json(&export_json(&data, now).unwrap()).unwrap();

            prop_assert_eq!(imported, data);
        }
    }
}
