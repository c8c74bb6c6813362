use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use uuid::Uuid;

use crate::planning::employees::{Employee, EmployeeTable};
use crate::planning::week_key::WeekKey;

pub type ShopId = String;
pub type EmployeeId = String;

/// Stored in place of a slot array on a leave day.
pub const LEAVE_MARKER: &str = "Congé ☀️";
pub const CURRENT_VERSION: &str = "2.0";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlanningError {
    #[error("Shop not found: {0}")]
    ShopNotFound(ShopId),
    #[error("Employee not found: {0}")]
    EmployeeNotFound(EmployeeId),
    #[error("Date {date} is outside week {week}")]
    DayOutsideWeek { date: NaiveDate, week: WeekKey },
    #[error("Slot {index} out of range ({len} slots configured)")]
    SlotOutOfRange { index: usize, len: usize },
    #[error("Invalid shop configuration: {0}")]
    InvalidConfig(String),
    #[error("Nothing to paste: clipboard is empty")]
    EmptyClipboard,
    #[error("Cannot paste a copied week into a single day")]
    IncompatiblePaste,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DaySlots {
    Slots(Vec<bool>),
    Leave,
}

impl Serialize for DaySlots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DaySlots::Slots(slots) => slots.serialize(serializer),
            DaySlots::Leave => serializer.serialize_str(LEAVE_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for DaySlots {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Slots(Vec<bool>),
            Marker(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Slots(slots) => Ok(DaySlots::Slots(slots)),
            Raw::Marker(marker) if marker == LEAVE_MARKER => Ok(DaySlots::Leave),
            Raw::Marker(marker) => Err(de::Error::custom(format!("unknown day marker '{}'", marker))),
        }
    }
}

impl DaySlots {
    pub fn empty(slot_count: usize) -> Self {
        DaySlots::Slots(vec![false; slot_count])
    }

    pub fn is_leave(&self) -> bool {
        matches!(self, DaySlots::Leave)
    }

    pub fn as_slots(&self) -> Option<&[bool]> {
        match self {
            DaySlots::Slots(slots) => Some(slots),
            DaySlots::Leave => None,
        }
    }

    pub fn occupied_within(&self, slot_count: usize) -> usize {
        self.as_slots()
            .map(|slots| slots.iter().take(slot_count).filter(|s| **s).count())
            .unwrap_or(0)
    }

    pub fn is_occupied(&self) -> bool {
        self.as_slots().is_some_and(|slots| slots.contains(&true))
    }

    pub fn normalized(&self, slot_count: usize) -> Self {
        match self {
            DaySlots::Slots(slots) => {
                let mut resized = slots.clone();
                resized.resize(slot_count, false);
                DaySlots::Slots(resized)
            }
            DaySlots::Leave => DaySlots::Leave,
        }
    }
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format("%H:%M"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&value, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&value, "%H:%M:%S"))
            .map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopConfig {
    pub time_slots: Vec<String>,
    pub interval: u32,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
}

impl<'de> Deserialize<'de> for ShopConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Raw {
            time_slots: Vec<String>,
            interval: u32,
            #[serde(with = "hhmm")]
            start_time: NaiveTime,
            #[serde(with = "hhmm")]
            end_time: NaiveTime,
        }

        let raw = Raw::deserialize(deserializer)?;
        let config = ShopConfig::new(raw.start_time, raw.end_time, raw.interval).map_err(de::Error::custom)?;
        if config.time_slots != raw.time_slots {
            return Err(de::Error::custom(format!(
                "time slots {:?} do not match {}-{} every {} minutes",
                raw.time_slots,
                config.start_time.format("%H:%M"),
                config.end_time.format("%H:%M"),
                config.interval
            )));
        }
        Ok(config)
    }
}

impl ShopConfig {
    pub fn new(start: NaiveTime, end: NaiveTime, interval: u32) -> Result<Self, PlanningError> {
        if interval == 0 {
            return Err(PlanningError::InvalidConfig("interval must be positive".to_string()));
        }
        if start >= end {
            return Err(PlanningError::InvalidConfig(format!(
                "start {} must be before end {}",
                start.format("%H:%M"),
                end.format("%H:%M")
            )));
        }

        let start_minute = start.num_seconds_from_midnight() / 60;
        let end_minute = end.num_seconds_from_midnight() / 60;
        let time_slots = (start_minute..end_minute)
            .step_by(interval as usize)
            .filter_map(|minute| NaiveTime::from_num_seconds_from_midnight_opt(minute * 60, 0))
            .map(|time| time.format("%H:%M").to_string())
            .collect();

        Ok(Self {
            time_slots,
            interval,
            start_time: start,
            end_time: end,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.time_slots.len()
    }

    pub fn slot_offset_minutes(&self, index: usize) -> Option<u32> {
        let index = u32::try_from(index).ok()?;
        index
            .checked_mul(self.interval)?
            .checked_add(self.start_time.num_seconds_from_midnight() / 60)
    }

    pub fn slot_start(&self, index: usize) -> Option<NaiveTime> {
        let minute = self.slot_offset_minutes(index)?;
        NaiveTime::from_num_seconds_from_midnight_opt(minute.checked_mul(60)?, 0)
    }

    pub fn hours_for_slots(&self, occupied: usize) -> f64 {
        occupied as f64 * self.interval as f64 / 60.0
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        let start = NaiveTime::from_hms_opt(9, 0, 0).expect("valid opening time");
        let end = NaiveTime::from_hms_opt(20, 0, 0).expect("valid closing time");
        Self::new(start, end, 30).expect("default shop hours are valid")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekData {
    #[serde(default)]
    pub planning: BTreeMap<EmployeeId, BTreeMap<NaiveDate, DaySlots>>,
    #[serde(default)]
    pub selected_employees: Vec<EmployeeId>,
}

impl WeekData {
    pub fn day(&self, employee_id: &str, date: NaiveDate) -> Option<&DaySlots> {
        self.planning.get(employee_id).and_then(|days| days.get(&date))
    }

    pub fn set_day(&mut self, employee_id: &str, date: NaiveDate, slots: DaySlots) {
        self.planning
            .entry(employee_id.to_string())
            .or_default()
            .insert(date, slots);
    }

    pub fn select(&mut self, employee_id: &str) {
        if !self.selected_employees.iter().any(|id| id == employee_id) {
            self.selected_employees.push(employee_id.to_string());
        }
    }

    pub fn occupied_slots(&self, employee_id: &str, slot_count: usize) -> usize {
        self.planning
            .get(employee_id)
            .map(|days| days.values().map(|d| d.occupied_within(slot_count)).sum())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shop {
    pub id: ShopId,
    pub name: String,
    pub config: ShopConfig,
    pub roster: Vec<EmployeeId>,
    pub weeks: BTreeMap<WeekKey, WeekData>,
}

impl Shop {
    pub fn new(id: impl Into<ShopId>, name: impl Into<String>, config: ShopConfig) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            config,
            roster: Vec::new(),
            weeks: BTreeMap::new(),
        }
    }

    pub fn week(&self, week: WeekKey) -> Option<&WeekData> {
        self.weeks.get(&week)
    }

    pub fn add_to_roster(&mut self, employee_id: &str) {
        if !self.roster.iter().any(|id| id == employee_id) {
            self.roster.push(employee_id.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanningData {
    pub version: String,
    pub shops: Vec<Shop>,
    pub employees: EmployeeTable,
}

impl PlanningData {
    pub fn new() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            shops: Vec::new(),
            employees: EmployeeTable::default(),
        }
    }

    pub fn shop(&self, shop_id: &str) -> Option<&Shop> {
        self.shops.iter().find(|shop| shop.id == shop_id)
    }

    pub(crate) fn shop_mut(&mut self, shop_id: &str) -> Option<&mut Shop> {
        self.shops.iter_mut().find(|shop| shop.id == shop_id)
    }

    pub fn require_shop(&self, shop_id: &str) -> Result<&Shop, PlanningError> {
        self.shop(shop_id)
            .ok_or_else(|| PlanningError::ShopNotFound(shop_id.to_string()))
    }

    pub fn employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees.get(employee_id)
    }

    pub fn employee_name<'a>(&'a self, employee_id: &'a str) -> &'a str {
        self.employee(employee_id)
            .map(|e| e.name.as_str())
            .unwrap_or(employee_id)
    }

    pub fn add_shop(&self, name: &str, config: ShopConfig) -> (Self, ShopId) {
        let id = format!("shop_{}", Uuid::new_v4().simple());
        let mut next = self.clone();
        next.shops.push(Shop::new(id.clone(), name, config));
        (next, id)
    }

    pub fn add_employee<S: AsRef<str>>(&self, name: &str, shops: &[S]) -> Result<(Self, EmployeeId), PlanningError> {
        let id = format!("emp_{}", Uuid::new_v4().simple());
        let next = self.with_employee_in(Employee::new(id.clone(), name), shops)?;
        Ok((next, id))
    }

    pub fn with_employee_in<S: AsRef<str>>(&self, mut employee: Employee, shops: &[S]) -> Result<Self, PlanningError> {
        let mut next = self.clone();
        for shop_id in shops.iter().map(AsRef::as_ref) {
            let shop = next
                .shop_mut(shop_id)
                .ok_or_else(|| PlanningError::ShopNotFound(shop_id.to_string()))?;
            shop.add_to_roster(&employee.id);
            employee.authorize(shop_id);
        }
        next.employees.merge(employee);
        Ok(next)
    }
}

impl Default for PlanningData {
    fn default() -> Self {
        Self::new()
    }
}
