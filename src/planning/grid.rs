use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::planning::model::{DaySlots, EmployeeId, PlanningData, PlanningError, WeekData};
use crate::planning::week_key::WeekKey;

pub type WeekPlanning = BTreeMap<EmployeeId, BTreeMap<NaiveDate, DaySlots>>;

pub fn get_week_planning(
    data: &PlanningData,
    shop_id: &str,
    week: WeekKey,
) -> Result<WeekData, PlanningError> {
    let shop = data.require_shop(shop_id)?;
    let slot_count = shop.config.slot_count();
    let stored = shop.week(week);

    let mut employees: Vec<&EmployeeId> = shop.roster.iter().collect();
    if let Some(stored) = stored {
        for id in stored.selected_employees.iter().chain(stored.planning.keys()) {
            if !employees.contains(&id) {
                employees.push(id);
            }
        }
    }

    let mut planning = WeekPlanning::new();
    for employee_id in employees {
        let stored_days = stored.and_then(|w| w.planning.get(employee_id));
        let days = week
            .days()
            .map(|date| {
                let slots = stored_days
                    .and_then(|days| days.get(&date))
                    .map(|slots| slots.normalized(slot_count))
                    .unwrap_or_else(|| DaySlots::empty(slot_count));
                (date, slots)
            })
            .collect();
        planning.insert(employee_id.clone(), days);
    }

    Ok(WeekData {
        planning,
        selected_employees: stored
            .map(|w| w.selected_employees.clone())
            .unwrap_or_default(),
    })
}

pub fn save_week_planning(
    data: &PlanningData,
    shop_id: &str,
    week: WeekKey,
    planning: WeekPlanning,
    selected_employees: Vec<EmployeeId>,
) -> Result<PlanningData, PlanningError> {
    let mut next = data.clone();
    let shop = next
        .shop_mut(shop_id)
        .ok_or_else(|| PlanningError::ShopNotFound(shop_id.to_string()))?;

    debug!(shop = shop_id, %week, employees = planning.len(), "saving week planning");
    shop.weeks.insert(
        week,
        WeekData {
            planning,
            selected_employees,
        },
    );
    Ok(next)
}

fn update_day<F>(
    data: &PlanningData,
    shop_id: &str,
    employee_id: &str,
    date: NaiveDate,
    update: F,
) -> Result<PlanningData, PlanningError>
where
    F: FnOnce(DaySlots, usize) -> Result<DaySlots, PlanningError>,
{
    let week = WeekKey::containing(date);
    let slot_count = data.require_shop(shop_id)?.config.slot_count();
    let mut week_data = get_week_planning(data, shop_id, week)?;

    let current = week_data
        .day(employee_id, date)
        .cloned()
        .unwrap_or_else(|| DaySlots::empty(slot_count));
    let updated = update(current, slot_count)?;

    for day in week.days() {
        if day != date && week_data.day(employee_id, day).is_none() {
            week_data.set_day(employee_id, day, DaySlots::empty(slot_count));
        }
    }
    week_data.set_day(employee_id, date, updated);
    week_data.select(employee_id);

    save_week_planning(
        data,
        shop_id,
        week,
        week_data.planning,
        week_data.selected_employees,
    )
}

/// Flips one slot. Toggling a leave day turns it back into a working day
/// with only that slot set.
pub fn toggle_slot(
    data: &PlanningData,
    shop_id: &str,
    employee_id: &str,
    date: NaiveDate,
    index: usize,
) -> Result<PlanningData, PlanningError> {
    update_day(data, shop_id, employee_id, date, |current, slot_count| {
        if index >= slot_count {
            return Err(PlanningError::SlotOutOfRange { index, len: slot_count });
        }
        let mut slots = match current {
            DaySlots::Slots(slots) => slots,
            DaySlots::Leave => vec![false; slot_count],
        };
        slots[index] = !slots[index];
        Ok(DaySlots::Slots(slots))
    })
}

pub fn set_day_slots(
    data: &PlanningData,
    shop_id: &str,
    employee_id: &str,
    date: NaiveDate,
    slots: Vec<bool>,
) -> Result<PlanningData, PlanningError> {
    update_day(data, shop_id, employee_id, date, |_, slot_count| {
        Ok(DaySlots::Slots(slots).normalized(slot_count))
    })
}

pub fn mark_leave(
    data: &PlanningData,
    shop_id: &str,
    employee_id: &str,
    date: NaiveDate,
) -> Result<PlanningData, PlanningError> {
    update_day(data, shop_id, employee_id, date, |_, _| Ok(DaySlots::Leave))
}
