use chrono::{NaiveDate, NaiveTime};

use crate::planning::{DaySlots, PlanningData, ShopConfig, WeekData, WeekKey};

pub fn calculate_employee_daily_hours(
    employee_id: &str,
    day: NaiveDate,
    week: &WeekData,
    config: &ShopConfig,
) -> f64 {
    match week.day(employee_id, day) {
        Some(slots @ DaySlots::Slots(_)) => {
            config.hours_for_slots(slots.occupied_within(config.slot_count()))
        }
        Some(DaySlots::Leave) | None => 0.0,
    }
}

pub fn week_day_hours(
    employee_id: &str,
    week_key: WeekKey,
    week: &WeekData,
    config: &ShopConfig,
) -> [f64; 7] {
    let mut hours = [0.0; 7];
    for (offset, day) in week_key.days().enumerate() {
        hours[offset] = calculate_employee_daily_hours(employee_id, day, week, config);
    }
    hours
}

pub fn calculate_employee_weekly_hours(
    employee_id: &str,
    week_key: WeekKey,
    week: &WeekData,
    config: &ShopConfig,
) -> f64 {
    week_day_hours(employee_id, week_key, week, config).iter().sum()
}

pub fn employee_shop_hours_on(
    data: &PlanningData,
    shop_id: &str,
    employee_id: &str,
    date: NaiveDate,
) -> f64 {
    let Some(shop) = data.shop(shop_id) else {
        return 0.0;
    };
    shop.week(WeekKey::containing(date))
        .map(|week| calculate_employee_daily_hours(employee_id, date, week, &shop.config))
        .unwrap_or(0.0)
}

pub fn employee_day_hours_all_shops(data: &PlanningData, employee_id: &str, date: NaiveDate) -> f64 {
    data.shops
        .iter()
        .map(|shop| employee_shop_hours_on(data, &shop.id, employee_id, date))
        .sum()
}

pub fn employee_hours_between(
    data: &PlanningData,
    employee_id: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> f64 {
    start
        .iter_days()
        .take_while(|day| *day <= end)
        .map(|day| employee_day_hours_all_shops(data, employee_id, day))
        .sum()
}

const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShiftRange {
    pub start: NaiveTime,
    pub end: NaiveTime,
    /// `end` is on the following day, e.g. a shift closing at 24:00 ends at 00:00.
    pub ends_next_day: bool,
}

pub fn shift_ranges(slots: &[bool], config: &ShopConfig) -> Vec<ShiftRange> {
    let mut ranges = Vec::new();
    let mut run_start: Option<usize> = None;
    let slot_count = slots.len().min(config.slot_count());

    for index in 0..=slot_count {
        let occupied = index < slot_count && slots[index];
        match (occupied, run_start) {
            (true, None) => run_start = Some(index),
            (false, Some(first)) => {
                if let Some(range) = shift_range(config, first, index) {
                    ranges.push(range);
                }
                run_start = None;
            }
            _ => {}
        }
    }
    ranges
}

fn shift_range(config: &ShopConfig, first: usize, past_last: usize) -> Option<ShiftRange> {
    let start = config.slot_start(first)?;
    let end_minute = config.slot_offset_minutes(past_last)?;
    let end = NaiveTime::from_num_seconds_from_midnight_opt((end_minute % MINUTES_PER_DAY) * 60, 0)?;
    Some(ShiftRange {
        start,
        end,
        ends_next_day: end_minute >= MINUTES_PER_DAY,
    })
}
