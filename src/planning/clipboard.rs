use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::planning::grid::{get_week_planning, save_week_planning};
use crate::planning::model::{DaySlots, EmployeeId, PlanningData, PlanningError, ShopId};
use crate::planning::week_key::WeekKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyScope {
    Week,
    Day(NaiveDate),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopySource {
    pub shop_id: ShopId,
    pub week: WeekKey,
    pub scope: CopyScope,
    pub employees: Vec<EmployeeId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PasteTarget {
    pub shop_id: ShopId,
    pub week: WeekKey,
    pub scope: CopyScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    Ask,
    Overwrite,
    Merge,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConflict {
    pub employee_id: EmployeeId,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PasteOutcome {
    Applied(PlanningData),
    NeedsConfirmation { conflicts: Vec<SlotConflict> },
}

#[derive(Debug, Clone, PartialEq)]
enum CopiedSlots {
    Week(Vec<DaySlots>),
    Day(DaySlots),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CopyBuffer {
    pub source: CopySource,
    payload: BTreeMap<EmployeeId, CopiedSlots>,
}

impl CopyBuffer {
    pub fn employee_count(&self) -> usize {
        self.payload.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    buffer: Option<CopyBuffer>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> Option<&CopyBuffer> {
        self.buffer.as_ref()
    }

    pub fn clear(&mut self) {
        self.buffer = None;
    }

    pub fn copy(&mut self, data: &PlanningData, source: CopySource) -> Result<&CopyBuffer, PlanningError> {
        let slot_count = data.require_shop(&source.shop_id)?.config.slot_count();
        let week_data = get_week_planning(data, &source.shop_id, source.week)?;

        if let CopyScope::Day(date) = source.scope
            && !source.week.contains(date)
        {
            return Err(PlanningError::DayOutsideWeek { date, week: source.week });
        }

        let day_or_empty = |employee_id: &str, date: NaiveDate| {
            week_data
                .day(employee_id, date)
                .cloned()
                .unwrap_or_else(|| DaySlots::empty(slot_count))
        };

        let payload = source
            .employees
            .iter()
            .map(|employee_id| {
                let copied = match source.scope {
                    CopyScope::Week => CopiedSlots::Week(
                        source.week.days().map(|date| day_or_empty(employee_id.as_str(), date)).collect(),
                    ),
                    CopyScope::Day(date) => CopiedSlots::Day(day_or_empty(employee_id.as_str(), date)),
                };
                (employee_id.clone(), copied)
            })
            .collect();

        if self.buffer.is_some() {
            debug!("replacing previous clipboard content");
        }
        info!(
            shop = %source.shop_id,
            week = %source.week,
            employees = source.employees.len(),
            "copied planning"
        );

        Ok(self.buffer.insert(CopyBuffer { source, payload }))
    }

    pub fn paste(
        &self,
        data: &PlanningData,
        target: &PasteTarget,
        policy: ConflictPolicy,
    ) -> Result<PasteOutcome, PlanningError> {
        let buffer = self.buffer.as_ref().ok_or(PlanningError::EmptyClipboard)?;
        let slot_count = data.require_shop(&target.shop_id)?.config.slot_count();
        let mut week_data = get_week_planning(data, &target.shop_id, target.week)?;
        let writes = plan_writes(buffer, target, slot_count)?;

        if policy == ConflictPolicy::Ask {
            let conflicts: Vec<SlotConflict> = writes
                .iter()
                .filter(|(employee_id, date, _)| {
                    week_data.day(employee_id, *date).is_some_and(DaySlots::is_occupied)
                })
                .map(|(employee_id, date, _)| SlotConflict {
                    employee_id: employee_id.clone(),
                    date: *date,
                })
                .collect();
            if !conflicts.is_empty() {
                debug!(conflicts = conflicts.len(), "paste needs confirmation");
                return Ok(PasteOutcome::NeedsConfirmation { conflicts });
            }
        }

        for (employee_id, date, incoming) in writes {
            let slots = match (policy, week_data.day(&employee_id, date)) {
                (ConflictPolicy::Merge, Some(existing)) => merge_slots(existing, incoming),
                _ => incoming,
            };
            for day in target.week.days() {
                if week_data.day(&employee_id, day).is_none() {
                    week_data.set_day(&employee_id, day, DaySlots::empty(slot_count));
                }
            }
            week_data.set_day(&employee_id, date, slots);
            week_data.select(&employee_id);
        }

        info!(shop = %target.shop_id, week = %target.week, "pasted planning");
        let next = save_week_planning(
            data,
            &target.shop_id,
            target.week,
            week_data.planning,
            week_data.selected_employees,
        )?;
        Ok(PasteOutcome::Applied(next))
    }
}

fn plan_writes(
    buffer: &CopyBuffer,
    target: &PasteTarget,
    slot_count: usize,
) -> Result<Vec<(EmployeeId, NaiveDate, DaySlots)>, PlanningError> {
    if let CopyScope::Day(date) = target.scope
        && !target.week.contains(date)
    {
        return Err(PlanningError::DayOutsideWeek { date, week: target.week });
    }

    let mut writes = Vec::new();
    for (employee_id, copied) in &buffer.payload {
        match (copied, target.scope) {
            (CopiedSlots::Week(days), CopyScope::Week) => {
                for (date, slots) in target.week.days().zip(days) {
                    writes.push((employee_id.clone(), date, slots.normalized(slot_count)));
                }
            }
            (CopiedSlots::Day(slots), CopyScope::Week) => {
                for date in target.week.days() {
                    writes.push((employee_id.clone(), date, slots.normalized(slot_count)));
                }
            }
            (CopiedSlots::Day(slots), CopyScope::Day(date)) => {
                writes.push((employee_id.clone(), date, slots.normalized(slot_count)));
            }
            (CopiedSlots::Week(_), CopyScope::Day(_)) => return Err(PlanningError::IncompatiblePaste),
        }
    }
    Ok(writes)
}

fn merge_slots(existing: &DaySlots, incoming: DaySlots) -> DaySlots {
    match (existing, incoming) {
        (DaySlots::Slots(current), DaySlots::Slots(pasted)) => DaySlots::Slots(
            pasted
                .iter()
                .enumerate()
                .map(|(i, slot)| *slot || current.get(i).copied().unwrap_or(false))
                .collect(),
        ),
        (_, incoming) => incoming,
    }
}
