pub mod clipboard;
pub mod employees;
pub mod grid;
pub mod model;
pub mod week_key;

pub use clipboard::{Clipboard, ConflictPolicy, CopyScope, CopySource, PasteOutcome, PasteTarget};
pub use employees::{Employee, EmployeeTable};
pub use grid::{get_week_planning, mark_leave, save_week_planning, set_day_slots, toggle_slot};
pub use model::{
    DaySlots, EmployeeId, PlanningData, PlanningError, Shop, ShopConfig, ShopId, WeekData,
    CURRENT_VERSION, LEAVE_MARKER,
};
pub use week_key::{parse_iso_date, WeekKey, WeekKeyError};
