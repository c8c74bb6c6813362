pub mod hours;
pub mod main_shop;
pub mod planning;
pub mod register;
pub mod report;
pub mod storage;

pub use planning::{Employee, PlanningData, PlanningError, Shop, ShopConfig, WeekData, WeekKey};
pub use storage::{KeyValueStore, MemoryStore, SqliteStore};
