use tracing::{debug, error, warn};

use crate::planning::{EmployeeId, PlanningData, Shop, WeekData, WeekKey};
use crate::storage::backup::BackupDocument;
use crate::storage::keys::{
    is_app_key, parse_planning_key, planning_key, selected_employees_key, PlanningKey, SHOPS,
};
use crate::storage::kv::{get_json, set_json, KeyValueStore, StorageError};

pub fn write_week<S: KeyValueStore + ?Sized>(
    store: &mut S,
    shop: &Shop,
    week: WeekKey,
    data: &WeekData,
) -> Result<(), StorageError> {
    set_json(store, &planning_key(&shop.id, week), &data.planning)?;
    set_json(store, &selected_employees_key(&shop.id, week), &data.selected_employees)?;
    Ok(())
}

pub fn save_to_store<S: KeyValueStore + ?Sized>(store: &mut S, data: &PlanningData) -> usize {
    let mut failures = 0;

    let mut shop_index = BackupDocument::from_planning(data, None);
    for record in &mut shop_index.shops {
        record.weeks.clear();
    }
    if let Err(e) = set_json(store, SHOPS, &shop_index) {
        error!("Failed to save shop list: {}", e);
        failures += 1;
    }

    for shop in &data.shops {
        for (week, week_data) in &shop.weeks {
            if let Err(e) = write_week(store, shop, *week, week_data) {
                error!(shop = %shop.id, %week, "Failed to save week: {}", e);
                failures += 1;
            }
        }
    }

    debug!(shops = data.shops.len(), failures, "mirrored planning to store");
    failures
}

pub fn load_from_store<S: KeyValueStore + ?Sized>(store: &S) -> Result<PlanningData, StorageError> {
    let Some(index) = get_json::<BackupDocument, _>(store, SHOPS)? else {
        return Ok(PlanningData::new());
    };
    let mut data = index.into_planning();

    for key in store.keys()? {
        let Some(parsed) = parse_planning_key(&key) else {
            continue;
        };
        let (shop_id, week) = match &parsed {
            PlanningKey::Planning { shop_id, week } => (shop_id.clone(), *week),
            PlanningKey::SelectedEmployees { shop_id, week } => (shop_id.clone(), *week),
        };
        let Some(shop) = data.shop_mut(&shop_id) else {
            warn!(key = %key, "week stored for unknown shop, skipping");
            continue;
        };
        let week_data = shop.weeks.entry(week).or_default();

        match parsed {
            PlanningKey::Planning { .. } => {
                if let Some(planning) = get_json(store, &key)? {
                    week_data.planning = planning;
                }
            }
            PlanningKey::SelectedEmployees { .. } => {
                if let Some(selected) = get_json::<Vec<EmployeeId>, _>(store, &key)? {
                    week_data.selected_employees = selected;
                }
            }
        }
    }

    Ok(data)
}

pub fn clear_store<S: KeyValueStore + ?Sized>(store: &mut S) -> usize {
    let keys = match store.keys() {
        Ok(keys) => keys,
        Err(e) => {
            error!("Failed to list stored keys: {}", e);
            return 1;
        }
    };

    let mut failures = 0;
    for key in keys.iter().filter(|key| is_app_key(key)) {
        if let Err(e) = store.remove(key) {
            error!(key = %key, "Failed to remove key: {}", e);
            failures += 1;
        }
    }
    failures
}

/// Replaces the stored planning with `data`. Fails before any write when
/// the old keys cannot all be removed.
pub fn replace_all<S: KeyValueStore + ?Sized>(store: &mut S, data: &PlanningData) -> Result<(), StorageError> {
    let failures = clear_store(store);
    if failures > 0 {
        return Err(StorageError::Unavailable(format!("{} key(s) could not be removed", failures)));
    }
    let failures = save_to_store(store, data);
    if failures > 0 {
        return Err(StorageError::Unavailable(format!("{} write(s) failed", failures)));
    }
    Ok(())
}
