use chrono::NaiveDate;
use tracing::debug;

use crate::planning::{PlanningData, Shop, ShopId, WeekKey};

const WEEK_PRESENCE_WEIGHT: usize = 10;

fn authorized_shops<'a>(data: &'a PlanningData, employee_id: &str) -> Vec<&'a Shop> {
    let Some(employee) = data.employee(employee_id) else {
        return Vec::new();
    };
    data.shops
        .iter()
        .filter(|shop| employee.can_work_in(&shop.id))
        .collect()
}

pub fn shop_score(shop: &Shop, employee_id: &str) -> usize {
    let slot_count = shop.config.slot_count();
    shop.weeks
        .values()
        .map(|week| week.occupied_slots(employee_id, slot_count))
        .filter(|occupied| *occupied > 0)
        .map(|occupied| WEEK_PRESENCE_WEIGHT + occupied)
        .sum()
}

/// A single authorized shop wins outright. Otherwise the highest
/// [`shop_score`] wins and equal scores go to the smallest shop id.
pub fn determine_employee_main_shop(data: &PlanningData, employee_id: &str) -> Option<ShopId> {
    let shops = authorized_shops(data, employee_id);
    if let [only] = shops.as_slice() {
        return Some(only.id.clone());
    }

    let best = shops
        .iter()
        .map(|shop| (shop_score(shop, employee_id), *shop))
        .max_by(|(score_a, shop_a), (score_b, shop_b)| {
            score_a.cmp(score_b).then_with(|| shop_b.id.cmp(&shop_a.id))
        });

    if let Some((score, shop)) = best {
        debug!(employee = employee_id, shop = %shop.id, score, "resolved main shop");
    }
    best.map(|(_, shop)| shop.id.clone())
}

pub fn assign_main_shops(data: &PlanningData) -> PlanningData {
    let mut next = data.clone();
    let ids: Vec<String> = data.employees.iter().map(|e| e.id.clone()).collect();
    for id in ids {
        let main_shop = determine_employee_main_shop(data, &id);
        if let Some(employee) = next.employees.get_mut(&id) {
            employee.main_shop = main_shop;
        }
    }
    next
}

/// True when none of the employee's authorized shops has an occupied slot
/// for `date`.
pub fn is_employee_on_leave(data: &PlanningData, employee_id: &str, date: NaiveDate) -> bool {
    let week = WeekKey::containing(date);
    !authorized_shops(data, employee_id).iter().any(|shop| {
        shop.week(week)
            .and_then(|week_data| week_data.day(employee_id, date))
            .is_some_and(|slots| slots.occupied_within(shop.config.slot_count()) > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planning::{mark_leave, set_day_slots, ShopConfig};
    use chrono::NaiveTime;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn two_slot_config() -> ShopConfig {
        let start = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(11, 0, 0).unwrap();
        ShopConfig::new(start, end, 60).unwrap()
    }

    fn two_shops() -> (PlanningData, String, String) {
        let mut data = PlanningData::new();
        data.shops.push(Shop::new("shop_b", "Cannes", two_slot_config()));
        data.shops.push(Shop::new("shop_a", "Nice", two_slot_config()));
        (data, "shop_a".to_string(), "shop_b".to_string())
    }

    #[test]
    fn single_authorized_shop_wins() {
        let (data, shop_a, _) = two_shops();
        let (data, emp) = data.add_employee("Léa", &[&shop_a]).unwrap();

        assert_eq!(determine_employee_main_shop(&data, &emp), Some(shop_a));
    }

    #[test]
    fn unknown_employee_has_no_main_shop() {
        let (data, _, _) = two_shops();
        assert_eq!(determine_employee_main_shop(&data, "ghost"), None);
    }

    #[test]
    fn weeks_worked_outweigh_slot_count() {
        let (data, shop_a, shop_b) = two_shops();
        let (data, emp) = data.add_employee("Léa", &[&shop_a, &shop_b]).unwrap();
        let data = set_day_slots(&data, &shop_a, &emp, date(2025, 7, 7), vec![true, false]).unwrap();
        let data = set_day_slots(&data, &shop_a, &emp, date(2025, 7, 14), vec![true, false]).unwrap();
        let data = set_day_slots(&data, &shop_b, &emp, date(2025, 7, 21), vec![true, true]).unwrap();
        let data = set_day_slots(&data, &shop_b, &emp, date(2025, 7, 22), vec![true, true]).unwrap();
        let data = set_day_slots(&data, &shop_b, &emp, date(2025, 7, 23), vec![true, true]).unwrap();

        assert_eq!(shop_score(data.shop(&shop_a).unwrap(), &emp), 22);
        assert_eq!(shop_score(data.shop(&shop_b).unwrap(), &emp), 16);
        assert_eq!(determine_employee_main_shop(&data, &emp), Some(shop_a));
    }

    #[test]
    fn tie_goes_to_smallest_shop_id() {
        let (data, shop_a, shop_b) = two_shops();
        let (data, emp) = data.add_employee("Léa", &[&shop_b, &shop_a]).unwrap();

        assert_eq!(determine_employee_main_shop(&data, &emp), Some(shop_a));
    }

    #[test]
    fn slots_in_unauthorized_shop_do_not_count() {
        let (data, shop_a, shop_b) = two_shops();
        let (data, emp) = data.add_employee("Léa", &[&shop_a]).unwrap();
        let data = set_day_slots(&data, &shop_b, &emp, date(2025, 7, 7), vec![true, true]).unwrap();

        assert!(is_employee_on_leave(&data, &emp, date(2025, 7, 7)));
    }

    #[test]
    fn employee_without_slots_is_on_leave() {
        let (data, shop_a, shop_b) = two_shops();
        let (data, emp) = data.add_employee("Léa", &[&shop_a, &shop_b]).unwrap();
        let data = mark_leave(&data, &shop_a, &emp, date(2025, 7, 8)).unwrap();

        assert!(is_employee_on_leave(&data, &emp, date(2025, 7, 8)));
        assert!(is_employee_on_leave(&data, &emp, date(2025, 7, 9)));
    }

    #[test]
    fn one_occupied_slot_in_any_shop_is_not_leave() {
        let (data, shop_a, shop_b) = two_shops();
        let (data, emp) = data.add_employee("Léa", &[&shop_a, &shop_b]).unwrap();
        let data = set_day_slots(&data, &shop_b, &emp, date(2025, 7, 8), vec![false, true]).unwrap();

        assert!(!is_employee_on_leave(&data, &emp, date(2025, 7, 8)));
    }

    #[test]
    fn assign_main_shops_fills_every_employee() {
        let (data, shop_a, shop_b) = two_shops();
        let (data, first) = data.add_employee("Léa", &[&shop_b]).unwrap();
        let (data, second) = data.add_employee("Hugo", &[&shop_a, &shop_b]).unwrap();

        let data = assign_main_shops(&data);

        assert_eq!(data.employee(&first).unwrap().main_shop, Some(shop_b));
        assert_eq!(data.employee(&second).unwrap().main_shop, Some(shop_a));
    }
}
