use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::planning::model::{EmployeeId, Shop, ShopId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    #[serde(default)]
    pub can_work_in: Vec<ShopId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_shop: Option<ShopId>,
}

impl Employee {
    pub fn new(id: impl Into<EmployeeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            can_work_in: Vec::new(),
            main_shop: None,
        }
    }

    pub fn can_work_in(&self, shop_id: &str) -> bool {
        self.can_work_in.iter().any(|id| id == shop_id)
    }

    pub fn authorize(&mut self, shop_id: &str) {
        if !self.can_work_in(shop_id) {
            self.can_work_in.push(shop_id.to_string());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeTable {
    entries: BTreeMap<EmployeeId, Employee>,
}

impl EmployeeTable {
    pub fn get(&self, employee_id: &str) -> Option<&Employee> {
        self.entries.get(employee_id)
    }

    pub(crate) fn get_mut(&mut self, employee_id: &str) -> Option<&mut Employee> {
        self.entries.get_mut(employee_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Employee> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Folds another appearance of an employee into the table. The first
    /// appearance keeps its name; shop authorizations accumulate.
    pub fn merge(&mut self, appearance: Employee) {
        match self.entries.get_mut(&appearance.id) {
            Some(existing) => {
                for shop_id in &appearance.can_work_in {
                    existing.authorize(shop_id);
                }
                if existing.main_shop.is_none() {
                    existing.main_shop = appearance.main_shop;
                }
            }
            None => {
                self.entries.insert(appearance.id.clone(), appearance);
            }
        }
    }

    pub fn roster_of<'a>(&'a self, shop: &'a Shop) -> impl Iterator<Item = &'a Employee> + 'a {
        shop.roster.iter().filter_map(|id| self.entries.get(id))
    }
}
