use crate::upstream::types::Department;
use std::collections::HashMap;

/// Department id → name lookup, kept in upstream order.
#[derive(Debug, Clone, Default)]
pub struct DepartmentDirectory {
    entries: Vec<Department>,
    by_id: HashMap<String, usize>,
}

impl DepartmentDirectory {
    pub fn new(departments: Vec<Department>) -> Self {
        let mut directory = Self::default();
        for department in departments {
            match directory.by_id.get(&department.id) {
                Some(&slot) => directory.entries[slot] = department,
                None => {
                    directory.by_id.insert(department.id.clone(), directory.entries.len());
                    directory.entries.push(department);
                }
            }
        }
        directory
    }

    pub fn name(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(|&slot| self.entries[slot].name.as_str())
    }

    /// Name for display, falling back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.name(id).unwrap_or(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Department> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
