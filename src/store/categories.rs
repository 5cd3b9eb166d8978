use tracing::{info, warn};

use crate::error::{DaytaskError, Result};
use crate::model::{CategoryEntry, CategoryKind, CategoryRef};
use crate::store::kv::{self, SharedKv};

/// Seed set present from first run. These can never be deleted.
pub const DEFAULT_CATEGORIES: [&str; 3] = ["Work", "Personal", "Shopping"];

pub fn is_default(name: &str) -> bool {
    DEFAULT_CATEGORIES.contains(&name)
}

/// The set of valid category labels: the fixed defaults plus user-added ones.
pub struct CategoryStore {
    kv: SharedKv,
    categories: Vec<String>,
}

impl CategoryStore {
    pub const KEY: &'static str = "categories";

    pub fn load(kv: SharedKv) -> Result<Self> {
        let stored: Option<Vec<String>> = kv::load_record(kv.as_ref(), Self::KEY)?;
        let categories = match stored {
            Some(list) => with_defaults(list),
            None => DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        };
        Ok(Self { kv, categories })
    }

    /// Add a custom category. Returns the trimmed label that was stored.
    pub fn add(&mut self, name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DaytaskError::EmptyCategory);
        }
        if self.contains(trimmed) {
            return Err(DaytaskError::DuplicateCategory(trimmed.to_string()));
        }

        let mut next = self.categories.clone();
        next.push(trimmed.to_string());
        self.commit(next)?;
        info!(category = trimmed, "added category");
        Ok(trimmed.to_string())
    }

    /// Remove a custom category. Tasks already tagged with it keep the label.
    /// Returns false, without writing, when the label was not present.
    pub fn delete(&mut self, name: &str) -> Result<bool> {
        if is_default(name) {
            return Err(DaytaskError::ProtectedCategory(name.to_string()));
        }
        if !self.contains(name) {
            return Ok(false);
        }

        let next: Vec<String> = self
            .categories
            .iter()
            .filter(|c| c.as_str() != name)
            .cloned()
            .collect();
        self.commit(next)?;
        info!(category = name, "deleted category");
        Ok(true)
    }

    pub fn list(&self) -> Vec<CategoryEntry> {
        self.categories
            .iter()
            .map(|name| CategoryEntry {
                name: name.clone(),
                kind: kind_of(name),
            })
            .collect()
    }

    pub fn names(&self) -> &[String] {
        &self.categories
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.iter().any(|c| c == name)
    }

    /// Classify a label against the current set. Unknown labels yield `None`.
    pub fn resolve(&self, name: &str) -> Option<CategoryRef> {
        if !self.contains(name) {
            return None;
        }
        Some(match kind_of(name) {
            CategoryKind::Default => CategoryRef::Default(name.to_string()),
            CategoryKind::Custom => CategoryRef::Custom(name.to_string()),
        })
    }

    fn commit(&mut self, next: Vec<String>) -> Result<()> {
        kv::save_record(self.kv.as_ref(), Self::KEY, &next)?;
        self.categories = next;
        Ok(())
    }
}

/// Whether `name` is one of the seeded defaults or a user label.
pub fn kind_of(name: &str) -> CategoryKind {
    if is_default(name) {
        CategoryKind::Default
    } else {
        CategoryKind::Custom
    }
}

/// Make sure every default is present, restoring missing ones at the front in
/// seed order, and drop duplicate labels.
fn with_defaults(stored: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(stored.len() + DEFAULT_CATEGORIES.len());
    for default in DEFAULT_CATEGORIES {
        if !stored.iter().any(|c| c == default) {
            warn!(category = default, "restoring missing default category");
            out.push(default.to_string());
        }
    }
    for name in stored {
        if !out.contains(&name) {
            out.push(name);
        }
    }
    out
}
