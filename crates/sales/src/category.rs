//! Category record and the inputs that shape it.

use serde::{Deserialize, Serialize};

use storefront_core::{CategoryId, Entity};

/// A flat catalog grouping.
///
/// `active == false` means the category was soft-deleted; the record stays
/// addressable by id and in the full listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
}

impl Category {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Soft delete. There is no way back.
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Caller input for creating a category.
///
/// There is no `active` field: new categories always start
/// active, and an `active` key in incoming JSON is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Field set handed to the repository to shape an unsaved record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategoryRecord {
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
}

impl From<NewCategory> for NewCategoryRecord {
    fn from(input: NewCategory) -> Self {
        Self {
            name: input.name,
            description: input.description,
            active: true,
        }
    }
}

/// Partial update. Absent fields leave the stored value unchanged.
///
/// `id` and `active` are not part of the update path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryChanges {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl CategoryChanges {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    /// Merge the present fields onto `category`.
    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(description) = self.description {
            category.description = Some(description);
        }
    }
}
