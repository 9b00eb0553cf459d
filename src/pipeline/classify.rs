use crate::config::{ChangesConfig, FieldValues};
use crate::model::entity::{ChangeType, Entity};

/// Field mappings and change-type filters applied to every fetched defect.
#[derive(Debug, Default, Clone)]
pub struct Classifier {
    pub dev_field: Option<String>,
    pub desc_field: Option<String>,
    pub due_to_field: Option<String>,
    pub fix: Option<FieldValues>,
    pub add: Option<FieldValues>,
    pub update: Option<FieldValues>,
    pub remove: Option<FieldValues>,
}

impl Classifier {
    pub fn from_config(changes: &ChangesConfig) -> Self {
        Self {
            dev_field: changes.dev_field.clone(),
            desc_field: changes.desc_field.clone(),
            due_to_field: changes.due_to_field.clone(),
            fix: changes.fix.clone(),
            add: changes.add.clone(),
            update: changes.update.clone(),
            remove: changes.remove.clone(),
        }
    }

    fn filter(&self, change_type: ChangeType) -> Option<&FieldValues> {
        match change_type {
            ChangeType::Fix => self.fix.as_ref(),
            ChangeType::Add => self.add.as_ref(),
            ChangeType::Update => self.update.as_ref(),
            ChangeType::Remove => self.remove.as_ref(),
        }
    }

    fn is_satisfied(&self, change_type: ChangeType, entity: &Entity) -> bool {
        self.filter(change_type)
            .filter(|filter| !filter.is_empty())
            .is_some_and(|filter| {
                filter
                    .iter()
                    .all(|(name, value)| entity.has_value(name, value))
            })
    }

    /// Fill the cached id, mappings and change type of `entity`.
    ///
    /// Filters are tried FIX, ADD, UPDATE, REMOVE and every satisfied one
    /// overwrites the previous result, so REMOVE wins over FIX when both match.
    pub fn classify(&self, entity: &mut Entity) {
        entity.id = entity.field("id").map(String::from);
        entity.dev = mapped(entity, &self.dev_field);
        entity.desc = mapped(entity, &self.desc_field);
        entity.due_to = mapped(entity, &self.due_to_field);
        entity.change_type = ChangeType::ALL
            .into_iter()
            .filter(|change_type| self.is_satisfied(*change_type, entity))
            .last();
    }
}

fn mapped(entity: &Entity, mapping: &Option<String>) -> Option<String> {
    mapping
        .as_deref()
        .and_then(|name| entity.field(name))
        .map(String::from)
}
