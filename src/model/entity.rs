use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn is_named(&self, name: &str) -> bool {
        eq_ignore_case(&self.name, name)
    }
}

/// Case-insensitive comparison that also folds non-ASCII letters (ALM values are often localised).
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    Fix,
    Add,
    Update,
    Remove,
}

impl ChangeType {
    /// Evaluation order of the change filters. Later entries overwrite earlier ones.
    pub const ALL: [ChangeType; 4] = [
        ChangeType::Fix,
        ChangeType::Add,
        ChangeType::Update,
        ChangeType::Remove,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Fix => "FIX",
            ChangeType::Add => "ADD",
            ChangeType::Update => "UPDATE",
            ChangeType::Remove => "REMOVE",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One defect as returned by HP ALM.
///
/// `fields` is the source of truth. The remaining members are filled once by
/// the classifier right after the page is decoded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    pub entity_type: String,
    pub fields: Vec<Field>,
    pub id: Option<String>,
    pub dev: Option<String>,
    pub desc: Option<String>,
    pub due_to: Option<String>,
    pub change_type: Option<ChangeType>,
}

impl Entity {
    pub fn new(entity_type: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields,
            ..Default::default()
        }
    }

    /// Value of the last field with the given name, ignoring case.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|f| f.is_named(name))
            .map(|f| f.value.as_str())
    }

    /// True when some field carries `name` with a value equal to `value`, both ignoring case.
    pub fn has_value(&self, name: &str, value: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.is_named(name) && eq_ignore_case(&f.value, value))
    }
}
