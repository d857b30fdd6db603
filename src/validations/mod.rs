//! Validation result model.
//!
//! # Data Flow
//! ```text
//! checker
//!     → IstioCheck (code, severity, path)
//!     → IstioValidation per object (valid = no Error check)
//!     → IstioValidations keyed by (objectType, namespace, name)
//!     → merge across checkers, serialize as objectType → "name.namespace"
//! ```
//!
//! # Design Decisions
//! - Ordered maps and sets so repeated runs serialize byte-identically
//! - Merging deduplicates checks and references and ANDs validity
//! - An object never references itself

pub mod messages;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

pub use messages::{template, MessageCode};

/// Kind of object a validation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    DestinationRule,
    Gateway,
    Sidecar,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DestinationRule => "destinationrule",
            Self::Gateway => "gateway",
            Self::Sidecar => "sidecar",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unique identity of a validated object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IstioValidationKey {
    pub object_type: ObjectType,
    pub namespace: String,
    pub name: String,
}

impl IstioValidationKey {
    pub fn new(object_type: ObjectType, namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            object_type,
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for IstioValidationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.namespace)
    }
}

/// Ordered `Unknown < Warning < Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Unknown,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One finding at one location of an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IstioCheck {
    pub code: MessageCode,
    pub severity: Severity,
    /// Locator such as `spec/subsets[0]`.
    pub path: String,
}

impl IstioCheck {
    /// Check carrying the code's default severity.
    pub fn build(code: MessageCode, path: impl Into<String>) -> Self {
        Self::with_severity(code, code.default_severity(), path)
    }

    pub fn with_severity(code: MessageCode, severity: Severity, path: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            path: path.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Aggregate verdict for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IstioValidation {
    pub name: String,
    pub object_type: ObjectType,
    pub valid: bool,
    pub checks: Vec<IstioCheck>,
    pub references: BTreeSet<IstioValidationKey>,
    #[serde(skip)]
    namespace: String,
}

impl IstioValidation {
    pub fn new(key: &IstioValidationKey) -> Self {
        Self {
            name: key.name.clone(),
            object_type: key.object_type,
            valid: true,
            checks: Vec::new(),
            references: BTreeSet::new(),
            namespace: key.namespace.clone(),
        }
    }

    pub fn key(&self) -> IstioValidationKey {
        IstioValidationKey::new(self.object_type, self.namespace.clone(), self.name.clone())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Append a check unless an identical one is present.
    pub fn add_check(&mut self, check: IstioCheck) {
        if check.is_error() {
            self.valid = false;
        }
        if !self.checks.contains(&check) {
            self.checks.push(check);
        }
    }

    pub fn add_reference(&mut self, reference: IstioValidationKey) {
        if reference != self.key() {
            self.references.insert(reference);
        }
    }

    pub fn merge(&mut self, other: IstioValidation) {
        self.valid &= other.valid;
        for check in other.checks {
            self.add_check(check);
        }
        for reference in other.references {
            self.add_reference(reference);
        }
    }
}

/// Result map keyed by object identity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IstioValidations(BTreeMap<IstioValidationKey, IstioValidation>);

impl IstioValidations {
    pub fn new() -> Self {
        Self::default()
    }

    /// The validation for `key`, created valid and empty if absent.
    pub fn entry(&mut self, key: IstioValidationKey) -> &mut IstioValidation {
        self.0
            .entry(key)
            .or_insert_with_key(IstioValidation::new)
    }

    pub fn insert(&mut self, validation: IstioValidation) {
        match self.0.get_mut(&validation.key()) {
            Some(existing) => existing.merge(validation),
            None => {
                self.0.insert(validation.key(), validation);
            }
        }
    }

    pub fn merge(&mut self, other: IstioValidations) {
        for (_, validation) in other.0 {
            self.insert(validation);
        }
    }

    pub fn get(&self, key: &IstioValidationKey) -> Option<&IstioValidation> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&IstioValidationKey, &IstioValidation)> {
        self.0.iter()
    }

    pub fn invalid_count(&self) -> usize {
        self.0.values().filter(|v| !v.valid).count()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&IstioValidation) -> bool) {
        self.0.retain(|_, validation| keep(validation));
    }
}

impl FromIterator<IstioValidation> for IstioValidations {
    fn from_iter<I: IntoIterator<Item = IstioValidation>>(iter: I) -> Self {
        let mut validations = Self::new();
        for validation in iter {
            validations.insert(validation);
        }
        validations
    }
}

impl Serialize for IstioValidations {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut grouped: BTreeMap<&str, BTreeMap<String, &IstioValidation>> = BTreeMap::new();
        for (key, validation) in &self.0 {
            grouped
                .entry(key.object_type.as_str())
                .or_default()
                .insert(key.to_string(), validation);
        }

        let mut map = serializer.serialize_map(Some(grouped.len()))?;
        for (object_type, objects) in &grouped {
            map.serialize_entry(object_type, objects)?;
        }
        map.end()
    }
}
