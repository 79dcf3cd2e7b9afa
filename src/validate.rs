use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use jsonschema::JSONSchema;
use log::{debug, warn};
use serde_json::Value;

use crate::document::{CharacterDocument, DimensionDocument};
use crate::model::build_model;
use crate::store::{DataStore, DocumentKind, StoredDocument};

/// One problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViolationDetail {
    /// JSON pointer into the document, empty for whole-document problems.
    pub pointer: String,
    pub message: String,
}

impl ViolationDetail {
    fn whole(message: impl Into<String>) -> Self {
        Self {
            pointer: String::new(),
            message: message.into(),
        }
    }
}

/// All problems found in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: PathBuf,
    pub details: Vec<ViolationDetail>,
}

/// Result of checking a whole data directory. Violations are collected, not
/// fail-fast.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub checked: usize,
    pub violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    fn push(&mut self, path: PathBuf, details: Vec<ViolationDetail>) {
        if details.is_empty() {
            return;
        }
        match self.violations.iter_mut().find(|v| v.path == path) {
            Some(existing) => existing.details.extend(details),
            None => self.violations.push(Violation { path, details }),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            return write!(f, "All {} document(s) are valid", self.checked);
        }
        writeln!(
            f,
            "{} file(s) failed validation ({} document(s) checked):",
            self.violations.len(),
            self.checked
        )?;
        for violation in &self.violations {
            writeln!(f, " - {}", violation.path.display())?;
            for detail in &violation.details {
                if detail.pointer.is_empty() {
                    writeln!(f, "     {}", detail.message)?;
                } else {
                    writeln!(f, "     at {}: {}", detail.pointer, detail.message)?;
                }
            }
        }
        Ok(())
    }
}

/// Checks every document in the store against its kind's schema, then runs
/// the structural checks serde and the rig builder can express.
pub fn validate_store(store: &DataStore) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut compiled: HashMap<DocumentKind, JSONSchema> = HashMap::new();

    for schema in store.schemas() {
        let Some(kind) = schema.kind else {
            continue;
        };
        let value = match &schema.value {
            Ok(value) => value,
            Err(err) => {
                report.push(
                    schema.path.clone(),
                    vec![ViolationDetail::whole(format!("invalid JSON: {err}"))],
                );
                continue;
            }
        };
        match JSONSchema::compile(value) {
            Ok(validator) => {
                compiled.insert(kind, validator);
            }
            Err(err) => {
                report.push(
                    schema.path.clone(),
                    vec![ViolationDetail::whole(format!("schema does not compile: {err}"))],
                );
            }
        }
    }

    let mut character_names: HashMap<String, PathBuf> = HashMap::new();

    for document in store.documents() {
        report.checked += 1;
        let value = match &document.value {
            Ok(value) => value,
            Err(err) => {
                report.push(
                    document.path.clone(),
                    vec![ViolationDetail::whole(format!("invalid JSON: {err}"))],
                );
                continue;
            }
        };
        let Some(validator) = compiled.get(&document.kind) else {
            report.push(
                document.path.clone(),
                vec![ViolationDetail::whole(format!(
                    "no usable {}_schema.json for this document",
                    document.kind
                ))],
            );
            continue;
        };

        let details: Vec<ViolationDetail> = match validator.validate(value) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|error| ViolationDetail {
                    pointer: error.instance_path.to_string(),
                    message: error.to_string(),
                })
                .collect(),
        };
        if !details.is_empty() {
            report.push(document.path.clone(), details);
            continue;
        }

        let details = match document.kind {
            DocumentKind::Character => check_character(document, value, &mut character_names),
            DocumentKind::Dimension => check_dimension(value),
            DocumentKind::Crafting | DocumentKind::Ingredient => Vec::new(),
        };
        report.push(document.path.clone(), details);
        debug!("checked {}", document.path.display());
    }

    if !report.is_valid() {
        warn!(
            "{} file(s) failed validation in {}",
            report.violations.len(),
            store.root().display()
        );
    }
    report
}

fn check_character(
    document: &StoredDocument,
    value: &Value,
    seen: &mut HashMap<String, PathBuf>,
) -> Vec<ViolationDetail> {
    let character: CharacterDocument = match serde_json::from_value(value.clone()) {
        Ok(character) => character,
        Err(err) => return vec![ViolationDetail::whole(format!("does not decode: {err}"))],
    };
    let mut details = Vec::new();
    if let Some(first) = seen.get(&character.name) {
        details.push(ViolationDetail {
            pointer: "/name".into(),
            message: format!(
                "character {:?} is already defined in {}",
                character.name,
                first.display()
            ),
        });
    } else {
        seen.insert(character.name.clone(), document.path.clone());
    }
    if let Err(err) = build_model(&character) {
        details.push(ViolationDetail::whole(err.to_string()));
    }
    details
}

fn check_dimension(value: &Value) -> Vec<ViolationDetail> {
    match serde_json::from_value::<DimensionDocument>(value.clone()) {
        Ok(_) => Vec::new(),
        Err(err) => vec![ViolationDetail::whole(format!("does not decode: {err}"))],
    }
}
