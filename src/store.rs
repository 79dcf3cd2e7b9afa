use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info};
use serde_json::Value;

/// Category of data document; each lives in its own directory and is
/// checked against `<schema_stem>_schema.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Character,
    Dimension,
    Crafting,
    Ingredient,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::Character,
        DocumentKind::Dimension,
        DocumentKind::Crafting,
        DocumentKind::Ingredient,
    ];

    pub fn directory(self) -> &'static str {
        match self {
            DocumentKind::Character => "characters",
            DocumentKind::Dimension => "dimensions",
            DocumentKind::Crafting => "crafting",
            DocumentKind::Ingredient => "ingredients",
        }
    }

    pub fn schema_stem(self) -> &'static str {
        match self {
            DocumentKind::Character => "character",
            DocumentKind::Dimension => "dimension",
            DocumentKind::Crafting => "crafting",
            DocumentKind::Ingredient => "ingredient",
        }
    }

    /// Maps `character_schema.json` style file names back to a kind.
    pub fn from_schema_file(file_name: &str) -> Option<Self> {
        let stem = file_name.strip_suffix("_schema.json")?;
        Self::ALL.into_iter().find(|kind| kind.schema_stem() == stem)
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.schema_stem())
    }
}

/// Parsed file contents, or the JSON syntax error that prevented parsing.
pub type Parsed = std::result::Result<Value, String>;

/// Data document loaded from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub kind: DocumentKind,
    pub path: PathBuf,
    pub value: Parsed,
}

/// JSON Schema loaded from `schemas/`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSchema {
    pub kind: Option<DocumentKind>,
    pub path: PathBuf,
    pub value: Parsed,
}

/// Every schema and data document under a data directory, loaded once.
#[derive(Debug, Clone)]
pub struct DataStore {
    root: PathBuf,
    schemas: Vec<StoredSchema>,
    documents: Vec<StoredDocument>,
}

impl DataStore {
    /// Reads `schemas/*_schema.json` and every kind directory below `root`.
    /// Missing kind directories count as empty and unreadable files abort
    /// the load. Files that are not valid JSON are kept with their syntax
    /// error so validation can report them alongside everything else.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            anyhow::bail!("data directory {} does not exist", root.display());
        }

        let mut schemas = Vec::new();
        for path in json_files(&root.join("schemas"))? {
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            if !file_name.ends_with("_schema.json") {
                continue;
            }
            let kind = DocumentKind::from_schema_file(&file_name);
            if kind.is_none() {
                debug!("schema {} does not match any document kind", path.display());
            }
            let value = read_json(&path)?;
            schemas.push(StoredSchema { kind, path, value });
        }

        let mut documents = Vec::new();
        for kind in DocumentKind::ALL {
            for path in json_files(&root.join(kind.directory()))? {
                let value = read_json(&path)?;
                documents.push(StoredDocument { kind, path, value });
            }
        }

        info!(
            "loaded {} schema(s) and {} document(s) from {}",
            schemas.len(),
            documents.len(),
            root.display()
        );

        Ok(Self {
            root,
            schemas,
            documents,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn schemas(&self) -> &[StoredSchema] {
        &self.schemas
    }

    pub fn documents(&self) -> &[StoredDocument] {
        &self.documents
    }

    pub fn documents_of(&self, kind: DocumentKind) -> impl Iterator<Item = &StoredDocument> {
        self.documents.iter().filter(move |doc| doc.kind == kind)
    }
}

fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("unable to list {}", dir.display()))? {
        let path = entry
            .with_context(|| format!("unable to list {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_json(path: &Path) -> Result<Parsed> {
    let text =
        fs::read_to_string(path).with_context(|| format!("unable to read {}", path.display()))?;
    let parsed = serde_json::from_str(&text).map_err(|err| err.to_string());
    if let Err(err) = &parsed {
        debug!("{} is not valid JSON: {err}", path.display());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn schema_file_names_map_to_kinds() {
        assert_eq!(
            DocumentKind::from_schema_file("character_schema.json"),
            Some(DocumentKind::Character)
        );
        assert_eq!(
            DocumentKind::from_schema_file("ingredient_schema.json"),
            Some(DocumentKind::Ingredient)
        );
        assert_eq!(DocumentKind::from_schema_file("weapon_schema.json"), None);
        assert_eq!(DocumentKind::from_schema_file("character.json"), None);
    }

    #[test]
    fn open_loads_documents_in_path_order() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "schemas/character_schema.json", "{}");
        write(dir.path(), "characters/b.json", r#"{"name": "B"}"#);
        write(dir.path(), "characters/a.json", r#"{"name": "A"}"#);
        write(dir.path(), "characters/notes.txt", "ignored");
        write(dir.path(), "dimensions/void.json", r#"{"name": "Void"}"#);

        let store = DataStore::open(dir.path()).unwrap();
        assert_eq!(store.schemas().len(), 1);
        assert_eq!(store.schemas()[0].kind, Some(DocumentKind::Character));
        let names: Vec<&str> = store
            .documents_of(DocumentKind::Character)
            .map(|doc| doc.value.as_ref().unwrap()["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(store.documents().len(), 3);
    }

    #[test]
    fn invalid_json_is_kept_per_document() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "characters/broken.json", "{ not json");
        write(dir.path(), "characters/fine.json", r#"{"name": "Fine"}"#);
        let store = DataStore::open(dir.path()).unwrap();
        let documents = store.documents();
        assert_eq!(documents.len(), 2);
        assert!(documents[0].path.ends_with("broken.json"));
        assert!(documents[0].value.is_err());
        assert!(documents[1].value.is_ok());
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(DataStore::open(dir.path().join("nope")).is_err());
    }
}
