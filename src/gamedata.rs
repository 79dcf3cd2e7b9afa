use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

use crate::document::{CharacterDocument, DimensionDocument};

/// Payload served at `/gamedata`: every character and dimension document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameData {
    pub characters: Vec<CharacterDocument>,
    pub dimensions: Vec<DimensionDocument>,
}

impl GameData {
    /// Decodes the validated character and dimension documents of a store.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_store(store: &crate::store::DataStore) -> Result<Self> {
        use crate::store::DocumentKind;

        let characters = store
            .documents_of(DocumentKind::Character)
            .map(|doc| {
                let value = doc.value.clone().map_err(|err| {
                    anyhow!("invalid JSON in {}: {err}", doc.path.display())
                })?;
                serde_json::from_value(value)
                    .with_context(|| format!("invalid character document {}", doc.path.display()))
            })
            .collect::<Result<Vec<CharacterDocument>>>()?;
        let dimensions = store
            .documents_of(DocumentKind::Dimension)
            .map(|doc| {
                let value = doc.value.clone().map_err(|err| {
                    anyhow!("invalid JSON in {}: {err}", doc.path.display())
                })?;
                serde_json::from_value(value)
                    .with_context(|| format!("invalid dimension document {}", doc.path.display()))
            })
            .collect::<Result<Vec<DimensionDocument>>>()?;
        Ok(Self {
            characters,
            dimensions,
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("invalid game data payload")
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).context("unable to serialize game data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Role;

    const PAYLOAD: &str = r##"{
        "characters": [
            {"name": "Bok", "role": "ally", "parts": [{"name": "body", "shape": "sphere", "size": [0.5, 0, 0], "color": "#00ff00", "position": [0, 0, 0]}], "welds": []},
            {"name": "Grub", "role": "enemy"}
        ],
        "dimensions": [{"name": "Ember Wastes", "difficulty_level": 3}]
    }"##;

    #[test]
    fn payload_parses_every_document() {
        let data = GameData::from_json(PAYLOAD).unwrap();
        assert_eq!(data.characters.len(), 2);
        assert_eq!(data.characters[1].name, "Grub");
        assert_eq!(data.characters[1].role, Role::Enemy);
        assert_eq!(data.dimensions[0].difficulty_level, 3);
    }

    #[test]
    fn payload_keeps_its_shape_when_reserialized() {
        let data = GameData::from_json(PAYLOAD).unwrap();
        let value: serde_json::Value = serde_json::from_str(&data.to_json().unwrap()).unwrap();
        assert_eq!(value["characters"][0]["parts"][0]["shape"], "sphere");
        assert_eq!(value["characters"][1]["role"], "enemy");
        assert_eq!(value["dimensions"][0]["name"], "Ember Wastes");
    }
}
