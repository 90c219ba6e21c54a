use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::api::TrainingItem;

#[derive(Debug, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("Failed to read {}: {}", .path.display(), .source)]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {}", .path.display(), .source)]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct CuisinesFile {
    #[serde(rename = "ALLOWED_CUISINES")]
    allowed_cuisines: Vec<String>,
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ReferenceDataError> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|source| ReferenceDataError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    serde_json::from_slice(&content).map_err(|source| ReferenceDataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the cuisine allow-list, a JSON object with an `ALLOWED_CUISINES` list
pub async fn load_allowed_cuisines(path: &Path) -> Result<Vec<String>, ReferenceDataError> {
    let cuisines: CuisinesFile = read_json(path).await?;
    Ok(cuisines.allowed_cuisines)
}

/// Reads the preference dataset, a JSON list of `{name, description}` objects
pub async fn load_training_items(path: &Path) -> Result<Vec<TrainingItem>, ReferenceDataError> {
    read_json(path).await
}

#[cfg(test)]
mod reference_data_tests {
    use std::io::Write;
    use std::path::Path;

    use tempfile::NamedTempFile;

    use crate::api::TrainingItem;
    use crate::reference_data::{load_allowed_cuisines, load_training_items, ReferenceDataError};

    fn file_with(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write temp file");
        file
    }

    #[tokio::test]
    async fn loads_allowed_cuisines() {
        let file = file_with(r#"{"ALLOWED_CUISINES": ["Any", "Indian", "Thai"]}"#);
        let cuisines = load_allowed_cuisines(file.path())
            .await
            .expect("Failed to load cuisines");
        assert_eq!(cuisines, vec!["Any", "Indian", "Thai"]);
    }

    #[tokio::test]
    async fn loads_training_items() {
        let file = file_with(
            r#"[{"name": "Rasam", "description": "Peppery soup"},
                {"name": "Kulfi", "description": "Frozen milk dessert"}]"#,
        );
        let items = load_training_items(file.path())
            .await
            .expect("Failed to load training items");
        assert_eq!(
            items,
            vec![
                TrainingItem {
                    name: "Rasam".to_string(),
                    description: "Peppery soup".to_string(),
                },
                TrainingItem {
                    name: "Kulfi".to_string(),
                    description: "Frozen milk dessert".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn missing_file_is_read_error() {
        let result = load_training_items(Path::new("/nonexistent/my_food.json")).await;
        assert!(matches!(result, Err(ReferenceDataError::Read { .. })));
    }

    #[tokio::test]
    async fn wrong_shape_is_parse_error() {
        let file = file_with(r#"{"cuisines": ["Any"]}"#);
        let result = load_allowed_cuisines(file.path()).await;
        assert!(matches!(result, Err(ReferenceDataError::Parse { .. })));
    }

    #[tokio::test]
    async fn shipped_reference_files_are_valid() {
        let data_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../data");
        let cuisines = load_allowed_cuisines(&data_dir.join("cuisines.json"))
            .await
            .expect("Failed to load shipped cuisines");
        assert!(cuisines.iter().any(|c| c == "Any"));
        let items = load_training_items(&data_dir.join("my_food.json"))
            .await
            .expect("Failed to load shipped training data");
        assert!(!items.is_empty());
    }
}
