//! Schema configuration loading.
//!
//! The compiled-in [`PanelSchema::default`] matches the merged
//! migration/crime extract; alternate datasets supply a TOML file naming
//! their own columns and category list.

use std::path::Path;

use crime_trends_panel_models::PanelSchema;

use crate::PanelError;

/// Loads a [`PanelSchema`] from a TOML file.
///
/// All fields are optional in the file; omitted fields fall back to the
/// defaults.
///
/// # Errors
///
/// Returns [`PanelError::Io`] if the file cannot be read and
/// [`PanelError::Schema`] if it is not valid schema TOML.
pub fn load_schema(path: &Path) -> Result<PanelSchema, PanelError> {
    let display = path.display().to_string();

    let contents = std::fs::read_to_string(path).map_err(|e| PanelError::Io {
        path: display.clone(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| PanelError::Schema {
        path: display,
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_full_schema() {
        let dir = std::env::temp_dir().join("crime_trends_schema_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("schema.toml");
        std::fs::write(
            &path,
            "country_column = \"country\"\n\
             year_column = \"year\"\n\
             migration_column = \"net_migration\"\n\
             categories = [\"Assault\", \"Theft\"]\n",
        )
        .unwrap();

        let schema = load_schema(&path).unwrap();
        assert_eq!(schema.migration_column, "net_migration");
        assert_eq!(schema.categories, vec!["Assault", "Theft"]);
    }

    #[test]
    fn omitted_fields_use_defaults() {
        let dir = std::env::temp_dir().join("crime_trends_schema_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("partial.toml");
        std::fs::write(&path, "migration_column = \"inflow\"\n").unwrap();

        let schema = load_schema(&path).unwrap();
        assert_eq!(schema.migration_column, "inflow");
        assert_eq!(schema.country_column, "ülke");
        assert_eq!(schema.categories.len(), 13);
    }

    #[test]
    fn invalid_toml_is_fatal() {
        let dir = std::env::temp_dir().join("crime_trends_schema_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        std::fs::write(&path, "categories = 5\n").unwrap();

        let err = load_schema(&path).unwrap_err();
        assert!(matches!(err, PanelError::Schema { .. }));
    }

    #[test]
    fn missing_file_is_fatal() {
        let err = load_schema(Path::new("/nonexistent/schema.toml")).unwrap_err();
        assert!(matches!(err, PanelError::Io { .. }));
    }
}
