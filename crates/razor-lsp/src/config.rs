use razor_core::DEFAULT_VERSION_HISTORY;
use serde::Deserialize;
use tower_lsp_server::ls_types::FormattingOptions;

/// Root configuration for the razor-lsp server.
///
/// Provided by the LSP client via initialization options. All fields use
/// sensible defaults if not specified.
///
/// # Examples
///
/// ```
/// use razor_lsp::config::RazorConfig;
///
/// let json = r#"{
///     "formatting": { "enabled": false },
///     "documents": { "versionHistory": 50 }
/// }"#;
///
/// let config: RazorConfig = serde_json::from_str(json).unwrap();
/// assert!(!config.formatting.enabled);
/// assert_eq!(config.documents.version_history, 50);
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RazorConfig {
    #[serde(default)]
    pub formatting: FormattingConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
}

/// Configuration for formatting of projected edits.
///
/// # Defaults
///
/// - `enabled`: `true`
/// - `default_options`: tab size 4, insert spaces
///
/// When `enabled` is `false`, requests asking for formatting have their
/// edits mapped unformatted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_formatting_options")]
    pub default_options: FormattingOptions,
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_options: default_formatting_options(),
        }
    }
}

/// Configuration for host document tracking.
///
/// # Defaults
///
/// - `version_history`: `20` snapshots per document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentsConfig {
    /// Snapshots remembered per open document (1..=1000, clamped)
    #[serde(
        default = "default_version_history",
        deserialize_with = "deserialize_version_history"
    )]
    pub version_history: usize,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            version_history: default_version_history(),
        }
    }
}

// Default value functions
const fn default_true() -> bool {
    true
}

fn default_formatting_options() -> FormattingOptions {
    FormattingOptions {
        tab_size: 4,
        insert_spaces: true,
        ..Default::default()
    }
}

const fn default_version_history() -> usize {
    DEFAULT_VERSION_HISTORY
}

/// Upper bound for version_history
const MAX_VERSION_HISTORY: usize = 1000;

fn validate_version_history(history: usize) -> usize {
    let clamped = history.clamp(1, MAX_VERSION_HISTORY);
    if clamped != history {
        tracing::warn!(
            "versionHistory {} out of range, using {}",
            history,
            clamped
        );
    }
    clamped
}

fn deserialize_version_history<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let history = usize::deserialize(deserializer)?;
    Ok(validate_version_history(history))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RazorConfig::default();
        assert!(config.formatting.enabled);
        assert_eq!(config.formatting.default_options.tab_size, 4);
        assert!(config.formatting.default_options.insert_spaces);
        assert_eq!(config.documents.version_history, 20);
    }

    #[test]
    fn test_empty_config_deserialization() {
        let config: RazorConfig = serde_json::from_str("{}").unwrap();
        assert!(config.formatting.enabled);
        assert_eq!(config.documents.version_history, 20);
    }

    #[test]
    fn test_formatting_config_deserialization() {
        let json = r#"{
            "enabled": false,
            "defaultOptions": { "tabSize": 2, "insertSpaces": false }
        }"#;

        let config: FormattingConfig = serde_json::from_str(json).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.default_options.tab_size, 2);
        assert!(!config.default_options.insert_spaces);
    }

    #[test]
    fn test_partial_config_deserialization() {
        let json = r#"{ "formatting": { "enabled": false } }"#;

        let config: RazorConfig = serde_json::from_str(json).unwrap();
        assert!(!config.formatting.enabled);
        // Other fields should use defaults
        assert_eq!(config.formatting.default_options.tab_size, 4);
        assert_eq!(config.documents.version_history, 20);
    }

    #[test]
    fn test_version_history_clamped_high() {
        let json = r#"{ "versionHistory": 5000 }"#;
        let config: DocumentsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.version_history, 1000);
    }

    #[test]
    fn test_version_history_clamped_low() {
        let json = r#"{ "versionHistory": 0 }"#;
        let config: DocumentsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.version_history, 1);
    }

    #[test]
    fn test_version_history_in_range() {
        let json = r#"{ "versionHistory": 64 }"#;
        let config: DocumentsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.version_history, 64);
    }
}
