use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub survey: SurveyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

/// Where Survey lives and which app namespace Tables works in
#[derive(Debug, Deserialize, Clone)]
pub struct SurveyConfig {
    #[serde(default = "default_app_name")]
    pub app_name: String,
    #[serde(default = "default_package_name")]
    pub package_name: String,
    /// Executable that receives the row address
    pub executable: String,
}

fn default_app_name() -> String {
    "default".to_string()
}

fn default_package_name() -> String {
    "org.opendatakit.survey".to_string()
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/tables.db"

[survey]
app_name = "default"
package_name = "org.opendatakit.survey"
executable = "odk-survey"
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Current working directory
/// 3. Falls back to embedded default config
pub fn load_config() -> anyhow::Result<Config> {
    for config_path in candidate_config_paths() {
        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            let contents = std::fs::read_to_string(&config_path)?;
            return parse_config(&contents);
        }
        tracing::debug!("config.toml not found at: {}", config_path.display());
    }

    tracing::info!("Using default embedded configuration");
    parse_config(DEFAULT_CONFIG)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    Ok(config)
}

fn candidate_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            paths.push(exe_dir.join("config.toml"));
        }
    }
    paths.push(PathBuf::from("config.toml"));
    paths
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    // Fallback: use relative to current directory
    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_loads() {
        let config = parse_config(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.database.path, "target/db/tables.db");
        assert_eq!(config.survey.app_name, "default");
        assert_eq!(config.survey.package_name, "org.opendatakit.survey");
        assert_eq!(config.survey.executable, "odk-survey");
    }

    #[test]
    fn test_survey_defaults_fill_missing_fields() {
        let config = parse_config(
            r#"
            [database]
            path = "/tmp/tables.db"

            [survey]
            executable = "/opt/survey/bin/survey"
            "#,
        )
        .unwrap();
        assert_eq!(config.survey.app_name, "default");
        assert_eq!(config.survey.package_name, "org.opendatakit.survey");
        assert_eq!(
            get_database_path(&config).unwrap(),
            PathBuf::from("/tmp/tables.db")
        );
    }

    #[test]
    fn test_missing_executable_is_an_error() {
        let result = parse_config(
            r#"
            [database]
            path = "x.db"

            [survey]
            app_name = "default"
            "#,
        );
        assert!(result.is_err());
    }
}
