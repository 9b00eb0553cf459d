use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Field name → value pairs. Sorted keys keep generated queries and payloads stable.
pub type FieldValues = BTreeMap<String, String>;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub alm: AlmConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub export: ExportConfig,
    pub confluence: Option<ConfluenceConfig>,
    #[serde(default)]
    pub changes: ChangesConfig,
    #[serde(default)]
    pub update: UpdateConfig,
}

#[derive(Debug, Deserialize)]
pub struct AlmConfig {
    pub url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub domain: String,
    pub project: String,
}

impl AlmConfig {
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    pub fn authentication_url(&self) -> String {
        format!("{}/qcbin/authentication-point/authenticate", self.base_url())
    }

    pub fn defects_url(&self) -> String {
        format!(
            "{}/qcbin/rest/domains/{}/projects/{}/defects",
            self.base_url(),
            self.domain,
            self.project
        )
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct QueryConfig {
    /// Raw ALM query statement. Takes precedence over `values`.
    pub statement: Option<String>,
    pub values: Option<FieldValues>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ExportConfig {
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub translations: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfluenceConfig {
    pub server: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub page_id: String,
    pub keyword: Option<String>,
    pub header: Option<String>,
}

impl ConfluenceConfig {
    pub fn rpc_url(&self) -> String {
        format!("{}/rpc/xmlrpc", self.server.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ChangesConfig {
    /// Where to write changes.xml. No path, no file.
    pub output: Option<PathBuf>,
    pub version: Option<String>,
    pub dev_field: Option<String>,
    pub desc_field: Option<String>,
    pub due_to_field: Option<String>,
    pub fix: Option<FieldValues>,
    pub add: Option<FieldValues>,
    pub update: Option<FieldValues>,
    pub remove: Option<FieldValues>,
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdateConfig {
    #[serde(default)]
    pub values: FieldValues,
}

pub const ENV_ALM_USER: &str = "HPALM_USER";
pub const ENV_ALM_PASSWORD: &str = "HPALM_PASSWORD";
pub const ENV_CONFLUENCE_USER: &str = "HPALM_CONFLUENCE_USER";
pub const ENV_CONFLUENCE_PASSWORD: &str = "HPALM_CONFLUENCE_PASSWORD";

pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".deliverynote")
        .join("config.toml")
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        bail!("Config file {} not found", path.display());
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    let mut config = parse_config(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    apply_env(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(contents)?;
    Ok(config)
}

/// Fill credentials missing from the file from the environment.
pub fn apply_env(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    fill(&mut config.alm.user, &lookup, ENV_ALM_USER);
    fill(&mut config.alm.password, &lookup, ENV_ALM_PASSWORD);
    if let Some(confluence) = config.confluence.as_mut() {
        fill(&mut confluence.user, &lookup, ENV_CONFLUENCE_USER);
        fill(&mut confluence.password, &lookup, ENV_CONFLUENCE_PASSWORD);
    }
}

fn fill(slot: &mut Option<String>, lookup: &impl Fn(&str) -> Option<String>, key: &str) {
    if slot.is_none() {
        *slot = lookup(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[alm]
url = "http://alm.organization.net:8080/"
domain = "DEP1"
project = "PROJECT_1"

[query.values]
status = "Corrected"
project = "Test Project"

[export]
columns = ["id", "name"]
translations = { id = "ID#" }

[confluence]
server = "http://confluence.organization.net"
page_id = "25200500"
keyword = "<p>begining of the page</p>"

[changes]
output = "out/changes.xml"
version = "1.0.0"
dev_field = "detected-by"
desc_field = "name"
due_to_field = "owner"
fix = { status = "Corrected" }

[update.values]
status = "Closed"
"#;

    #[test]
    fn parses_full_config() {
        let config = parse_config(FULL).unwrap();
        assert_eq!(config.alm.domain, "DEP1");
        assert_eq!(config.export.columns, ["id", "name"]);
        assert_eq!(config.export.translations["id"], "ID#");
        assert_eq!(config.changes.fix.as_ref().unwrap()["status"], "Corrected");
        assert!(config.changes.add.is_none());
        assert_eq!(config.update.values["status"], "Closed");
        assert_eq!(
            config.changes.output.as_deref(),
            Some(Path::new("out/changes.xml"))
        );
    }

    #[test]
    fn builds_alm_urls_without_double_slash() {
        let config = parse_config(FULL).unwrap();
        assert_eq!(
            config.alm.authentication_url(),
            "http://alm.organization.net:8080/qcbin/authentication-point/authenticate"
        );
        assert_eq!(
            config.alm.defects_url(),
            "http://alm.organization.net:8080/qcbin/rest/domains/DEP1/projects/PROJECT_1/defects"
        );
        assert_eq!(
            config.confluence.unwrap().rpc_url(),
            "http://confluence.organization.net/rpc/xmlrpc"
        );
    }

    #[test]
    fn optional_sections_default_to_empty() {
        let config = parse_config(
            "[alm]\nurl = \"http://alm\"\ndomain = \"D\"\nproject = \"P\"\n",
        )
        .unwrap();
        assert!(config.confluence.is_none());
        assert!(config.export.columns.is_empty());
        assert!(config.changes.output.is_none());
        assert!(config.update.values.is_empty());
        assert!(config.query.statement.is_none());
    }

    #[test]
    fn missing_alm_section_fails() {
        assert!(parse_config("[query]\nstatement = \"x\"\n").is_err());
    }

    #[test]
    fn env_fills_only_missing_credentials() {
        let mut config = parse_config(FULL).unwrap();
        config.alm.user = Some("from-file".into());
        apply_env(&mut config, |key| Some(format!("env:{key}")));

        assert_eq!(config.alm.user.as_deref(), Some("from-file"));
        assert_eq!(config.alm.password.as_deref(), Some("env:HPALM_PASSWORD"));
        let confluence = config.confluence.unwrap();
        assert_eq!(confluence.user.as_deref(), Some("env:HPALM_CONFLUENCE_USER"));
        assert_eq!(
            confluence.password.as_deref(),
            Some("env:HPALM_CONFLUENCE_PASSWORD")
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
