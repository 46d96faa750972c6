use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::config::SiteConfig;
use crate::error::RiskError;

pub fn load_builtin() -> Result<SiteConfig> {
    let content = include_str!("../../assets/site.json");
    parse_site_config(content, "built-in site.json")
}

pub fn load_site_config(path: &Path) -> Result<SiteConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read site config {}", path.display()))?;
    parse_site_config(&content, &path.display().to_string())
}

/// Finds the top-level key whose value does not deserialize on its own.
fn offending_key(doc: &Value) -> Option<String> {
    let obj = doc.as_object()?;
    obj.iter().find_map(|(key, value)| {
        let mut single = Map::new();
        single.insert(key.clone(), value.clone());
        serde_json::from_value::<SiteConfig>(Value::Object(single))
            .is_err()
            .then(|| key.clone())
    })
}

pub fn parse_site_config(content: &str, source: &str) -> Result<SiteConfig> {
    let doc: Value = serde_json::from_str(content)
        .map_err(|e| RiskError::config(source, format!("malformed config: {}", e)))?;
    let config: SiteConfig = match serde_json::from_value(doc.clone()) {
        Ok(config) => config,
        Err(e) => {
            let field = offending_key(&doc).unwrap_or_else(|| source.to_string());
            return Err(RiskError::config(field, format!("{} (in {})", e, source)).into());
        }
    };
    config.validate()?;
    Ok(config)
}
