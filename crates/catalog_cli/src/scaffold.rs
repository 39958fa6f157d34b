//! Minimal project files for a fresh catalog directory.

use anyhow::{Context, Result};
use serde_json::json;
use std::io::ErrorKind;
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Presence of this file marks a directory as an initialized catalog
pub const CONFIG_FILE: &str = "eventcatalog.config.js";

const GITIGNORE: &str = "# Dependencies
/node_modules

# Production
/build
/dist

# Generated files
.astro
.eventcatalog-core

# Misc
.DS_Store
.env.local
.env.development.local
.env.test.local
.env.production.local

npm-debug.log*
yarn-debug.log*
yarn-error.log*
";

const ENV: &str = "# EventCatalog environment variables\n";

const NPMRC: &str = "strict-peer-dependencies=false\n";

/// Config file names that mark a directory as an initialized catalog
const CONFIG_FILES: [&str; 2] = [CONFIG_FILE, "eventcatalog.config.ts"];

/// Create config, `.gitignore`, `package.json`, `.env` and `.npmrc` in `dir`
///
/// Files that already exist are left untouched. Returns the names written.
///
/// # Errors
///
/// Returns error if any file cannot be written
pub async fn init_catalog(dir: &Path, organization: &str) -> Result<Vec<&'static str>> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create catalog directory '{}'", dir.display()))?;

    let files = [
        (CONFIG_FILE, config_js(organization)),
        (".gitignore", GITIGNORE.to_string()),
        ("package.json", package_json(dir)?),
        (".env", ENV.to_string()),
        (".npmrc", NPMRC.to_string()),
    ];
    let mut written = Vec::new();
    for (name, content) in files {
        let path = dir.join(name);
        if create_new(&path, &content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?
        {
            written.push(name);
        } else {
            debug!(path = %path.display(), "kept existing file");
        }
    }
    info!(dir = %dir.display(), files = ?written, "initialized catalog");
    Ok(written)
}

/// Scaffold `dir` unless it already has a catalog config; returns whether it did
///
/// # Errors
///
/// Returns error if scaffolding fails
pub async fn init_if_missing(dir: &Path) -> Result<bool> {
    if CONFIG_FILES.iter().any(|name| dir.join(name).is_file()) {
        return Ok(false);
    }
    init_catalog(dir, "My Organization").await?;
    Ok(true)
}

/// Write `content` to a file that must not exist yet; `false` if it did
async fn create_new(path: &Path, content: &str) -> std::io::Result<bool> {
    let mut file = match tokio::fs::OpenOptions::new().write(true).create_new(true).open(path).await {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::AlreadyExists => return Ok(false),
        Err(err) => return Err(err),
    };
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    Ok(true)
}

fn config_js(organization: &str) -> String {
    let organization = organization.replace('\\', "\\\\").replace('\'', "\\'");
    let cid = uuid::Uuid::new_v4();
    format!(
        "/** @type {{import('@eventcatalog/core/bin/eventcatalog.config').Config}} */
export default {{
  title: 'EventCatalog',
  tagline: 'Discover, Explore and Document your Event Driven Architectures',
  organizationName: '{organization}',
  homepageLink: 'https://eventcatalog.dev/',
  output: 'static',
  trailingSlash: false,
  base: '/',
  logo: {{
    alt: 'EventCatalog Logo',
    src: '/logo.png',
    text: 'EventCatalog',
  }},
  cId: '{cid}',
}};
"
    )
}

fn package_json(dir: &Path) -> Result<String> {
    let name = dir
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().to_lowercase()))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "my-catalog".to_string());
    let package = json!({
        "name": name,
        "version": "0.1.0",
        "private": true,
        "scripts": {
            "dev": "eventcatalog dev",
            "build": "eventcatalog build",
            "start": "eventcatalog start",
            "preview": "eventcatalog preview",
            "generate": "eventcatalog generate",
            "lint": "eventcatalog-linter"
        },
        "dependencies": {
            "@eventcatalog/core": "latest",
            "@eventcatalog/linter": "latest"
        }
    });
    let mut text = serde_json::to_string_pretty(&package).context("Failed to encode package.json")?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cid(config: &str) -> String {
        let start = config.find("cId: '").unwrap() + "cId: '".len();
        config[start..start + 36].to_string()
    }

    #[tokio::test]
    async fn test_init_writes_project_files() {
        let tmp = TempDir::new().unwrap();
        init_catalog(tmp.path(), "My Organization").await.unwrap();

        let config = std::fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(config.contains("organizationName: 'My Organization'"));
        assert!(uuid::Uuid::parse_str(&cid(&config)).is_ok());

        let gitignore = std::fs::read_to_string(tmp.path().join(".gitignore")).unwrap();
        assert!(gitignore.contains("node_modules"));
        assert!(tmp.path().join(".env").is_file());
        let npmrc = std::fs::read_to_string(tmp.path().join(".npmrc")).unwrap();
        assert!(npmrc.contains("strict-peer-dependencies=false"));

        let pkg: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(tmp.path().join("package.json")).unwrap()).unwrap();
        assert_eq!(pkg["dependencies"]["@eventcatalog/core"], "latest");
        assert_eq!(pkg["scripts"]["dev"], "eventcatalog dev");
        assert_eq!(pkg["scripts"]["generate"], "eventcatalog generate");
    }

    #[tokio::test]
    async fn test_custom_organization_and_fresh_cid() {
        let first_dir = TempDir::new().unwrap();
        init_catalog(first_dir.path(), "Acme's Corp").await.unwrap();
        let first = std::fs::read_to_string(first_dir.path().join(CONFIG_FILE)).unwrap();
        assert!(first.contains("organizationName: 'Acme\\'s Corp'"));

        let second_dir = TempDir::new().unwrap();
        init_catalog(second_dir.path(), "Acme").await.unwrap();
        let second = std::fs::read_to_string(second_dir.path().join(CONFIG_FILE)).unwrap();
        assert_ne!(cid(&first), cid(&second));
    }

    #[tokio::test]
    async fn test_existing_project_files_survive() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".gitignore"), "my-secrets/\n").unwrap();
        std::fs::write(tmp.path().join("package.json"), "{\"name\":\"mine\"}").unwrap();

        let written = init_catalog(tmp.path(), "Acme").await.unwrap();
        assert_eq!(written, vec![CONFIG_FILE, ".env", ".npmrc"]);
        assert_eq!(std::fs::read_to_string(tmp.path().join(".gitignore")).unwrap(), "my-secrets/\n");
        assert_eq!(std::fs::read_to_string(tmp.path().join("package.json")).unwrap(), "{\"name\":\"mine\"}");

        let config = std::fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(init_catalog(tmp.path(), "Other").await.unwrap().is_empty());
        assert_eq!(std::fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap(), config);
    }

    #[tokio::test]
    async fn test_typescript_config_counts_as_initialized() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("eventcatalog.config.ts"), "export default {};").unwrap();

        assert!(!init_if_missing(tmp.path()).await.unwrap());
        assert!(!tmp.path().join(CONFIG_FILE).exists());
    }

    #[tokio::test]
    async fn test_existing_config_is_kept() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE), "export default {};").unwrap();

        assert!(!init_if_missing(tmp.path()).await.unwrap());
        let config = std::fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, "export default {};");
        assert!(!tmp.path().join(".gitignore").exists());
    }
}
