//! `eventcatalog import`: apply DSL documents to a catalog.

use crate::scaffold::init_if_missing;
use anyhow::{Result, bail};
use catalog_compiler::{ImportResult, ReconcileOptions, Reconciler, render_import_report};
use catalog_core::CatalogError;
use catalog_dsl::{DslParser, Program, TextParser};
use catalog_sdk::FsCatalog;
use std::path::PathBuf;
use tracing::{debug, info};

/// Options of the import command
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// `.ec` files, parsed independently and imported as one batch
    pub files: Vec<PathBuf>,
    /// Document read from standard input, used when no files are given
    pub stdin: Option<String>,
    /// Report outcomes without writing
    pub dry_run: bool,
    /// Write new resources to top-level type folders
    pub flat: bool,
    /// Skip project scaffolding
    pub no_init: bool,
    /// Catalog directory
    pub dir: PathBuf,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            stdin: None,
            dry_run: false,
            flat: false,
            no_init: false,
            dir: PathBuf::from("."),
        }
    }
}

/// Parse every source, then reconcile the combined program
///
/// # Errors
///
/// Fails before any write when no input is given, a file is missing or a
/// document does not parse. Per-resource failures are reported in the
/// result instead.
pub async fn run_import(options: &ImportOptions) -> Result<ImportResult> {
    let program = load_program(options).await?;

    if !options.no_init && !options.dry_run && init_if_missing(&options.dir).await? {
        info!(dir = %options.dir.display(), "scaffolded new catalog");
    }

    let store = FsCatalog::new(&options.dir);
    let reconcile_options = ReconcileOptions {
        nested: !options.flat,
        dry_run: options.dry_run,
    };
    Ok(Reconciler::new(&store, reconcile_options).reconcile(&program).await)
}

/// Run an import and render its report
///
/// # Errors
///
/// See [`run_import`]
pub async fn import_dsl(options: &ImportOptions) -> Result<String> {
    let result = run_import(options).await?;
    Ok(render_import_report(&result))
}

async fn load_program(options: &ImportOptions) -> Result<Program> {
    let mut sources = Vec::new();
    if !options.files.is_empty() {
        for path in &options.files {
            if !path.is_file() {
                bail!("File not found: {}", path.display());
            }
            let text = tokio::fs::read_to_string(path).await?;
            sources.push((path.display().to_string(), text));
        }
    } else if let Some(text) = &options.stdin {
        sources.push(("<stdin>".to_string(), text.clone()));
    } else {
        bail!("Either provide .ec file paths or use --stdin");
    }

    let parser = TextParser::new();
    let mut program = Program::new();
    for (source_name, text) in sources {
        let parsed = parser
            .parse(&text)
            .map_err(|errors| CatalogError::Parse { source_name: source_name.clone(), errors })?;
        debug!(source = %source_name, definitions = parsed.definitions.len(), "parsed");
        program.extend(parsed);
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::CONFIG_FILE;
    use catalog_core::ResourceType;
    use catalog_sdk::CatalogStore;
    use tempfile::TempDir;

    fn options(dir: &TempDir) -> ImportOptions {
        ImportOptions {
            dir: dir.path().to_path_buf(),
            no_init: true,
            ..ImportOptions::default()
        }
    }

    fn write_ec(dir: &TempDir, name: &str, text: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_input_source() {
        let tmp = TempDir::new().unwrap();
        let err = import_dsl(&options(&tmp)).await.unwrap_err();
        assert_eq!(err.to_string(), "Either provide .ec file paths or use --stdin");
    }

    #[tokio::test]
    async fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let opts = ImportOptions {
            files: vec![tmp.path().join("nope.ec")],
            ..options(&tmp)
        };
        let err = import_dsl(&opts).await.unwrap_err();
        assert!(err.to_string().starts_with("File not found: "));
    }

    #[tokio::test]
    async fn test_parse_errors_abort_before_writing() {
        let tmp = TempDir::new().unwrap();
        let catalog = TempDir::new().unwrap();
        let good = write_ec(&tmp, "good.ec", "event A { version 1.0.0 }");
        let bad = write_ec(&tmp, "bad.ec", "event B {\n  version 1.0.0\n");
        let opts = ImportOptions {
            files: vec![good, bad],
            ..options(&catalog)
        };

        let err = import_dsl(&opts).await.unwrap_err();
        let catalog_err = err.downcast_ref::<CatalogError>().unwrap();
        assert!(matches!(catalog_err, CatalogError::Parse { .. }));
        assert!(err.to_string().starts_with("Parse errors in "));
        assert!(std::fs::read_dir(catalog.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_files_are_one_batch() {
        let tmp = TempDir::new().unwrap();
        let first = write_ec(&tmp, "events.ec", "event OrderCreated { version 1.0.0 }");
        let second = write_ec(
            &tmp,
            "services.ec",
            "service OrderService { version 1.0.0 sends event OrderCreated }",
        );
        let opts = ImportOptions {
            files: vec![first, second],
            ..options(&tmp)
        };

        let result = run_import(&opts).await.unwrap();
        assert_eq!(result.created.len(), 2, "{result:?}");
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_stdin_import_and_report() {
        let tmp = TempDir::new().unwrap();
        let opts = ImportOptions {
            stdin: Some(
                "event OrderCreated {\n  version 1.0.0\n  name \"Order Created\"\n}\n\nservice OrderService {\n  version 1.0.0\n  name \"Order Service\"\n  sends event OrderCreated@1.0.0\n}"
                    .to_string(),
            ),
            ..options(&tmp)
        };

        let report = import_dsl(&opts).await.unwrap();
        assert!(console::strip_ansi_codes(&report).contains("Created 2 resource(s)"));

        let store = FsCatalog::new(tmp.path());
        assert!(store.read(ResourceType::Event, "OrderCreated", Some("1.0.0")).await.unwrap().is_some());
        assert!(store.read(ResourceType::Service, "OrderService", Some("1.0.0")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_scaffolding_runs_unless_disabled() {
        let tmp = TempDir::new().unwrap();
        let stdin = Some("event E".to_string());

        let dry = ImportOptions {
            stdin: stdin.clone(),
            dry_run: true,
            no_init: false,
            ..options(&tmp)
        };
        run_import(&dry).await.unwrap();
        assert!(!tmp.path().join(CONFIG_FILE).exists());

        let skipped = ImportOptions {
            stdin: stdin.clone(),
            ..options(&tmp)
        };
        run_import(&skipped).await.unwrap();
        assert!(!tmp.path().join(CONFIG_FILE).exists());

        let init = ImportOptions {
            stdin,
            no_init: false,
            ..options(&tmp)
        };
        run_import(&init).await.unwrap();
        assert!(tmp.path().join(CONFIG_FILE).is_file());
        assert!(tmp.path().join(".gitignore").is_file());
    }

    #[tokio::test]
    async fn test_flat_mode() {
        let tmp = TempDir::new().unwrap();
        let opts = ImportOptions {
            stdin: Some("domain Payment { service OrderService { writes-to container LedgerDb } }".to_string()),
            flat: true,
            ..options(&tmp)
        };
        run_import(&opts).await.unwrap();
        assert!(tmp.path().join("containers/LedgerDb/index.mdx").is_file());
        assert!(tmp.path().join("services/OrderService/index.mdx").is_file());
    }

    #[tokio::test]
    async fn test_nested_container_stub() {
        let tmp = TempDir::new().unwrap();
        let opts = ImportOptions {
            stdin: Some("domain Payment { service OrderService { writes-to container LedgerDb } }".to_string()),
            ..options(&tmp)
        };
        run_import(&opts).await.unwrap();
        assert!(tmp.path().join("domains/Payment/containers/LedgerDb/index.mdx").is_file());
        assert!(!tmp.path().join("containers/LedgerDb").exists());
    }

    #[tokio::test]
    async fn test_dot_ids_are_rejected_per_resource() {
        let tmp = TempDir::new().unwrap();
        let opts = ImportOptions {
            stdin: Some("event .. { version 1.0.0 }\nevent Fine { version 1.0.0 }".to_string()),
            ..options(&tmp)
        };

        let result = run_import(&opts).await.unwrap();
        assert_eq!(result.errors.len(), 1, "{result:?}");
        assert!(result.errors[0].message.contains("must be a single path segment"));
        assert_eq!(result.created.len(), 1);
        assert!(!tmp.path().join("index.mdx").exists());
        assert!(tmp.path().join("events/Fine/index.mdx").is_file());
    }

    #[tokio::test]
    async fn test_scaffolding_keeps_user_files() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(".gitignore"), "my-secrets/\n").unwrap();
        std::fs::write(tmp.path().join("package.json"), "{\"name\":\"mine\"}").unwrap();
        let opts = ImportOptions {
            stdin: Some("event A { version 1.0.0 }".to_string()),
            no_init: false,
            ..options(&tmp)
        };

        import_dsl(&opts).await.unwrap();
        assert!(tmp.path().join(CONFIG_FILE).is_file());
        assert_eq!(std::fs::read_to_string(tmp.path().join(".gitignore")).unwrap(), "my-secrets/\n");
        assert_eq!(std::fs::read_to_string(tmp.path().join("package.json")).unwrap(), "{\"name\":\"mine\"}");
    }
}
