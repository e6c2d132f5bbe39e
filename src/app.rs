// Declare modules
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod scanner;

use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::path::Path;

use self::cli::Cli;
use self::config::resolve_config;
use self::error::OptimizeError;
use self::formatter::OutputGenerator;
use self::models::{BuildInfo, ProjectConfig};
use self::scanner::Scanner;

/// What a run produced, besides the two documents on disk.
#[derive(Debug)]
pub struct Outcome {
    pub build: BuildInfo,
    pub exclude_paths: Vec<String>,
}

/// Runs parse, normalize, scan and emit against `root`, then the optional
/// list dump.
pub fn optimize(root: &Path, config: &ProjectConfig) -> Result<Outcome, OptimizeError> {
    let raw = parser::parse_compile_commands(root, config)?;
    let build = normalize::normalize(root, config, raw);

    let scanner = Scanner::new(root.to_path_buf(), config);
    let exclude_paths = scanner.exclude_paths(&build.files, &build.includes)?;

    let output_dir = root.join(&config.output_dir);
    OutputGenerator::write_documents(&output_dir, config, &build, &exclude_paths)?;

    if let Some(dir) = &config.dump_dir {
        OutputGenerator::write_lists(&root.join(dir), &build, &exclude_paths)?;
    }

    Ok(Outcome {
        build,
        exclude_paths,
    })
}

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Identify Project Root & Name
    let current_dir = env::current_dir().context("Failed to get current directory")?;
    let project_name = current_dir.file_name().and_then(|n| n.to_str());

    // 3. Resolve Configuration
    let config = resolve_config(&args, project_name)?;

    // 4. Parse, filter, scan and write
    let outcome = optimize(&current_dir, &config).context("Failed to generate VS Code settings")?;

    log::info!(
        "Done: {} includes, {} defines, {} exclusions",
        outcome.build.includes.len(),
        outcome.build.defines.len(),
        outcome.exclude_paths.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(db: &str, dirs: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("build/compile_commands.json"), db).unwrap();
        for d in dirs {
            fs::create_dir_all(dir.path().join(d)).unwrap();
        }
        dir
    }

    fn read(dir: &TempDir, name: &str) -> String {
        fs::read_to_string(dir.path().join(".vscode").join(name)).unwrap()
    }

    #[test]
    fn single_entry_project() {
        let dir = project(
            r#"[{"directory": "proj", "file": "main.c",
                 "arguments": ["-DFOO=1", "-Iinc", "gcc", "main.c"]}]"#,
            &["proj/inc", "docs"],
        );
        let config = ProjectConfig::default();

        let outcome = optimize(dir.path(), &config).unwrap();

        assert_eq!(outcome.build.defines, vec!["FOO=1"]);
        assert_eq!(outcome.build.includes, vec!["proj/inc"]);
        assert!(outcome.build.files.contains(&"proj/main.c".to_string()));

        let scanned = &outcome.exclude_paths[config.exclude_globs.len()..];
        assert_eq!(scanned, ["docs".to_string()]);

        let settings = read(&dir, formatter::SETTINGS_FILE);
        assert!(settings.contains(r#""docs": true"#));
        let properties = read(&dir, formatter::PROPERTIES_FILE);
        assert!(properties.contains(r#""proj/inc""#));
    }

    #[test]
    fn missing_include_is_dropped() {
        let dir = project(
            r#"[{"directory": ".", "file": "a.c", "command": "gcc -Ithere -Inowhere -c a.c"}]"#,
            &["there"],
        );
        let outcome = optimize(dir.path(), &ProjectConfig::default()).unwrap();
        assert_eq!(outcome.build.includes, vec!["there"]);
    }

    #[test]
    fn rerun_produces_identical_documents() {
        let dir = project(
            r#"[
                {"directory": "main", "file": "b.c", "arguments": ["gcc", "-DB", "-I../lib"]},
                {"directory": "main", "file": "a.c", "arguments": ["gcc", "-DA", "-DB"]}
            ]"#,
            &["main", "lib/x", "tools/y", "build/config"],
        );
        let config = ProjectConfig::default();

        optimize(dir.path(), &config).unwrap();
        let first = (
            read(&dir, formatter::PROPERTIES_FILE),
            read(&dir, formatter::SETTINGS_FILE),
        );
        optimize(dir.path(), &config).unwrap();
        let second = (
            read(&dir, formatter::PROPERTIES_FILE),
            read(&dir, formatter::SETTINGS_FILE),
        );

        assert_eq!(first, second);
    }

    #[test]
    fn rerun_with_custom_output_and_dump_dirs_is_stable() {
        let dir = project(
            r#"[{"directory": "main", "file": "a.c", "arguments": ["gcc", "-DA"]}]"#,
            &["main", "docs"],
        );
        let config = ProjectConfig {
            output_dir: "cfg".into(),
            dump_dir: Some("lists".into()),
            exclude_globs: Vec::new(),
            ..ProjectConfig::default()
        };
        let settings_path = dir.path().join("cfg").join(formatter::SETTINGS_FILE);

        let first = optimize(dir.path(), &config).unwrap();
        let first_settings = fs::read_to_string(&settings_path).unwrap();
        let second = optimize(dir.path(), &config).unwrap();
        let second_settings = fs::read_to_string(&settings_path).unwrap();

        assert_eq!(first.exclude_paths, vec!["docs"]);
        assert_eq!(first.exclude_paths, second.exclude_paths);
        assert_eq!(first_settings, second_settings);
        assert!(dir.path().join("lists").join("epaths.txt").exists());
    }

    #[test]
    fn emitted_lists_are_sorted_and_filtered() {
        let dir = project(
            r#"[
                {"directory": ".", "file": "z.c", "arguments": ["cc", "-DZ", "-DSKIP_ME", "-Ib", "-Ia"]},
                {"directory": ".", "file": "y.c", "arguments": ["cc", "-DA=\"1\"", "-Ivendor/x"]}
            ]"#,
            &["a", "b", "vendor/x"],
        );
        let config = ProjectConfig {
            defines_filter_out: vec!["SKIP".into()],
            includes_filter_out: vec!["vendor".into()],
            ..ProjectConfig::default()
        };

        let outcome = optimize(dir.path(), &config).unwrap();
        let build = &outcome.build;

        assert!(build.files.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(build.defines, vec!["A=\"1\"", "Z"]);
        assert_eq!(build.includes, vec!["a", "b"]);
    }

    #[test]
    fn missing_database_fails_without_writing() {
        let dir = TempDir::new().unwrap();
        let err = optimize(dir.path(), &ProjectConfig::default()).unwrap_err();
        assert!(matches!(err, OptimizeError::MissingInput(_)));
        assert!(!dir.path().join(".vscode").exists());
    }
}
