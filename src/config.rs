//! Building [`Options`] from a JSON config file and command-line flags.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;
use treeshake::{IgnoreSpec, Options};

use crate::Cli;

/// Load `--config` if given, then layer the command-line flags on top:
/// list flags extend the file's lists, boolean flags force `true`.
pub fn load_options(cli: &Cli) -> Result<Options> {
    let mut options = match &cli.config {
        Some(path) => read_config(path)?,
        None => Options::default(),
    };

    options.used.extend(cli.used.iter().cloned());
    for path in &cli.used_file {
        options.used.extend(read_used_file(path)?);
    }

    options
        .ignore
        .extend(cli.ignore.iter().cloned().map(IgnoreSpec::Literal));
    options.ignore.extend(
        cli.ignore_pattern
            .iter()
            .cloned()
            .map(|pattern| IgnoreSpec::Pattern { pattern }),
    );

    if cli.allow_ids {
        options.allow_ids = true;
    }
    if cli.allow_non_class_selectors {
        options.allow_non_class_selectors = true;
    }
    if cli.allow_non_class_combinators {
        options.allow_non_class_combinators = Some(true);
    }

    debug!(
        used = options.used.len(),
        ignore = options.ignore.len(),
        "options loaded"
    );
    Ok(options)
}

fn read_config(path: &Path) -> Result<Options> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config {}", path.display()))
}

/// Class names separated by any whitespace.
fn read_used_file(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read used classes {}", path.display()))?;
    Ok(text.split_whitespace().map(str::to_string).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("css-treeshake").chain(args.iter().copied()))
    }

    #[test]
    fn test_flags_only() {
        let cli = parse(&["--used", "a,b", "--used", "c", "--ignore", ".x", "--allow-ids"]);
        let options = load_options(&cli).unwrap();
        assert_eq!(options.used, vec!["a", "b", "c"]);
        assert_eq!(options.ignore, vec![IgnoreSpec::Literal(".x".into())]);
        assert!(options.allow_ids);
        assert_eq!(options.allow_non_class_combinators, None);
    }

    #[test]
    fn test_flags_extend_config_file() {
        let td = TempDir::new().unwrap();
        let config = td.path().join("shake.json");
        std::fs::write(&config, r#"{ "used": ["a"], "allowNonClassSelectors": true }"#).unwrap();
        let used = td.path().join("used.txt");
        std::fs::write(&used, "b\n c\td\n").unwrap();

        let cli = parse(&[
            "--config",
            config.to_str().unwrap(),
            "--used-file",
            used.to_str().unwrap(),
            "--ignore-pattern",
            "^\\.js-",
            "--allow-non-class-combinators",
        ]);
        let options = load_options(&cli).unwrap();
        assert_eq!(options.used, vec!["a", "b", "c", "d"]);
        assert!(options.allow_non_class_selectors);
        assert_eq!(options.allow_non_class_combinators, Some(true));
        assert_eq!(
            options.ignore,
            vec![IgnoreSpec::Pattern {
                pattern: "^\\.js-".into()
            }]
        );
    }

    #[test]
    fn test_missing_config_file() {
        let cli = parse(&["--config", "/nonexistent/shake.json"]);
        let err = load_options(&cli).unwrap_err();
        assert!(format!("{err:#}").contains("read config"));
    }
}
