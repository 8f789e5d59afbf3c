use super::Host;
use crate::Result;
use crate::config::Config;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `harvest.toml`, `harvest.yml`, `harvest.yaml` or `harvest.json`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    let config_path = args.config.as_ref();

    match Config::load(Utf8Path::new("."), config_path) {
        Ok((_, warnings)) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = config_path {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration (no config file found)");
            }

            for warning in &warnings {
                let _ = writeln!(host.error(), "⚠️ {warning}");
            }
            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e}");
            host.exit(1);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::host::TestHost;
    use crate::commands::init::{InitArgs, init_config};
    use std::fs;

    fn temp_path(dir: &tempfile::TempDir, name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().join(name)).unwrap()
    }

    #[test]
    fn test_default_config_is_valid_in_every_format() {
        let dir = tempfile::tempdir().unwrap();

        for name in ["harvest.yml", "harvest.toml", "harvest.json"] {
            let path = temp_path(&dir, name);

            let mut init_host = TestHost::new();
            init_config(&mut init_host, &InitArgs { output: path.clone() }).unwrap();
            assert!(init_host.output_text().contains(name));

            let mut host = TestHost::new();
            let result = validate_config(&mut host, &ValidateArgs { config: Some(path) });
            assert!(result.is_ok(), "default configuration in {name} should validate: {result:?}");
            assert!(host.output_text().contains("Configuration file is valid"));
            assert!(host.exit_code.is_none());
        }
    }

    #[test]
    fn test_unknown_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "unknown.toml");
        fs::write(&path, "unknown_field = \"value\"\n").unwrap();

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(path) });

        assert!(result.is_err());
        assert_eq!(host.exit_code, Some(1));
        assert!(host.error_text().contains("Configuration validation failed"));
    }

    #[test]
    fn test_invalid_pattern() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "bad_pattern.yml");
        fs::write(&path, "patterns:\n  documentation: [\"(unclosed\"]\n").unwrap();

        let mut host = TestHost::new();
        let result = validate_config(&mut host, &ValidateArgs { config: Some(path) });

        assert!(result.is_err());
        assert!(host.error_text().contains("unclosed"));
    }

    #[test]
    fn test_warnings_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = temp_path(&dir, "warn.yml");
        fs::write(&path, "ci_cd_tools: []\n").unwrap();

        let mut host = TestHost::new();
        validate_config(&mut host, &ValidateArgs { config: Some(path) }).unwrap();

        assert!(host.error_text().contains("ci_cd_tools is empty"));
    }
}
