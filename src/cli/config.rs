use std::path::Path;

use crate::config::SocConfig;
use crate::error::{Result, SocError};

/// Execute `config show`: print the effective configuration.
pub fn show(config_path: Option<&Path>) -> Result<()> {
    let path = SocConfig::resolve_path(config_path);
    let config = SocConfig::load_from(&path)?;
    println!("# {}", path.display());
    print!("{}", toml::to_string_pretty(&config)?);
    Ok(())
}

/// Execute `config init`: write defaults, refusing to clobber without `--force`.
pub fn init(config_path: Option<&Path>, force: bool) -> Result<()> {
    let path = SocConfig::resolve_path(config_path);
    if path.exists() && !force {
        return Err(SocError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    SocConfig::default().save_to(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        init(Some(&path), false).unwrap();
        assert!(path.exists());
        assert!(init(Some(&path), false).is_err());
        init(Some(&path), true).unwrap();
        show(Some(&path)).unwrap();
    }
}
