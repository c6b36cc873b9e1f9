use std::path::PathBuf;

/// Returns the base directory for SOC data.
///
/// Uses `$A3S_SOC_HOME` if set, otherwise defaults to `~/.a3s/soc`.
pub fn soc_home() -> PathBuf {
    if let Ok(home) = std::env::var("A3S_SOC_HOME") {
        return PathBuf::from(home);
    }

    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".a3s")
        .join("soc")
}

/// Returns the path to the user configuration file.
pub fn config_path() -> PathBuf {
    soc_home().join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    // Both cases share one test so they don't race on the env var.
    #[test]
    fn test_soc_home_and_config_path() {
        std::env::remove_var("A3S_SOC_HOME");
        let home = soc_home();
        assert!(home.ends_with(".a3s/soc") || home.ends_with(".a3s\\soc"));

        std::env::set_var("A3S_SOC_HOME", "/tmp/test-soc");
        assert_eq!(soc_home(), PathBuf::from("/tmp/test-soc"));
        assert_eq!(config_path(), PathBuf::from("/tmp/test-soc/config.toml"));
        std::env::remove_var("A3S_SOC_HOME");
    }
}
