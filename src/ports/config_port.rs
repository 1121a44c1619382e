//! Configuration access port.

use std::path::PathBuf;

/// Section/key lookup over a configuration source.
pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Integer value, or `None` when the key is absent. A present but
    /// non-numeric value is reported as `Err` with the raw text.
    fn get_int(&self, section: &str, key: &str) -> Result<Option<i64>, String>;

    /// Non-empty string value interpreted as a filesystem path.
    fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_string(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }
}
