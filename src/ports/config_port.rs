//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;

    /// Optional float: `None` when the key is absent or blank.
    fn get_opt_double(&self, section: &str, key: &str) -> Option<Result<f64, String>> {
        let raw = self.get_string(section, key)?;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(trimmed.parse::<f64>().map_err(|e| e.to_string()))
    }
}
