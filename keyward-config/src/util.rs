use std::path::PathBuf;
use std::time::Duration;

/// Read an environment variable, treating blank values as unset.
pub fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

pub fn path_var(name: &str) -> Option<PathBuf> {
    non_empty_var(name).map(PathBuf::from)
}

/// Parse a humantime duration such as `"5s"`, `"1h 30m"` or `"0s"`.
pub fn parse_duration(raw: &str) -> Result<Duration, humantime::DurationError> {
    humantime::parse_duration(raw.trim())
}

/// Number of hashing workers used when none is configured.
pub fn default_hash_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
