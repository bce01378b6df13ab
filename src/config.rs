use std::path::PathBuf;
use std::time::Duration;

/// Network timeout applied when no other value is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Environment variable that overrides the scratch directory.
pub const SCRATCH_DIR_ENV: &str = "ADDON_VALIDATOR_SCRATCH_DIR";

/// Settings for one validation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Where the package is downloaded and unpacked. Not isolated per run:
    /// concurrent runs must use different directories.
    pub scratch_dir: PathBuf,
    /// Upper bound on the whole download.
    pub timeout: Duration,
    /// Alternative schema document; the embedded one is used when `None`.
    pub schema: Option<PathBuf>,
    /// Keep going after a schema failure, reporting violations as warnings.
    pub lenient_schema: bool,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir(),
            timeout: DEFAULT_TIMEOUT,
            schema: None,
            lenient_schema: false,
        }
    }
}

impl ValidateOptions {
    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_schema(mut self, schema: impl Into<PathBuf>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    #[must_use]
    pub fn with_lenient_schema(mut self, lenient: bool) -> Self {
        self.lenient_schema = lenient;
        self
    }
}
