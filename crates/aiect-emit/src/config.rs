//! Script emission configuration.

/// Default CT script file name.
pub const DEFAULT_SCRIPT_FILE: &str = "aie_profile.ct";

/// Default JSON file written by the script's `end` block.
pub const DEFAULT_RESULTS_FILE: &str = "aie_profile_counters.json";

/// Script rendering configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptConfig {
    /// Comment lines at the top of the script (without the leading `# `).
    pub banner: Vec<String>,
    /// Session name printed when tracing starts and ends.
    pub title: String,
    /// JSON file name, resolved against the working directory at run time.
    pub results_file: String,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            banner: vec![
                "Auto-generated CT file for AIE Profile counters".to_string(),
                "Generated by XRT AIE Profile Plugin".to_string(),
            ],
            title: "AIE Profile".to_string(),
            results_file: DEFAULT_RESULTS_FILE.to_string(),
        }
    }
}

impl ScriptConfig {
    /// Set the JSON results file name.
    #[must_use]
    pub fn with_results_file(mut self, name: impl Into<String>) -> Self {
        self.results_file = name.into();
        self
    }

    /// Set the session title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Replace the banner comment lines.
    #[must_use]
    pub fn with_banner<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.banner = lines.into_iter().map(Into::into).collect();
        self
    }
}
