//! Nagios plugin status codes

/// Status reported to the monitoring system through the process exit code
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PluginStatus {
    /// Everything is fine
    #[default]
    Ok,
    /// Threshold crossed, not yet critical
    Warning,
    /// Immediate attention required
    Critical,
    /// The check itself could not determine a result
    Unknown,
}

impl PluginStatus {
    /// Process exit code for this status
    pub fn exit_code(&self) -> i32 {
        match self {
            PluginStatus::Ok => 0,
            PluginStatus::Warning => 1,
            PluginStatus::Critical => 2,
            PluginStatus::Unknown => 3,
        }
    }

    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            PluginStatus::Ok => "OK",
            PluginStatus::Warning => "WARNING",
            PluginStatus::Critical => "CRITICAL",
            PluginStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for PluginStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
