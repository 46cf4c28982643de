use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeoEnrichError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Output,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    High,
    Critical,
}

impl GeoEnrichError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::CsvError(_) => ErrorCategory::Input,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::Output,
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Output => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::CsvError(e) => format!("The input file is not valid CSV: {}", e),
            Self::IoError(e) => format!("File access failed: {}", e),
            Self::SerializationError(e) => format!("Could not encode the GeoJSON output: {}", e),
            Self::ConfigError { message } => message.clone(),
            Self::MissingConfigError { field } => format!("{} is not set", field),
            Self::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("{} = '{}' is invalid ({})", field, value, reason),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::CsvError(_) => "Make sure the input is a UTF-8 CSV file with a header row",
            Self::IoError(_) => "Check that the input exists and the output directory is writable",
            Self::SerializationError(_) => "Re-run with --verbose and report the failing row",
            Self::MissingConfigError { .. } => {
                "Set GOOGLE_PLACES_API_KEY (or GOOGLE_MAPS_API_KEY) and enable the Places API"
            }
            Self::ConfigError { .. } => {
                "Verify the API key and that the Places API is enabled for it"
            }
            Self::InvalidConfigValueError { .. } => "Fix the value on the command line or in the config file",
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoEnrichError>;
