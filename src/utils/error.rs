use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgriError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("Inference request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Image decoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}': {value} ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Inference error: {message}")]
    InferenceError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Data,
    Network,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AgriError {
    pub fn processing(message: impl Into<String>) -> Self {
        AgriError::ProcessingError {
            message: message.into(),
        }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        AgriError::InferenceError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AgriError::ValidationError { .. } => ErrorCategory::Input,
            AgriError::ConfigError { .. }
            | AgriError::InvalidConfigValueError { .. }
            | AgriError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AgriError::CsvError(_)
            | AgriError::SerializationError(_)
            | AgriError::ImageError(_)
            | AgriError::ProcessingError { .. } => ErrorCategory::Data,
            AgriError::HttpError(_) | AgriError::InferenceError { .. } => ErrorCategory::Network,
            AgriError::IoError(_) | AgriError::ZipError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 給終端使用者看的訊息，不含內部細節
    pub fn user_friendly_message(&self) -> String {
        match self {
            AgriError::ValidationError { message } => message.clone(),
            AgriError::ImageError(_) => "The uploaded file could not be read as an image.".to_string(),
            AgriError::HttpError(_) | AgriError::InferenceError { .. } => {
                "The disease detection model is currently unavailable.".to_string()
            }
            AgriError::ConfigError { .. }
            | AgriError::InvalidConfigValueError { .. }
            | AgriError::MissingConfigError { .. } => format!("Configuration problem: {}", self),
            _ => "An error occurred while processing the data.".to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => "Check the location, soil type and area values and try again",
            ErrorCategory::Configuration => "Review the TOML configuration file and CLI flags",
            ErrorCategory::Data => "Check the dataset for malformed rows (empty fields, zero area)",
            ErrorCategory::Network => "Make sure the model server is running and reachable",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }

    /// 依嚴重程度對應的程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgriError>;
