use thiserror::Error;

type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum AgriWaterError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Crop data error: {0}")]
    CropData(String),

    #[error("Weather API error: {message}")]
    WeatherApi {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("Calculation error: {0}")]
    Calculation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl AgriWaterError {
    pub fn weather(message: impl Into<String>) -> Self {
        AgriWaterError::WeatherApi {
            message: message.into(),
            source: None,
        }
    }

    pub fn weather_caused_by(message: impl Into<String>, cause: impl Into<BoxedCause>) -> Self {
        AgriWaterError::WeatherApi {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    /// Process exit code for the CLI, one per error kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            AgriWaterError::Validation(_) => 2,
            AgriWaterError::CropData(_) => 3,
            AgriWaterError::WeatherApi { .. } => 4,
            AgriWaterError::Calculation(_) => 5,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, AgriWaterError>;
