pub mod calculations;
pub mod evapotranspiration;
pub mod normalizer;
pub mod orchestrator;
pub mod validation;

pub use evapotranspiration::{DailyEtc, EvapotranspirationEngine};
pub use normalizer::WeatherSeriesNormalizer;
pub use orchestrator::{FieldRequest, IrrigationOrchestrator, OrchestratorState};
