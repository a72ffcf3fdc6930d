use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum MevFlowError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Scoring error: {0}")]
    Scoring(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("Persistence error: {0}")]
    Persistence(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MevFlowError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn market_data_error(msg: impl Into<String>) -> Self {
        Self::MarketData(msg.into())
    }

    pub fn scoring_error(msg: impl Into<String>) -> Self {
        Self::Scoring(msg.into())
    }

    pub fn execution_error(msg: impl Into<String>) -> Self {
        Self::Execution(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, MevFlowError>;
