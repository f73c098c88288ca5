use thiserror::Error;

pub type Result<T> = std::result::Result<T, SupportError>;

#[derive(Error, Debug)]
pub enum SupportError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Knowledge base error: {0}")]
    Knowledge(String),

    #[error("Endpoint error: {0}")]
    Endpoint(#[from] completion::EndpointError),

    #[error("Invalid question: {0}")]
    Query(#[from] session::QueryError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<config::ConfigError> for SupportError {
    #[inline]
    fn from(error: config::ConfigError) -> Self {
        Self::Config(error.to_string())
    }
}

impl From<knowledge::KnowledgeError> for SupportError {
    #[inline]
    fn from(error: knowledge::KnowledgeError) -> Self {
        Self::Knowledge(error.to_string())
    }
}

impl From<knowledge::UnknownSectionError> for SupportError {
    #[inline]
    fn from(error: knowledge::UnknownSectionError) -> Self {
        Self::Knowledge(error.to_string())
    }
}

pub mod commands;
pub mod completion;
pub mod config;
pub mod knowledge;
pub mod orchestrator;
pub mod prompt;
pub mod retrieval;
pub mod session;
