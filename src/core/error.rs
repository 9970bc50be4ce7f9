use thiserror::Error;

#[derive(Error, Debug)]
pub enum ColonyError {
    #[error("Player not found: {0:?}")]
    PlayerNotFound(crate::core::types::PlayerId),

    #[error("Habitat not found: {0}")]
    HabitatNotFound(String),

    #[error("Unknown blueprint: {0}")]
    UnknownBlueprint(String),

    #[error("Unknown technology: {0}")]
    UnknownTechnology(String),

    #[error("Unknown faction: {0}")]
    UnknownFaction(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ColonyError>;
