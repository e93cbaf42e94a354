use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Malformed log: topic {index} requested but log only has {topics} topics")]
    MissingTopic { index: usize, topics: usize },
    #[error("Malformed log: data range [{start}, {end}) exceeds data length {len}")]
    DataOutOfRange { start: usize, end: usize, len: usize },
    #[error("Malformed log: invalid data range [{start}, {end})")]
    InvalidRange { start: usize, end: usize },
    #[error("Unknown precision: asset {asset} has no decimals")]
    UnknownPrecision { asset: String },
}

impl DecodeError {
    /// Whether the error is a fault in the source chain data, as opposed to
    /// missing metadata that a decoder can skip over.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::UnknownPrecision { .. })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Decoder '{decoder}' is already registered")]
    DuplicateDecoder { decoder: String },
    #[error(
        "Counterparty '{counterparty}' of decoder '{decoder}' is already owned by '{existing}'"
    )]
    DuplicateCounterparty {
        counterparty: String,
        decoder: String,
        existing: String,
    },
    #[error(
        "Settings for '{identifier}' of decoder '{decoder}' are already declared by '{existing}'"
    )]
    DuplicateEventSettings {
        identifier: String,
        decoder: String,
        existing: String,
    },
}
