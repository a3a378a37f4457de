use thiserror::Error;

use crate::models::LotteryKind;

#[derive(Debug, Error)]
pub enum ReductionError {
    /// Le nombre de combinaisons dépasse le plafond configuré.
    #[error("Pool trop grand : {count} combinaisons (plafond {limit})")]
    PoolTooLarge { count: u64, limit: u64 },

    #[error("Bornes inversées pour le filtre {family} : min={min} > max={max}")]
    InvertedBounds {
        family: &'static str,
        min: u32,
        max: u32,
    },

    #[error("Intervalles invalides : {0}")]
    InvalidBands(String),

    #[error("Numéro {number} hors limites ({min}-{max})")]
    NumberOutOfRange { number: u8, min: u8, max: u8 },

    #[error("Combinaison invalide : {0}")]
    InvalidCombination(String),

    #[error("Preset inconnu pour {kind} : {key}")]
    UnknownPreset { kind: LotteryKind, key: String },

    #[error("Erreur d'entrée/sortie : {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON invalide : {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReductionError>;
