use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::LotteryKind;

/// Plage AC jugée optimale et constantes empiriques utilisées par le score qualité.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcConfig {
    pub min_optimal: u32,
    pub max_optimal: u32,
    pub ideal_sum: u32,
    pub ideal_span: u32,
}

impl AcConfig {
    pub fn for_kind(kind: LotteryKind) -> Self {
        match kind {
            LotteryKind::Ssq => Self {
                min_optimal: 7,
                max_optimal: 10,
                ideal_sum: 102,
                ideal_span: 26,
            },
            LotteryKind::Dlt => Self {
                min_optimal: 4,
                max_optimal: 6,
                ideal_sum: 90,
                ideal_span: 25,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcLevel {
    Low,
    Optimal,
    High,
}

impl fmt::Display for AcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcLevel::Low => write!(f, "FAIBLE"),
            AcLevel::Optimal => write!(f, "OPTIMAL"),
            AcLevel::High => write!(f, "ÉLEVÉ"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AcAnalysis {
    pub value: u32,
    pub level: AcLevel,
    /// Différences positives de toutes les paires, dans l'ordre (i, j) avec i < j.
    pub differences: Vec<u32>,
    pub unique_differences: usize,
    pub recommendation: String,
}

/// Valeur AC : nombre de différences distinctes moins (n - 1). Vaut 0 pour n < 2.
pub fn ac_value(numbers: &[u8]) -> u32 {
    let n = numbers.len();
    if n < 2 {
        return 0;
    }
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();

    let mut seen = [false; 256];
    let mut unique = 0usize;
    for i in 0..n {
        for j in (i + 1)..n {
            let d = (sorted[j] - sorted[i]) as usize;
            if d > 0 && !seen[d] {
                seen[d] = true;
                unique += 1;
            }
        }
    }

    (unique + 1).saturating_sub(n) as u32
}

pub fn calculate_ac_value(numbers: &[u8], config: &AcConfig) -> AcAnalysis {
    let mut sorted = numbers.to_vec();
    sorted.sort_unstable();

    let mut differences = Vec::with_capacity(sorted.len() * sorted.len().saturating_sub(1) / 2);
    for i in 0..sorted.len() {
        for j in (i + 1)..sorted.len() {
            let d = (sorted[j] - sorted[i]) as u32;
            if d > 0 {
                differences.push(d);
            }
        }
    }
    let mut distinct = differences.clone();
    distinct.sort_unstable();
    distinct.dedup();

    let value = ac_value(&sorted);
    let level = if value < config.min_optimal {
        AcLevel::Low
    } else if value > config.max_optimal {
        AcLevel::High
    } else {
        AcLevel::Optimal
    };

    let recommendation = match level {
        AcLevel::Low => format!(
            "AC={} sous la plage optimale {}-{} : combinaison trop régulière, espacez davantage les numéros",
            value, config.min_optimal, config.max_optimal
        ),
        AcLevel::Optimal => format!(
            "AC={} dans la plage optimale {}-{}",
            value, config.min_optimal, config.max_optimal
        ),
        AcLevel::High => format!(
            "AC={} au-dessus de la plage optimale {}-{} : combinaison très dispersée",
            value, config.min_optimal, config.max_optimal
        ),
    };

    AcAnalysis {
        value,
        level,
        differences,
        unique_differences: distinct.len(),
        recommendation,
    }
}
