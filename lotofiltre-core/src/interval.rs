use serde::{Deserialize, Serialize};

use crate::error::{ReductionError, Result};
use crate::models::LotteryKind;

pub const BAND_NAMES: [&str; 3] = ["petits", "moyens", "grands"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Band {
    pub min: u8,
    pub max: u8,
}

/// Trois intervalles contigus, sans chevauchement (petits / moyens / grands).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "[Band; 3]", into = "[Band; 3]")]
pub struct IntervalBands {
    bands: [Band; 3],
}

impl TryFrom<[Band; 3]> for IntervalBands {
    type Error = ReductionError;

    fn try_from(bands: [Band; 3]) -> Result<Self> {
        for (i, band) in bands.iter().enumerate() {
            if band.min > band.max {
                return Err(ReductionError::InvalidBands(format!(
                    "intervalle {} vide ({}-{})",
                    BAND_NAMES[i], band.min, band.max
                )));
            }
        }
        for i in 0..2 {
            if bands[i + 1].min as u16 != bands[i].max as u16 + 1 {
                return Err(ReductionError::InvalidBands(format!(
                    "{}-{} et {}-{} ne sont pas contigus",
                    bands[i].min,
                    bands[i].max,
                    bands[i + 1].min,
                    bands[i + 1].max
                )));
            }
        }
        Ok(Self { bands })
    }
}

impl From<IntervalBands> for [Band; 3] {
    fn from(value: IntervalBands) -> Self {
        value.bands
    }
}

impl IntervalBands {
    pub fn new(small: (u8, u8), medium: (u8, u8), large: (u8, u8)) -> Result<Self> {
        Self::try_from([
            Band { min: small.0, max: small.1 },
            Band { min: medium.0, max: medium.1 },
            Band { min: large.0, max: large.1 },
        ])
    }

    pub fn for_kind(kind: LotteryKind) -> Self {
        let bands = match kind {
            LotteryKind::Ssq => [(1, 11), (12, 22), (23, 33)],
            LotteryKind::Dlt => [(1, 12), (13, 24), (25, 35)],
        };
        Self {
            bands: bands.map(|(min, max)| Band { min, max }),
        }
    }

    pub fn bands(&self) -> &[Band; 3] {
        &self.bands
    }

    /// Vérifie que les intervalles couvrent exactement `[min, max]`.
    pub fn check_covers(&self, min: u8, max: u8) -> Result<()> {
        let first = self.bands[0].min;
        let last = self.bands[2].max;
        if first != min || last != max {
            return Err(ReductionError::InvalidBands(format!(
                "couverture {}-{} différente de la plage {}-{}",
                first, last, min, max
            )));
        }
        Ok(())
    }

    pub fn band_of(&self, number: u8) -> Option<usize> {
        self.bands
            .iter()
            .position(|b| number >= b.min && number <= b.max)
    }

    pub fn counts(&self, numbers: &[u8]) -> [usize; 3] {
        let mut counts = [0usize; 3];
        for &n in numbers {
            if let Some(i) = self.band_of(n) {
                counts[i] += 1;
            }
        }
        counts
    }
}

#[derive(Debug, Clone)]
pub struct IntervalAnalysis {
    pub counts: [usize; 3],
    pub ratio: String,
    pub balance_score: u8,
    pub is_balanced: bool,
    pub is_extreme: bool,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickIntervalCheck {
    pub is_balanced: bool,
    pub ratio: String,
}

pub fn format_ratio(counts: &[usize; 3]) -> String {
    format!("{}:{}:{}", counts[0], counts[1], counts[2])
}

/// 100 × (1 − écart absolu total à n/3 / n), arrondi et borné à [0, 100].
pub fn balance_score(counts: &[usize; 3], n: usize) -> u8 {
    if n == 0 {
        return 0;
    }
    let ideal = n as f64 / 3.0;
    let deviation: f64 = counts.iter().map(|&c| (c as f64 - ideal).abs()).sum();
    (100.0 * (1.0 - deviation / n as f64)).round().clamp(0.0, 100.0) as u8
}

/// Chaque intervalle à au plus 1 de n/3.
pub fn is_balanced(counts: &[usize; 3], n: usize) -> bool {
    if n == 0 {
        return false;
    }
    counts.iter().all(|&c| (3 * c).abs_diff(n) <= 3)
}

/// Un intervalle contient plus des 2/3 des numéros.
pub fn is_extreme(counts: &[usize; 3], n: usize) -> bool {
    counts.iter().any(|&c| 3 * c > 2 * n)
}

pub(crate) fn max_deviation(counts: &[usize; 3], n: usize) -> f64 {
    let ideal = n as f64 / 3.0;
    counts
        .iter()
        .map(|&c| (c as f64 - ideal).abs())
        .fold(0.0, f64::max)
}

pub fn analyze_interval_distribution(numbers: &[u8], bands: &IntervalBands) -> IntervalAnalysis {
    let n = numbers.len();
    let counts = bands.counts(numbers);
    let ratio = format_ratio(&counts);
    let balanced = is_balanced(&counts, n);
    let extreme = is_extreme(&counts, n);

    let recommendation = if n == 0 {
        "Aucun numéro à analyser".to_string()
    } else if extreme {
        let crowded = counts
            .iter()
            .enumerate()
            .max_by_key(|&(_, &c)| c)
            .map(|(i, _)| BAND_NAMES[i])
            .unwrap_or(BAND_NAMES[0]);
        format!("Répartition {ratio} extrême : trop de numéros {crowded}, rééquilibrez les intervalles")
    } else if balanced {
        format!("Répartition {ratio} équilibrée entre petits, moyens et grands numéros")
    } else {
        format!("Répartition {ratio} acceptable mais déséquilibrée, visez environ {:.1} par intervalle", n as f64 / 3.0)
    };

    IntervalAnalysis {
        counts,
        ratio,
        balance_score: balance_score(&counts, n),
        is_balanced: balanced,
        is_extreme: extreme,
        recommendation,
    }
}

pub fn quick_interval_check(numbers: &[u8], bands: &IntervalBands) -> QuickIntervalCheck {
    let counts = bands.counts(numbers);
    QuickIntervalCheck {
        is_balanced: is_balanced(&counts, numbers.len()),
        ratio: format_ratio(&counts),
    }
}
