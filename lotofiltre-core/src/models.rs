use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ac::AcConfig;
use crate::combination::binomial;
use crate::error::{ReductionError, Result};
use crate::interval::IntervalBands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotteryKind {
    /// 6 numéros parmi 33 + 1 parmi 16.
    Ssq,
    /// 5 numéros parmi 35 + 2 parmi 12.
    Dlt,
}

impl LotteryKind {
    pub const ALL: [LotteryKind; 2] = [LotteryKind::Ssq, LotteryKind::Dlt];

    pub fn key(&self) -> &'static str {
        match self {
            LotteryKind::Ssq => "ssq",
            LotteryKind::Dlt => "dlt",
        }
    }

    pub fn shape(&self) -> LotteryShape {
        match self {
            LotteryKind::Ssq => LotteryShape {
                primary: DrawRule { min: 1, max: 33, count: 6 },
                secondary: DrawRule { min: 1, max: 16, count: 1 },
            },
            LotteryKind::Dlt => LotteryShape {
                primary: DrawRule { min: 1, max: 35, count: 5 },
                secondary: DrawRule { min: 1, max: 12, count: 2 },
            },
        }
    }

    pub fn profile(&self) -> LotteryProfile {
        LotteryProfile {
            kind: Some(*self),
            shape: self.shape(),
            ac: AcConfig::for_kind(*self),
            bands: IntervalBands::for_kind(*self),
        }
    }
}

impl fmt::Display for LotteryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LotteryKind::Ssq => write!(f, "SSQ (6/33 + 1/16)"),
            LotteryKind::Dlt => write!(f, "DLT (5/35 + 2/12)"),
        }
    }
}

impl FromStr for LotteryKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ssq" => Ok(LotteryKind::Ssq),
            "dlt" => Ok(LotteryKind::Dlt),
            other => Err(format!("Loterie inconnue : {other} (attendu : ssq, dlt)")),
        }
    }
}

/// Plage légale `[min, max]` et nombre de numéros tirés.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRule {
    pub min: u8,
    pub max: u8,
    pub count: usize,
}

impl DrawRule {
    pub fn contains(&self, number: u8) -> bool {
        number >= self.min && number <= self.max
    }

    fn check(&self, numbers: &[u8]) -> Result<()> {
        for &n in numbers {
            if !self.contains(n) {
                return Err(ReductionError::NumberOutOfRange {
                    number: n,
                    min: self.min,
                    max: self.max,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryShape {
    pub primary: DrawRule,
    pub secondary: DrawRule,
}

impl LotteryShape {
    /// Vrai si le pool permet au moins une grille complète.
    pub fn can_generate(&self, pool: &NumberPool) -> bool {
        self.primary.count > 0
            && self.secondary.count > 0
            && pool.primary.len() >= self.primary.count
            && pool.secondary.len() >= self.secondary.count
    }

    /// C(|primary|, k1) × C(|secondary|, k2), saturé à `u64::MAX`.
    pub fn combination_count(&self, pool: &NumberPool) -> u64 {
        if !self.can_generate(pool) {
            return 0;
        }
        binomial(pool.primary.len(), self.primary.count)
            .saturating_mul(binomial(pool.secondary.len(), self.secondary.count))
    }

    pub fn validate_pool(&self, pool: &NumberPool) -> Result<()> {
        self.primary.check(&pool.primary)?;
        self.secondary.check(&pool.secondary)
    }

    pub fn validate_combination(&self, combination: &Combination) -> Result<()> {
        if combination.primary.len() != self.primary.count {
            return Err(ReductionError::InvalidCombination(format!(
                "{} numéros principaux au lieu de {}",
                combination.primary.len(),
                self.primary.count
            )));
        }
        if combination.secondary.len() != self.secondary.count {
            return Err(ReductionError::InvalidCombination(format!(
                "{} numéros spéciaux au lieu de {}",
                combination.secondary.len(),
                self.secondary.count
            )));
        }
        if !is_strictly_ascending(&combination.primary) || !is_strictly_ascending(&combination.secondary) {
            return Err(ReductionError::InvalidCombination(format!(
                "numéros non triés ou en double : {combination}"
            )));
        }
        self.primary.check(&combination.primary)?;
        self.secondary.check(&combination.secondary)
    }
}

fn is_strictly_ascending(numbers: &[u8]) -> bool {
    numbers.windows(2).all(|w| w[0] < w[1])
}

/// Numéros candidats, canonicalisés : triés, sans doublon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberPool {
    pub primary: Vec<u8>,
    pub secondary: Vec<u8>,
}

impl NumberPool {
    pub fn new(primary: impl IntoIterator<Item = u8>, secondary: impl IntoIterator<Item = u8>) -> Self {
        let primary: BTreeSet<u8> = primary.into_iter().collect();
        let secondary: BTreeSet<u8> = secondary.into_iter().collect();
        Self {
            primary: primary.into_iter().collect(),
            secondary: secondary.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_empty() && self.secondary.is_empty()
    }
}

/// Une grille complète. Les deux listes sont triées par ordre croissant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combination {
    pub primary: Vec<u8>,
    pub secondary: Vec<u8>,
}

impl Combination {
    pub fn new(mut primary: Vec<u8>, mut secondary: Vec<u8>) -> Self {
        primary.sort_unstable();
        secondary.sort_unstable();
        Self { primary, secondary }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} + {}", format_numbers(&self.primary), format_numbers(&self.secondary))
    }
}

pub fn format_numbers(numbers: &[u8]) -> String {
    numbers
        .iter()
        .map(|n| format!("{:02}", n))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Forme de la loterie + paramètres des métriques numériques.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProfile")]
pub struct LotteryProfile {
    pub kind: Option<LotteryKind>,
    pub shape: LotteryShape,
    pub ac: AcConfig,
    pub bands: IntervalBands,
}

impl LotteryProfile {
    /// Profil personnalisé : les intervalles doivent partitionner la plage principale.
    pub fn new(shape: LotteryShape, ac: AcConfig, bands: IntervalBands) -> Result<Self> {
        bands.check_covers(shape.primary.min, shape.primary.max)?;
        if ac.min_optimal > ac.max_optimal {
            return Err(ReductionError::InvertedBounds {
                family: "ac_optimal",
                min: ac.min_optimal,
                max: ac.max_optimal,
            });
        }
        Ok(Self { kind: None, shape, ac, bands })
    }
}

#[derive(Deserialize)]
struct RawProfile {
    #[serde(default)]
    kind: Option<LotteryKind>,
    shape: LotteryShape,
    ac: AcConfig,
    bands: IntervalBands,
}

impl TryFrom<RawProfile> for LotteryProfile {
    type Error = ReductionError;

    fn try_from(raw: RawProfile) -> Result<Self> {
        let mut profile = Self::new(raw.shape, raw.ac, raw.bands)?;
        profile.kind = raw.kind;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_canonicalized() {
        let pool = NumberPool::new([9, 3, 3, 1], [2, 1, 2]);
        assert_eq!(pool.primary, vec![1, 3, 9]);
        assert_eq!(pool.secondary, vec![1, 2]);
    }

    #[test]
    fn test_can_generate() {
        let shape = LotteryKind::Ssq.shape();
        assert!(shape.can_generate(&NumberPool::new(1..=6, [1])));
        assert!(!shape.can_generate(&NumberPool::new(1..=5, [1])));
        assert!(!shape.can_generate(&NumberPool::new(1..=6, Vec::new())));
        assert!(!shape.can_generate(&NumberPool::default()));
    }

    #[test]
    fn test_zero_draw_count_generates_nothing() {
        let mut shape = LotteryKind::Dlt.shape();
        shape.secondary.count = 0;
        let pool = NumberPool::new(1..=10, 1..=5);
        assert!(!shape.can_generate(&pool));
        assert_eq!(shape.combination_count(&pool), 0);
    }

    #[test]
    fn test_combination_count() {
        let pool = NumberPool::new(1..=7, [1, 2]);
        assert_eq!(LotteryKind::Ssq.shape().combination_count(&pool), 14);

        let full = NumberPool::new(1..=33, 1..=16);
        assert_eq!(LotteryKind::Ssq.shape().combination_count(&full), 1_107_568 * 16);
    }

    #[test]
    fn test_validate_pool_out_of_range() {
        let shape = LotteryKind::Ssq.shape();
        assert!(shape.validate_pool(&NumberPool::new(1..=33, 1..=16)).is_ok());
        assert!(shape.validate_pool(&NumberPool::new([0, 1, 2], [1])).is_err());
        assert!(shape.validate_pool(&NumberPool::new(1..=6, [17])).is_err());
    }

    #[test]
    fn test_validate_combination() {
        let shape = LotteryKind::Dlt.shape();
        let ok = Combination::new(vec![3, 1, 20, 35, 7], vec![12, 2]);
        assert!(shape.validate_combination(&ok).is_ok());

        let short = Combination { primary: vec![1, 2, 3, 4], secondary: vec![1, 2] };
        assert!(shape.validate_combination(&short).is_err());

        let dup = Combination { primary: vec![1, 2, 2, 4, 5], secondary: vec![1, 2] };
        assert!(shape.validate_combination(&dup).is_err());

        let out = Combination { primary: vec![1, 2, 3, 4, 36], secondary: vec![1, 2] };
        assert!(shape.validate_combination(&out).is_err());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("SSQ".parse::<LotteryKind>().unwrap(), LotteryKind::Ssq);
        assert_eq!(" dlt ".parse::<LotteryKind>().unwrap(), LotteryKind::Dlt);
        assert!("euromillions".parse::<LotteryKind>().is_err());
    }

    #[test]
    fn test_combination_display() {
        let c = Combination::new(vec![8, 1, 12], vec![7]);
        assert_eq!(c.to_string(), "01 08 12 + 07");
    }

    #[test]
    fn test_custom_profile_rejects_bad_bands() {
        let shape = LotteryKind::Ssq.shape();
        let ac = AcConfig::for_kind(LotteryKind::Ssq);
        let bands = IntervalBands::for_kind(LotteryKind::Dlt);
        assert!(LotteryProfile::new(shape, ac, bands).is_err());
        assert!(LotteryProfile::new(shape, ac, IntervalBands::for_kind(LotteryKind::Ssq)).is_ok());
    }

    #[test]
    fn test_profile_serde_validates() {
        let ssq = LotteryKind::Ssq.profile();
        let json = serde_json::to_string(&ssq).unwrap();
        let back: LotteryProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ssq);

        // intervalles DLT (1-35) sur une plage SSQ (1-33)
        let mut value = serde_json::to_value(&ssq).unwrap();
        value["bands"] = serde_json::to_value(IntervalBands::for_kind(LotteryKind::Dlt)).unwrap();
        assert!(serde_json::from_value::<LotteryProfile>(value).is_err());

        let mut value = serde_json::to_value(&ssq).unwrap();
        value["ac"]["min_optimal"] = serde_json::json!(11);
        value["ac"]["max_optimal"] = serde_json::json!(3);
        assert!(serde_json::from_value::<LotteryProfile>(value).is_err());
    }
}
