use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ac::ac_value;
use crate::error::{ReductionError, Result};
use crate::interval::{balance_score, format_ratio, is_balanced, is_extreme};
use crate::models::{Combination, LotteryProfile};
use crate::quality::quality_score;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterFamily {
    AcValue,
    SumValue,
    OddEvenRatio,
    IntervalDistribution,
    Span,
    Consecutive,
    TailNumbers,
}

impl FilterFamily {
    /// Ordre d'évaluation, fixe : la première famille en échec est celle rapportée.
    pub const ORDER: [FilterFamily; 7] = [
        FilterFamily::AcValue,
        FilterFamily::SumValue,
        FilterFamily::OddEvenRatio,
        FilterFamily::IntervalDistribution,
        FilterFamily::Span,
        FilterFamily::Consecutive,
        FilterFamily::TailNumbers,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FilterFamily::AcValue => "ac_value",
            FilterFamily::SumValue => "sum_value",
            FilterFamily::OddEvenRatio => "odd_even_ratio",
            FilterFamily::IntervalDistribution => "interval_distribution",
            FilterFamily::Span => "span",
            FilterFamily::Consecutive => "consecutive",
            FilterFamily::TailNumbers => "tail_numbers",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FilterFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterFamily::AcValue => write!(f, "Valeur AC"),
            FilterFamily::SumValue => write!(f, "Somme"),
            FilterFamily::OddEvenRatio => write!(f, "Pairs/impairs"),
            FilterFamily::IntervalDistribution => write!(f, "Intervalles"),
            FilterFamily::Span => write!(f, "Écart"),
            FilterFamily::Consecutive => write!(f, "Consécutifs"),
            FilterFamily::TailNumbers => write!(f, "Finales"),
        }
    }
}

// ════════════════════════════════════════════════════════════════
// Configuration
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeFilter {
    pub enabled: bool,
    pub min: u32,
    pub max: u32,
}

impl Default for RangeFilter {
    fn default() -> Self {
        Self { enabled: false, min: 0, max: u32::MAX }
    }
}

impl RangeFilter {
    pub fn between(min: u32, max: u32) -> Self {
        Self { enabled: true, min, max }
    }

    fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OddEvenFilter {
    pub enabled: bool,
    pub min_odd: u32,
    pub max_odd: u32,
}

impl Default for OddEvenFilter {
    fn default() -> Self {
        Self { enabled: false, min_odd: 0, max_odd: u32::MAX }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalFilter {
    pub enabled: bool,
    pub require_balanced: bool,
    pub avoid_extreme: bool,
    /// 0 = pas de minimum.
    pub min_balance_score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsecutiveFilter {
    pub enabled: bool,
    pub max_count: u32,
}

impl Default for ConsecutiveFilter {
    fn default() -> Self {
        Self { enabled: false, max_count: u32::MAX }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TailFilter {
    pub enabled: bool,
    pub min_unique: u32,
    pub max_unique: u32,
}

impl Default for TailFilter {
    fn default() -> Self {
        Self { enabled: false, min_unique: 0, max_unique: u32::MAX }
    }
}

/// Toutes les familles sont toujours présentes ; une famille désactivée laisse tout passer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub ac_value: RangeFilter,
    pub sum_value: RangeFilter,
    pub odd_even_ratio: OddEvenFilter,
    pub interval_distribution: IntervalFilter,
    pub span: RangeFilter,
    pub consecutive: ConsecutiveFilter,
    pub tail_numbers: TailFilter,
}

impl FilterConfig {
    pub fn builder() -> FilterConfigBuilder {
        FilterConfigBuilder::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: FilterConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn is_enabled(&self, family: FilterFamily) -> bool {
        match family {
            FilterFamily::AcValue => self.ac_value.enabled,
            FilterFamily::SumValue => self.sum_value.enabled,
            FilterFamily::OddEvenRatio => self.odd_even_ratio.enabled,
            FilterFamily::IntervalDistribution => self.interval_distribution.enabled,
            FilterFamily::Span => self.span.enabled,
            FilterFamily::Consecutive => self.consecutive.enabled,
            FilterFamily::TailNumbers => self.tail_numbers.enabled,
        }
    }

    pub fn enabled_families(&self) -> Vec<FilterFamily> {
        FilterFamily::ORDER
            .into_iter()
            .filter(|f| self.is_enabled(*f))
            .collect()
    }

    /// Rejette les bornes inversées (même pour une famille désactivée).
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            (FilterFamily::AcValue, self.ac_value.min, self.ac_value.max),
            (FilterFamily::SumValue, self.sum_value.min, self.sum_value.max),
            (FilterFamily::OddEvenRatio, self.odd_even_ratio.min_odd, self.odd_even_ratio.max_odd),
            (FilterFamily::Span, self.span.min, self.span.max),
            (FilterFamily::TailNumbers, self.tail_numbers.min_unique, self.tail_numbers.max_unique),
        ];
        for (family, min, max) in ranges {
            if min > max {
                return Err(ReductionError::InvertedBounds { family: family.name(), min, max });
            }
        }
        let score = self.interval_distribution.min_balance_score as u32;
        if score > 100 {
            return Err(ReductionError::InvertedBounds {
                family: FilterFamily::IntervalDistribution.name(),
                min: score,
                max: 100,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterConfigBuilder {
    config: FilterConfig,
}

impl FilterConfigBuilder {
    /// Part d'une configuration existante au lieu de tout désactivé.
    pub fn from_base(base: FilterConfig) -> Self {
        Self { config: base }
    }

    pub fn ac_value(mut self, min: u32, max: u32) -> Self {
        self.config.ac_value = RangeFilter::between(min, max);
        self
    }

    pub fn sum_value(mut self, min: u32, max: u32) -> Self {
        self.config.sum_value = RangeFilter::between(min, max);
        self
    }

    pub fn odd_count(mut self, min_odd: u32, max_odd: u32) -> Self {
        self.config.odd_even_ratio = OddEvenFilter { enabled: true, min_odd, max_odd };
        self
    }

    pub fn interval(mut self, require_balanced: bool, avoid_extreme: bool, min_balance_score: u8) -> Self {
        self.config.interval_distribution = IntervalFilter {
            enabled: true,
            require_balanced,
            avoid_extreme,
            min_balance_score,
        };
        self
    }

    pub fn span(mut self, min: u32, max: u32) -> Self {
        self.config.span = RangeFilter::between(min, max);
        self
    }

    pub fn consecutive(mut self, max_count: u32) -> Self {
        self.config.consecutive = ConsecutiveFilter { enabled: true, max_count };
        self
    }

    pub fn tail_numbers(mut self, min_unique: u32, max_unique: u32) -> Self {
        self.config.tail_numbers = TailFilter { enabled: true, min_unique, max_unique };
        self
    }

    pub fn disable(mut self, family: FilterFamily) -> Self {
        match family {
            FilterFamily::AcValue => self.config.ac_value.enabled = false,
            FilterFamily::SumValue => self.config.sum_value.enabled = false,
            FilterFamily::OddEvenRatio => self.config.odd_even_ratio.enabled = false,
            FilterFamily::IntervalDistribution => self.config.interval_distribution.enabled = false,
            FilterFamily::Span => self.config.span.enabled = false,
            FilterFamily::Consecutive => self.config.consecutive.enabled = false,
            FilterFamily::TailNumbers => self.config.tail_numbers.enabled = false,
        }
        self
    }

    pub fn build(self) -> Result<FilterConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// ════════════════════════════════════════════════════════════════
// Métriques sur les numéros principaux
// ════════════════════════════════════════════════════════════════

pub fn sum_of(numbers: &[u8]) -> u32 {
    numbers.iter().map(|&n| n as u32).sum()
}

pub fn odd_count(numbers: &[u8]) -> u32 {
    numbers.iter().filter(|&&n| n % 2 == 1).count() as u32
}

pub fn span_of(numbers: &[u8]) -> u32 {
    match (numbers.iter().min(), numbers.iter().max()) {
        (Some(&lo), Some(&hi)) => (hi - lo) as u32,
        _ => 0,
    }
}

/// Plus longue suite d'entiers adjacents (différence exactement 1).
pub fn longest_consecutive_run(numbers: &[u8]) -> u32 {
    if numbers.is_empty() {
        return 0;
    }
    let sorted;
    let numbers = if numbers.windows(2).all(|w| w[0] <= w[1]) {
        numbers
    } else {
        let mut copy = numbers.to_vec();
        copy.sort_unstable();
        sorted = copy;
        &sorted[..]
    };

    let mut longest = 1u32;
    let mut run = 1u32;
    for w in numbers.windows(2) {
        if w[1] as i16 - w[0] as i16 == 1 {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }
    longest
}

/// Nombre de chiffres des unités distincts.
pub fn unique_tails(numbers: &[u8]) -> u32 {
    let mut seen = [false; 10];
    for &n in numbers {
        seen[(n % 10) as usize] = true;
    }
    seen.iter().filter(|&&s| s).count() as u32
}

// ════════════════════════════════════════════════════════════════
// Évaluation
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterFailure {
    AcValue { value: u32, min: u32, max: u32 },
    SumValue { value: u32, min: u32, max: u32 },
    OddCount { value: u32, min: u32, max: u32 },
    Unbalanced { ratio: String },
    Extreme { ratio: String },
    BalanceScore { score: u8, min: u8, ratio: String },
    Span { value: u32, min: u32, max: u32 },
    Consecutive { run: u32, max: u32 },
    TailNumbers { value: u32, min: u32, max: u32 },
}

impl FilterFailure {
    pub fn family(&self) -> FilterFamily {
        match self {
            FilterFailure::AcValue { .. } => FilterFamily::AcValue,
            FilterFailure::SumValue { .. } => FilterFamily::SumValue,
            FilterFailure::OddCount { .. } => FilterFamily::OddEvenRatio,
            FilterFailure::Unbalanced { .. }
            | FilterFailure::Extreme { .. }
            | FilterFailure::BalanceScore { .. } => FilterFamily::IntervalDistribution,
            FilterFailure::Span { .. } => FilterFamily::Span,
            FilterFailure::Consecutive { .. } => FilterFamily::Consecutive,
            FilterFailure::TailNumbers { .. } => FilterFamily::TailNumbers,
        }
    }
}

impl fmt::Display for FilterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterFailure::AcValue { value, min, max } => {
                write!(f, "Valeur AC {value} hors de la plage [{min}, {max}]")
            }
            FilterFailure::SumValue { value, min, max } => {
                write!(f, "Somme {value} hors de la plage [{min}, {max}]")
            }
            FilterFailure::OddCount { value, min, max } => {
                write!(f, "{value} numéros impairs, attendu entre {min} et {max}")
            }
            FilterFailure::Unbalanced { ratio } => {
                write!(f, "Répartition {ratio} non équilibrée")
            }
            FilterFailure::Extreme { ratio } => {
                write!(f, "Répartition {ratio} extrême")
            }
            FilterFailure::BalanceScore { score, min, ratio } => {
                write!(f, "Score d'équilibre {score} < {min} (répartition {ratio})")
            }
            FilterFailure::Span { value, min, max } => {
                write!(f, "Écart {value} hors de la plage [{min}, {max}]")
            }
            FilterFailure::Consecutive { run, max } => {
                write!(f, "{run} numéros consécutifs, maximum autorisé {max}")
            }
            FilterFailure::TailNumbers { value, min, max } => {
                write!(f, "{value} finales distinctes, attendu entre {min} et {max}")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreMode {
    #[default]
    Never,
    WhenPassed,
    Always,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOutcome {
    pub passed: bool,
    pub failure: Option<FilterFailure>,
    pub quality_score: Option<u8>,
}

impl FilterOutcome {
    pub fn failure_reason(&self) -> Option<String> {
        self.failure.as_ref().map(|f| f.to_string())
    }
}

/// Première famille en échec sur les numéros principaux (triés), ou `None`.
pub fn first_failure(primary: &[u8], filter: &FilterConfig, profile: &LotteryProfile) -> Option<FilterFailure> {
    if filter.ac_value.enabled {
        let value = ac_value(primary);
        if !filter.ac_value.contains(value) {
            return Some(FilterFailure::AcValue { value, min: filter.ac_value.min, max: filter.ac_value.max });
        }
    }

    if filter.sum_value.enabled {
        let value = sum_of(primary);
        if !filter.sum_value.contains(value) {
            return Some(FilterFailure::SumValue { value, min: filter.sum_value.min, max: filter.sum_value.max });
        }
    }

    if filter.odd_even_ratio.enabled {
        let cfg = &filter.odd_even_ratio;
        let value = odd_count(primary);
        if value < cfg.min_odd || value > cfg.max_odd {
            return Some(FilterFailure::OddCount { value, min: cfg.min_odd, max: cfg.max_odd });
        }
    }

    if filter.interval_distribution.enabled {
        let cfg = &filter.interval_distribution;
        let n = primary.len();
        let counts = profile.bands.counts(primary);
        if cfg.require_balanced && !is_balanced(&counts, n) {
            return Some(FilterFailure::Unbalanced { ratio: format_ratio(&counts) });
        }
        if cfg.avoid_extreme && is_extreme(&counts, n) {
            return Some(FilterFailure::Extreme { ratio: format_ratio(&counts) });
        }
        if cfg.min_balance_score > 0 {
            let score = balance_score(&counts, n);
            if score < cfg.min_balance_score {
                return Some(FilterFailure::BalanceScore {
                    score,
                    min: cfg.min_balance_score,
                    ratio: format_ratio(&counts),
                });
            }
        }
    }

    if filter.span.enabled {
        let value = span_of(primary);
        if !filter.span.contains(value) {
            return Some(FilterFailure::Span { value, min: filter.span.min, max: filter.span.max });
        }
    }

    if filter.consecutive.enabled {
        let run = longest_consecutive_run(primary);
        if run > filter.consecutive.max_count {
            return Some(FilterFailure::Consecutive { run, max: filter.consecutive.max_count });
        }
    }

    if filter.tail_numbers.enabled {
        let cfg = &filter.tail_numbers;
        let value = unique_tails(primary);
        if value < cfg.min_unique || value > cfg.max_unique {
            return Some(FilterFailure::TailNumbers { value, min: cfg.min_unique, max: cfg.max_unique });
        }
    }

    None
}

pub fn evaluate(
    combination: &Combination,
    filter: &FilterConfig,
    profile: &LotteryProfile,
    mode: ScoreMode,
) -> FilterOutcome {
    let failure = first_failure(&combination.primary, filter, profile);
    let passed = failure.is_none();
    let quality_score = match mode {
        ScoreMode::Always => Some(quality_score(&combination.primary, profile)),
        ScoreMode::WhenPassed if passed => Some(quality_score(&combination.primary, profile)),
        _ => None,
    };
    FilterOutcome { passed, failure, quality_score }
}
