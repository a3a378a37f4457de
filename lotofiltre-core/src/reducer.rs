use rayon::prelude::*;

use crate::combination::KSubsets;
use crate::error::{ReductionError, Result};
use crate::filter::{evaluate, first_failure, FilterConfig, FilterFamily, FilterOutcome, ScoreMode};
use crate::models::{Combination, LotteryProfile, NumberPool};
use crate::settings::EngineSettings;

/// Nombre de grilles retenues dans `FilterSummary::top_combinations`.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CostSavings {
    pub original_cost: u64,
    pub reduced_cost: u64,
    pub savings: u64,
}

impl CostSavings {
    pub fn compute(original_count: u64, reduced_count: u64, unit_price: u64) -> Self {
        let original_cost = original_count.saturating_mul(unit_price);
        let reduced_cost = reduced_count.saturating_mul(unit_price);
        Self {
            original_cost,
            reduced_cost,
            savings: original_cost.saturating_sub(reduced_cost),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterStats {
    pub total_checked: u64,
    pub passed_count: u64,
    /// Pourcentage, 0 si rien n'a été vérifié.
    pub pass_rate: f64,
    /// Rejets attribués à la première famille en échec, indexés par `FilterFamily::index`.
    pub rejected_by: [u64; 7],
}

impl FilterStats {
    fn finish(total_checked: u64, passed_count: u64, rejected_by: [u64; 7]) -> Self {
        Self {
            total_checked,
            passed_count,
            pass_rate: percent(passed_count, total_checked),
            rejected_by,
        }
    }

    pub fn rejections(&self) -> Vec<(FilterFamily, u64)> {
        FilterFamily::ORDER
            .into_iter()
            .map(|f| (f, self.rejected_by[f.index()]))
            .filter(|(_, n)| *n > 0)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReductionResult {
    pub original_count: u64,
    pub reduced_count: u64,
    /// round(100 × (original − reduced) / original).
    pub reduction_rate: u32,
    pub stats: FilterStats,
    pub combinations: Vec<Combination>,
    pub cost_savings: CostSavings,
}

impl ReductionResult {
    fn empty() -> Self {
        Self {
            original_count: 0,
            reduced_count: 0,
            reduction_rate: 0,
            stats: FilterStats::default(),
            combinations: Vec::new(),
            cost_savings: CostSavings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCombination {
    pub combination: Combination,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSummary {
    pub stats: FilterStats,
    /// Moyenne des scores des grilles retenues, 0 si aucune.
    pub average_score: f64,
    pub top_combinations: Vec<ScoredCombination>,
    /// Un résultat par grille d'entrée, dans le même ordre.
    pub outcomes: Vec<FilterOutcome>,
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

pub fn reduce(
    pool: &NumberPool,
    profile: &LotteryProfile,
    filter: &FilterConfig,
    settings: &EngineSettings,
) -> Result<ReductionResult> {
    reduce_with_progress(pool, profile, filter, settings, |_| {})
}

/// Réduction en une passe : génération et filtrage fusionnés.
///
/// Les prédicats ne portent que sur les numéros principaux : chaque
/// sous-ensemble principal est évalué une fois puis croisé avec les
/// sous-ensembles spéciaux s'il passe. `on_progress` reçoit le nombre
/// cumulé de grilles vérifiées.
pub fn reduce_with_progress(
    pool: &NumberPool,
    profile: &LotteryProfile,
    filter: &FilterConfig,
    settings: &EngineSettings,
    mut on_progress: impl FnMut(u64),
) -> Result<ReductionResult> {
    filter.validate()?;
    let shape = &profile.shape;
    shape.validate_pool(pool)?;

    let original_count = shape.combination_count(pool);
    if original_count > settings.max_combinations {
        log::warn!(
            "Réduction refusée : {} combinaisons > plafond {}",
            original_count,
            settings.max_combinations
        );
        return Err(ReductionError::PoolTooLarge {
            count: original_count,
            limit: settings.max_combinations,
        });
    }
    if original_count == 0 {
        log::warn!(
            "Pool insuffisant : {} principaux (requis {}), {} spéciaux (requis {})",
            pool.primary.len(),
            shape.primary.count,
            pool.secondary.len(),
            shape.secondary.count
        );
        return Ok(ReductionResult::empty());
    }

    log::debug!(
        "Réduction de {} combinaisons, filtres actifs : {:?}",
        original_count,
        filter.enabled_families()
    );

    let secondary: Vec<Vec<u8>> = KSubsets::new(&pool.secondary, shape.secondary.count).collect();
    let per_primary = secondary.len() as u64;

    let mut combinations = Vec::new();
    let mut rejected_by = [0u64; 7];
    let mut checked = 0u64;

    for primary in KSubsets::new(&pool.primary, shape.primary.count) {
        checked += per_primary;
        match first_failure(&primary, filter, profile) {
            Some(failure) => rejected_by[failure.family().index()] += per_primary,
            None => {
                for s in &secondary {
                    combinations.push(Combination {
                        primary: primary.clone(),
                        secondary: s.clone(),
                    });
                }
            }
        }
        on_progress(checked);
    }

    let reduced_count = combinations.len() as u64;
    let reduction_rate = percent(original_count - reduced_count, original_count).round() as u32;
    let stats = FilterStats::finish(checked, reduced_count, rejected_by);
    let cost_savings = CostSavings::compute(original_count, reduced_count, settings.unit_price);

    log::info!(
        "Réduction terminée : {} → {} grilles ({}%), économie {}",
        original_count,
        reduced_count,
        reduction_rate,
        cost_savings.savings
    );

    Ok(ReductionResult {
        original_count,
        reduced_count,
        reduction_rate,
        stats,
        combinations,
        cost_savings,
    })
}

/// Évalue une liste déjà matérialisée, avec score qualité, et classe les grilles retenues.
///
/// Le classement est stable : à score égal, l'ordre d'entrée est conservé.
pub fn apply_batch_filter(
    combinations: &[Combination],
    profile: &LotteryProfile,
    filter: &FilterConfig,
) -> Result<FilterSummary> {
    filter.validate()?;
    for c in combinations {
        profile.shape.validate_combination(c)?;
    }

    let outcomes: Vec<FilterOutcome> = combinations
        .par_iter()
        .map(|c| evaluate(c, filter, profile, ScoreMode::Always))
        .collect();

    let mut rejected_by = [0u64; 7];
    let mut passed: Vec<ScoredCombination> = Vec::new();
    for (combination, outcome) in combinations.iter().zip(&outcomes) {
        match &outcome.failure {
            Some(failure) => rejected_by[failure.family().index()] += 1,
            None => passed.push(ScoredCombination {
                combination: combination.clone(),
                score: outcome.quality_score.unwrap_or(0),
            }),
        }
    }

    let average_score = if passed.is_empty() {
        0.0
    } else {
        passed.iter().map(|s| s.score as f64).sum::<f64>() / passed.len() as f64
    };
    let stats = FilterStats::finish(combinations.len() as u64, passed.len() as u64, rejected_by);

    passed.sort_by(|a, b| b.score.cmp(&a.score));
    passed.truncate(TOP_N);

    log::debug!(
        "Filtrage par lot : {}/{} retenues, score moyen {:.1}",
        stats.passed_count,
        stats.total_checked,
        average_score
    );

    Ok(FilterSummary {
        stats,
        average_score,
        top_combinations: passed,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ac::ac_value;
    use crate::combination::generate;
    use crate::models::LotteryKind;
    use crate::presets::preset;

    fn settings() -> EngineSettings {
        EngineSettings::default()
    }

    #[test]
    fn test_scenario_conservative_preset() {
        let pool = NumberPool::new(1..=7, [1, 2]);
        let profile = LotteryKind::Ssq.profile();
        let conservative = preset(LotteryKind::Ssq, "conservative").unwrap();

        let all = generate(&pool, &profile.shape, u64::MAX).unwrap();
        assert_eq!(all.len(), 14);

        // 1..=7 : toutes les sous-grilles ont AC <= 1, rien ne passe
        let result = reduce(&pool, &profile, &conservative.filter, &settings()).unwrap();
        assert_eq!(result.original_count, 14);
        assert_eq!(result.reduced_count, 0);
        assert!(result.combinations.is_empty());
        assert_eq!(result.stats.rejected_by[FilterFamily::AcValue.index()], 14);
    }

    #[test]
    fn test_conservative_preset_survivors_within_bounds() {
        let pool = NumberPool::new([1, 3, 5, 8, 12, 17, 22, 26, 28], [4, 9]);
        let profile = LotteryKind::Ssq.profile();
        let conservative = preset(LotteryKind::Ssq, "conservative").unwrap();

        let result = reduce(&pool, &profile, &conservative.filter, &settings()).unwrap();
        assert_eq!(result.original_count, 168);
        assert_eq!(result.reduced_count, 122);
        assert_eq!(result.combinations.len(), 122);
        for c in &result.combinations {
            let ac = ac_value(&c.primary);
            assert!(
                ac >= conservative.filter.ac_value.min && ac <= conservative.filter.ac_value.max,
                "AC {ac} hors des bornes du preset pour {c}"
            );
        }
    }

    #[test]
    fn test_disabled_filter_keeps_everything() {
        let pool = NumberPool::new([2, 5, 9, 14, 17, 21, 26, 30], [3, 11]);
        let profile = LotteryKind::Ssq.profile();
        let result = reduce(&pool, &profile, &FilterConfig::default(), &settings()).unwrap();
        let generated = generate(&pool, &profile.shape, u64::MAX).unwrap();
        assert_eq!(result.reduced_count, generated.len() as u64);
        assert_eq!(result.combinations, generated);
        assert_eq!(result.reduction_rate, 0);
        assert_eq!(result.cost_savings.savings, 0);
    }

    #[test]
    fn test_filter_narrows() {
        let pool = NumberPool::new(1..=12, [4, 9]);
        let profile = LotteryKind::Ssq.profile();
        let open = reduce(&pool, &profile, &FilterConfig::default(), &settings()).unwrap();
        for key in ["conservative", "balanced", "aggressive"] {
            let p = preset(LotteryKind::Ssq, key).unwrap();
            let narrowed = reduce(&pool, &profile, &p.filter, &settings()).unwrap();
            assert!(narrowed.reduced_count <= open.reduced_count, "{key} élargit le résultat");
        }
    }

    #[test]
    fn test_impossible_filter_yields_empty_result() {
        let pool = NumberPool::new(1..=10, 1..=3);
        let profile = LotteryKind::Ssq.profile();
        let filter = FilterConfig::builder().sum_value(200, 300).build().unwrap();
        let result = reduce(&pool, &profile, &filter, &settings()).unwrap();
        assert_eq!(result.original_count, 210 * 3);
        assert_eq!(result.reduced_count, 0);
        assert!(result.combinations.is_empty());
        assert_eq!(result.reduction_rate, 100);
        assert_eq!(result.stats.pass_rate, 0.0);
        assert_eq!(result.stats.rejections(), vec![(FilterFamily::SumValue, 630)]);
    }

    #[test]
    fn test_cost_arithmetic() {
        let pool = NumberPool::new(1..=9, [1, 2, 3]);
        let profile = LotteryKind::Ssq.profile();
        let filter = FilterConfig::builder().consecutive(3).build().unwrap();
        let settings = EngineSettings { unit_price: 3, ..EngineSettings::default() };
        let result = reduce(&pool, &profile, &filter, &settings).unwrap();

        let cost = result.cost_savings;
        assert_eq!(cost.original_cost, result.original_count * 3);
        assert_eq!(cost.reduced_cost, result.reduced_count * 3);
        assert_eq!(cost.savings, cost.original_cost - cost.reduced_cost);
        assert_eq!(result.stats.total_checked, result.original_count);
        assert_eq!(result.stats.passed_count, result.reduced_count);
    }

    #[test]
    fn test_reduce_deterministic() {
        let pool = NumberPool::new([30, 1, 7, 12, 18, 22, 25, 33, 9], [5, 16]);
        let profile = LotteryKind::Ssq.profile();
        let filter = preset(LotteryKind::Ssq, "balanced").unwrap().filter;
        let a = reduce(&pool, &profile, &filter, &settings()).unwrap();
        let b = reduce(&pool, &profile, &filter, &settings()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_reduce_matches_per_ticket_evaluation() {
        let pool = NumberPool::new([3, 6, 11, 15, 20, 24, 29, 34], [2, 7, 10]);
        let profile = LotteryKind::Dlt.profile();
        let filter = preset(LotteryKind::Dlt, "balanced").unwrap().filter;
        let result = reduce(&pool, &profile, &filter, &settings()).unwrap();

        let expected: Vec<Combination> = generate(&pool, &profile.shape, u64::MAX)
            .unwrap()
            .into_iter()
            .filter(|c| evaluate(c, &filter, &profile, ScoreMode::Never).passed)
            .collect();
        assert_eq!(result.combinations, expected);
    }

    #[test]
    fn test_insufficient_or_empty_pool() {
        let profile = LotteryKind::Ssq.profile();
        for pool in [NumberPool::default(), NumberPool::new(1..=5, [1])] {
            let result = reduce(&pool, &profile, &FilterConfig::default(), &settings()).unwrap();
            assert_eq!(result.original_count, 0);
            assert_eq!(result.reduced_count, 0);
            assert_eq!(result.reduction_rate, 0);
            assert_eq!(result.stats.pass_rate, 0.0);
            assert_eq!(result.cost_savings, CostSavings::default());
        }
    }

    #[test]
    fn test_pool_too_large() {
        let pool = NumberPool::new(1..=33, 1..=16);
        let profile = LotteryKind::Ssq.profile();
        let err = reduce(&pool, &profile, &FilterConfig::default(), &settings()).unwrap_err();
        assert!(matches!(err, ReductionError::PoolTooLarge { limit: 5_000_000, .. }));
    }

    #[test]
    fn test_out_of_range_pool_rejected() {
        let pool = NumberPool::new([1, 2, 3, 4, 5, 40], [1]);
        let profile = LotteryKind::Ssq.profile();
        let err = reduce(&pool, &profile, &FilterConfig::default(), &settings()).unwrap_err();
        assert!(matches!(err, ReductionError::NumberOutOfRange { number: 40, .. }));
    }

    #[test]
    fn test_progress_reaches_total() {
        let pool = NumberPool::new(1..=8, [1, 2]);
        let profile = LotteryKind::Ssq.profile();
        let mut last = 0;
        let result = reduce_with_progress(&pool, &profile, &FilterConfig::default(), &settings(), |n| {
            assert!(n > last);
            last = n;
        })
        .unwrap();
        assert_eq!(last, result.original_count);
    }

    #[test]
    fn test_batch_filter_top_and_average() {
        let pool = NumberPool::new(1..=12, [1]);
        let profile = LotteryKind::Ssq.profile();
        let combos = generate(&pool, &profile.shape, u64::MAX).unwrap();
        let filter = FilterConfig::builder().consecutive(2).build().unwrap();
        let summary = apply_batch_filter(&combos, &profile, &filter).unwrap();

        assert_eq!(summary.stats.total_checked, combos.len() as u64);
        assert_eq!(summary.outcomes.len(), combos.len());
        assert!(summary.top_combinations.len() <= TOP_N);
        assert!(summary
            .top_combinations
            .windows(2)
            .all(|w| w[0].score >= w[1].score));
        assert!(summary.average_score > 0.0 && summary.average_score <= 100.0);
        let passed = summary.outcomes.iter().filter(|o| o.passed).count() as u64;
        assert_eq!(passed, summary.stats.passed_count);
    }

    #[test]
    fn test_batch_filter_ties_keep_input_order() {
        let profile = LotteryKind::Ssq.profile();
        // même numéros principaux → même score
        let combos: Vec<Combination> = (1..=12)
            .map(|s| Combination::new(vec![1, 3, 17, 22, 26, 28], vec![s]))
            .collect();
        let summary = apply_batch_filter(&combos, &profile, &FilterConfig::default()).unwrap();
        assert_eq!(summary.top_combinations.len(), TOP_N);
        let order: Vec<u8> = summary.top_combinations.iter().map(|s| s.combination.secondary[0]).collect();
        assert_eq!(order, (1..=10).collect::<Vec<u8>>());
    }

    #[test]
    fn test_batch_filter_empty_input() {
        let profile = LotteryKind::Dlt.profile();
        let summary = apply_batch_filter(&[], &profile, &FilterConfig::default()).unwrap();
        assert_eq!(summary.stats.total_checked, 0);
        assert_eq!(summary.stats.pass_rate, 0.0);
        assert_eq!(summary.average_score, 0.0);
        assert!(summary.top_combinations.is_empty());
    }

    #[test]
    fn test_batch_filter_rejects_malformed_combination() {
        let profile = LotteryKind::Dlt.profile();
        let bad = vec![Combination { primary: vec![1, 2, 3], secondary: vec![1, 2] }];
        assert!(apply_batch_filter(&bad, &profile, &FilterConfig::default()).is_err());
    }

    #[test]
    fn test_cost_savings_never_negative() {
        let cost = CostSavings::compute(10, 10, 2);
        assert_eq!(cost.savings, 0);
        let cost = CostSavings::compute(100, 37, 2);
        assert_eq!(cost, CostSavings { original_cost: 200, reduced_cost: 74, savings: 126 });
    }
}
