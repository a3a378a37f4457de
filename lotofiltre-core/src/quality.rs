use crate::ac::ac_value;
use crate::filter::{odd_count, span_of, sum_of, unique_tails};
use crate::interval::{is_balanced, max_deviation};
use crate::models::LotteryProfile;

pub const AC_WEIGHT: f64 = 20.0;
pub const ODD_EVEN_WEIGHT: f64 = 15.0;
pub const INTERVAL_WEIGHT: f64 = 20.0;
pub const SUM_WEIGHT: f64 = 15.0;
pub const SPAN_WEIGHT: f64 = 15.0;
pub const TAIL_WEIGHT: f64 = 15.0;

/// Détail du score qualité (total sur 100).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QualityScore {
    pub ac: f64,
    pub odd_even: f64,
    pub interval: f64,
    pub sum: f64,
    pub span: f64,
    pub tails: f64,
}

impl QualityScore {
    pub fn total(&self) -> u8 {
        let raw = self.ac + self.odd_even + self.interval + self.sum + self.span + self.tails;
        raw.round().clamp(0.0, 100.0) as u8
    }
}

/// Paliers décroissants : plein score jusqu'à `tiers[0]`, 2/3 jusqu'à `tiers[1]`, 1/3 jusqu'à `tiers[2]`.
fn tiered(distance: f64, tiers: [f64; 3], weight: f64) -> f64 {
    if distance <= tiers[0] {
        weight
    } else if distance <= tiers[1] {
        weight * 2.0 / 3.0
    } else if distance <= tiers[2] {
        weight / 3.0
    } else {
        0.0
    }
}

fn ac_points(value: u32, min_optimal: u32, max_optimal: u32) -> f64 {
    if value >= min_optimal && value <= max_optimal {
        AC_WEIGHT
    } else if value.checked_add(1) == Some(min_optimal) || max_optimal.checked_add(1) == Some(value) {
        AC_WEIGHT / 2.0
    } else {
        0.0
    }
}

fn interval_points(counts: &[usize; 3], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    if is_balanced(counts, n) {
        return INTERVAL_WEIGHT;
    }
    // -5 points par unité d'écart au-delà de la tolérance de 1
    let excess = max_deviation(counts, n) - 1.0;
    (INTERVAL_WEIGHT - 5.0 * excess).max(0.0)
}

fn tail_points(unique: u32, n: usize) -> f64 {
    let missing = (n as u32).saturating_sub(unique);
    match missing {
        0 | 1 => TAIL_WEIGHT,
        2 => TAIL_WEIGHT * 2.0 / 3.0,
        3 => TAIL_WEIGHT / 3.0,
        _ => 0.0,
    }
}

pub fn quality_breakdown(primary: &[u8], profile: &LotteryProfile) -> QualityScore {
    let n = primary.len();
    if n == 0 {
        return QualityScore::default();
    }
    let ac = &profile.ac;

    let odd_distance = (odd_count(primary) as f64 - n as f64 / 2.0).abs();
    let sum_distance = (sum_of(primary) as f64 - ac.ideal_sum as f64).abs();
    let span_distance = (span_of(primary) as f64 - ac.ideal_span as f64).abs();

    QualityScore {
        ac: ac_points(ac_value(primary), ac.min_optimal, ac.max_optimal),
        odd_even: tiered(odd_distance, [0.5, 1.5, 2.5], ODD_EVEN_WEIGHT),
        interval: interval_points(&profile.bands.counts(primary), n),
        sum: tiered(sum_distance, [10.0, 20.0, 35.0], SUM_WEIGHT),
        span: tiered(span_distance, [3.0, 6.0, 10.0], SPAN_WEIGHT),
        tails: tail_points(unique_tails(primary), n),
    }
}

pub fn quality_score(primary: &[u8], profile: &LotteryProfile) -> u8 {
    quality_breakdown(primary, profile).total()
}
