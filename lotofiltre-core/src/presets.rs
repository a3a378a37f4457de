use std::collections::HashMap;
use std::sync::LazyLock;

use crate::error::{ReductionError, Result};
use crate::filter::{
    ConsecutiveFilter, FilterConfig, IntervalFilter, OddEvenFilter, RangeFilter, TailFilter,
};
use crate::models::LotteryKind;

#[derive(Debug, Clone)]
pub struct Preset {
    pub key: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub filter: FilterConfig,
}

/// Bornes d'un preset, dans l'ordre des familles.
struct Bounds {
    ac: (u32, u32),
    sum: (u32, u32),
    odd: (u32, u32),
    interval: IntervalFilter,
    span: (u32, u32),
    max_consecutive: u32,
    tails: (u32, u32),
}

fn filter_from(b: Bounds) -> FilterConfig {
    FilterConfig {
        ac_value: RangeFilter::between(b.ac.0, b.ac.1),
        sum_value: RangeFilter::between(b.sum.0, b.sum.1),
        odd_even_ratio: OddEvenFilter { enabled: true, min_odd: b.odd.0, max_odd: b.odd.1 },
        interval_distribution: b.interval,
        span: RangeFilter::between(b.span.0, b.span.1),
        consecutive: ConsecutiveFilter { enabled: true, max_count: b.max_consecutive },
        tail_numbers: TailFilter { enabled: true, min_unique: b.tails.0, max_unique: b.tails.1 },
    }
}

fn interval(require_balanced: bool, avoid_extreme: bool, min_balance_score: u8) -> IntervalFilter {
    IntervalFilter { enabled: true, require_balanced, avoid_extreme, min_balance_score }
}

fn ssq_presets() -> Vec<Preset> {
    vec![
        Preset {
            key: "conservative",
            display_name: "Prudent",
            description: "Bornes larges : écarte seulement les grilles les plus atypiques",
            filter: filter_from(Bounds {
                ac: (6, 10),
                sum: (70, 140),
                odd: (1, 5),
                interval: interval(false, true, 0),
                span: (15, 32),
                max_consecutive: 3,
                tails: (4, 6),
            }),
        },
        Preset {
            key: "balanced",
            display_name: "Équilibré",
            description: "Compromis entre réduction et couverture",
            filter: filter_from(Bounds {
                ac: (7, 10),
                sum: (80, 125),
                odd: (2, 4),
                interval: interval(false, true, 50),
                span: (18, 30),
                max_consecutive: 2,
                tails: (5, 6),
            }),
        },
        Preset {
            key: "aggressive",
            display_name: "Agressif",
            description: "Bornes serrées autour des valeurs typiques, forte réduction",
            filter: filter_from(Bounds {
                ac: (8, 10),
                sum: (90, 115),
                odd: (2, 4),
                interval: interval(true, true, 60),
                span: (20, 28),
                max_consecutive: 2,
                tails: (5, 6),
            }),
        },
    ]
}

fn dlt_presets() -> Vec<Preset> {
    vec![
        Preset {
            key: "conservative",
            display_name: "Prudent",
            description: "Bornes larges : écarte seulement les grilles les plus atypiques",
            filter: filter_from(Bounds {
                ac: (3, 6),
                sum: (50, 130),
                odd: (1, 4),
                interval: interval(false, true, 0),
                span: (12, 33),
                max_consecutive: 3,
                tails: (3, 5),
            }),
        },
        Preset {
            key: "balanced",
            display_name: "Équilibré",
            description: "Compromis entre réduction et couverture",
            filter: filter_from(Bounds {
                ac: (4, 6),
                sum: (60, 120),
                odd: (1, 4),
                interval: interval(false, true, 40),
                span: (15, 32),
                max_consecutive: 2,
                tails: (4, 5),
            }),
        },
        Preset {
            key: "aggressive",
            display_name: "Agressif",
            description: "Bornes serrées autour des valeurs typiques, forte réduction",
            filter: filter_from(Bounds {
                ac: (5, 6),
                sum: (70, 110),
                odd: (2, 3),
                interval: interval(true, true, 50),
                span: (18, 30),
                max_consecutive: 2,
                tails: (4, 5),
            }),
        },
    ]
}

static REGISTRY: LazyLock<HashMap<LotteryKind, Vec<Preset>>> = LazyLock::new(|| {
    HashMap::from([
        (LotteryKind::Ssq, ssq_presets()),
        (LotteryKind::Dlt, dlt_presets()),
    ])
});

pub fn presets(kind: LotteryKind) -> &'static [Preset] {
    REGISTRY.get(&kind).map(Vec::as_slice).unwrap_or(&[])
}

pub fn preset(kind: LotteryKind, key: &str) -> Result<&'static Preset> {
    presets(kind)
        .iter()
        .find(|p| p.key.eq_ignore_ascii_case(key.trim()))
        .ok_or_else(|| ReductionError::UnknownPreset { kind, key: key.to_string() })
}

/// Configuration personnalisée : toutes les familles présentes, désactivées
/// sauf celles déjà activées dans `base`.
pub fn create_custom_filter(base: Option<&FilterConfig>) -> FilterConfig {
    base.copied().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterFamily;

    #[test]
    fn test_three_presets_per_kind() {
        for kind in LotteryKind::ALL {
            let keys: Vec<&str> = presets(kind).iter().map(|p| p.key).collect();
            assert_eq!(keys, vec!["conservative", "balanced", "aggressive"], "{kind}");
        }
    }

    #[test]
    fn test_presets_are_valid() {
        for kind in LotteryKind::ALL {
            for p in presets(kind) {
                assert!(p.filter.validate().is_ok(), "{} / {} invalide", kind, p.key);
                assert_eq!(p.filter.enabled_families().len(), FilterFamily::ORDER.len());
            }
        }
    }

    #[test]
    fn test_presets_tighten() {
        for kind in LotteryKind::ALL {
            let all = presets(kind);
            for pair in all.windows(2) {
                let (loose, tight) = (&pair[0].filter, &pair[1].filter);
                assert!(tight.ac_value.min >= loose.ac_value.min);
                assert!(tight.sum_value.min >= loose.sum_value.min);
                assert!(tight.sum_value.max <= loose.sum_value.max);
                assert!(tight.span.max - tight.span.min <= loose.span.max - loose.span.min);
            }
        }
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(preset(LotteryKind::Dlt, "Balanced").unwrap().display_name, "Équilibré");
        let err = preset(LotteryKind::Ssq, "yolo").unwrap_err();
        assert!(matches!(err, ReductionError::UnknownPreset { kind: LotteryKind::Ssq, .. }));
    }

    #[test]
    fn test_create_custom_filter_defaults_disabled() {
        let custom = create_custom_filter(None);
        assert!(custom.enabled_families().is_empty());
        assert_eq!(custom, FilterConfig::default());
    }

    #[test]
    fn test_create_custom_filter_keeps_base() {
        let base = FilterConfig::builder().span(10, 20).build().unwrap();
        let custom = create_custom_filter(Some(&base));
        assert_eq!(custom.enabled_families(), vec![FilterFamily::Span]);
        assert!(!custom.ac_value.enabled);
    }
}
