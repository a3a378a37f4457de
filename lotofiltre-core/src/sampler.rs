use chrono::Datelike;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::models::Combination;

/// Génère un seed déterministe basé sur la date du jour (YYYYMMDD).
pub fn date_seed() -> u64 {
    let today = chrono::Local::now().date_naive();
    let y = today.year() as u64;
    let m = today.month() as u64;
    let d = today.day() as u64;
    y * 10_000 + m * 100 + d
}

/// Échantillon aléatoire reproductible, dans l'ordre d'origine.
pub fn sample_combinations(combinations: &[Combination], count: usize, seed: u64) -> Vec<Combination> {
    if count >= combinations.len() {
        return combinations.to_vec();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = rand::seq::index::sample(&mut rng, combinations.len(), count).into_vec();
    indices.sort_unstable();
    indices.into_iter().map(|i| combinations[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combination::generate;
    use crate::models::{LotteryKind, NumberPool};

    fn combos() -> Vec<Combination> {
        let pool = NumberPool::new(1..=10, [1, 2]);
        generate(&pool, &LotteryKind::Ssq.shape(), u64::MAX).unwrap()
    }

    #[test]
    fn test_date_seed_format() {
        let seed = date_seed();
        let s = seed.to_string();
        assert_eq!(s.len(), 8, "seed devrait avoir 8 chiffres: {s}");
    }

    #[test]
    fn test_sample_size_and_order() {
        let all = combos();
        let sample = sample_combinations(&all, 20, 42);
        assert_eq!(sample.len(), 20);
        let positions: Vec<usize> = sample
            .iter()
            .map(|c| all.iter().position(|x| x == c).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "ordre d'origine non conservé");
    }

    #[test]
    fn test_sample_seed_determinism() {
        let all = combos();
        assert_eq!(sample_combinations(&all, 15, 7), sample_combinations(&all, 15, 7));
    }

    #[test]
    fn test_sample_larger_than_input() {
        let all = combos();
        assert_eq!(sample_combinations(&all, all.len() + 5, 1), all);
        assert!(sample_combinations(&[], 3, 1).is_empty());
    }
}
