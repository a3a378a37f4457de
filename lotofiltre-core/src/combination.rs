use crate::error::{ReductionError, Result};
use crate::models::{Combination, LotteryShape, NumberPool};

/// C(n, k), saturé à `u64::MAX`. Vaut 0 si k > n, 1 si k == 0.
pub fn binomial(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut acc: u128 = 1;
    for i in 0..k {
        // acc × (n - i) / (i + 1) reste entier à chaque étape
        acc = acc * (n - i) as u128 / (i + 1) as u128;
        if acc > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    acc as u64
}

/// Sous-ensembles de taille k, en ordre lexicographique sur les éléments triés.
#[derive(Debug, Clone)]
pub struct KSubsets {
    items: Vec<u8>,
    indices: Vec<usize>,
    done: bool,
}

impl KSubsets {
    /// `items` est trié et dédoublonné ; k == 0 ou k > n ne produit rien.
    pub fn new(items: &[u8], k: usize) -> Self {
        let mut items = items.to_vec();
        items.sort_unstable();
        items.dedup();
        let done = k == 0 || k > items.len();
        Self {
            items,
            indices: (0..k).collect(),
            done,
        }
    }

    fn advance(&mut self) {
        let n = self.items.len();
        let k = self.indices.len();
        // position la plus à droite encore incrémentable
        let mut i = k;
        while i > 0 {
            i -= 1;
            if self.indices[i] < n - k + i {
                self.indices[i] += 1;
                for j in (i + 1)..k {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                return;
            }
        }
        self.done = true;
    }
}

impl Iterator for KSubsets {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let subset = self.indices.iter().map(|&i| self.items[i]).collect();
        self.advance();
        Some(subset)
    }
}

/// Produit cartésien paresseux : chaque sous-ensemble principal × chaque sous-ensemble spécial.
#[derive(Debug, Clone)]
pub struct Tickets {
    primary: KSubsets,
    secondary: Vec<Vec<u8>>,
    current: Option<Vec<u8>>,
    next_secondary: usize,
}

impl Tickets {
    pub fn new(pool: &NumberPool, shape: &LotteryShape) -> Self {
        let usable = shape.can_generate(pool);
        let (primary, secondary) = if usable {
            (
                KSubsets::new(&pool.primary, shape.primary.count),
                KSubsets::new(&pool.secondary, shape.secondary.count).collect(),
            )
        } else {
            (KSubsets::new(&[], 0), Vec::new())
        };
        Self {
            primary,
            secondary,
            current: None,
            next_secondary: 0,
        }
    }
}

impl Iterator for Tickets {
    type Item = Combination;

    fn next(&mut self) -> Option<Self::Item> {
        if self.secondary.is_empty() {
            return None;
        }
        if self.current.is_none() || self.next_secondary >= self.secondary.len() {
            self.current = Some(self.primary.next()?);
            self.next_secondary = 0;
        }
        let primary = self.current.clone()?;
        let secondary = self.secondary[self.next_secondary].clone();
        self.next_secondary += 1;
        Some(Combination { primary, secondary })
    }
}

/// Matérialise toutes les grilles du pool.
///
/// Le générateur n'a pas de plafond interne : l'appelant fournit `limit` et
/// reçoit `PoolTooLarge` au-delà. Un pool insuffisant donne une liste vide.
pub fn generate(pool: &NumberPool, shape: &LotteryShape, limit: u64) -> Result<Vec<Combination>> {
    let count = shape.combination_count(pool);
    if count > limit {
        log::warn!("Génération refusée : {count} combinaisons > plafond {limit}");
        return Err(ReductionError::PoolTooLarge { count, limit });
    }
    if count == 0 {
        log::warn!(
            "Pool insuffisant : {} principaux (requis {}), {} spéciaux (requis {})",
            pool.primary.len(),
            shape.primary.count,
            pool.secondary.len(),
            shape.secondary.count
        );
        return Ok(Vec::new());
    }
    let mut combinations = Vec::with_capacity(count as usize);
    combinations.extend(Tickets::new(pool, shape));
    Ok(combinations)
}
