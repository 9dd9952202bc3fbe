//! Pair selection: which multiplication fact to ask next.
//!
//! Candidates for a stage are every pair up to `stage * 1.5` where at least
//! one factor stays within the stage. A target product is drawn from a
//! truncated normal centred on the middle of the product range, and the
//! candidate closest to it wins, with distances inflated for products that
//! were answered recently. Products in the recent-answers list are skipped
//! outright.

use std::collections::{HashMap, VecDeque};

use rand::Rng;

use crate::config::EngineConfig;
use crate::model::FactorPair;
use crate::sampling::sample_truncated_normal;

/// Build every candidate pair for `stage`.
///
/// Factors run from 1 to `floor(stage * (1 + stretch_mult))`; pairs where
/// both factors exceed `stage` are excluded.
pub fn build_candidates(stage: u32, stretch_mult: f64) -> Vec<FactorPair> {
    let max_factor = (stage as f64 * (1.0 + stretch_mult)).floor() as u32;
    let mut out = Vec::new();
    for a in 1..=max_factor {
        for b in 1..=max_factor {
            if a > stage && b > stage {
                continue;
            }
            out.push(FactorPair::new(a, b));
        }
    }
    out
}

/// Bounded FIFO of recently asked products.
#[derive(Debug, Clone)]
pub struct RecentAnswers {
    items: VecDeque<u32>,
    capacity: usize,
}

impl RecentAnswers {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a product, evicting the oldest entries beyond capacity.
    pub fn push(&mut self, product: u32) {
        self.items.push_back(product);
        while self.items.len() > self.capacity {
            self.items.pop_front();
        }
    }

    pub fn contains(&self, product: u32) -> bool {
        self.items.contains(&product)
    }

    /// Drop the oldest entry, returning it.
    pub fn evict_oldest(&mut self) -> Option<u32> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.items.iter().copied()
    }
}

/// Decaying per-product recency weights.
#[derive(Debug, Clone)]
pub struct ProductWeights {
    weights: HashMap<u32, f64>,
    decay: f64,
    floor: f64,
}

impl ProductWeights {
    pub fn new(decay: f64, floor: f64) -> Self {
        Self {
            weights: HashMap::new(),
            decay,
            floor,
        }
    }

    /// Weight of `product`, zero when absent.
    pub fn weight(&self, product: u32) -> f64 {
        self.weights.get(&product).copied().unwrap_or(0.0)
    }

    /// Decay every weight, drop the ones below the floor, then add one to
    /// `product`.
    pub fn decay_and_bump(&mut self, product: u32) {
        let decay = self.decay;
        let floor = self.floor;
        self.weights.retain(|_, w| {
            *w *= decay;
            *w >= floor
        });
        *self.weights.entry(product).or_insert(0.0) += 1.0;
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Chooses one pair out of a candidate set.
#[derive(Debug, Clone)]
pub struct PairSelector {
    sigma_scale: f64,
    weight_strength: f64,
    max_target_draws: u32,
    selection_safety: u32,
}

impl PairSelector {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            sigma_scale: config.sigma_scale,
            weight_strength: config.weight_strength,
            max_target_draws: config.max_target_draws,
            selection_safety: config.selection_safety,
        }
    }

    /// Pick a pair from `candidates`.
    ///
    /// Recent products are skipped; when that leaves nothing, the oldest
    /// recent entry is evicted and the scan repeated. Once the safety
    /// budget is spent the best pair is returned even if it is recent.
    /// The factors are swapped with probability one half. Returns `None`
    /// only for an empty candidate set.
    pub fn choose_pair<R: Rng + ?Sized>(
        &self,
        candidates: &[FactorPair],
        recent: &mut RecentAnswers,
        weights: &ProductWeights,
        rng: &mut R,
    ) -> Option<FactorPair> {
        let (min_p, max_p) = product_range(candidates)?;
        let (min_p, max_p) = (min_p as f64, max_p as f64);

        let mu = (min_p + max_p) / 2.0;
        let sigma = ((max_p - min_p) / self.sigma_scale).max(1e-6);
        let target = sample_truncated_normal(rng, min_p, max_p, mu, sigma, self.max_target_draws);

        let mut chosen = None;
        for _ in 0..self.selection_safety {
            chosen = self.best_candidate(candidates, target, weights, |p| recent.contains(p));
            if chosen.is_some() {
                break;
            }
            recent.evict_oldest();
        }

        let pair = match chosen {
            Some(pair) => pair,
            None => {
                tracing::warn!(
                    recent = recent.len(),
                    "selection safety exhausted, ignoring recent answers"
                );
                self.best_candidate(candidates, target, weights, |_| false)?
            }
        };

        tracing::trace!(target_product = target, product = pair.product, "pair chosen");

        Some(if rng.gen_bool(0.5) { pair.swapped() } else { pair })
    }

    fn best_candidate(
        &self,
        candidates: &[FactorPair],
        target: f64,
        weights: &ProductWeights,
        excluded: impl Fn(u32) -> bool,
    ) -> Option<FactorPair> {
        let mut best: Option<(f64, FactorPair)> = None;
        for pair in candidates {
            if excluded(pair.product) {
                continue;
            }
            let score = self.score(pair.product, target, weights);
            if best.map_or(true, |(best_score, _)| score < best_score) {
                best = Some((score, *pair));
            }
        }
        best.map(|(_, pair)| pair)
    }

    /// Distance to the target, inflated by the product's recency weight.
    pub fn score(&self, product: u32, target: f64, weights: &ProductWeights) -> f64 {
        (product as f64 - target).abs() * (1.0 + self.weight_strength * weights.weight(product))
    }
}

fn product_range(candidates: &[FactorPair]) -> Option<(u32, u32)> {
    let min = candidates.iter().map(|p| p.product).min()?;
    let max = candidates.iter().map(|p| p.product).max()?;
    Some((min, max))
}
