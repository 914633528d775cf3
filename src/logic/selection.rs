//! Automatic selection of the next four players from the waiting pool.
//!
//! Taking the literal top four starves fairness and variety, and scoring all
//! C(n,4) combinations is wasted work at interactive latencies, so the engine
//! runs a bounded randomized search: position-weighted anchors from the front
//! of the pool, random completions, a composite score and an early exit on a
//! clearly good result, with a deterministic fallback ladder when the random
//! phase comes up empty. Piggyback pairs are a hard constraint throughout: a
//! combination splitting a pair is discarded, never merely penalized.

use crate::logic::game_type::{classify_game_with_pair, pair_implied_type};
use crate::models::{
    GameHistory, GameType, PiggybackPair, Player, PlayerId, SessionActivity, SessionConfig,
};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

/// Anchors tried in the randomized phase.
const MAX_ANCHORS: usize = 3;
/// Random completions drawn per anchor.
const COMPLETIONS_PER_ANCHOR: usize = 20;
/// Sampling weights for the first four pool positions.
const ANCHOR_POSITION_WEIGHTS: [f64; 4] = [0.4, 0.3, 0.2, 0.1];
/// Fraction of the time budget the randomized phase may consume.
const SMART_PHASE_BUDGET: f64 = 0.7;

/// A total score above this ends the search immediately.
const EXCELLENT_TOTAL: f64 = 50.0;
/// A piggyback bonus above this ends the search immediately.
const EXCELLENT_PAIR_BONUS: f64 = 10.0;

const REPEAT_BASE: f64 = 50.0;
const REPEAT_GROUP_WEIGHT: f64 = 10.0;
const REPEAT_PAIR_WEIGHT: f64 = 2.0;
const BALANCE_WEIGHT: f64 = 2.0;
const COOLING_PENALTY: f64 = 5.0;
const VARIETY_BASE: f64 = 10.0;
const VARIETY_EXACT_PENALTY: f64 = 3.0;
const VARIETY_OVERLAP_PENALTY: f64 = 0.5;
const PAIR_BONUS: f64 = 15.0;
const PAIR_TYPE_BONUS: f64 = 10.0;

const CACHE_TTL: Duration = Duration::from_secs(30);
const CACHE_CAPACITY: usize = 512;

/// Pick the best four players from the waiting queue, or empty when no valid
/// combination exists. Only the first `pool_size` non-resting queue entries
/// are eligible. The returned players are in queue order.
pub fn select_next_game(
    queue: &[Player],
    pairs: &[PiggybackPair],
    history: &GameHistory,
    activity: &SessionActivity,
    config: &SessionConfig,
) -> Vec<Player> {
    let pool: Vec<&Player> = queue
        .iter()
        .filter(|p| !p.resting)
        .take(config.pool_size)
        .collect();
    if pool.len() < 4 {
        return Vec::new();
    }
    let pool_ids: Vec<PlayerId> = pool.iter().map(|p| p.id).collect();
    let ctx = SearchContext {
        pool,
        pool_ids,
        pairs: if config.piggyback_enabled { pairs.to_vec() } else { Vec::new() },
        history,
        activity,
        preferences_enabled: config.preferences_enabled,
    };

    let smart_deadline = Instant::now()
        + Duration::from_millis((config.selection_budget_ms as f64 * SMART_PHASE_BUDGET) as u64);
    let mut rng = rand::thread_rng();

    if let Some(combo) = ctx.smart_phase(smart_deadline, &mut rng) {
        return combo.into_iter().cloned().collect();
    }
    ctx.fallback_selection().into_iter().cloned().collect()
}

struct CandidateScore {
    total: f64,
    pair_bonus: f64,
}

/// Immutable inputs of one selection run.
struct SearchContext<'a> {
    pool: Vec<&'a Player>,
    pool_ids: Vec<PlayerId>,
    pairs: Vec<PiggybackPair>,
    history: &'a GameHistory,
    activity: &'a SessionActivity,
    preferences_enabled: bool,
}

impl<'a> SearchContext<'a> {
    /// Randomized phase: weighted anchors from the front of the pool, random
    /// completions, keep the best score seen, exit early on an excellent one.
    /// Returns the best combination found, or `None` when nothing scored
    /// before the anchors or the deadline ran out.
    fn smart_phase(&self, deadline: Instant, rng: &mut impl Rng) -> Option<Vec<&'a Player>> {
        let mut cache = RepeatPenaltyCache::new();
        let mut best: Option<(Vec<&'a Player>, f64)> = None;

        'anchors: for anchor_idx in self.pick_anchors(rng) {
            let anchor = self.pool[anchor_idx];

            // A piggybacked anchor always brings its partner along.
            let mut forced: Vec<&Player> = vec![anchor];
            if let Some(pair) = self.pairs.iter().find(|pair| pair.contains(anchor.id)) {
                if let Some(partner_id) = pair.other(anchor.id) {
                    match self.pool.iter().find(|p| p.id == partner_id) {
                        Some(&partner) => forced.push(partner),
                        // Partner outside the eligible pool: no completion
                        // with this anchor can satisfy pair integrity.
                        None => continue,
                    }
                }
            }
            let remaining: Vec<&Player> = self
                .pool
                .iter()
                .copied()
                .filter(|p| forced.iter().all(|f| f.id != p.id))
                .collect();
            let needed = 4 - forced.len();
            if remaining.len() < needed {
                continue;
            }

            for _ in 0..COMPLETIONS_PER_ANCHOR {
                if Instant::now() >= deadline {
                    break 'anchors;
                }
                let mut combo = forced.clone();
                combo.extend(remaining.choose_multiple(rng, needed).copied());
                self.sort_by_pool_position(&mut combo);

                let Some(score) = self.score_candidate(&combo, &mut cache) else {
                    continue;
                };
                if score.total > EXCELLENT_TOTAL || score.pair_bonus > EXCELLENT_PAIR_BONUS {
                    return Some(combo);
                }
                if best.as_ref().map_or(true, |(_, s)| score.total > *s) {
                    best = Some((combo, score.total));
                }
            }
        }
        best.map(|(combo, _)| combo)
    }

    /// Draw up to three distinct anchor indices from the pool's first four
    /// positions. Base weights favor the front of the queue; a high balance
    /// score raises a candidate's weight and a cooling period halves it.
    fn pick_anchors(&self, rng: &mut impl Rng) -> Vec<usize> {
        let count = self.pool.len().min(ANCHOR_POSITION_WEIGHTS.len());
        let cooling = self.activity.cooling_ids(&self.pool_ids);
        let mut weights: Vec<f64> = (0..count)
            .map(|i| {
                let mut w = ANCHOR_POSITION_WEIGHTS[i];
                w *= 1.0 + self.activity.balance_score(self.pool[i].id, &self.pool_ids) * 0.25;
                if cooling.contains(&self.pool[i].id) {
                    w *= 0.5;
                }
                w
            })
            .collect();

        let mut picked = Vec::new();
        while picked.len() < MAX_ANCHORS.min(count) {
            let total: f64 = weights.iter().sum();
            if total <= 0.0 {
                break;
            }
            let mut roll = rng.gen::<f64>() * total;
            let mut chosen = None;
            for (i, &w) in weights.iter().enumerate() {
                if w <= 0.0 {
                    continue;
                }
                chosen = Some(i);
                if roll < w {
                    break;
                }
                roll -= w;
            }
            match chosen {
                Some(i) => {
                    picked.push(i);
                    weights[i] = 0.0;
                }
                None => break,
            }
        }
        picked
    }

    /// Deterministic fallback ladder: pair-anchored combinations over the
    /// balance-sorted pool, then a sliding window over that order, then a
    /// sliding window over the original queue order. Pair integrity and full
    /// preference acceptance stay mandatory; an empty result is preferable to
    /// a split pair.
    fn fallback_selection(&self) -> Vec<&'a Player> {
        let cooling = self.activity.cooling_ids(&self.pool_ids);
        // Least-played first; cooling players pushed back among equals.
        let mut by_balance: Vec<&Player> = self.pool.clone();
        by_balance.sort_by(|a, b| {
            let sa = self.activity.balance_score(a.id, &self.pool_ids);
            let sb = self.activity.balance_score(b.id, &self.pool_ids);
            sb.partial_cmp(&sa)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| cooling.contains(&a.id).cmp(&cooling.contains(&b.id)))
        });

        for pair in &self.pairs {
            let (Some(&master), Some(&partner)) = (
                self.pool.iter().find(|p| p.id == pair.master),
                self.pool.iter().find(|p| p.id == pair.partner),
            ) else {
                continue;
            };
            let rest: Vec<&Player> = by_balance
                .iter()
                .copied()
                .filter(|p| !pair.contains(p.id))
                .collect();
            for i in 0..rest.len() {
                for j in (i + 1)..rest.len() {
                    let mut combo = vec![master, partner, rest[i], rest[j]];
                    self.sort_by_pool_position(&mut combo);
                    if self.valid_combination(&combo) {
                        return combo;
                    }
                }
            }
        }

        for window in by_balance.windows(4) {
            let mut combo = window.to_vec();
            self.sort_by_pool_position(&mut combo);
            if self.valid_combination(&combo) {
                return combo;
            }
        }
        for window in self.pool.windows(4) {
            let combo = window.to_vec();
            if self.valid_combination(&combo) {
                return combo;
            }
        }
        Vec::new()
    }

    /// Score a candidate. `None` means the candidate is invalid outright
    /// (splits a pair, or no game type works) and must be discarded, not
    /// penalized.
    fn score_candidate(
        &self,
        combo: &[&Player],
        cache: &mut RepeatPenaltyCache,
    ) -> Option<CandidateScore> {
        let ids: Vec<PlayerId> = combo.iter().map(|p| p.id).collect();
        if self.pairs.iter().any(|pair| pair.split_by(&ids)) {
            return None;
        }
        let contained: Vec<&PiggybackPair> = self
            .pairs
            .iter()
            .filter(|pair| ids.contains(&pair.master) && ids.contains(&pair.partner))
            .collect();
        let implied = contained.first().and_then(|&pair| implied_type_of(pair, combo));
        let game_type = classify_game_with_pair(combo, implied, self.preferences_enabled)?;

        let repeat_term = (REPEAT_BASE - cache.penalty(&ids, self.history)).max(0.0);

        let balance_bonus: f64 = ids
            .iter()
            .map(|&id| self.activity.balance_score(id, &self.pool_ids))
            .sum::<f64>()
            * BALANCE_WEIGHT;

        let cooling = self.activity.cooling_ids(&self.pool_ids);
        let cooling_penalty =
            COOLING_PENALTY * ids.iter().filter(|id| cooling.contains(id)).count() as f64;

        let mut variety = VARIETY_BASE;
        for player in combo {
            let others: HashSet<PlayerId> =
                ids.iter().copied().filter(|&id| id != player.id).collect();
            let mut repeated_exactly = false;
            for set in self.activity.recent_coplayer_sets(player.id) {
                if set.len() == others.len() && set.iter().all(|id| others.contains(id)) {
                    repeated_exactly = true;
                }
                variety -= VARIETY_OVERLAP_PENALTY
                    * set.iter().filter(|id| others.contains(id)).count() as f64;
            }
            if repeated_exactly {
                variety -= VARIETY_EXACT_PENALTY;
            }
        }
        let variety = variety.max(0.0);

        let mut pair_bonus = 0.0;
        for &pair in &contained {
            pair_bonus += PAIR_BONUS;
            if implied_type_of(pair, combo) == Some(game_type) {
                pair_bonus += PAIR_TYPE_BONUS;
            }
        }

        let total = repeat_term + balance_bonus + variety + pair_bonus - cooling_penalty;
        Some(CandidateScore { total, pair_bonus })
    }

    /// Hard validity: pair integrity plus a workable game type with full
    /// acceptance.
    fn valid_combination(&self, combo: &[&Player]) -> bool {
        let ids: Vec<PlayerId> = combo.iter().map(|p| p.id).collect();
        if self.pairs.iter().any(|pair| pair.split_by(&ids)) {
            return false;
        }
        let implied = self
            .pairs
            .iter()
            .find(|pair| ids.contains(&pair.master) && ids.contains(&pair.partner))
            .and_then(|pair| implied_type_of(pair, combo));
        classify_game_with_pair(combo, implied, self.preferences_enabled).is_some()
    }

    fn sort_by_pool_position(&self, combo: &mut [&Player]) {
        combo.sort_by_key(|p| self.pool_ids.iter().position(|&id| id == p.id));
    }
}

/// The game type a contained pair's genders imply, if both members are present.
fn implied_type_of(pair: &PiggybackPair, combo: &[&Player]) -> Option<GameType> {
    let master = combo.iter().find(|p| p.id == pair.master)?;
    let partner = combo.iter().find(|p| p.id == pair.partner)?;
    Some(pair_implied_type(master.gender, partner.gender))
}

/// Repeat penalties hit the history log once per distinct combination, not
/// once per scoring call: values are cached per sorted id tuple for a short
/// TTL. The cache is bounded; the oldest entry is evicted first.
struct RepeatPenaltyCache {
    entries: HashMap<Vec<PlayerId>, (f64, Instant)>,
    insertion_order: VecDeque<Vec<PlayerId>>,
}

impl RepeatPenaltyCache {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            insertion_order: VecDeque::new(),
        }
    }

    fn penalty(&mut self, ids: &[PlayerId], history: &GameHistory) -> f64 {
        let mut key = ids.to_vec();
        key.sort_unstable();
        if let Some(&(value, at)) = self.entries.get(&key) {
            if at.elapsed() < CACHE_TTL {
                return value;
            }
        }

        let mut penalty = REPEAT_GROUP_WEIGHT * history.count_together(&key) as f64;
        for i in 0..key.len() {
            for j in (i + 1)..key.len() {
                penalty += REPEAT_PAIR_WEIGHT * history.count_pair(key[i], key[j]) as f64;
            }
        }

        if self.entries.len() >= CACHE_CAPACITY {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        if self.entries.insert(key.clone(), (penalty, Instant::now())).is_none() {
            self.insertion_order.push_back(key);
        }
        penalty
    }
}
