// Expected-value scoring engine
//
// Each reward value belongs to exactly one tier. Tiers match literal reward
// values, not a general formula, because the game applies a different
// payoff rule to each of them:
//
//   0, 1, -1        near-neutral, flat score
//   -4              coin flip between capped interest and a fixed loss
//   > 0, % 5 == 0   every occupant's gold is pooled with the reward and split
//   7, 11           a sole occupant keeps it, otherwise one occupant loses it
//   8               reward split evenly between occupants
//   anything else   reward diluted by congestion

use crate::config::{LeaderDefenseConfig, ScoringConfig};
use crate::opponents::Actor;
use crate::reach::Contention;

/// Payoff rule attached to a reward value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewardTier {
    Neutral,
    Gamble,
    Pool,
    SoleClaim,
    EvenSplit,
    Congested,
}

impl RewardTier {
    pub fn classify(reward: i32) -> RewardTier {
        match reward {
            0 | 1 | -1 => RewardTier::Neutral,
            -4 => RewardTier::Gamble,
            r if r > 0 && r % 5 == 0 => RewardTier::Pool,
            7 | 11 => RewardTier::SoleClaim,
            8 => RewardTier::EvenSplit,
            _ => RewardTier::Congested,
        }
    }
}

/// Everything the tier rules look at for one candidate cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreInputs {
    pub reward: i32,
    pub cost: i32,
    pub leftover: i32,
    pub contention: Contention,
}

/// Expected value of moving onto a cell under the tier rules
///
/// Pure: identical inputs always give an identical score.
pub fn score_cell(inputs: &ScoreInputs, config: &ScoringConfig) -> f64 {
    let c = &inputs.contention;
    let reward = f64::from(inputs.reward);
    let cost = f64::from(inputs.cost);
    let leftover = f64::from(inputs.leftover);
    let contenders = f64::from(c.reachable) + 1.0;

    match RewardTier::classify(inputs.reward) {
        RewardTier::Neutral => config.neutral_score,
        RewardTier::Gamble => {
            let win = (leftover * config.gamble_interest_rate).max(config.gamble_interest_cap);
            let expected =
                win * config.gamble_win_chance - (1.0 - config.gamble_win_chance) * config.gamble_loss;
            expected / contenders - cost + adjustment(inputs, config)
        }
        RewardTier::Pool => {
            let blended = c.total_opportunity as f64 * config.oppo_weight
                + c.total_risk as f64 * config.risk_weight
                + leftover;
            blended / contenders - leftover - cost
        }
        RewardTier::SoleClaim => {
            if c.reachable == 0 {
                reward
            } else {
                -reward / contenders + adjustment(inputs, config)
            }
        }
        RewardTier::EvenSplit => reward / contenders - cost + adjustment(inputs, config),
        RewardTier::Congested => {
            let congestion = f64::from(c.opportunity) * config.oppo_weight
                + f64::from(c.risk) * config.risk_weight
                + 1.0;
            reward / congestion - cost + adjustment(inputs, config)
        }
    }
}

/// Opportunity minus risk
///
/// Richer reachers are worth a share of their leftover, poorer ones cost a
/// share of ours. Zero when nobody else can reach the cell.
pub fn adjustment(inputs: &ScoreInputs, config: &ScoringConfig) -> f64 {
    let c = &inputs.contention;
    if c.reachable == 0 {
        return 0.0;
    }
    let reachable = f64::from(c.reachable);
    let risk = f64::from(c.risk);

    let oppo_profit =
        c.total_opportunity as f64 * config.adjustment_share / (reachable * (1.0 + risk));
    let risk_profit = f64::from(inputs.leftover) * config.adjustment_share * risk / reachable;
    oppo_profit - risk_profit
}

/// Whether this round should be played defensively
///
/// Triggers when we strictly out-gold every opponent, or when we are past
/// the round threshold and our gold has kept pace with `gold_per_round`.
/// A board without opponents never triggers it.
pub fn leader_defense_active(
    config: &LeaderDefenseConfig,
    round_id: u32,
    my_gold: i32,
    opponents: &[Actor],
) -> bool {
    if !config.enabled || opponents.is_empty() {
        return false;
    }
    let leads = opponents.iter().all(|o| my_gold > o.gold);
    let ahead_of_pace = round_id >= config.round_threshold
        && i64::from(my_gold) >= i64::from(round_id) * i64::from(config.gold_per_round);
    leads || ahead_of_pace
}

/// Defensive score, replacing the tier rules for the whole round
pub fn score_leader_defense(reward: i32, config: &LeaderDefenseConfig) -> f64 {
    match RewardTier::classify(reward) {
        RewardTier::Neutral => config.neutral_score,
        RewardTier::Gamble => config.gamble_score,
        _ => -f64::from(reward),
    }
}
