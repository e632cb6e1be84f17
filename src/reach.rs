// Reachability and cost model
//
// Movement cost is a scaled Manhattan distance, floor(1.5 * d), except that
// staying on the current cell costs STAY_COST. An actor can afford a cell
// when the cost does not exceed its current gold; the same rule applies to
// us and to opponents.

use crate::opponents::Actor;
use crate::types::Coord;

/// Cost of staying put for a round
pub const STAY_COST: i32 = 1;

/// Cost of moving from `origin` to `target`
pub fn move_cost(origin: Coord, target: Coord) -> i32 {
    if origin == target {
        return STAY_COST;
    }
    // floor(1.5 * d) without going through floats
    origin.manhattan(&target) * 3 / 2
}

/// Whether an actor holding `gold` can pay `cost`
pub fn can_afford(cost: i32, gold: i32) -> bool {
    cost <= gold
}

/// What reaching a cell looks like for one actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reach {
    pub cost: i32,
    /// Gold left after paying for the move
    pub leftover: i32,
}

impl Reach {
    /// `None` when the actor cannot afford the cell
    pub fn of(actor: &Actor, target: Coord) -> Option<Reach> {
        let cost = move_cost(actor.pos, target);
        if !can_afford(cost, actor.gold) {
            return None;
        }
        Some(Reach {
            cost,
            leftover: actor.gold - cost,
        })
    }
}

/// How many opponents can contest a cell and how they compare to us
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Contention {
    /// Opponents that can afford the cell
    pub reachable: u32,
    /// Reachers left richer than our own leftover
    pub opportunity: u32,
    /// Reachers left at or below our own leftover
    pub risk: u32,
    pub total_opportunity: i64,
    pub total_risk: i64,
}

impl Contention {
    /// Measures contention at `target` given our leftover after moving there
    pub fn measure(target: Coord, my_leftover: i32, opponents: &[Actor]) -> Contention {
        let mut contention = Contention::default();

        for reach in opponents.iter().filter_map(|o| Reach::of(o, target)) {
            contention.reachable += 1;
            if reach.leftover > my_leftover {
                contention.opportunity += 1;
                contention.total_opportunity += i64::from(reach.leftover);
            } else {
                contention.risk += 1;
                contention.total_risk += i64::from(reach.leftover);
            }
        }

        contention
    }
}
