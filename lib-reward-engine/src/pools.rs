//! Team-pooled budget allocation.
//!
//! When pooling is enabled, the eligible set is partitioned into the
//! configured teams plus one implicit pool for identities no team
//! claims. Fixed-budget teams are funded first, then the remainder is
//! split evenly per head across all computed-budget pool members, and
//! each pool distributes its own budget proportional to points.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use lib_reward_types::{IdentityId, RewardError, RewardResult, RewardTeam, TeamBudgetType};

use crate::allocation::split_pool;

/// One allocation bucket, built once per computation and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Pool {
    /// A configured team, members already narrowed to the eligible set
    Team {
        team: RewardTeam,
        members: Vec<IdentityId>,
    },
    /// Eligible identities no team claims; always computed-budget
    Unassigned { members: Vec<IdentityId> },
}

impl Pool {
    pub fn name(&self) -> &str {
        match self {
            Pool::Team { team, .. } => &team.name,
            Pool::Unassigned { .. } => "",
        }
    }

    pub fn members(&self) -> &[IdentityId] {
        match self {
            Pool::Team { members, .. } => members,
            Pool::Unassigned { members } => members,
        }
    }

    fn budget_type(&self) -> TeamBudgetType {
        match self {
            Pool::Team { team, .. } => team.budget_type,
            Pool::Unassigned { .. } => TeamBudgetType::Computed,
        }
    }
}

/// Result of a pooled allocation: per-identity amounts plus the pool
/// each identity was funded from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PooledAllocation {
    pub amounts: BTreeMap<IdentityId, Decimal>,
    pub pool_names: BTreeMap<IdentityId, String>,
}

/// Partition the eligible set into pools.
///
/// - team members outside the eligible set are dropped, not replaced
/// - members of disabled teams are excluded from pooled allocation
///   entirely
/// - an identity claimed by two teams is a configuration error
/// - leftover eligible identities form the implicit unassigned pool
pub fn build_pools(
    teams: &[RewardTeam],
    eligible: &BTreeMap<IdentityId, Decimal>,
) -> RewardResult<Vec<Pool>> {
    let mut claimed: BTreeSet<IdentityId> = BTreeSet::new();
    let mut pools = Vec::new();

    for team in teams {
        let members: Vec<IdentityId> = team
            .members
            .iter()
            .copied()
            .filter(|id| eligible.contains_key(id))
            .collect();
        for id in &members {
            if !claimed.insert(*id) {
                return Err(RewardError::DuplicateTeamMembership { identity_id: *id });
            }
        }
        if !team.disabled && !members.is_empty() {
            pools.push(Pool::Team {
                team: team.clone(),
                members,
            });
        }
    }

    let unassigned: Vec<IdentityId> = eligible
        .keys()
        .copied()
        .filter(|id| !claimed.contains(id))
        .collect();
    if !unassigned.is_empty() {
        pools.push(Pool::Unassigned { members: unassigned });
    }
    Ok(pools)
}

/// Distribute `total_budget` across the pools.
///
/// Fixed and per-member team budgets are funded first and must sum to
/// strictly less than `total_budget`. The remainder is split evenly
/// per head over all computed-pool members, then each pool distributes
/// its budget proportional to points. A pool with zero points or zero
/// budget contributes nothing, without error.
pub fn allocate_pooled(
    total_budget: Decimal,
    pools: &[Pool],
    eligible: &BTreeMap<IdentityId, Decimal>,
) -> RewardResult<PooledAllocation> {
    let mut allocation = PooledAllocation::default();
    let mut fixed_budget_sum = Decimal::ZERO;
    let mut computed_member_count: u64 = 0;

    for pool in pools {
        let pool_budget = match pool.budget_type() {
            TeamBudgetType::Fixed => pool_fixed_budget(pool),
            TeamBudgetType::FixedPerMember => {
                pool_fixed_budget(pool) * Decimal::from(pool.members().len() as u64)
            }
            TeamBudgetType::Computed => {
                computed_member_count += pool.members().len() as u64;
                continue;
            }
        };
        fixed_budget_sum += pool_budget;
        distribute_within(pool, pool_budget, eligible, &mut allocation);
    }

    if fixed_budget_sum >= total_budget {
        return Err(RewardError::FixedTeamBudgetsExceedTotal {
            fixed: fixed_budget_sum,
            total: total_budget,
        });
    }

    if computed_member_count > 0 {
        let per_head =
            (total_budget - fixed_budget_sum) / Decimal::from(computed_member_count);
        for pool in pools {
            if pool.budget_type() != TeamBudgetType::Computed {
                continue;
            }
            let pool_budget = per_head * Decimal::from(pool.members().len() as u64);
            distribute_within(pool, pool_budget, eligible, &mut allocation);
        }
    }
    Ok(allocation)
}

fn pool_fixed_budget(pool: &Pool) -> Decimal {
    match pool {
        Pool::Team { team, .. } => team.budget,
        Pool::Unassigned { .. } => Decimal::ZERO,
    }
}

/// Proportional-to-points split of one pool's budget, recording the
/// pool name for every funded member.
fn distribute_within(
    pool: &Pool,
    pool_budget: Decimal,
    eligible: &BTreeMap<IdentityId, Decimal>,
    allocation: &mut PooledAllocation,
) {
    let member_points: BTreeMap<IdentityId, Decimal> = pool
        .members()
        .iter()
        .filter_map(|id| eligible.get(id).map(|points| (*id, *points)))
        .collect();
    for (id, amount) in split_pool(pool_budget, &member_points) {
        allocation.amounts.insert(id, amount);
        allocation.pool_names.insert(id, pool.name().to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn team(
        id: u64,
        name: &str,
        budget_type: TeamBudgetType,
        budget: Decimal,
        members: &[IdentityId],
    ) -> RewardTeam {
        RewardTeam {
            id,
            name: name.into(),
            budget_type,
            budget,
            members: members.to_vec(),
            disabled: false,
        }
    }

    #[test]
    fn fixed_team_plus_computed_remainder() {
        // Team1 FIXED 40 with {X:10, Y:10}; Team2 COMPUTED with {Z};
        // total 100 -> X=20, Y=20, Z=60
        let eligible = BTreeMap::from([(1, dec!(10)), (2, dec!(10)), (3, dec!(10))]);
        let teams = vec![
            team(1, "one", TeamBudgetType::Fixed, dec!(40), &[1, 2]),
            team(2, "two", TeamBudgetType::Computed, dec!(0), &[3]),
        ];
        let pools = build_pools(&teams, &eligible).unwrap();
        let allocation = allocate_pooled(dec!(100), &pools, &eligible).unwrap();
        assert_eq!(allocation.amounts[&1], dec!(20));
        assert_eq!(allocation.amounts[&2], dec!(20));
        assert_eq!(allocation.amounts[&3], dec!(60));
        assert_eq!(allocation.pool_names[&1], "one");
        assert_eq!(allocation.pool_names[&3], "two");
    }

    #[test]
    fn unclaimed_identities_form_implicit_pool() {
        let eligible = BTreeMap::from([(1, dec!(10)), (2, dec!(30))]);
        let teams = vec![team(1, "one", TeamBudgetType::Fixed, dec!(40), &[1])];
        let pools = build_pools(&teams, &eligible).unwrap();
        assert_eq!(pools.len(), 2);
        assert_eq!(pools[1], Pool::Unassigned { members: vec![2] });

        let allocation = allocate_pooled(dec!(100), &pools, &eligible).unwrap();
        assert_eq!(allocation.amounts[&1], dec!(40));
        // remainder 60 over one computed head
        assert_eq!(allocation.amounts[&2], dec!(60));
        assert_eq!(allocation.pool_names[&2], "");
    }

    #[test]
    fn remainder_split_is_even_per_head_across_pools() {
        // two computed pools of unequal size share the remainder per
        // head, not per pool
        let eligible = BTreeMap::from([
            (1, dec!(10)),
            (2, dec!(10)),
            (3, dec!(10)),
            (4, dec!(10)),
        ]);
        let teams = vec![
            team(1, "big", TeamBudgetType::Computed, dec!(0), &[1, 2, 3]),
            team(2, "small", TeamBudgetType::Computed, dec!(0), &[4]),
        ];
        let pools = build_pools(&teams, &eligible).unwrap();
        let allocation = allocate_pooled(dec!(100), &pools, &eligible).unwrap();
        for id in 1..=4 {
            assert_eq!(allocation.amounts[&id], dec!(25));
        }
    }

    #[test]
    fn per_member_team_budget_scales_with_members() {
        let eligible = BTreeMap::from([(1, dec!(10)), (2, dec!(30)), (3, dec!(10))]);
        let teams = vec![
            team(1, "one", TeamBudgetType::FixedPerMember, dec!(10), &[1, 2]),
            team(2, "two", TeamBudgetType::Computed, dec!(0), &[3]),
        ];
        let pools = build_pools(&teams, &eligible).unwrap();
        let allocation = allocate_pooled(dec!(100), &pools, &eligible).unwrap();
        // team one pool = 10 * 2 = 20, split 1:3
        assert_eq!(allocation.amounts[&1], dec!(5));
        assert_eq!(allocation.amounts[&2], dec!(15));
        assert_eq!(allocation.amounts[&3], dec!(80));
    }

    #[test]
    fn ineligible_members_are_dropped_not_replaced() {
        let eligible = BTreeMap::from([(1, dec!(10))]);
        let teams = vec![team(1, "one", TeamBudgetType::Fixed, dec!(40), &[1, 99])];
        let pools = build_pools(&teams, &eligible).unwrap();
        assert_eq!(pools[0].members(), &[1]);
    }

    #[test]
    fn duplicate_membership_is_fatal() {
        let eligible = BTreeMap::from([(1, dec!(10)), (2, dec!(10))]);
        let teams = vec![
            team(1, "one", TeamBudgetType::Fixed, dec!(10), &[1, 2]),
            team(2, "two", TeamBudgetType::Computed, dec!(0), &[2]),
        ];
        let err = build_pools(&teams, &eligible).unwrap_err();
        assert_eq!(err, RewardError::DuplicateTeamMembership { identity_id: 2 });
    }

    #[test]
    fn disabled_team_members_are_excluded() {
        let eligible = BTreeMap::from([(1, dec!(10)), (2, dec!(10))]);
        let mut disabled = team(1, "off", TeamBudgetType::Fixed, dec!(40), &[1]);
        disabled.disabled = true;
        let pools = build_pools(&[disabled], &eligible).unwrap();
        // identity 1 is claimed but unfunded; identity 2 falls through
        assert_eq!(pools.len(), 1);
        assert_eq!(pools[0], Pool::Unassigned { members: vec![2] });
    }

    #[test]
    fn fixed_budgets_reaching_total_are_fatal() {
        let eligible = BTreeMap::from([(1, dec!(10)), (2, dec!(10))]);
        let teams = vec![
            team(1, "one", TeamBudgetType::Fixed, dec!(100), &[1]),
            team(2, "two", TeamBudgetType::Computed, dec!(0), &[2]),
        ];
        let pools = build_pools(&teams, &eligible).unwrap();
        let err = allocate_pooled(dec!(100), &pools, &eligible).unwrap_err();
        assert_eq!(
            err,
            RewardError::FixedTeamBudgetsExceedTotal { fixed: dec!(100), total: dec!(100) }
        );
    }

    #[test]
    fn zero_point_pool_contributes_nothing_without_error() {
        // all of team one's members fell out of eligibility
        let eligible = BTreeMap::from([(3, dec!(10))]);
        let teams = vec![
            team(1, "one", TeamBudgetType::Fixed, dec!(40), &[1, 2]),
            team(2, "two", TeamBudgetType::Computed, dec!(0), &[3]),
        ];
        let pools = build_pools(&teams, &eligible).unwrap();
        let allocation = allocate_pooled(dec!(100), &pools, &eligible).unwrap();
        assert_eq!(allocation.amounts.len(), 1);
        assert_eq!(allocation.amounts[&3], dec!(100));
    }

    #[test]
    fn pooled_allocation_conserves_total_budget() {
        let eligible = BTreeMap::from([
            (1, dec!(7)),
            (2, dec!(13)),
            (3, dec!(5)),
            (4, dec!(25)),
        ]);
        let teams = vec![
            team(1, "one", TeamBudgetType::Fixed, dec!(30), &[1, 2]),
            team(2, "two", TeamBudgetType::Computed, dec!(0), &[3]),
        ];
        let pools = build_pools(&teams, &eligible).unwrap();
        let allocation = allocate_pooled(dec!(100), &pools, &eligible).unwrap();
        let sum: Decimal = allocation.amounts.values().copied().sum();
        assert!((sum - dec!(100)).abs() < dec!(0.000001));
    }
}
