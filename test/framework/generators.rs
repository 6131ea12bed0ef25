//! # Property-Based Test Generators
//!
//! Composable `proptest` strategies for generating valid and adversarial
//! inputs across all governor operations.
//!
//! ## Design Decisions
//!
//! - Generators produce *semantic* values (weights, windows, action
//!   sequences), not raw bytes, so tests exercise real code paths rather than
//!   hitting calldata decoding errors.
//! - Edge-case weights are tuned: zero-weight voters and exact-threshold
//!   splits show up far more often than uniform sampling would produce them.
//! - Ledger advances are bounded so a whole sequence stays inside the
//!   default archival TTL of freshly registered contracts.

extern crate std;

use proptest::prelude::*;
use std::vec::Vec;

// ── Scalar Generators ────────────────────────────────────────────────────────

/// Strategy for voting weights, biased toward edge cases.
///
/// Distribution:
///   10% → 0 (holder without delegated power)
///   10% → 1
///   80% → uniform in [1, 10^12]
pub fn weight_strategy() -> impl Strategy<Value = i128> {
    prop_oneof![
        1 => Just(0i128),
        1 => Just(1i128),
        8 => (1i128..=1_000_000_000_000i128),
    ]
}

/// Strictly positive weights.
pub fn positive_weight_strategy() -> impl Strategy<Value = i128> {
    prop_oneof![
        1 => Just(1i128),
        9 => (1i128..=1_000_000_000_000i128),
    ]
}

/// Approval thresholds, including both ends of the valid range.
pub fn threshold_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        1 => Just(1u32),
        1 => Just(100u32),
        2 => Just(66u32),
        6 => (1u32..=100u32),
    ]
}

/// Round lengths in ledgers.
pub fn window_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        1 => Just(1u32),
        3 => (1u32..=50u32),
        6 => (50u32..=300u32),
    ]
}

/// Ledger advances between actions.
pub fn ledger_delta_strategy() -> impl Strategy<Value = u32> {
    prop_oneof![
        2 => Just(1u32),
        5 => (1u32..=60u32),
        3 => (60u32..=250u32),
    ]
}

/// Split of a fixed electorate into `(for, against)` weights.
pub fn vote_split_strategy() -> impl Strategy<Value = (i128, i128)> {
    (0i128..=1_000i128, 0i128..=1_000i128)
}

// ── Action Generators ────────────────────────────────────────────────────────

/// Enumeration of all governor actions for state exploration.
///
/// `user_index` and `proposal_index` select from the explorer's pools with
/// modular indexing, so every generated value is usable.
#[derive(Debug, Clone)]
pub enum GovernanceAction {
    /// Propose `set_ticket_fee(fee)`.
    Propose { user_index: usize, fee: u32 },
    /// Vote in whichever round is open.
    Vote {
        user_index: usize,
        proposal_index: usize,
        support: bool,
    },
    /// Change a voter's balance at the current ledger.
    SetWeight { user_index: usize, weight: i128 },
    /// Operator: select the epoch's final candidate.
    SelectFinal,
    /// Execute a proposal with its recorded parameters.
    Execute { proposal_index: usize },
    /// Execute a proposal with one parameter changed.
    ExecuteMutated {
        proposal_index: usize,
        mutation: Mutation,
    },
    /// Advance the ledger sequence.
    AdvanceLedgers { delta: u32 },
}

/// Strategy for individual governance actions.
///
/// Weights model realistic usage: ballots and ledger progress dominate,
/// proposals and operator actions are rarer.
pub fn governance_action_strategy(
    num_users: usize,
) -> impl Strategy<Value = GovernanceAction> {
    let user_idx = 0..num_users;

    prop_oneof![
        12 => (user_idx.clone(), 0u32..=1_000u32)
            .prop_map(|(u, fee)| GovernanceAction::Propose { user_index: u, fee }),
        30 => (user_idx.clone(), 0usize..8, any::<bool>()).prop_map(|(u, p, s)| {
            GovernanceAction::Vote { user_index: u, proposal_index: p, support: s }
        }),
        6 => (user_idx.clone(), weight_strategy())
            .prop_map(|(u, w)| GovernanceAction::SetWeight { user_index: u, weight: w }),
        10 => Just(GovernanceAction::SelectFinal),
        10 => (0usize..8).prop_map(|p| GovernanceAction::Execute { proposal_index: p }),
        4 => (0usize..8, mutation_strategy()).prop_map(|(p, m)| {
            GovernanceAction::ExecuteMutated { proposal_index: p, mutation: m }
        }),
        20 => ledger_delta_strategy().prop_map(|d| GovernanceAction::AdvanceLedgers { delta: d }),
    ]
}

/// Strategy for a sequence of governance actions.
///
/// Produces 1–`max_len` actions. Keep `max_len` at or below 15 so the total
/// ledger advance stays under the archival TTL.
pub fn governance_action_sequence(
    num_users: usize,
    max_len: usize,
) -> impl Strategy<Value = Vec<GovernanceAction>> {
    prop::collection::vec(governance_action_strategy(num_users), 1..=max_len)
}

// ── Config Generators ────────────────────────────────────────────────────────

/// Complete governor configuration for property-based initialisation tests.
#[derive(Debug, Clone)]
pub struct GovernanceSetup {
    pub voting_window: u32,
    pub final_voting_window: u32,
    pub approval_threshold: u32,
    pub initial_weights: Vec<i128>,
}

/// Strategy for complete governance setups with 1–6 voters.
pub fn governance_setup_strategy() -> impl Strategy<Value = GovernanceSetup> {
    let num_voters = 1usize..=6usize;
    (window_strategy(), window_strategy(), threshold_strategy(), num_voters).prop_flat_map(
        |(voting_window, final_voting_window, approval_threshold, num_voters)| {
            let weights = prop::collection::vec(weight_strategy(), num_voters..=num_voters);
            weights.prop_map(move |initial_weights| GovernanceSetup {
                voting_window,
                final_voting_window,
                approval_threshold,
                initial_weights,
            })
        },
    )
}

// ── Mutation Testing Support ─────────────────────────────────────────────────

/// A single change to the parameters passed to `execute`.
///
/// Every mutation must be caught by the id re-hash.
#[derive(Debug, Clone)]
pub enum Mutation {
    /// Add one to the transferred value.
    BumpValue,
    /// Point the call at another contract.
    SwapTarget,
    /// Append a byte to the calldata.
    ExtendCalldata,
    /// Flip the first byte of the description hash.
    CorruptDescriptionHash,
}

/// Strategy for selecting a mutation.
pub fn mutation_strategy() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        Just(Mutation::BumpValue),
        Just(Mutation::SwapTarget),
        Just(Mutation::ExtendCalldata),
        Just(Mutation::CorruptDescriptionHash),
    ]
}

/// Apply a mutation to a transferred value.
pub fn mutate_value(value: i128, mutation: &Mutation) -> i128 {
    match mutation {
        Mutation::BumpValue => value.saturating_add(1),
        _ => value,
    }
}

/// Apply a mutation to a 32-byte description hash.
pub fn mutate_hash(hash: [u8; 32], mutation: &Mutation) -> [u8; 32] {
    match mutation {
        Mutation::CorruptDescriptionHash => {
            let mut out = hash;
            out[0] ^= 0xff;
            out
        }
        _ => hash,
    }
}

// ── Historical Pattern Generators ────────────────────────────────────────────

/// Models common governance flows for exploration input.
///
/// Patterns assume a harness with round windows of 100 ledgers.
#[derive(Debug, Clone)]
pub enum GovernancePattern {
    /// One proposal passes both rounds and is executed.
    HappyPath,
    /// Majority votes against in round 1.
    RejectedEarly,
    /// Round 2 reverses a round 1 approval.
    ReversedInFinal,
    /// Two proposals compete for the final slot.
    CompetingProposals,
    /// Someone tries to execute with altered parameters.
    TamperedExecution,
}

/// Generate a concrete action sequence from a governance pattern.
pub fn pattern_to_actions(pattern: &GovernancePattern, num_users: usize) -> Vec<GovernanceAction> {
    let other = 1 % num_users.max(1);
    match pattern {
        GovernancePattern::HappyPath => {
            vec![
                GovernanceAction::Propose { user_index: 0, fee: 50 },
                GovernanceAction::Vote { user_index: 0, proposal_index: 0, support: true },
                GovernanceAction::Vote { user_index: other, proposal_index: 0, support: true },
                GovernanceAction::AdvanceLedgers { delta: 101 },
                GovernanceAction::SelectFinal,
                GovernanceAction::Vote { user_index: 0, proposal_index: 0, support: true },
                GovernanceAction::AdvanceLedgers { delta: 101 },
                GovernanceAction::Execute { proposal_index: 0 },
            ]
        }
        GovernancePattern::RejectedEarly => {
            vec![
                GovernanceAction::Propose { user_index: 0, fee: 10 },
                GovernanceAction::Vote { user_index: 0, proposal_index: 0, support: false },
                GovernanceAction::Vote { user_index: other, proposal_index: 0, support: false },
                GovernanceAction::AdvanceLedgers { delta: 101 },
                GovernanceAction::SelectFinal,
                GovernanceAction::Execute { proposal_index: 0 },
            ]
        }
        GovernancePattern::ReversedInFinal => {
            vec![
                GovernanceAction::Propose { user_index: 0, fee: 75 },
                GovernanceAction::Vote { user_index: 0, proposal_index: 0, support: true },
                GovernanceAction::AdvanceLedgers { delta: 101 },
                GovernanceAction::SelectFinal,
                GovernanceAction::Vote { user_index: 0, proposal_index: 0, support: false },
                GovernanceAction::AdvanceLedgers { delta: 101 },
                GovernanceAction::Execute { proposal_index: 0 },
            ]
        }
        GovernancePattern::CompetingProposals => {
            let mut actions = vec![
                GovernanceAction::Propose { user_index: 0, fee: 20 },
                GovernanceAction::Propose { user_index: other, fee: 30 },
            ];
            for u in 0..num_users.min(4) {
                actions.push(GovernanceAction::Vote { user_index: u, proposal_index: 0, support: true });
                actions.push(GovernanceAction::Vote { user_index: u, proposal_index: 1, support: u % 2 == 0 });
            }
            actions.push(GovernanceAction::AdvanceLedgers { delta: 101 });
            actions.push(GovernanceAction::SelectFinal);
            actions.push(GovernanceAction::SelectFinal);
            actions
        }
        GovernancePattern::TamperedExecution => {
            vec![
                GovernanceAction::Propose { user_index: 0, fee: 90 },
                GovernanceAction::Vote { user_index: 0, proposal_index: 0, support: true },
                GovernanceAction::AdvanceLedgers { delta: 101 },
                GovernanceAction::SelectFinal,
                GovernanceAction::Vote { user_index: 0, proposal_index: 0, support: true },
                GovernanceAction::AdvanceLedgers { delta: 101 },
                GovernanceAction::ExecuteMutated { proposal_index: 0, mutation: Mutation::ExtendCalldata },
                GovernanceAction::ExecuteMutated { proposal_index: 0, mutation: Mutation::BumpValue },
                GovernanceAction::Execute { proposal_index: 0 },
            ]
        }
    }
}

/// Strategy that selects a governance pattern.
pub fn governance_pattern_strategy() -> impl Strategy<Value = GovernancePattern> {
    prop_oneof![
        Just(GovernancePattern::HappyPath),
        Just(GovernancePattern::RejectedEarly),
        Just(GovernancePattern::ReversedInFinal),
        Just(GovernancePattern::CompetingProposals),
        Just(GovernancePattern::TamperedExecution),
    ]
}
