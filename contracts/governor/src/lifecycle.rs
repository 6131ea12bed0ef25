//! Proposal state machine and final-candidate selection.
//!
//! State is never stored. It is derived on every read from the proposal
//! record, the two round tallies and the current ledger, so every party
//! re-deriving it from the same ledger gets the same answer and a terminal
//! state can never be undone by a config update.
//!
//! ```text
//! Pending ──► Defeated                       (round 1 below threshold)
//!    │
//!    └──► Queued ──► Expired                 (grace window elapsed, never selected)
//!            │
//!            └──► [select_final_candidate] ──► Queued (round 2)
//!                                                 ├──► Defeated
//!                                                 └──► Succeeded ──► Executed
//!                                                          │
//!                                                          └──► Expired (execution window elapsed)
//! ```

use soroban_sdk::{contracttype, symbol_short, BytesN, Env, Symbol, Vec};

use crate::config::GovernorConfig;
use crate::proposal::{self, Proposal};
use crate::voting::{load_tally, Round, Tally};
use crate::ContractError;

// ── Storage keys ─────────────────────────────────────────────────────────────

const FINAL: Symbol = symbol_short!("FINAL");
const EPOCH: Symbol = symbol_short!("EPOCH");

// ── Types ─────────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ProposalState {
    Pending = 0,
    Defeated = 1,
    Queued = 2,
    Succeeded = 3,
    Executed = 4,
    Expired = 5,
}

impl ProposalState {
    /// Terminal states can never change again and block re-proposal.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ProposalState::Defeated | ProposalState::Executed | ProposalState::Expired
        )
    }
}

/// The single proposal chosen to proceed to round 2 in the current epoch.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FinalCandidate {
    pub id: BytesN<32>,
    /// Incremented by every successful selection.
    pub epoch: u32,
    pub selected_at_block: u32,
}

// ── Derivation ───────────────────────────────────────────────────────────────

/// Classify a proposal at ledger `now`.
pub fn derive_state(proposal: &Proposal, first: &Tally, second: &Tally, now: u32) -> ProposalState {
    if proposal.executed {
        return ProposalState::Executed;
    }
    if now < proposal.first_deadline_block {
        return ProposalState::Pending;
    }

    if proposal.selected_as_final {
        if matches!(proposal.second_deadline_block, Some(deadline) if now < deadline) {
            return ProposalState::Queued;
        }
        if !second.passes(proposal.approval_threshold) {
            return ProposalState::Defeated;
        }
        return match proposal.execution_deadline_block {
            Some(expiry) if now >= expiry => ProposalState::Expired,
            _ => ProposalState::Succeeded,
        };
    }

    if !first.passes(proposal.approval_threshold) {
        return ProposalState::Defeated;
    }
    if proposal.queue_grace_window > 0
        && now >= proposal
            .first_deadline_block
            .saturating_add(proposal.queue_grace_window)
    {
        return ProposalState::Expired;
    }
    ProposalState::Queued
}

/// Load both tallies and derive the state at the current ledger.
pub(crate) fn state_of(env: &Env, proposal: &Proposal) -> ProposalState {
    let first = load_tally(env, &proposal.id, Round::First);
    let second = load_tally(env, &proposal.id, Round::Second);
    derive_state(proposal, &first, &second, env.ledger().sequence())
}

/// Round currently accepting ballots, if any.
pub fn open_round(proposal: &Proposal, now: u32) -> Option<Round> {
    if proposal.executed {
        return None;
    }
    if now < proposal.first_deadline_block {
        return Some(Round::First);
    }
    match proposal.second_deadline_block {
        Some(deadline) if proposal.selected_as_final && now < deadline => Some(Round::Second),
        _ => None,
    }
}

/// Ledger whose voting weights count for `round`.
pub fn snapshot_block(proposal: &Proposal, round: Round) -> Option<u32> {
    match round {
        Round::First => Some(proposal.created_at_block),
        Round::Second => proposal.selected_at_block,
    }
}

// ── Final candidate ──────────────────────────────────────────────────────────

pub(crate) fn final_candidate(env: &Env) -> Option<FinalCandidate> {
    env.storage().instance().get(&FINAL)
}

pub(crate) fn current_epoch(env: &Env) -> u32 {
    env.storage().instance().get(&EPOCH).unwrap_or(0u32)
}

/// Pick the queued proposal with the highest round 1 approval rate and open
/// its second round. Ties go to the earliest `created_at_block`, then to
/// creation order.
///
/// A new epoch may only start once the previous candidate is `Defeated`,
/// `Executed` or `Expired`.
///
/// Returns the new candidate, its round 1 approval rate and its second
/// deadline.
pub(crate) fn select_final(
    env: &Env,
    config: &GovernorConfig,
) -> Result<(FinalCandidate, u32, u32), ContractError> {
    let now = env.ledger().sequence();

    if let Some(current) = final_candidate(env) {
        if let Some(p) = proposal::load(env, &current.id) {
            if matches!(
                state_of(env, &p),
                ProposalState::Queued | ProposalState::Succeeded
            ) {
                return Err(ContractError::FinalCandidateActive);
            }
        }
    }

    let mut still_open: Vec<BytesN<32>> = Vec::new(env);
    let mut best: Option<(Proposal, u32)> = None;

    for id in proposal::open_ids(env).iter() {
        let Some(p) = proposal::load(env, &id) else {
            continue;
        };
        match state_of(env, &p) {
            ProposalState::Pending => still_open.push_back(id),
            ProposalState::Queued if !p.selected_as_final => {
                let rate = load_tally(env, &id, Round::First).approval_rate();
                let better = match &best {
                    None => true,
                    Some((current, best_rate)) => {
                        rate > *best_rate
                            || (rate == *best_rate
                                && p.created_at_block < current.created_at_block)
                    }
                };
                if better {
                    best = Some((p, rate));
                }
                still_open.push_back(id);
            }
            _ => {}
        }
    }

    let (mut chosen, rate) = best.ok_or(ContractError::NoQueuedProposals)?;

    if let Some(pos) = still_open.first_index_of(&chosen.id) {
        still_open.remove(pos);
    }
    proposal::set_open_ids(env, &still_open);

    let second_deadline = now.saturating_add(config.final_voting_window);
    chosen.selected_as_final = true;
    chosen.selected_at_block = Some(now);
    chosen.second_deadline_block = Some(second_deadline);
    chosen.execution_deadline_block =
        Some(second_deadline.saturating_add(config.execution_window));
    proposal::store(env, &chosen);

    let candidate = FinalCandidate {
        id: chosen.id.clone(),
        epoch: current_epoch(env).saturating_add(1),
        selected_at_block: now,
    };
    env.storage().instance().set(&EPOCH, &candidate.epoch);
    env.storage().instance().set(&FINAL, &candidate);

    Ok((candidate, rate, second_deadline))
}
