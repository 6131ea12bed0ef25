//! Weighted vote records and per-round tallies.
//!
//! Both structures are keyed by `(proposal, round)` so round 1 weight can
//! never leak into the round 2 tally. The tally is updated incrementally at
//! cast time and always equals the sum of the round's vote records.

use soroban_sdk::{contracttype, symbol_short, Address, BytesN, Env, Symbol};

use crate::ContractError;

// ── Storage key prefixes ─────────────────────────────────────────────────────

const VOTE: Symbol = symbol_short!("VOTE");
const TALLY: Symbol = symbol_short!("TALLY");

// TTL: ~60 days
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Types ─────────────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum VoteSupport {
    Against = 0,
    For = 1,
}

/// Voting phase a record or tally belongs to.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Round {
    /// Open from creation until the first deadline.
    First = 1,
    /// Open for the selected final candidate until the second deadline.
    Second = 2,
}

/// One voter's ballot in one round. The weight is captured at cast time
/// and never re-read.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VoteRecord {
    pub voter: Address,
    pub support: VoteSupport,
    pub weight: i128,
    pub cast_at_block: u32,
}

#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    pub for_votes: i128,
    pub against_votes: i128,
    /// Number of ballots, zero-weight ones included.
    pub voters: u32,
}

impl Tally {
    /// Combined weight of both sides. Never overflows: `add` rejects any
    /// ballot that would push the sum past `i128::MAX`.
    pub fn total(&self) -> i128 {
        self.for_votes.saturating_add(self.against_votes)
    }

    /// `for * 100 / (for + against)`, rounded down; `0` when nothing was cast.
    pub fn approval_rate(&self) -> u32 {
        let for_votes = self.for_votes.max(0) as u128;
        let total = for_votes + self.against_votes.max(0) as u128;
        if total == 0 {
            return 0;
        }
        scaled_ratio(for_votes, 100, total)
    }

    pub fn passes(&self, threshold: u32) -> bool {
        self.approval_rate() >= threshold
    }

    fn add(&mut self, support: VoteSupport, weight: i128) -> Result<(), ContractError> {
        let (for_votes, against_votes) = match support {
            VoteSupport::For => (self.for_votes.checked_add(weight), Some(self.against_votes)),
            VoteSupport::Against => (Some(self.for_votes), self.against_votes.checked_add(weight)),
        };
        let (Some(for_votes), Some(against_votes)) = (for_votes, against_votes) else {
            return Err(ContractError::TallyOverflow);
        };
        if for_votes.checked_add(against_votes).is_none() {
            return Err(ContractError::TallyOverflow);
        }

        self.for_votes = for_votes;
        self.against_votes = against_votes;
        self.voters = self.voters.saturating_add(1);
        Ok(())
    }
}

/// `floor(value * factor / total)` for `value <= total`, exact for any
/// `total` that fits in a `u128`.
///
/// Double-and-add over `factor`, keeping every multiple as
/// `quotient * total + remainder` with `remainder < total`.
fn scaled_ratio(value: u128, factor: u32, total: u128) -> u32 {
    if value >= total {
        return factor;
    }
    let (mut quotient, mut remainder) = (0u128, value);
    let (mut acc_quotient, mut acc_remainder) = (0u128, 0u128);
    let mut bits = factor;

    while bits > 0 {
        if bits & 1 == 1 {
            acc_quotient += quotient;
            if acc_remainder >= total - remainder {
                acc_remainder -= total - remainder;
                acc_quotient += 1;
            } else {
                acc_remainder += remainder;
            }
        }
        quotient *= 2;
        if remainder >= total - remainder {
            remainder -= total - remainder;
            quotient += 1;
        } else {
            remainder *= 2;
        }
        bits >>= 1;
    }

    acc_quotient as u32
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn vote_key(id: &BytesN<32>, round: Round, voter: &Address) -> (Symbol, BytesN<32>, Round, Address) {
    (VOTE, id.clone(), round, voter.clone())
}

fn tally_key(id: &BytesN<32>, round: Round) -> (Symbol, BytesN<32>, Round) {
    (TALLY, id.clone(), round)
}

pub(crate) fn has_voted(env: &Env, id: &BytesN<32>, round: Round, voter: &Address) -> bool {
    env.storage().persistent().has(&vote_key(id, round, voter))
}

pub(crate) fn load_vote(
    env: &Env,
    id: &BytesN<32>,
    round: Round,
    voter: &Address,
) -> Option<VoteRecord> {
    env.storage().persistent().get(&vote_key(id, round, voter))
}

pub(crate) fn load_tally(env: &Env, id: &BytesN<32>, round: Round) -> Tally {
    env.storage()
        .persistent()
        .get(&tally_key(id, round))
        .unwrap_or_default()
}

/// Persist `record` and fold its weight into the round's tally.
///
/// Callers must have checked `has_voted` first.
///
/// Fails with `TallyOverflow`, writing nothing, when the ballot would push
/// the round's combined weight past `i128::MAX`.
pub(crate) fn record_vote(
    env: &Env,
    id: &BytesN<32>,
    round: Round,
    record: &VoteRecord,
) -> Result<Tally, ContractError> {
    let mut tally = load_tally(env, id, round);
    tally.add(record.support, record.weight)?;

    let key = vote_key(id, round, &record.voter);
    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    let key = tally_key(id, round);
    env.storage().persistent().set(&key, &tally);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    Ok(tally)
}
