#![no_std]

//! # Governor DAO
//!
//! A two-round governance engine. Holders of voting power propose arbitrary
//! contract calls, vote on them with weights read from an external
//! checkpointing ledger, and execute the call once it clears both rounds.
//!
//! - **Content-addressed proposals**: `id = keccak256(target, value, keccak256(calldata), description_hash)`
//! - **Snapshot weights**: round 1 counts weights at the creation ledger,
//!   round 2 at the selection ledger
//! - **Queue then finalize**: round 1 winners are `Queued`; the operator
//!   selects the best one as the epoch's final candidate, which then runs a
//!   second round
//! - **Derived state**: proposal state is recomputed from stored data and the
//!   current ledger on every read
//! - **Atomic execution**: a reverted target call leaves the proposal
//!   unexecuted
//!
//! Soroban applies transactions one at a time, which serialises every
//! mutation of a proposal and its tallies.

pub mod config;
pub mod events;
pub mod execution;
pub mod lifecycle;
pub mod power;
pub mod proposal;
pub mod voting;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

use soroban_sdk::{contract, contractimpl, Address, Bytes, BytesN, Env, String, Vec};

use config::GovernorConfig;
use lifecycle::{open_round, snapshot_block, state_of, FinalCandidate, ProposalState};
use proposal::Proposal;
use voting::{has_voted, load_tally, record_vote, Round, Tally, VoteRecord, VoteSupport};

// ── Error codes ───────────────────────────────────────────────────────────────

/// Governor error codes.
///
/// | Range   | Purpose                          |
/// |---------|----------------------------------|
/// | 1 – 9   | Lifecycle, config, input         |
/// | 10 – 19 | Proposal registry                |
/// | 20 – 29 | Vote casting                     |
/// | 30 – 39 | Final-candidate selection        |
/// | 40 – 49 | Execution authorisation          |
/// | 100+    | Failures raised by collaborators |
#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidConfig = 4,
    InvalidInput = 5,
    InvalidCalldata = 6,
    MissingValueToken = 7,
    DuplicateActiveProposal = 10,
    ProposalIdRetired = 11,
    ProposalNotFound = 12,
    InsufficientVotingPower = 13,
    VotingClosed = 20,
    AlreadyVoted = 21,
    TallyOverflow = 22,
    NoQueuedProposals = 30,
    FinalCandidateActive = 31,
    IdMismatch = 40,
    NotSucceeded = 41,
    AlreadyExecuted = 42,
    ExecutionReverted = 100,
}

impl ContractError {
    /// True when governance accepted the action but the target call failed.
    pub fn is_collaborator_failure(&self) -> bool {
        (*self as u32) >= 100
    }
}

// ── Contract ──────────────────────────────────────────────────────────────────

#[contract]
pub struct GovernorContract;

#[contractimpl]
impl GovernorContract {
    // ── Initialisation ────────────────────────────────────────────────────────

    /// Bootstrap the governor.
    ///
    /// * `admin`        - operator allowed to select final candidates and
    ///                    update the config.
    /// * `voting_power` - checkpointing ledger implementing
    ///                    [`power::VotingPowerInterface`].
    pub fn initialize(
        env: Env,
        admin: Address,
        voting_power: Address,
        config: GovernorConfig,
    ) -> Result<(), ContractError> {
        config::bootstrap(&env, &admin, &voting_power, &config)?;
        events::publish_initialized(&env, &admin, &voting_power, &config);
        Ok(())
    }

    pub fn update_config(
        env: Env,
        admin: Address,
        config: GovernorConfig,
    ) -> Result<(), ContractError> {
        config::require_initialized(&env)?;
        admin.require_auth();
        config::require_admin(&env, &admin)?;
        config.validate()?;

        config::store(&env, &config);
        events::publish_config_updated(&env, &config);
        Ok(())
    }

    // ── Proposal registry ─────────────────────────────────────────────────────

    /// Register a call for governance and open round 1.
    ///
    /// Fails with `DuplicateActiveProposal` while an identical proposal is
    /// still live, and with `ProposalIdRetired` once it reached a terminal
    /// state. Records are never deleted.
    pub fn propose(
        env: Env,
        proposer: Address,
        target: Address,
        value: i128,
        calldata: Bytes,
        description: String,
    ) -> Result<BytesN<32>, ContractError> {
        config::require_initialized(&env)?;
        proposer.require_auth();
        let config = config::load(&env)?;

        if value < 0 {
            return Err(ContractError::InvalidInput);
        }
        execution::decode_calldata(&env, &calldata)?;

        let description_hash = proposal::hash_description(&env, &description)?;
        let id = proposal::hash_proposal(&env, &target, value, &calldata, &description_hash);

        if let Some(existing) = proposal::load(&env, &id) {
            return Err(if state_of(&env, &existing).is_terminal() {
                ContractError::ProposalIdRetired
            } else {
                ContractError::DuplicateActiveProposal
            });
        }

        let now = env.ledger().sequence();
        if config.proposal_threshold > 0
            && power::weight_at(&env, &proposer, now)? < config.proposal_threshold
        {
            return Err(ContractError::InsufficientVotingPower);
        }

        let record = Proposal {
            id: id.clone(),
            proposer,
            target,
            value,
            calldata,
            description_hash,
            created_at_block: now,
            first_deadline_block: now.saturating_add(config.voting_window),
            approval_threshold: config.approval_threshold,
            queue_grace_window: config.queue_grace_window,
            selected_as_final: false,
            selected_at_block: None,
            second_deadline_block: None,
            execution_deadline_block: None,
            executed: false,
        };

        proposal::store(&env, &record);
        proposal::index(&env, &id);
        events::publish_proposal_created(&env, &record, &description);

        Ok(id)
    }

    // ── Voting ────────────────────────────────────────────────────────────────

    /// Cast a weighted ballot in whichever round is open. Returns the weight
    /// counted, which may be zero.
    pub fn cast_vote(
        env: Env,
        voter: Address,
        id: BytesN<32>,
        support: VoteSupport,
    ) -> Result<i128, ContractError> {
        config::require_initialized(&env)?;
        voter.require_auth();

        let proposal = proposal::load(&env, &id).ok_or(ContractError::ProposalNotFound)?;
        let now = env.ledger().sequence();

        let round = open_round(&proposal, now).ok_or(ContractError::VotingClosed)?;
        if has_voted(&env, &id, round, &voter) {
            return Err(ContractError::AlreadyVoted);
        }

        let snapshot = snapshot_block(&proposal, round).ok_or(ContractError::VotingClosed)?;
        let weight = power::weight_at(&env, &voter, snapshot)?;

        let record = VoteRecord {
            voter,
            support,
            weight,
            cast_at_block: now,
        };
        record_vote(&env, &id, round, &record)?;
        events::publish_vote_cast(&env, &id, round, &record);

        Ok(weight)
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────────

    /// Select the epoch's final candidate among all `Queued` proposals and
    /// open its second round. Operator only.
    pub fn select_final_candidate(
        env: Env,
        operator: Address,
    ) -> Result<BytesN<32>, ContractError> {
        config::require_initialized(&env)?;
        operator.require_auth();
        config::require_admin(&env, &operator)?;
        let config = config::load(&env)?;

        let (candidate, rate, second_deadline) = lifecycle::select_final(&env, &config)?;
        events::publish_final_selected(&env, &candidate, rate, second_deadline);

        Ok(candidate.id)
    }

    // ── Execution ─────────────────────────────────────────────────────────────

    /// Execute the succeeded final candidate. Anyone may call.
    ///
    /// The call parameters are re-hashed and must match the current final
    /// candidate exactly.
    pub fn execute(
        env: Env,
        target: Address,
        value: i128,
        calldata: Bytes,
        description_hash: BytesN<32>,
    ) -> Result<BytesN<32>, ContractError> {
        config::require_initialized(&env)?;
        let config = config::load(&env)?;

        let id = proposal::hash_proposal(&env, &target, value, &calldata, &description_hash);
        match lifecycle::final_candidate(&env) {
            Some(candidate) if candidate.id == id => {}
            _ => return Err(ContractError::IdMismatch),
        }

        let mut proposal = proposal::load(&env, &id).ok_or(ContractError::ProposalNotFound)?;
        if proposal.executed {
            return Err(ContractError::AlreadyExecuted);
        }
        if state_of(&env, &proposal) != ProposalState::Succeeded {
            return Err(ContractError::NotSucceeded);
        }

        proposal.executed = true;
        proposal::store(&env, &proposal);

        execution::dispatch(&env, &config, &proposal)?;
        events::publish_proposal_executed(&env, &proposal);

        Ok(id)
    }

    // ── View functions ────────────────────────────────────────────────────────

    pub fn state(env: Env, id: BytesN<32>) -> Result<ProposalState, ContractError> {
        config::load(&env)?;
        let proposal = proposal::load(&env, &id).ok_or(ContractError::ProposalNotFound)?;
        Ok(state_of(&env, &proposal))
    }

    pub fn get_proposal(env: Env, id: BytesN<32>) -> Result<Proposal, ContractError> {
        proposal::load(&env, &id).ok_or(ContractError::ProposalNotFound)
    }

    /// First deadline (end of round 1).
    pub fn proposal_deadline(env: Env, id: BytesN<32>) -> Result<u32, ContractError> {
        proposal::load(&env, &id)
            .map(|p| p.first_deadline_block)
            .ok_or(ContractError::ProposalNotFound)
    }

    /// Ledger whose weights count for `round`; `None` for round 2 of a
    /// proposal that was never selected.
    pub fn proposal_snapshot(
        env: Env,
        id: BytesN<32>,
        round: Round,
    ) -> Result<Option<u32>, ContractError> {
        let proposal = proposal::load(&env, &id).ok_or(ContractError::ProposalNotFound)?;
        Ok(snapshot_block(&proposal, round))
    }

    pub fn proposal_votes(env: Env, id: BytesN<32>, round: Round) -> Result<Tally, ContractError> {
        if !proposal::exists(&env, &id) {
            return Err(ContractError::ProposalNotFound);
        }
        Ok(load_tally(&env, &id, round))
    }

    /// Percentage of cast weight voting `For`, rounded down; `0` with no votes.
    pub fn approval_rate(env: Env, id: BytesN<32>, round: Round) -> Result<u32, ContractError> {
        Self::proposal_votes(env, id, round).map(|t| t.approval_rate())
    }

    pub fn get_vote(env: Env, id: BytesN<32>, round: Round, voter: Address) -> Option<VoteRecord> {
        voting::load_vote(&env, &id, round, &voter)
    }

    pub fn has_voted(env: Env, id: BytesN<32>, round: Round, voter: Address) -> bool {
        has_voted(&env, &id, round, &voter)
    }

    pub fn final_candidate(env: Env) -> Option<FinalCandidate> {
        lifecycle::final_candidate(&env)
    }

    pub fn current_epoch(env: Env) -> u32 {
        lifecycle::current_epoch(&env)
    }

    /// Every proposal ever created, in creation order.
    pub fn proposal_ids(env: Env) -> Vec<BytesN<32>> {
        proposal::all_ids(&env)
    }

    pub fn hash_proposal(
        env: Env,
        target: Address,
        value: i128,
        calldata: Bytes,
        description_hash: BytesN<32>,
    ) -> BytesN<32> {
        proposal::hash_proposal(&env, &target, value, &calldata, &description_hash)
    }

    pub fn hash_description(env: Env, description: String) -> Result<BytesN<32>, ContractError> {
        proposal::hash_description(&env, &description)
    }

    pub fn block_number(env: Env) -> u32 {
        env.ledger().sequence()
    }

    /// Weight `account` would vote with if a proposal were created now.
    pub fn vote_power(env: Env, account: Address) -> Result<i128, ContractError> {
        power::weight_at(&env, &account, env.ledger().sequence())
    }

    pub fn get_config(env: Env) -> Result<GovernorConfig, ContractError> {
        config::load(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        config::admin(&env)
    }

    pub fn voting_power_source(env: Env) -> Result<Address, ContractError> {
        config::voting_power(&env)
    }

    pub fn is_initialized(env: Env) -> bool {
        config::is_initialized(&env)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
