#![allow(deprecated)] // events().publish migration to #[contractevent] tracked separately

//! Structured event publishing for the Governor contract.

use soroban_sdk::{symbol_short, Address, BytesN, Env, String};

use crate::config::GovernorConfig;
use crate::lifecycle::FinalCandidate;
use crate::proposal::Proposal;
use crate::voting::{Round, VoteRecord};

pub fn publish_initialized(env: &Env, admin: &Address, voting_power: &Address, config: &GovernorConfig) {
    env.events().publish(
        (symbol_short!("GOV_INIT"),),
        (admin.clone(), voting_power.clone(), config.clone()),
    );
}

pub fn publish_config_updated(env: &Env, config: &GovernorConfig) {
    env.events()
        .publish((symbol_short!("GOV_CFG"),), config.clone());
}

/// Carries every call-defining field: only hashes are kept in storage.
pub fn publish_proposal_created(env: &Env, proposal: &Proposal, description: &String) {
    env.events().publish(
        (symbol_short!("PROP_NEW"), proposal.id.clone()),
        (
            proposal.proposer.clone(),
            proposal.target.clone(),
            proposal.value,
            proposal.calldata.clone(),
            description.clone(),
            proposal.created_at_block,
            proposal.first_deadline_block,
        ),
    );
}

pub fn publish_vote_cast(env: &Env, id: &BytesN<32>, round: Round, record: &VoteRecord) {
    env.events().publish(
        (symbol_short!("VOTE"), id.clone(), round),
        (record.voter.clone(), record.support, record.weight),
    );
}

pub fn publish_final_selected(
    env: &Env,
    candidate: &FinalCandidate,
    first_round_rate: u32,
    second_deadline: u32,
) {
    env.events().publish(
        (symbol_short!("FINAL"), candidate.id.clone(), candidate.epoch),
        (first_round_rate, candidate.selected_at_block, second_deadline),
    );
}

pub fn publish_proposal_executed(env: &Env, proposal: &Proposal) {
    env.events().publish(
        (symbol_short!("PROP_EXE"), proposal.id.clone()),
        (proposal.target.clone(), proposal.value),
    );
}
