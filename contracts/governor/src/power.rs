//! Voting-power source consumed by the governor.
//!
//! The governor never computes balances. It asks an external checkpointing
//! ledger for an address's weight at a historical ledger. Delegation lives in
//! that contract: an account's own balance only counts once it has
//! delegated, to itself or to someone else.

use soroban_sdk::{contractclient, Address, Env};

use crate::config;
use crate::ContractError;

#[contractclient(name = "VotingPowerClient")]
pub trait VotingPowerInterface {
    /// Votes delegated to `account` as of `ledger` (inclusive).
    fn weight_at(env: Env, account: Address, ledger: u32) -> i128;

    /// Assign `delegator`'s weight to `delegatee`.
    fn delegate(env: Env, delegator: Address, delegatee: Address);
}

/// Weight of `account` at `ledger`. Negative answers count as zero.
pub(crate) fn weight_at(env: &Env, account: &Address, ledger: u32) -> Result<i128, ContractError> {
    let source = config::voting_power(env)?;
    let weight = VotingPowerClient::new(env, &source).weight_at(account, &ledger);
    Ok(weight.max(0))
}
