//! Governor configuration: voting windows, approval threshold and the
//! addresses of the external collaborators.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol};

use crate::ContractError;

// ── Storage keys ─────────────────────────────────────────────────────────────

const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");
const CONFIG: Symbol = symbol_short!("CONFIG");
const VOTING_POWER: Symbol = symbol_short!("VP_SRC");

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

// ── Defaults ─────────────────────────────────────────────────────────────────

/// Round 1 length in ledgers.
pub const DEFAULT_VOTING_WINDOW: u32 = 1_000;
/// Round 2 length in ledgers.
pub const DEFAULT_FINAL_VOTING_WINDOW: u32 = 1_000;
/// Inclusive approval percentage required in both rounds.
pub const DEFAULT_APPROVAL_THRESHOLD: u32 = 66;
/// Ledgers after the second deadline during which a succeeded candidate can
/// be executed.
pub const DEFAULT_EXECUTION_WINDOW: u32 = 1_000;

/// Tunable governance parameters.
///
/// Every value that decides a proposal's fate is copied into the proposal
/// when it is created or selected, so a config update only affects
/// proposals created afterwards.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GovernorConfig {
    /// Ledgers between proposal creation and the first deadline.
    pub voting_window: u32,
    /// Ledgers between final-candidate selection and the second deadline.
    pub final_voting_window: u32,
    /// Percentage (1..=100) of cast weight that must be `For`. Inclusive.
    pub approval_threshold: u32,
    /// Ledgers after the first deadline after which an unselected queued
    /// proposal is `Expired`. Zero disables expiry.
    pub queue_grace_window: u32,
    /// Ledgers after the second deadline after which an unexecuted succeeded
    /// candidate is `Expired` and stops blocking the next selection.
    pub execution_window: u32,
    /// Minimum weight a proposer must hold at the current ledger.
    pub proposal_threshold: i128,
    /// Token transferred to the target when a proposal carries `value > 0`.
    pub value_token: Option<Address>,
}

impl GovernorConfig {
    /// Defaults matching the deployed DAO: 1 000-ledger rounds, 66 % approval,
    /// no queue expiry, a 1 000-ledger execution window, no proposer
    /// threshold, no value token.
    pub fn standard() -> Self {
        Self {
            voting_window: DEFAULT_VOTING_WINDOW,
            final_voting_window: DEFAULT_FINAL_VOTING_WINDOW,
            approval_threshold: DEFAULT_APPROVAL_THRESHOLD,
            queue_grace_window: 0,
            execution_window: DEFAULT_EXECUTION_WINDOW,
            proposal_threshold: 0,
            value_token: None,
        }
    }

    pub fn validate(&self) -> Result<(), ContractError> {
        if self.voting_window == 0 || self.final_voting_window == 0 {
            return Err(ContractError::InvalidConfig);
        }
        if self.execution_window == 0 {
            return Err(ContractError::InvalidConfig);
        }
        if self.approval_threshold == 0 || self.approval_threshold > 100 {
            return Err(ContractError::InvalidConfig);
        }
        if self.proposal_threshold < 0 {
            return Err(ContractError::InvalidConfig);
        }
        Ok(())
    }
}

// ── Storage helpers ──────────────────────────────────────────────────────────

pub(crate) fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&INITIALIZED)
}

pub(crate) fn require_initialized(env: &Env) -> Result<(), ContractError> {
    if !is_initialized(env) {
        return Err(ContractError::NotInitialized);
    }
    extend_instance(env);
    Ok(())
}

pub(crate) fn bootstrap(
    env: &Env,
    admin: &Address,
    voting_power: &Address,
    config: &GovernorConfig,
) -> Result<(), ContractError> {
    if is_initialized(env) {
        return Err(ContractError::AlreadyInitialized);
    }
    config.validate()?;

    env.storage().instance().set(&ADMIN, admin);
    env.storage().instance().set(&VOTING_POWER, voting_power);
    env.storage().instance().set(&CONFIG, config);
    env.storage().instance().set(&INITIALIZED, &true);
    extend_instance(env);
    Ok(())
}

pub(crate) fn load(env: &Env) -> Result<GovernorConfig, ContractError> {
    env.storage()
        .instance()
        .get(&CONFIG)
        .ok_or(ContractError::NotInitialized)
}

pub(crate) fn store(env: &Env, config: &GovernorConfig) {
    env.storage().instance().set(&CONFIG, config);
}

pub(crate) fn admin(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&ADMIN)
        .ok_or(ContractError::NotInitialized)
}

pub(crate) fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
    if *caller != admin(env)? {
        return Err(ContractError::Unauthorized);
    }
    Ok(())
}

pub(crate) fn voting_power(env: &Env) -> Result<Address, ContractError> {
    env.storage()
        .instance()
        .get(&VOTING_POWER)
        .ok_or(ContractError::NotInitialized)
}
