//! Reference collaborators for tests: a checkpointing voting-power ledger
//! and a lottery-style execution target.
//!
//! Compiled only for tests or with the `testutils` feature.

use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short, Address, Env, Symbol, Vec,
};

use crate::power::VotingPowerInterface;

const BALANCE: Symbol = symbol_short!("BAL");
const DELEGATE: Symbol = symbol_short!("DLG");
const CHECKPOINTS: Symbol = symbol_short!("CKPT");
const TICKET_FEE: Symbol = symbol_short!("FEE");
const CALLS: Symbol = symbol_short!("CALLS");

const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

/// Votes held by a delegatee from `ledger` onwards.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Checkpoint {
    pub ledger: u32,
    pub votes: i128,
}

// ── Voting power ─────────────────────────────────────────────────────────────

/// Balance ledger with explicit delegation and per-ledger checkpoints.
///
/// Balances only turn into votes once their holder delegates (to itself or
/// to another account).
#[contract]
pub struct MockVotingPower;

fn bump(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

fn balance_of(env: &Env, account: &Address) -> i128 {
    env.storage()
        .persistent()
        .get(&(BALANCE, account.clone()))
        .unwrap_or(0i128)
}

fn delegate_of(env: &Env, account: &Address) -> Option<Address> {
    env.storage().persistent().get(&(DELEGATE, account.clone()))
}

fn checkpoints_of(env: &Env, account: &Address) -> Vec<Checkpoint> {
    env.storage()
        .persistent()
        .get(&(CHECKPOINTS, account.clone()))
        .unwrap_or_else(|| Vec::new(env))
}

fn latest_votes(env: &Env, account: &Address) -> i128 {
    checkpoints_of(env, account)
        .last()
        .map(|c| c.votes)
        .unwrap_or(0)
}

fn move_votes(env: &Env, delegatee: &Address, delta: i128) {
    if delta == 0 {
        return;
    }
    let now = env.ledger().sequence();
    let mut checkpoints = checkpoints_of(env, delegatee);
    let votes = latest_votes(env, delegatee).saturating_add(delta);

    match checkpoints.last() {
        Some(last) if last.ledger == now => {
            checkpoints.set(checkpoints.len() - 1, Checkpoint { ledger: now, votes });
        }
        _ => checkpoints.push_back(Checkpoint { ledger: now, votes }),
    }

    let key = (CHECKPOINTS, delegatee.clone());
    env.storage().persistent().set(&key, &checkpoints);
    bump(env, &key);
}

#[contractimpl]
impl MockVotingPower {
    /// Overwrite `account`'s balance, moving the difference in votes to its
    /// current delegatee.
    pub fn set_balance(env: Env, account: Address, amount: i128) {
        let previous = balance_of(&env, &account);
        let key = (BALANCE, account.clone());
        env.storage().persistent().set(&key, &amount);
        bump(&env, &key);

        if let Some(delegatee) = delegate_of(&env, &account) {
            move_votes(&env, &delegatee, amount.saturating_sub(previous));
        }
    }

    pub fn balance(env: Env, account: Address) -> i128 {
        balance_of(&env, &account)
    }

    pub fn delegates(env: Env, account: Address) -> Option<Address> {
        delegate_of(&env, &account)
    }

    pub fn checkpoints(env: Env, account: Address) -> Vec<Checkpoint> {
        checkpoints_of(&env, &account)
    }
}

#[contractimpl]
impl VotingPowerInterface for MockVotingPower {
    fn weight_at(env: Env, account: Address, ledger: u32) -> i128 {
        let checkpoints = checkpoints_of(&env, &account);
        let mut weight = 0i128;
        for c in checkpoints.iter() {
            if c.ledger > ledger {
                break;
            }
            weight = c.votes;
        }
        weight
    }

    fn delegate(env: Env, delegator: Address, delegatee: Address) {
        delegator.require_auth();

        let balance = balance_of(&env, &delegator);
        if let Some(previous) = delegate_of(&env, &delegator) {
            move_votes(&env, &previous, -balance);
        }

        let key = (DELEGATE, delegator.clone());
        env.storage().persistent().set(&key, &delegatee);
        bump(&env, &key);

        move_votes(&env, &delegatee, balance);
    }
}

// ── Execution target ─────────────────────────────────────────────────────────

/// Minimal lottery whose parameters are owned by governance.
#[contract]
pub struct MockLottery;

#[contractimpl]
impl MockLottery {
    pub fn set_ticket_fee(env: Env, fee: u32) {
        env.storage().instance().set(&TICKET_FEE, &fee);
        let calls: u32 = env.storage().instance().get(&CALLS).unwrap_or(0u32);
        env.storage().instance().set(&CALLS, &calls.saturating_add(1));
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    pub fn ticket_fee(env: Env) -> u32 {
        env.storage().instance().get(&TICKET_FEE).unwrap_or(0u32)
    }

    /// Number of successful governance calls received.
    pub fn calls(env: Env) -> u32 {
        env.storage().instance().get(&CALLS).unwrap_or(0u32)
    }

    /// Always reverts.
    pub fn close_round(_env: Env) {
        panic!("lottery round cannot be closed by governance");
    }
}
