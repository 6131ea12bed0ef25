//! Proposal records, content-derived identifiers and registry storage.
//!
//! A proposal is addressed by `keccak256(xdr(target) || value_be || keccak256(calldata) || description_hash)`.
//! Only the hash of the description is kept; the creation event carries the
//! full text so indexers can re-derive the identifier.

use soroban_sdk::{
    contracttype, symbol_short, xdr::ToXdr, Address, Bytes, BytesN, Env, String, Symbol, Vec,
};

use crate::ContractError;

// ── Storage key prefixes ─────────────────────────────────────────────────────

const PROPOSAL: Symbol = symbol_short!("PROP");
const ALL_IDS: Symbol = symbol_short!("PROP_IDS");
const OPEN_IDS: Symbol = symbol_short!("PROP_OPEN");

// TTL: ~60 days at 5s/ledger
const TTL_THRESHOLD: u32 = 1_036_800;
const TTL_EXTEND_TO: u32 = 2_073_600;

/// Longest description (in UTF-8 bytes) accepted for hashing.
pub const MAX_DESCRIPTION_LEN: u32 = 1_024;

/// The on-chain proposal record.
///
/// Call-defining fields and the copied governance parameters are immutable
/// after creation. Only the final-candidate fields and `executed` change
/// afterwards; tallies live in `voting`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Proposal {
    pub id: BytesN<32>,
    pub proposer: Address,
    pub target: Address,
    pub value: i128,
    /// XDR-encoded `Vec<Val>`: function symbol followed by its arguments.
    pub calldata: Bytes,
    pub description_hash: BytesN<32>,
    /// Round 1 snapshot ledger.
    pub created_at_block: u32,
    pub first_deadline_block: u32,
    /// Approval threshold in force at creation, applied to both rounds.
    pub approval_threshold: u32,
    /// Queue grace window in force at creation. Zero disables expiry.
    pub queue_grace_window: u32,
    pub selected_as_final: bool,
    /// Round 2 snapshot ledger, set on selection.
    pub selected_at_block: Option<u32>,
    pub second_deadline_block: Option<u32>,
    /// First ledger at which an unexecuted succeeded candidate is `Expired`.
    pub execution_deadline_block: Option<u32>,
    pub executed: bool,
}

// ── Identity ─────────────────────────────────────────────────────────────────

/// `keccak256` of the UTF-8 bytes of `description`.
pub fn hash_description(env: &Env, description: &String) -> Result<BytesN<32>, ContractError> {
    let len = description.len();
    if len > MAX_DESCRIPTION_LEN {
        return Err(ContractError::InvalidInput);
    }
    let mut buf = [0u8; MAX_DESCRIPTION_LEN as usize];
    let utf8 = &mut buf[..len as usize];
    description.copy_into_slice(utf8);
    Ok(env.crypto().keccak256(&Bytes::from_slice(env, utf8)).into())
}

/// Content-derived proposal identifier.
pub fn hash_proposal(
    env: &Env,
    target: &Address,
    value: i128,
    calldata: &Bytes,
    description_hash: &BytesN<32>,
) -> BytesN<32> {
    let calldata_hash: BytesN<32> = env.crypto().keccak256(calldata).into();

    let mut preimage = target.clone().to_xdr(env);
    preimage.extend_from_array(&value.to_be_bytes());
    preimage.extend_from_array(&calldata_hash.to_array());
    preimage.extend_from_array(&description_hash.to_array());

    env.crypto().keccak256(&preimage).into()
}

// ── Storage helpers ──────────────────────────────────────────────────────────

fn proposal_key(id: &BytesN<32>) -> (Symbol, BytesN<32>) {
    (PROPOSAL, id.clone())
}

pub(crate) fn store(env: &Env, proposal: &Proposal) {
    let key = proposal_key(&proposal.id);
    env.storage().persistent().set(&key, proposal);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub(crate) fn load(env: &Env, id: &BytesN<32>) -> Option<Proposal> {
    env.storage().persistent().get(&proposal_key(id))
}

pub(crate) fn exists(env: &Env, id: &BytesN<32>) -> bool {
    env.storage().persistent().has(&proposal_key(id))
}

fn load_ids(env: &Env, key: &Symbol) -> Vec<BytesN<32>> {
    env.storage()
        .persistent()
        .get(key)
        .unwrap_or_else(|| Vec::new(env))
}

fn store_ids(env: &Env, key: &Symbol, ids: &Vec<BytesN<32>>) {
    env.storage().persistent().set(key, ids);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Append a freshly created proposal to both the audit index and the open
/// (still selectable) index.
pub(crate) fn index(env: &Env, id: &BytesN<32>) {
    let mut all = load_ids(env, &ALL_IDS);
    all.push_back(id.clone());
    store_ids(env, &ALL_IDS, &all);

    let mut open = load_ids(env, &OPEN_IDS);
    open.push_back(id.clone());
    store_ids(env, &OPEN_IDS, &open);
}

/// Every proposal ever created, in creation order.
pub(crate) fn all_ids(env: &Env) -> Vec<BytesN<32>> {
    load_ids(env, &ALL_IDS)
}

/// Proposals that may still become a final candidate, in creation order.
pub(crate) fn open_ids(env: &Env) -> Vec<BytesN<32>> {
    load_ids(env, &OPEN_IDS)
}

pub(crate) fn set_open_ids(env: &Env, ids: &Vec<BytesN<32>>) {
    store_ids(env, &OPEN_IDS, ids);
}
