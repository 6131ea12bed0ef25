//! Proposal execution: calldata decoding and dispatch to the target.
//!
//! Calldata is an opaque byte string at the governance layer. At dispatch it
//! is read as the XDR encoding of a `Vec<Val>` whose head is the function
//! symbol and whose tail is the argument list, then replayed verbatim.
//!
//! A failing target (or a failing value transfer) surfaces as
//! `ExecutionReverted`. Because the error is returned from the entry point,
//! the host discards every write of the invocation, including the
//! `executed` flag.

use soroban_sdk::{
    token::TokenClient, xdr::FromXdr, Address, Bytes, Env, InvokeError, Symbol, TryFromVal, Val,
    Vec,
};

use crate::config::GovernorConfig;
use crate::proposal::Proposal;
use crate::ContractError;

/// Split calldata into `(function, args)`.
pub fn decode_calldata(env: &Env, calldata: &Bytes) -> Result<(Symbol, Vec<Val>), ContractError> {
    let words =
        Vec::<Val>::from_xdr(env, calldata).map_err(|_| ContractError::InvalidCalldata)?;
    let head = words.get(0).ok_or(ContractError::InvalidCalldata)?;
    let function =
        Symbol::try_from_val(env, &head).map_err(|_| ContractError::InvalidCalldata)?;
    Ok((function, words.slice(1..)))
}

fn transfer_value(
    env: &Env,
    config: &GovernorConfig,
    target: &Address,
    value: i128,
) -> Result<(), ContractError> {
    if value == 0 {
        return Ok(());
    }
    let token = config
        .value_token
        .clone()
        .ok_or(ContractError::MissingValueToken)?;
    let sent = TokenClient::new(env, &token).try_transfer(
        &env.current_contract_address(),
        target,
        &value,
    );
    match sent {
        Ok(Ok(())) => Ok(()),
        _ => Err(ContractError::ExecutionReverted),
    }
}

/// Send `value` and perform the call described by the proposal.
pub(crate) fn dispatch(
    env: &Env,
    config: &GovernorConfig,
    proposal: &Proposal,
) -> Result<(), ContractError> {
    let (function, args) = decode_calldata(env, &proposal.calldata)?;

    transfer_value(env, config, &proposal.target, proposal.value)?;

    match env.try_invoke_contract::<Val, InvokeError>(&proposal.target, &function, args) {
        Ok(_) => Ok(()),
        Err(_) => Err(ContractError::ExecutionReverted),
    }
}
