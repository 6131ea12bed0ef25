#![no_main]

use arbitrary::Arbitrary;
use governor::{
    config::GovernorConfig,
    lifecycle::ProposalState,
    testutils::{MockLottery, MockVotingPower, MockVotingPowerClient},
    voting::{Round, VoteSupport},
    GovernorContract, GovernorContractClient,
};
use libfuzzer_sys::fuzz_target;
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    xdr::ToXdr,
    Address, Bytes, BytesN, Env, IntoVal, String, Symbol, Val,
};

/// Ledger budget for one run; stays below the default archival TTL of
/// freshly registered contracts.
const MAX_ADVANCE: u32 = 3_000;

/// Actions modelling every governor entry point plus ledger progress.
///
/// Indices are reduced modulo the number of users / proposals so that
/// most inputs reach the contract instead of failing on lookup.
#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    Propose { proposer: u8, fee: u8 },
    Vote { voter: u8, proposal: u8, support: bool },
    SetBalance { account: u8, amount: u16 },
    SelectFinal,
    Execute { proposal: u8, tamper: bool },
    AdvanceLedgers { delta: u8 },
}

struct Submitted {
    id: BytesN<32>,
    calldata: Bytes,
    description_hash: BytesN<32>,
}

fuzz_target!(|actions: Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_sequence_number(10);

    let admin = Address::generate(&env);
    let power_id = env.register(MockVotingPower, ());
    let lottery_id = env.register(MockLottery, ());
    let contract_id = env.register(GovernorContract, ());
    let client = GovernorContractClient::new(&env, &contract_id);
    let power = MockVotingPowerClient::new(&env, &power_id);

    let mut config = GovernorConfig::standard();
    config.voting_window = 40;
    config.final_voting_window = 40;
    config.queue_grace_window = 200;
    config.execution_window = 200;
    if client.try_initialize(&admin, &power_id, &config).is_err() {
        return;
    }

    let mut users = vec![];
    for _ in 0..4 {
        let u = Address::generate(&env);
        power.set_balance(&u, &100);
        power.delegate(&u, &u);
        users.push(u);
    }

    let mut proposals: Vec<Submitted> = vec![];
    let mut executed: Vec<BytesN<32>> = vec![];
    let mut advanced = 0u32;

    for action in actions.into_iter() {
        match action {
            FuzzAction::Propose { proposer, fee } => {
                let proposer = &users[proposer as usize % users.len()];
                let words: soroban_sdk::Vec<Val> = soroban_sdk::vec![
                    &env,
                    Symbol::new(&env, "set_ticket_fee").into_val(&env),
                    (fee as u32).into_val(&env),
                ];
                let calldata = words.to_xdr(&env);
                let description = String::from_str(&env, "fuzz");
                if let Ok(Ok(id)) =
                    client.try_propose(proposer, &lottery_id, &0, &calldata, &description)
                {
                    proposals.push(Submitted {
                        id,
                        calldata,
                        description_hash: client.hash_description(&description),
                    });
                }
            }
            FuzzAction::Vote {
                voter,
                proposal,
                support,
            } => {
                if proposals.is_empty() {
                    continue;
                }
                let voter = &users[voter as usize % users.len()];
                let p = &proposals[proposal as usize % proposals.len()];
                let support = if support {
                    VoteSupport::For
                } else {
                    VoteSupport::Against
                };
                let _ = client.try_cast_vote(voter, &p.id, &support);
            }
            FuzzAction::SetBalance { account, amount } => {
                let account = &users[account as usize % users.len()];
                power.set_balance(account, &(amount as i128));
            }
            FuzzAction::SelectFinal => {
                let _ = client.try_select_final_candidate(&admin);
            }
            FuzzAction::Execute { proposal, tamper } => {
                if proposals.is_empty() {
                    continue;
                }
                let p = &proposals[proposal as usize % proposals.len()];
                let value = if tamper { 1i128 } else { 0i128 };
                if let Ok(Ok(id)) =
                    client.try_execute(&lottery_id, &value, &p.calldata, &p.description_hash)
                {
                    assert!(!tamper, "INVARIANT VIOLATION: tampered call executed");
                    executed.push(id);
                }
            }
            FuzzAction::AdvanceLedgers { delta } => {
                let delta = delta as u32;
                if advanced.saturating_add(delta) > MAX_ADVANCE {
                    continue;
                }
                advanced += delta;
                let seq = env.ledger().sequence().saturating_add(delta);
                env.ledger().set_sequence_number(seq);
            }
        }

        // ── Post-action invariant checks ──
        let mut live_finalists = 0u32;
        for p in &proposals {
            let record = client.get_proposal(&p.id);
            let state = client.state(&p.id);

            for round in [Round::First, Round::Second] {
                let tally = client.proposal_votes(&p.id, &round);
                assert!(
                    client.approval_rate(&p.id, &round) <= 100,
                    "INVARIANT VIOLATION: approval rate above 100"
                );

                let mut for_sum = 0i128;
                let mut against_sum = 0i128;
                for u in &users {
                    if let Some(v) = client.get_vote(&p.id, &round, u) {
                        match v.support {
                            VoteSupport::For => for_sum += v.weight,
                            VoteSupport::Against => against_sum += v.weight,
                        }
                    }
                }
                assert_eq!(tally.for_votes, for_sum, "INVARIANT VIOLATION: for tally");
                assert_eq!(
                    tally.against_votes, against_sum,
                    "INVARIANT VIOLATION: against tally"
                );
            }

            if executed.contains(&p.id) {
                assert!(record.executed, "INVARIANT VIOLATION: executed flag lost");
                assert_eq!(state, ProposalState::Executed);
            }
            if record.selected_as_final
                && matches!(state, ProposalState::Queued | ProposalState::Succeeded)
            {
                live_finalists += 1;
            }
        }
        assert!(
            live_finalists <= 1,
            "INVARIANT VIOLATION: more than one active final candidate"
        );
    }
});
