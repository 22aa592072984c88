//! Integration tests driving the engine through whole proposal lifecycles:
//! submission → deposits → votes → end-of-block processing → genesis.
//!
//! The engine is wired to the in-memory collaborators from
//! `agora-nullables`; one validator holds all stake so voting power equals
//! bonded tokens.

use std::sync::Arc;

use agora_governance::msgs::{
    AnyMsg, MsgCreateGovernor, MsgDelegateGovernor, MsgDeposit, MsgProposeConstitutionAmendment,
    MsgSubmitProposal, MsgUpdateParams, MsgVote,
};
use agora_governance::proposal::single_vote;
use agora_governance::state::{GovState, Queue};
use agora_governance::tally::TallyEngine;
use agora_governance::{
    classify, EmaKind, ExecContext, GenesisState, GovConfig, GovEvent, GovHooks, GovernanceDelegation, GovernanceEngine,
    GovernanceError, Governor, GovernorDescription, GovernorStatus, MsgHandler, Params, Proposal, ProposalStatus,
    TallyResult, Vote, VoteOption,
};
use agora_governance::proposal::{Deposit, LastMinDeposit};
use agora_nullables::{MemStore, NullAccounts, NullBank, NullClock, NullStaking};
use agora_providers::StakingHooks;
use agora_store::KvStore;
use agora_types::{Address, Coins, Dec, Timestamp, ValidatorAddress};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const DAY: u64 = 86_400;
const T0: u64 = 1_700_000_000;
const MIN_DEPOSIT: u128 = 10_000_000;

struct Chain {
    engine: GovernanceEngine,
    store: Arc<MemStore>,
    bank: Arc<NullBank>,
    staking: Arc<NullStaking>,
}

fn at(secs: u64) -> Timestamp {
    Timestamp::new(T0 + secs)
}

fn addr(name: &str) -> Address {
    Address::new(format!("agora1{name}"))
}

fn val() -> ValidatorAddress {
    ValidatorAddress::new("agoravaloper1val")
}

fn stake(amount: u128) -> Coins {
    Coins::single("stake", amount)
}

fn dec(s: &str) -> Dec {
    s.parse().unwrap()
}

fn chain_from(genesis: GenesisState, config: GovConfig, setup: impl FnOnce(&NullBank, &NullStaking)) -> Chain {
    let store = Arc::new(MemStore::new());
    let bank = Arc::new(NullBank::new());
    let staking = Arc::new(NullStaking::new());
    staking.add_validator(&val(), &addr("valop"), true);
    setup(&bank, &staking);
    let mut engine = GovernanceEngine::new(
        store.clone(),
        staking.clone(),
        bank.clone(),
        &NullAccounts::new(),
        config,
    );
    engine.init_genesis(&genesis, at(0)).unwrap();
    engine.drain_events();
    Chain {
        engine,
        store,
        bank,
        staking,
    }
}

fn chain_with(params: Params) -> Chain {
    chain_from(
        GenesisState {
            params,
            ..Default::default()
        },
        GovConfig::default(),
        |_, _| {},
    )
}

fn chain() -> Chain {
    chain_with(Params::default())
}

impl Chain {
    fn state(&self) -> GovState<'_> {
        GovState::new(self.store.as_ref())
    }

    fn bond(&self, who: &str, tokens: u128) {
        self.staking.delegate(&addr(who), &val(), tokens).unwrap();
    }

    fn submit(&mut self, proposer: &str, messages: Vec<AnyMsg>, deposit: u128, now: Timestamp) -> u64 {
        self.bank.mint(&addr(proposer), &stake(deposit));
        self.engine
            .submit_proposal(
                MsgSubmitProposal {
                    messages,
                    initial_deposit: stake(deposit),
                    proposer: addr(proposer),
                    metadata: String::new(),
                    title: "Raise the bar".into(),
                    summary: "A proposal used in tests.".into(),
                },
                now,
            )
            .unwrap()
    }

    fn vote(&mut self, id: u64, voter: &str, option: VoteOption, now: Timestamp) {
        self.engine
            .vote(
                MsgVote {
                    proposal_id: id,
                    voter: addr(voter),
                    options: single_vote(option),
                    metadata: String::new(),
                },
                now,
            )
            .unwrap();
    }

    fn proposal(&self, id: u64) -> Option<Proposal> {
        self.state().proposal(id).unwrap()
    }

    fn status(&self, id: u64) -> ProposalStatus {
        self.proposal(id).unwrap().status
    }
}

/// Executes by writing a marker key; a payload of `fail` refuses.
struct MarkerHandler {
    authority: Address,
}

const MARKER_URL: &str = "/test.MsgMarker";

fn marker_key(payload: &[u8]) -> Vec<u8> {
    let mut key = vec![0xEE];
    key.extend_from_slice(payload);
    key
}

impl MsgHandler for MarkerHandler {
    fn signers(&self, _msg: &AnyMsg) -> Result<Vec<Address>, GovernanceError> {
        Ok(vec![self.authority.clone()])
    }

    fn execute(&self, ctx: &ExecContext<'_>, msg: &AnyMsg) -> Result<(), GovernanceError> {
        if msg.value == b"fail" {
            return Err(GovernanceError::Execution("marker refused".into()));
        }
        ctx.store.put(&marker_key(&msg.value), b"done")?;
        Ok(())
    }
}

fn marker(payload: &str) -> AnyMsg {
    AnyMsg {
        type_url: MARKER_URL.into(),
        value: payload.as_bytes().to_vec(),
    }
}

// ---------------------------------------------------------------------------
// 1. Deposit period
// ---------------------------------------------------------------------------

#[test]
fn expired_deposit_period_drops_and_refunds() {
    let mut c = chain();
    let id = c.submit("alice", vec![], 1_000_000, at(0));
    assert_eq!(c.status(id), ProposalStatus::DepositPeriod);
    assert_eq!(c.bank.balance(c.engine.module_address()), stake(1_000_000));

    c.engine.end_block(at(14 * DAY - 1)).unwrap();
    assert!(c.proposal(id).is_some());

    c.engine.drain_events();
    c.engine.end_block(at(14 * DAY)).unwrap();
    assert!(c.proposal(id).is_none());
    assert_eq!(c.bank.balance(&addr("alice")), stake(1_000_000));
    assert!(c.bank.balance(c.engine.module_address()).is_empty());
    assert_eq!(c.state().inactive_count().unwrap(), 0);
    assert!(c.engine.drain_events().contains(&GovEvent::ProposalDropped {
        proposal_id: id,
        deposits_burned: false,
    }));
    c.engine.assert_invariants().unwrap();
}

#[test]
fn expired_deposit_period_burns_when_configured() {
    let mut c = chain_with(Params {
        burn_proposal_deposit_prevote: true,
        ..Params::default()
    });
    let id = c.submit("alice", vec![], 1_000_000, at(0));
    c.engine.end_block(at(14 * DAY)).unwrap();
    assert!(c.proposal(id).is_none());
    assert!(c.bank.balance(&addr("alice")).is_empty());
    assert_eq!(c.bank.burned(), stake(1_000_000));
    c.engine.assert_invariants().unwrap();
}

#[test]
fn deposit_reaching_min_starts_voting() {
    let mut c = chain();
    let id = c.submit("alice", vec![], 1_000_000, at(0));
    c.bank.mint(&addr("bob"), &stake(9_000_000));
    let activated = c
        .engine
        .deposit(
            agora_governance::msgs::MsgDeposit {
                proposal_id: id,
                depositor: addr("bob"),
                amount: stake(9_000_000),
            },
            at(DAY),
        )
        .unwrap();
    assert!(activated);
    let p = c.proposal(id).unwrap();
    assert_eq!(p.status, ProposalStatus::VotingPeriod);
    assert_eq!(p.voting_start_time, Some(at(DAY)));
    assert_eq!(p.voting_end_time, Some(at(22 * DAY)));
    assert_eq!(p.total_deposit, stake(MIN_DEPOSIT));
    assert_eq!(c.state().active_count().unwrap(), 1);
    assert_eq!(c.state().inactive_count().unwrap(), 0);
    c.engine.assert_invariants().unwrap();
}

#[test]
fn min_deposit_rises_above_target() {
    let mut c = chain();
    for proposer in ["alice", "bob", "carol"] {
        let id = c.submit(proposer, vec![], MIN_DEPOSIT, at(0));
        assert_eq!(c.status(id), ProposalStatus::VotingPeriod);
    }
    let min = c.engine.querier().min_deposit(at(0)).unwrap();
    assert_eq!(min.to_string(), "10500000stake");

    // the same deposit no longer activates a fourth proposal
    let id = c.submit("dave", vec![], MIN_DEPOSIT, at(0));
    assert_eq!(c.status(id), ProposalStatus::DepositPeriod);
}

// ---------------------------------------------------------------------------
// 2. Voting period end
// ---------------------------------------------------------------------------

#[test]
fn proposal_passes_and_updates_ema() {
    let mut c = chain();
    c.bond("alice", 70);
    c.bond("bob", 30);
    let id = c.submit("carol", vec![], MIN_DEPOSIT, at(0));
    c.vote(id, "alice", VoteOption::Yes, at(DAY));
    c.vote(id, "bob", VoteOption::No, at(DAY));

    c.engine.end_block(at(21 * DAY)).unwrap();
    let p = c.proposal(id).unwrap();
    assert_eq!(p.status, ProposalStatus::Passed);
    assert_eq!(
        p.final_tally_result,
        TallyResult {
            yes_count: Dec::from_int(70),
            abstain_count: Dec::ZERO,
            no_count: Dec::from_int(30),
        }
    );
    assert!(c.state().votes(id).unwrap().is_empty());
    assert_eq!(c.bank.balance(&addr("carol")), stake(MIN_DEPOSIT));
    assert_eq!(c.state().active_count().unwrap(), 0);
    assert_eq!(
        c.engine.querier().participation_ema(EmaKind::General).unwrap(),
        dec("0.6")
    );
    c.engine.assert_invariants().unwrap();
}

#[test]
fn stake_beyond_u64_tallies_exactly() {
    const E21: u128 = 1_000_000_000_000_000_000_000;
    let mut c = chain();
    // 10^15 units of consensus power are 10^21 tokens
    let power = c.staking.tokens_from_consensus_power(1_000_000_000_000_000);
    assert_eq!(power, E21);
    c.bond("alice", 2 * power);
    c.bond("bob", power);
    let id = c.submit("carol", vec![], MIN_DEPOSIT, at(0));
    c.vote(id, "alice", VoteOption::Yes, at(DAY));
    c.vote(id, "bob", VoteOption::No, at(DAY));

    c.engine.end_block(at(21 * DAY)).unwrap();
    let p = c.proposal(id).unwrap();
    assert_eq!(p.status, ProposalStatus::Passed);
    assert_eq!(p.final_tally_result.yes_count, Dec::from_u128(2 * E21));
    assert_eq!(p.final_tally_result.no_count, Dec::from_u128(E21));
    assert_eq!(
        c.engine.querier().participation_ema(EmaKind::General).unwrap(),
        dec("0.6")
    );
    c.engine.assert_invariants().unwrap();
}

#[test]
fn low_turnout_is_rejected_and_lowers_ema() {
    let mut c = chain();
    c.bond("alice", 5);
    c.bond("bob", 95);
    let id = c.submit("carol", vec![], MIN_DEPOSIT, at(0));
    c.vote(id, "alice", VoteOption::Yes, at(DAY));

    c.engine.end_block(at(21 * DAY)).unwrap();
    assert_eq!(c.status(id), ProposalStatus::Rejected);
    assert_eq!(
        c.engine.querier().participation_ema(EmaKind::General).unwrap(),
        dec("0.41")
    );
    // quorum is missed but deposits are only burned when configured
    assert_eq!(c.bank.balance(&addr("carol")), stake(MIN_DEPOSIT));
}

#[test]
fn zero_votes_follow_burn_vote_quorum() {
    for burn in [false, true] {
        let mut c = chain_with(Params {
            burn_vote_quorum: burn,
            ..Params::default()
        });
        c.bond("alice", 100);
        let id = c.submit("carol", vec![], MIN_DEPOSIT, at(0));

        let params = c.state().params().unwrap();
        let proposal = c.proposal(id).unwrap();
        let outcome = TallyEngine::new(c.state(), c.staking.as_ref(), &GovConfig::default())
            .preview(&params, &proposal)
            .unwrap();
        assert!(!outcome.passes);
        assert_eq!(outcome.burn_deposits, burn);

        c.engine.end_block(at(21 * DAY)).unwrap();
        assert_eq!(c.status(id), ProposalStatus::Rejected);
        if burn {
            assert_eq!(c.bank.burned(), stake(MIN_DEPOSIT));
        } else {
            assert_eq!(c.bank.balance(&addr("carol")), stake(MIN_DEPOSIT));
        }
        c.engine.assert_invariants().unwrap();
    }
}

#[test]
fn failed_execution_rolls_back_every_message() {
    let mut c = chain();
    let authority = c.engine.module_address().clone();
    c.engine
        .router_mut()
        .register(MARKER_URL, Box::new(MarkerHandler { authority }));
    c.bond("alice", 100);

    let failing = c.submit("carol", vec![marker("a"), marker("fail")], MIN_DEPOSIT, at(0));
    let passing = c.submit("dave", vec![marker("b")], MIN_DEPOSIT, at(0));
    c.vote(failing, "alice", VoteOption::Yes, at(DAY));
    c.vote(passing, "alice", VoteOption::Yes, at(DAY));

    c.engine.end_block(at(21 * DAY)).unwrap();

    let p = c.proposal(failing).unwrap();
    assert_eq!(p.status, ProposalStatus::Failed);
    assert!(p.failed_reason.contains("marker refused"));
    assert!(c.store.get(&marker_key(b"a")).unwrap().is_none());

    assert_eq!(c.status(passing), ProposalStatus::Passed);
    assert_eq!(c.store.get(&marker_key(b"b")).unwrap(), Some(b"done".to_vec()));

    // a failed proposal still returns its deposits
    assert_eq!(c.bank.balance(&addr("carol")), stake(MIN_DEPOSIT));
    let events = c.engine.drain_events();
    assert!(events.iter().any(|e| matches!(
        e,
        GovEvent::ProposalFinalized { proposal_id, status: ProposalStatus::Failed, failed_reason: Some(_), .. }
            if *proposal_id == failing
    )));
}

#[test]
fn unroutable_message_rejected_at_submission() {
    let mut c = chain();
    c.bank.mint(&addr("carol"), &stake(MIN_DEPOSIT));
    let err = c
        .engine
        .submit_proposal(
            MsgSubmitProposal {
                messages: vec![marker("a")],
                initial_deposit: stake(MIN_DEPOSIT),
                proposer: addr("carol"),
                metadata: String::new(),
                title: "t".into(),
                summary: "s".into(),
            },
            at(0),
        )
        .unwrap_err();
    assert!(matches!(err, GovernanceError::NoHandler(_)));
    // nothing was charged or stored
    assert_eq!(c.bank.balance(&addr("carol")), stake(MIN_DEPOSIT));
    assert!(c.state().proposals().unwrap().is_empty());
}

#[test]
fn passed_update_params_replaces_params() {
    let mut c = chain();
    c.bond("alice", 100);
    let params = Params {
        max_deposit_period_secs: 7 * DAY,
        ..Params::default()
    };
    let msg = AnyMsg::pack(&MsgUpdateParams {
        authority: c.engine.module_address().clone(),
        params,
    })
    .unwrap();
    let id = c.submit("carol", vec![msg], MIN_DEPOSIT, at(0));
    c.vote(id, "alice", VoteOption::Yes, at(DAY));
    c.engine.end_block(at(21 * DAY)).unwrap();

    assert_eq!(c.status(id), ProposalStatus::Passed);
    assert_eq!(c.engine.querier().params().unwrap().max_deposit_period_secs, 7 * DAY);
}

#[test]
fn passed_amendment_patches_constitution() {
    let mut c = chain_from(
        GenesisState {
            constitution: "Article 1\nAll holders are equal.\n".into(),
            ..Default::default()
        },
        GovConfig::default(),
        |_, _| {},
    );
    c.bond("alice", 100);
    let msg = AnyMsg::pack(&MsgProposeConstitutionAmendment {
        authority: c.engine.module_address().clone(),
        amendment: "@@ -2 +2 @@\n-All holders are equal.\n+All stakers are equal.\n".into(),
    })
    .unwrap();
    let id = c.submit("carol", vec![msg], MIN_DEPOSIT, at(0));
    assert!(c.engine.querier().proposal_kinds(id).unwrap().is_constitution_amendment());
    c.vote(id, "alice", VoteOption::Yes, at(DAY));
    c.engine.end_block(at(21 * DAY)).unwrap();

    assert_eq!(c.status(id), ProposalStatus::Passed);
    assert_eq!(
        c.engine.querier().constitution().unwrap(),
        "Article 1\nAll stakers are equal.\n"
    );
    let q = c.engine.querier();
    assert_eq!(q.participation_ema(EmaKind::ConstitutionAmendment).unwrap(), dec("0.6"));
    assert_eq!(q.participation_ema(EmaKind::General).unwrap(), dec("0.5"));
    assert_eq!(q.participation_ema(EmaKind::Law).unwrap(), dec("0.5"));
}

#[test]
fn empty_proposal_is_classified_any() {
    assert!(classify(&[]).is_any());
    assert!(!classify(&[]).is_law());
}

// ---------------------------------------------------------------------------
// 3. Quorum checks
// ---------------------------------------------------------------------------

fn quorum_check_params() -> Params {
    Params {
        quorum_check_count: 2,
        ..Params::default()
    }
}

#[test]
fn late_quorum_extends_voting_period() {
    let mut c = chain_with(quorum_check_params());
    let clock = NullClock::new(T0);
    c.bond("alice", 100);
    let id = c.submit("carol", vec![], MIN_DEPOSIT, clock.now());
    assert_eq!(c.proposal(id).unwrap().voting_end_time, Some(at(21 * DAY)));

    // first check: nobody voted, the next one lands half a day later
    c.engine.drain_events();
    c.engine.end_block(clock.advance(20 * DAY)).unwrap();
    assert!(c.engine.drain_events().contains(&GovEvent::QuorumCheck {
        proposal_id: id,
        reached: false,
        checks_done: 0,
    }));
    let pending = c.state().quorum_checks_from(at(0)).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].0, at(20 * DAY + DAY / 2));
    assert_eq!(pending[0].2.quorum_checks_done, 1);

    c.vote(id, "alice", VoteOption::Yes, clock.advance(1));
    c.engine.end_block(clock.advance(DAY / 2 - 1)).unwrap();
    let new_end = at(21 * DAY + DAY / 2);
    assert_eq!(c.proposal(id).unwrap().voting_end_time, Some(new_end));
    assert!(c.engine.drain_events().contains(&GovEvent::VotingPeriodExtended {
        proposal_id: id,
        voting_end_time: new_end,
    }));

    c.engine.end_block(clock.advance(DAY / 2)).unwrap();
    assert_eq!(c.status(id), ProposalStatus::VotingPeriod);
    c.engine.end_block(clock.advance(DAY / 2)).unwrap();
    assert_eq!(clock.now(), new_end);
    assert_eq!(c.status(id), ProposalStatus::Passed);
    assert!(c.state().quorum_checks_from(at(0)).unwrap().is_empty());
}

#[test]
fn quorum_at_first_check_keeps_voting_end() {
    let mut c = chain_with(quorum_check_params());
    c.bond("alice", 100);
    let id = c.submit("carol", vec![], MIN_DEPOSIT, at(0));
    c.vote(id, "alice", VoteOption::Yes, at(DAY));

    c.engine.end_block(at(20 * DAY)).unwrap();
    assert_eq!(c.proposal(id).unwrap().voting_end_time, Some(at(21 * DAY)));
    assert!(c.state().quorum_checks_from(at(0)).unwrap().is_empty());

    c.engine.end_block(at(21 * DAY)).unwrap();
    assert_eq!(c.status(id), ProposalStatus::Passed);
}

#[test]
fn delete_proposal_leaves_no_quorum_check() {
    let mut c = chain_with(quorum_check_params());
    let id = c.submit("carol", vec![], MIN_DEPOSIT, at(0));
    let start = c.proposal(id).unwrap().voting_start_time.unwrap();
    assert_eq!(c.state().quorum_checks_from(start).unwrap().len(), 1);

    c.engine.delete_proposal(id, at(DAY)).unwrap();
    assert!(c
        .state()
        .quorum_checks_from(start)
        .unwrap()
        .iter()
        .all(|(_, entry_id, _)| *entry_id != id));
    assert!(c.state().queue_entries(Queue::Active).unwrap().is_empty());
    assert_eq!(c.state().active_count().unwrap(), 0);
    assert!(c.proposal(id).is_none());
}

// ---------------------------------------------------------------------------
// 4. Governors
// ---------------------------------------------------------------------------

fn governor_chain() -> (Chain, u64) {
    let mut c = chain_with(Params {
        min_governor_self_delegation: 3,
        ..Params::default()
    });
    c.bond("gov", 3);
    c.bond("dave", 5);
    c.bond("zed", 2);
    c.engine
        .create_governor(
            MsgCreateGovernor {
                address: addr("gov"),
                description: GovernorDescription {
                    moniker: "gov".into(),
                    ..Default::default()
                },
            },
            at(0),
        )
        .unwrap();
    c.engine
        .delegate_governor(
            MsgDelegateGovernor {
                delegator: addr("dave"),
                governor: addr("gov"),
            },
            at(0),
        )
        .unwrap();
    let id = c.submit("carol", vec![], MIN_DEPOSIT, at(0));
    (c, id)
}

#[test]
fn governor_votes_for_silent_delegators() {
    let (mut c, id) = governor_chain();
    c.vote(id, "gov", VoteOption::Yes, at(DAY));
    let tally = c.engine.querier().tally(id).unwrap();
    assert_eq!(tally.yes_count, Dec::from_int(8));
    assert_eq!(tally.no_count, Dec::ZERO);
    assert_eq!(c.engine.querier().governor_voting_power(&addr("gov")).unwrap(), Dec::from_int(8));
    c.engine.assert_invariants().unwrap();
}

#[test]
fn direct_voter_excluded_from_governor() {
    let (mut c, id) = governor_chain();
    c.vote(id, "gov", VoteOption::Yes, at(DAY));
    c.vote(id, "dave", VoteOption::No, at(DAY));
    let tally = c.engine.querier().tally(id).unwrap();
    assert_eq!(tally.yes_count, Dec::from_int(3));
    assert_eq!(tally.no_count, Dec::from_int(5));

    // 8 of 10 bonded voted, yes is 3/8 of the non-abstaining power
    c.engine.end_block(at(21 * DAY)).unwrap();
    assert_eq!(c.status(id), ProposalStatus::Rejected);
}

#[test]
fn governor_below_self_delegation_is_deactivated() {
    let (mut c, id) = governor_chain();
    let gov = addr("gov");
    c.engine.before_delegation_shares_modified(&gov, &val(), at(DAY)).unwrap();
    c.staking.undelegate(&gov, &val(), Dec::from_int(1)).unwrap();
    c.engine.after_delegation_modified(&gov, &val(), at(DAY)).unwrap();

    let governor = c.engine.querier().governor(&gov).unwrap().unwrap();
    assert_eq!(governor.status, GovernorStatus::Inactive);
    assert_eq!(c.engine.querier().governance_delegation(&gov).unwrap(), None);
    assert_eq!(
        c.engine.querier().governance_delegation(&addr("dave")).unwrap(),
        Some(gov.clone())
    );
    c.engine.assert_invariants().unwrap();

    // an inactive governor only votes its own stake
    c.vote(id, "gov", VoteOption::Yes, at(DAY));
    assert_eq!(c.engine.querier().tally(id).unwrap().yes_count, Dec::from_int(2));
}

#[test]
fn validator_inheritance_is_opt_in() {
    for inheritance in [false, true] {
        let mut c = chain_from(
            GenesisState::default(),
            GovConfig {
                validator_inheritance: inheritance,
                ..GovConfig::default()
            },
            |_, _| {},
        );
        c.bond("valop", 1);
        c.bond("alice", 4);
        c.bond("bob", 5);
        let id = c.submit("carol", vec![], MIN_DEPOSIT, at(0));
        c.vote(id, "valop", VoteOption::Yes, at(DAY));
        c.vote(id, "bob", VoteOption::No, at(DAY));

        let tally = c.engine.querier().tally(id).unwrap();
        let expected_yes = if inheritance { 5 } else { 1 };
        assert_eq!(tally.yes_count, Dec::from_int(expected_yes));
        assert_eq!(tally.no_count, Dec::from_int(5));
    }
}

// ---------------------------------------------------------------------------
// 5. Genesis
// ---------------------------------------------------------------------------

fn populated_genesis() -> GenesisState {
    let base = |id: u64, status: ProposalStatus| Proposal {
        id,
        messages: vec![],
        status,
        final_tally_result: TallyResult::default(),
        submit_time: at(0),
        deposit_end_time: at(14 * DAY),
        total_deposit: Coins::empty(),
        voting_start_time: None,
        voting_end_time: None,
        metadata: String::new(),
        title: format!("proposal {id}"),
        summary: "imported".into(),
        proposer: addr("alice"),
        failed_reason: String::new(),
    };
    let mut deposit_period = base(1, ProposalStatus::DepositPeriod);
    deposit_period.total_deposit = stake(1_000_000);
    let mut voting = base(2, ProposalStatus::VotingPeriod);
    voting.total_deposit = stake(MIN_DEPOSIT);
    voting.voting_start_time = Some(at(DAY));
    voting.voting_end_time = Some(at(22 * DAY));

    GenesisState {
        starting_proposal_id: 3,
        params: Params {
            min_governor_self_delegation: 3,
            ..Params::default()
        },
        proposals: vec![deposit_period, voting],
        deposits: vec![
            Deposit {
                proposal_id: 1,
                depositor: addr("alice"),
                amount: stake(1_000_000),
            },
            Deposit {
                proposal_id: 2,
                depositor: addr("bob"),
                amount: stake(MIN_DEPOSIT),
            },
        ],
        votes: vec![Vote {
            proposal_id: 2,
            voter: addr("carol"),
            options: single_vote(VoteOption::Yes),
            metadata: "because".into(),
        }],
        constitution: "Article 1\n".into(),
        last_min_deposit: Some(LastMinDeposit {
            value: stake(12_000_000),
            time: at(DAY),
        }),
        last_min_initial_deposit: None,
        participation_ema: dec("0.3"),
        law_participation_ema: dec("0.5"),
        constitution_amendment_participation_ema: dec("0.7"),
        governors: vec![Governor {
            address: addr("gov"),
            description: GovernorDescription {
                moniker: "gov".into(),
                ..Default::default()
            },
            status: GovernorStatus::Active,
            last_status_change_time: Some(at(0)),
        }],
        governance_delegations: vec![
            GovernanceDelegation {
                delegator: addr("dave"),
                governor: addr("gov"),
            },
            GovernanceDelegation {
                delegator: addr("gov"),
                governor: addr("gov"),
            },
        ],
    }
}

fn fund_genesis(bank: &NullBank, staking: &NullStaking) {
    bank.mint(&Address::module("gov"), &stake(MIN_DEPOSIT + 1_000_000));
    staking.delegate(&addr("gov"), &val(), 3).unwrap();
    staking.delegate(&addr("dave"), &val(), 5).unwrap();
}

#[test]
fn genesis_round_trip() {
    let genesis = populated_genesis();
    let c = chain_from(genesis.clone(), GovConfig::default(), fund_genesis);

    assert_eq!(c.engine.export_genesis().unwrap(), genesis);
    assert_eq!(c.state().inactive_count().unwrap(), 1);
    assert_eq!(c.state().active_count().unwrap(), 1);
    assert_eq!(
        c.state().queue_entries(Queue::Active).unwrap(),
        vec![(at(22 * DAY), 2)]
    );
    assert_eq!(
        c.engine.querier().governor_val_shares(&addr("gov")).unwrap()[&val()],
        Dec::from_int(8)
    );
    c.engine.assert_invariants().unwrap();
}

#[test]
fn genesis_continues_proposal_ids() {
    let mut c = chain_from(populated_genesis(), GovConfig::default(), fund_genesis);
    let id = c.submit("erin", vec![], 1_000_000, at(DAY));
    assert_eq!(id, 3);
}

#[test]
fn genesis_rebuilds_quorum_checks() {
    let mut genesis = populated_genesis();
    genesis.params.quorum_check_count = 2;
    let c = chain_from(genesis, GovConfig::default(), fund_genesis);
    let checks = c.state().quorum_checks_from(at(0)).unwrap();
    assert_eq!(checks.len(), 1);
    let (time, id, entry) = &checks[0];
    assert_eq!((*time, *id), (at(21 * DAY), 2));
    assert_eq!(entry.quorum_checks_done, 0);
}

#[test]
fn genesis_balance_mismatch_is_fatal() {
    let store = Arc::new(MemStore::new());
    let bank = Arc::new(NullBank::new());
    bank.mint(&Address::module("gov"), &stake(1));
    let mut engine = GovernanceEngine::new(
        store,
        Arc::new(NullStaking::new()),
        bank,
        &NullAccounts::new(),
        GovConfig::default(),
    );
    let err = engine.init_genesis(&populated_genesis(), at(0)).unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn submit_without_genesis_is_fatal() {
    let bank = Arc::new(NullBank::new());
    bank.mint(&addr("alice"), &stake(MIN_DEPOSIT));
    let mut engine = GovernanceEngine::new(
        Arc::new(MemStore::new()),
        Arc::new(NullStaking::new()),
        bank,
        &NullAccounts::new(),
        GovConfig::default(),
    );
    let err = engine
        .submit_proposal(
            MsgSubmitProposal {
                messages: vec![],
                initial_deposit: stake(MIN_DEPOSIT),
                proposer: addr("alice"),
                metadata: String::new(),
                title: "t".into(),
                summary: "s".into(),
            },
            at(0),
        )
        .unwrap_err();
    assert!(err.is_fatal());
}

// ---------------------------------------------------------------------------
// 6. Rejected messages leave no trace
// ---------------------------------------------------------------------------

/// Refuses the lifecycle point named by `refuse`.
struct RefusingHooks {
    refuse: &'static str,
}

impl RefusingHooks {
    fn check(&self, point: &str) -> Result<(), GovernanceError> {
        if self.refuse == point {
            return Err(GovernanceError::Execution(format!("{point} refused")));
        }
        Ok(())
    }
}

impl GovHooks for RefusingHooks {
    fn after_proposal_submission(&mut self, _proposal_id: u64) -> Result<(), GovernanceError> {
        self.check("submission")
    }

    fn after_proposal_deposit(&mut self, _proposal_id: u64, _depositor: &Address) -> Result<(), GovernanceError> {
        self.check("deposit")
    }

    fn after_proposal_vote(&mut self, _proposal_id: u64, _voter: &Address) -> Result<(), GovernanceError> {
        self.check("vote")
    }
}

fn submit_msg(proposer: &str, deposit: u128) -> MsgSubmitProposal {
    MsgSubmitProposal {
        messages: vec![],
        initial_deposit: stake(deposit),
        proposer: addr(proposer),
        metadata: String::new(),
        title: "Raise the bar".into(),
        summary: "A proposal used in tests.".into(),
    }
}

#[test]
fn refused_submission_hook_rolls_back_submission() {
    for point in ["submission", "deposit"] {
        let mut c = chain();
        c.engine.set_hooks(Box::new(RefusingHooks { refuse: point }));
        c.bank.mint(&addr("alice"), &stake(MIN_DEPOSIT));

        let err = c.engine.submit_proposal(submit_msg("alice", MIN_DEPOSIT), at(0)).unwrap_err();
        assert!(matches!(err, GovernanceError::Execution(_)));
        assert!(c.state().proposals().unwrap().is_empty());
        assert!(c.state().all_deposits().unwrap().is_empty());
        assert_eq!(c.state().next_proposal_id().unwrap(), Some(1));
        assert!(c.state().queue_entries(Queue::Inactive).unwrap().is_empty());
        assert!(c.state().queue_entries(Queue::Active).unwrap().is_empty());
        assert_eq!(c.bank.balance(&addr("alice")), stake(MIN_DEPOSIT));
        assert!(c.bank.balance(c.engine.module_address()).is_empty());
        assert!(c.engine.drain_events().is_empty());
    }
}

#[test]
fn refused_deposit_hook_keeps_proposal_unchanged() {
    let mut c = chain();
    let id = c.submit("alice", vec![], 1_000_000, at(0));
    c.engine.drain_events();
    c.engine.set_hooks(Box::new(RefusingHooks { refuse: "deposit" }));
    c.bank.mint(&addr("bob"), &stake(MIN_DEPOSIT));

    let err = c
        .engine
        .deposit(
            MsgDeposit {
                proposal_id: id,
                depositor: addr("bob"),
                amount: stake(MIN_DEPOSIT),
            },
            at(DAY),
        )
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Execution(_)));
    let p = c.proposal(id).unwrap();
    assert_eq!(p.status, ProposalStatus::DepositPeriod);
    assert_eq!(p.total_deposit, stake(1_000_000));
    assert!(c.state().deposit(id, &addr("bob")).unwrap().is_none());
    assert_eq!(c.bank.balance(&addr("bob")), stake(MIN_DEPOSIT));
    assert_eq!(c.bank.balance(c.engine.module_address()), stake(1_000_000));
    assert!(c.engine.drain_events().is_empty());
    c.engine.assert_invariants().unwrap();
}

#[test]
fn refused_vote_hook_drops_the_vote() {
    let mut c = chain();
    c.bond("alice", 10);
    let id = c.submit("carol", vec![], MIN_DEPOSIT, at(0));
    c.engine.drain_events();
    c.engine.set_hooks(Box::new(RefusingHooks { refuse: "vote" }));

    let err = c
        .engine
        .vote(
            MsgVote {
                proposal_id: id,
                voter: addr("alice"),
                options: single_vote(VoteOption::Yes),
                metadata: String::new(),
            },
            at(DAY),
        )
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Execution(_)));
    assert!(c.state().vote(id, &addr("alice")).unwrap().is_none());
    assert!(c.engine.drain_events().is_empty());
}

#[test]
fn deposit_without_funds_records_nothing() {
    let mut c = chain();
    let id = c.submit("alice", vec![], 1_000_000, at(0));
    let err = c
        .engine
        .deposit(
            MsgDeposit {
                proposal_id: id,
                depositor: addr("bob"),
                amount: stake(MIN_DEPOSIT),
            },
            at(DAY),
        )
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Provider(_)));
    assert!(c.state().deposit(id, &addr("bob")).unwrap().is_none());
    assert_eq!(c.status(id), ProposalStatus::DepositPeriod);
}

#[test]
fn malformed_governor_addresses_are_rejected() {
    let mut c = chain_with(Params {
        min_governor_self_delegation: 0,
        ..Params::default()
    });
    let overlong = Address::new(format!("agora1{}", "g".repeat(Address::MAX_LEN)));
    for address in [Address::new("cosmos1gov"), Address::new("agora1gov-x"), overlong.clone()] {
        let err = c
            .engine
            .create_governor(
                MsgCreateGovernor {
                    address: address.clone(),
                    description: GovernorDescription {
                        moniker: "gov".into(),
                        ..Default::default()
                    },
                },
                at(0),
            )
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidMessage(_)), "{address}: {err}");
        assert!(c.engine.querier().governor(&address).unwrap().is_none());
    }

    c.engine
        .create_governor(
            MsgCreateGovernor {
                address: addr("gov"),
                description: GovernorDescription {
                    moniker: "gov".into(),
                    ..Default::default()
                },
            },
            at(0),
        )
        .unwrap();
    for (delegator, governor) in [(overlong.clone(), addr("gov")), (addr("dave"), overlong)] {
        let err = c
            .engine
            .delegate_governor(MsgDelegateGovernor { delegator: delegator.clone(), governor }, at(0))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidMessage(_)));
        assert!(c.engine.querier().governance_delegation(&delegator).unwrap().is_none());
    }
}
