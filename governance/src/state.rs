//! Typed access to persisted governance state.
//!
//! Records are bincode-encoded under one-byte prefixes. Multi-byte
//! integers in keys are big-endian so byte order equals numeric order:
//!
//! | prefix | key                                   | value                    |
//! |--------|---------------------------------------|--------------------------|
//! | `0x00` | id                                    | `Proposal`               |
//! | `0x01` | deposit end time, id                  | (inactive queue)         |
//! | `0x02` | voting end time, id                   | (active queue)           |
//! | `0x03` | check time, id                        | `QuorumCheckQueueEntry`  |
//! | `0x04` |                                       | next proposal id         |
//! | `0x05` |                                       | `Params`                 |
//! | `0x10` | id, depositor                         | `Deposit`                |
//! | `0x20` | id, voter                             | `Vote`                   |
//! | `0x30` / `0x31` |                              | active / inactive count  |
//! | `0x40` / `0x41` |                              | last min (initial) deposit |
//! | `0x50`..`0x52`  |                              | participation EMAs       |
//! | `0x60` |                                       | constitution             |
//! | `0x70` | governor                              | `Governor`               |
//! | `0x71` | delegator                             | governor address         |
//! | `0x72` | u16 len, governor, validator          | shares                   |

use serde::de::DeserializeOwned;
use serde::Serialize;

use agora_store::{prefix_end, KvStore};
use agora_types::{Address, Dec, Timestamp, ValidatorAddress};

use crate::error::encoding_error;
use crate::governor::Governor;
use crate::params::Params;
use crate::participation::EmaKind;
use crate::proposal::{Deposit, LastMinDeposit, Proposal, QuorumCheckQueueEntry, Vote};
use crate::GovernanceError;

pub(crate) mod keys {
    pub const PROPOSAL: u8 = 0x00;
    pub const INACTIVE_QUEUE: u8 = 0x01;
    pub const ACTIVE_QUEUE: u8 = 0x02;
    pub const QUORUM_CHECK_QUEUE: u8 = 0x03;
    pub const NEXT_PROPOSAL_ID: u8 = 0x04;
    pub const PARAMS: u8 = 0x05;
    pub const DEPOSIT: u8 = 0x10;
    pub const VOTE: u8 = 0x20;
    pub const ACTIVE_COUNT: u8 = 0x30;
    pub const INACTIVE_COUNT: u8 = 0x31;
    pub const LAST_MIN_DEPOSIT: u8 = 0x40;
    pub const LAST_MIN_INITIAL_DEPOSIT: u8 = 0x41;
    pub const EMA_GENERAL: u8 = 0x50;
    pub const EMA_LAW: u8 = 0x51;
    pub const EMA_CONSTITUTION_AMENDMENT: u8 = 0x52;
    pub const CONSTITUTION: u8 = 0x60;
    pub const GOVERNOR: u8 = 0x70;
    pub const GOVERNANCE_DELEGATION: u8 = 0x71;
    pub const GOVERNOR_VAL_SHARES: u8 = 0x72;
}

/// A time-ordered queue of proposal ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Queue {
    /// Proposals in their deposit period, by deposit end time.
    Inactive,
    /// Proposals in their voting period, by voting end time.
    Active,
}

impl Queue {
    fn prefix(self) -> u8 {
        match self {
            Self::Inactive => keys::INACTIVE_QUEUE,
            Self::Active => keys::ACTIVE_QUEUE,
        }
    }
}

fn id_key(prefix: u8, id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(9);
    key.push(prefix);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn id_addr_key(prefix: u8, id: u64, addr: &Address) -> Vec<u8> {
    let mut key = id_key(prefix, id);
    key.extend_from_slice(addr.as_bytes());
    key
}

fn time_id_key(prefix: u8, time: Timestamp, id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(17);
    key.push(prefix);
    key.extend_from_slice(&time.to_be_bytes());
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn addr_key(prefix: u8, addr: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(1 + addr.as_bytes().len());
    key.push(prefix);
    key.extend_from_slice(addr.as_bytes());
    key
}

/// Governor-scoped prefix: the governor address carries a big-endian u16
/// length so one governor's entries never share a prefix with another's.
fn governor_prefix(governor: &Address) -> Result<Vec<u8>, GovernanceError> {
    let bytes = governor.as_bytes();
    let len = u16::try_from(bytes.len()).map_err(|_| {
        GovernanceError::InvalidMessage(format!("governor address of {} bytes", bytes.len()))
    })?;
    let mut key = Vec::with_capacity(3 + bytes.len());
    key.push(keys::GOVERNOR_VAL_SHARES);
    key.extend_from_slice(&len.to_be_bytes());
    key.extend_from_slice(bytes);
    Ok(key)
}

fn val_shares_key(
    governor: &Address,
    validator: &ValidatorAddress,
) -> Result<Vec<u8>, GovernanceError> {
    let mut key = governor_prefix(governor)?;
    key.extend_from_slice(validator.as_bytes());
    Ok(key)
}

fn decode_time_id(key: &[u8]) -> Result<(Timestamp, u64), GovernanceError> {
    if key.len() != 17 {
        return Err(GovernanceError::Invariant(format!(
            "malformed queue key of {} bytes",
            key.len()
        )));
    }
    let mut time = [0u8; 8];
    let mut id = [0u8; 8];
    time.copy_from_slice(&key[1..9]);
    id.copy_from_slice(&key[9..17]);
    Ok((Timestamp::from_be_bytes(time), u64::from_be_bytes(id)))
}

fn utf8(bytes: &[u8]) -> Result<String, GovernanceError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| GovernanceError::Invariant(format!("non-utf8 key component: {e}")))
}

/// Borrowed handle over a [`KvStore`] with typed governance accessors.
#[derive(Clone, Copy)]
pub struct GovState<'a> {
    kv: &'a dyn KvStore,
}

impl<'a> GovState<'a> {
    pub fn new(kv: &'a dyn KvStore) -> Self {
        Self { kv }
    }

    pub fn kv(&self) -> &'a dyn KvStore {
        self.kv
    }

    fn get<T: DeserializeOwned>(&self, key: &[u8]) -> Result<Option<T>, GovernanceError> {
        match self.kv.get(key)? {
            Some(bytes) => bincode::deserialize(&bytes)
                .map(Some)
                .map_err(encoding_error),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(&self, key: &[u8], value: &T) -> Result<(), GovernanceError> {
        let bytes = bincode::serialize(value).map_err(encoding_error)?;
        self.kv.put(key, &bytes)?;
        Ok(())
    }

    fn values<T: DeserializeOwned>(&self, prefix: &[u8]) -> Result<Vec<T>, GovernanceError> {
        self.kv
            .iter_prefix(prefix)?
            .into_iter()
            .map(|(_, v)| bincode::deserialize(&v).map_err(encoding_error))
            .collect()
    }

    // ── Proposals ──────────────────────────────────────────────────────

    pub fn proposal(&self, id: u64) -> Result<Option<Proposal>, GovernanceError> {
        self.get(&id_key(keys::PROPOSAL, id))
    }

    /// Like [`proposal`](Self::proposal) but a missing record is an error.
    pub fn require_proposal(&self, id: u64) -> Result<Proposal, GovernanceError> {
        self.proposal(id)?
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub fn set_proposal(&self, proposal: &Proposal) -> Result<(), GovernanceError> {
        self.put(&id_key(keys::PROPOSAL, proposal.id), proposal)
    }

    pub fn remove_proposal(&self, id: u64) -> Result<(), GovernanceError> {
        self.kv.delete(&id_key(keys::PROPOSAL, id))?;
        Ok(())
    }

    /// All proposals in ascending id order.
    pub fn proposals(&self) -> Result<Vec<Proposal>, GovernanceError> {
        self.values(&[keys::PROPOSAL])
    }

    pub fn next_proposal_id(&self) -> Result<Option<u64>, GovernanceError> {
        self.get(&[keys::NEXT_PROPOSAL_ID])
    }

    pub fn set_next_proposal_id(&self, id: u64) -> Result<(), GovernanceError> {
        self.put(&[keys::NEXT_PROPOSAL_ID], &id)
    }

    // ── Params ─────────────────────────────────────────────────────────

    pub fn params(&self) -> Result<Params, GovernanceError> {
        Ok(self.get(&[keys::PARAMS])?.unwrap_or_default())
    }

    pub fn set_params(&self, params: &Params) -> Result<(), GovernanceError> {
        self.put(&[keys::PARAMS], params)
    }

    // ── Deposits ───────────────────────────────────────────────────────

    pub fn deposit(&self, id: u64, depositor: &Address) -> Result<Option<Deposit>, GovernanceError> {
        self.get(&id_addr_key(keys::DEPOSIT, id, depositor))
    }

    pub fn set_deposit(&self, deposit: &Deposit) -> Result<(), GovernanceError> {
        self.put(
            &id_addr_key(keys::DEPOSIT, deposit.proposal_id, &deposit.depositor),
            deposit,
        )
    }

    pub fn remove_deposit(&self, id: u64, depositor: &Address) -> Result<(), GovernanceError> {
        self.kv.delete(&id_addr_key(keys::DEPOSIT, id, depositor))?;
        Ok(())
    }

    /// Deposits on one proposal, ordered by depositor.
    pub fn deposits(&self, id: u64) -> Result<Vec<Deposit>, GovernanceError> {
        self.values(&id_key(keys::DEPOSIT, id))
    }

    /// Every deposit, ordered by (proposal, depositor).
    pub fn all_deposits(&self) -> Result<Vec<Deposit>, GovernanceError> {
        self.values(&[keys::DEPOSIT])
    }

    // ── Votes ──────────────────────────────────────────────────────────

    pub fn vote(&self, id: u64, voter: &Address) -> Result<Option<Vote>, GovernanceError> {
        self.get(&id_addr_key(keys::VOTE, id, voter))
    }

    pub fn set_vote(&self, vote: &Vote) -> Result<(), GovernanceError> {
        self.put(&id_addr_key(keys::VOTE, vote.proposal_id, &vote.voter), vote)
    }

    pub fn remove_vote(&self, id: u64, voter: &Address) -> Result<(), GovernanceError> {
        self.kv.delete(&id_addr_key(keys::VOTE, id, voter))?;
        Ok(())
    }

    /// Votes on one proposal, ordered by voter.
    pub fn votes(&self, id: u64) -> Result<Vec<Vote>, GovernanceError> {
        self.values(&id_key(keys::VOTE, id))
    }

    pub fn all_votes(&self) -> Result<Vec<Vote>, GovernanceError> {
        self.values(&[keys::VOTE])
    }

    // ── Time queues ────────────────────────────────────────────────────

    pub fn insert_queue(&self, queue: Queue, time: Timestamp, id: u64) -> Result<(), GovernanceError> {
        self.kv.put(&time_id_key(queue.prefix(), time, id), &[])?;
        Ok(())
    }

    pub fn remove_queue(&self, queue: Queue, time: Timestamp, id: u64) -> Result<(), GovernanceError> {
        self.kv.delete(&time_id_key(queue.prefix(), time, id))?;
        Ok(())
    }

    /// Entries with time `<= now`, in (time, id) order.
    pub fn queue_due(&self, queue: Queue, now: Timestamp) -> Result<Vec<(Timestamp, u64)>, GovernanceError> {
        self.due_range(queue.prefix(), now)?
            .into_iter()
            .map(|(k, _)| decode_time_id(&k))
            .collect()
    }

    /// Every entry of `queue`, in (time, id) order.
    pub fn queue_entries(&self, queue: Queue) -> Result<Vec<(Timestamp, u64)>, GovernanceError> {
        self.kv
            .iter_prefix(&[queue.prefix()])?
            .into_iter()
            .map(|(k, _)| decode_time_id(&k))
            .collect()
    }

    fn due_range(&self, prefix: u8, now: Timestamp) -> Result<Vec<agora_store::KvPair>, GovernanceError> {
        let end = match now.as_secs().checked_add(1) {
            Some(next) => {
                let mut end = vec![prefix];
                end.extend_from_slice(&next.to_be_bytes());
                Some(end)
            }
            None => prefix_end(&[prefix]),
        };
        Ok(self.kv.iter_range(&[prefix], end.as_deref())?)
    }

    // ── Quorum-check queue ─────────────────────────────────────────────

    pub fn insert_quorum_check(
        &self,
        time: Timestamp,
        id: u64,
        entry: &QuorumCheckQueueEntry,
    ) -> Result<(), GovernanceError> {
        self.put(&time_id_key(keys::QUORUM_CHECK_QUEUE, time, id), entry)
    }

    pub fn remove_quorum_check(&self, time: Timestamp, id: u64) -> Result<(), GovernanceError> {
        self.kv
            .delete(&time_id_key(keys::QUORUM_CHECK_QUEUE, time, id))?;
        Ok(())
    }

    /// Checks due at `now`, in (time, id) order.
    pub fn quorum_checks_due(
        &self,
        now: Timestamp,
    ) -> Result<Vec<(Timestamp, u64, QuorumCheckQueueEntry)>, GovernanceError> {
        self.due_range(keys::QUORUM_CHECK_QUEUE, now)?
            .into_iter()
            .map(|(k, v)| {
                let (time, id) = decode_time_id(&k)?;
                let entry = bincode::deserialize(&v).map_err(encoding_error)?;
                Ok((time, id, entry))
            })
            .collect()
    }

    /// Checks scheduled at or after `from`, in (time, id) order.
    pub fn quorum_checks_from(
        &self,
        from: Timestamp,
    ) -> Result<Vec<(Timestamp, u64, QuorumCheckQueueEntry)>, GovernanceError> {
        let start = time_id_key(keys::QUORUM_CHECK_QUEUE, from, 0);
        let end = prefix_end(&[keys::QUORUM_CHECK_QUEUE]);
        self.kv
            .iter_range(&start, end.as_deref())?
            .into_iter()
            .map(|(k, v)| {
                let (time, id) = decode_time_id(&k)?;
                let entry = bincode::deserialize(&v).map_err(encoding_error)?;
                Ok((time, id, entry))
            })
            .collect()
    }

    // ── Counters ───────────────────────────────────────────────────────

    pub fn active_count(&self) -> Result<u64, GovernanceError> {
        Ok(self.get(&[keys::ACTIVE_COUNT])?.unwrap_or(0))
    }

    pub fn set_active_count(&self, n: u64) -> Result<(), GovernanceError> {
        self.put(&[keys::ACTIVE_COUNT], &n)
    }

    pub fn inactive_count(&self) -> Result<u64, GovernanceError> {
        Ok(self.get(&[keys::INACTIVE_COUNT])?.unwrap_or(0))
    }

    pub fn set_inactive_count(&self, n: u64) -> Result<(), GovernanceError> {
        self.put(&[keys::INACTIVE_COUNT], &n)
    }

    // ── Throttler anchors ──────────────────────────────────────────────

    pub fn last_min_deposit(&self) -> Result<Option<LastMinDeposit>, GovernanceError> {
        self.get(&[keys::LAST_MIN_DEPOSIT])
    }

    pub fn set_last_min_deposit(&self, last: &LastMinDeposit) -> Result<(), GovernanceError> {
        self.put(&[keys::LAST_MIN_DEPOSIT], last)
    }

    pub fn last_min_initial_deposit(&self) -> Result<Option<LastMinDeposit>, GovernanceError> {
        self.get(&[keys::LAST_MIN_INITIAL_DEPOSIT])
    }

    pub fn set_last_min_initial_deposit(&self, last: &LastMinDeposit) -> Result<(), GovernanceError> {
        self.put(&[keys::LAST_MIN_INITIAL_DEPOSIT], last)
    }

    // ── Participation EMAs ─────────────────────────────────────────────

    fn ema_key(kind: EmaKind) -> u8 {
        match kind {
            EmaKind::General => keys::EMA_GENERAL,
            EmaKind::Law => keys::EMA_LAW,
            EmaKind::ConstitutionAmendment => keys::EMA_CONSTITUTION_AMENDMENT,
        }
    }

    /// The stored EMA, `None` before the first update.
    pub fn stored_ema(&self, kind: EmaKind) -> Result<Option<Dec>, GovernanceError> {
        self.get(&[Self::ema_key(kind)])
    }

    pub fn set_ema(&self, kind: EmaKind, value: Dec) -> Result<(), GovernanceError> {
        self.put(&[Self::ema_key(kind)], &value)
    }

    // ── Constitution ───────────────────────────────────────────────────

    pub fn constitution(&self) -> Result<String, GovernanceError> {
        Ok(self.get(&[keys::CONSTITUTION])?.unwrap_or_default())
    }

    pub fn set_constitution(&self, text: &str) -> Result<(), GovernanceError> {
        self.put(&[keys::CONSTITUTION], &text.to_string())
    }

    // ── Governors ──────────────────────────────────────────────────────

    pub fn governor(&self, address: &Address) -> Result<Option<Governor>, GovernanceError> {
        self.get(&addr_key(keys::GOVERNOR, address))
    }

    pub fn set_governor(&self, governor: &Governor) -> Result<(), GovernanceError> {
        self.put(&addr_key(keys::GOVERNOR, &governor.address), governor)
    }

    /// All governors ordered by address.
    pub fn governors(&self) -> Result<Vec<Governor>, GovernanceError> {
        self.values(&[keys::GOVERNOR])
    }

    /// The governor `delegator` is assigned to.
    pub fn governance_delegation(&self, delegator: &Address) -> Result<Option<Address>, GovernanceError> {
        self.get(&addr_key(keys::GOVERNANCE_DELEGATION, delegator))
    }

    pub fn set_governance_delegation(
        &self,
        delegator: &Address,
        governor: &Address,
    ) -> Result<(), GovernanceError> {
        self.put(&addr_key(keys::GOVERNANCE_DELEGATION, delegator), governor)
    }

    pub fn remove_governance_delegation(&self, delegator: &Address) -> Result<(), GovernanceError> {
        self.kv
            .delete(&addr_key(keys::GOVERNANCE_DELEGATION, delegator))?;
        Ok(())
    }

    /// Every (delegator, governor) pair ordered by delegator.
    pub fn governance_delegations(&self) -> Result<Vec<(Address, Address)>, GovernanceError> {
        self.kv
            .iter_prefix(&[keys::GOVERNANCE_DELEGATION])?
            .into_iter()
            .map(|(k, v)| {
                let delegator = Address::new(utf8(&k[1..])?);
                let governor = bincode::deserialize(&v).map_err(encoding_error)?;
                Ok((delegator, governor))
            })
            .collect()
    }

    /// Delegators assigned to `governor`.
    pub fn delegators_of(&self, governor: &Address) -> Result<Vec<Address>, GovernanceError> {
        Ok(self
            .governance_delegations()?
            .into_iter()
            .filter(|(_, g)| g == governor)
            .map(|(d, _)| d)
            .collect())
    }

    pub fn governor_val_shares(
        &self,
        governor: &Address,
        validator: &ValidatorAddress,
    ) -> Result<Option<Dec>, GovernanceError> {
        self.get(&val_shares_key(governor, validator)?)
    }

    pub fn set_governor_val_shares(
        &self,
        governor: &Address,
        validator: &ValidatorAddress,
        shares: Dec,
    ) -> Result<(), GovernanceError> {
        self.put(&val_shares_key(governor, validator)?, &shares)
    }

    pub fn remove_governor_val_shares(
        &self,
        governor: &Address,
        validator: &ValidatorAddress,
    ) -> Result<(), GovernanceError> {
        self.kv.delete(&val_shares_key(governor, validator)?)?;
        Ok(())
    }

    /// Share totals of one governor, ordered by validator.
    pub fn governor_val_shares_of(
        &self,
        governor: &Address,
    ) -> Result<Vec<(ValidatorAddress, Dec)>, GovernanceError> {
        let prefix = governor_prefix(governor)?;
        self.kv
            .iter_prefix(&prefix)?
            .into_iter()
            .map(|(k, v)| {
                let validator = ValidatorAddress::new(utf8(&k[prefix.len()..])?);
                let shares = bincode::deserialize(&v).map_err(encoding_error)?;
                Ok((validator, shares))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_nullables::MemStore;

    #[test]
    fn test_queue_due_is_inclusive_and_ordered() {
        let store = MemStore::new();
        let state = GovState::new(&store);
        state.insert_queue(Queue::Active, Timestamp::new(20), 2).unwrap();
        state.insert_queue(Queue::Active, Timestamp::new(10), 7).unwrap();
        state.insert_queue(Queue::Active, Timestamp::new(10), 3).unwrap();
        state.insert_queue(Queue::Active, Timestamp::new(21), 1).unwrap();
        state.insert_queue(Queue::Inactive, Timestamp::new(5), 9).unwrap();

        let due = state.queue_due(Queue::Active, Timestamp::new(20)).unwrap();
        assert_eq!(
            due,
            vec![
                (Timestamp::new(10), 3),
                (Timestamp::new(10), 7),
                (Timestamp::new(20), 2)
            ]
        );
        assert!(state.queue_due(Queue::Active, Timestamp::new(9)).unwrap().is_empty());
    }

    #[test]
    fn test_queue_due_at_end_of_time() {
        let store = MemStore::new();
        let state = GovState::new(&store);
        state.insert_queue(Queue::Inactive, Timestamp::new(u64::MAX), 1).unwrap();
        let due = state.queue_due(Queue::Inactive, Timestamp::new(u64::MAX)).unwrap();
        assert_eq!(due.len(), 1);
    }

    #[test]
    fn test_governor_prefixes_do_not_collide() {
        let store = MemStore::new();
        let state = GovState::new(&store);
        let short = Address::new("agora1gov");
        let long = Address::new("agora1govx");
        let val = ValidatorAddress::new("agoravaloper1a");
        state.set_governor_val_shares(&short, &val, Dec::from_int(1)).unwrap();
        state.set_governor_val_shares(&long, &val, Dec::from_int(2)).unwrap();
        assert_eq!(
            state.governor_val_shares_of(&short).unwrap(),
            vec![(val.clone(), Dec::from_int(1))]
        );
        assert_eq!(
            state.governor_val_shares_of(&long).unwrap(),
            vec![(val, Dec::from_int(2))]
        );
    }

    #[test]
    fn test_governor_longer_than_255_bytes_keeps_its_own_prefix() {
        let store = MemStore::new();
        let state = GovState::new(&store);
        // 300 bytes would wrap to 44 under a one-byte length
        let long = Address::new(format!("agora1{}", "g".repeat(294)));
        let short = Address::new(format!("agora1{}", "g".repeat(38)));
        assert_eq!(long.as_bytes().len(), 300);
        assert_eq!(short.as_bytes().len(), 44);
        let val = ValidatorAddress::new("agoravaloper1a");
        state.set_governor_val_shares(&long, &val, Dec::from_int(3)).unwrap();
        state.set_governor_val_shares(&short, &val, Dec::from_int(4)).unwrap();
        assert_eq!(
            state.governor_val_shares_of(&short).unwrap(),
            vec![(val.clone(), Dec::from_int(4))]
        );
        assert_eq!(
            state.governor_val_shares(&long, &val).unwrap(),
            Some(Dec::from_int(3))
        );
    }

    #[test]
    fn test_governance_delegations_roundtrip() {
        let store = MemStore::new();
        let state = GovState::new(&store);
        let gov = Address::new("agora1gov");
        state
            .set_governance_delegation(&Address::new("agora1bob"), &gov)
            .unwrap();
        state
            .set_governance_delegation(&Address::new("agora1alice"), &gov)
            .unwrap();
        let all = state.governance_delegations().unwrap();
        assert_eq!(all[0].0, Address::new("agora1alice"));
        assert_eq!(state.delegators_of(&gov).unwrap().len(), 2);
        state
            .remove_governance_delegation(&Address::new("agora1bob"))
            .unwrap();
        assert!(state
            .governance_delegation(&Address::new("agora1bob"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_defaults_when_empty() {
        let store = MemStore::new();
        let state = GovState::new(&store);
        assert_eq!(state.params().unwrap(), Params::default());
        assert_eq!(state.active_count().unwrap(), 0);
        assert_eq!(state.constitution().unwrap(), "");
        assert!(state.stored_ema(EmaKind::Law).unwrap().is_none());
        assert!(state.next_proposal_id().unwrap().is_none());
    }
}
