//! Journaled world state
//!
//! Accounts, persistent and transient storage, the access list, the refund
//! counter and emitted logs. Every mutator journals the inverse change before
//! applying it; [`JournaledState::revert_to_snapshot`] replays the journal
//! tail in reverse.
//!
//! Accounts are cached as `Option<Account>`: `None` records an address known
//! to be absent (never existed in the backend, or destroyed) so the backend
//! is not consulted again.

mod access_list;
mod account;
mod backend;
mod journal;
mod log;

use std::collections::HashMap;
use std::mem;

use bytes::Bytes;
use ember_primitives::{Address, H256, U256};
use tracing::{debug, error};

use crate::config::Rules;
use crate::error::{EvmError, EvmResult};

pub use access_list::AccessList;
pub use account::{Account, AccountInfo, StorageSlot};
pub use backend::{MemoryBackend, StateBackend};
pub use journal::{Journal, JournalEntry};
pub use log::Log;

/// Journaled state for one chain of transactions
#[derive(Default)]
pub struct JournaledState {
    accounts: HashMap<Address, Option<Account>>,
    backend: Option<Box<dyn StateBackend>>,
    journal: Journal,
    access_list: AccessList,
    transient: HashMap<(Address, U256), U256>,
    refund: u64,
    logs: Vec<Log>,
}

impl std::fmt::Debug for JournaledState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournaledState")
            .field("accounts", &self.accounts.len())
            .field("has_backend", &self.backend.is_some())
            .field("journal", &self.journal.len())
            .field("refund", &self.refund)
            .field("logs", &self.logs.len())
            .finish()
    }
}

impl JournaledState {
    /// Memory-only state
    pub fn new() -> Self {
        Self::default()
    }

    /// State reading through to `backend` for accounts and slots it has not
    /// seen yet
    pub fn with_backend(backend: Box<dyn StateBackend>) -> Self {
        Self {
            backend: Some(backend),
            ..Self::default()
        }
    }

    /// Insert an account without journaling (fixture and genesis loading)
    pub fn insert_account(&mut self, address: Address, account: Account) {
        self.accounts.insert(address, Some(account));
    }

    /// Cached account, without consulting the backend
    pub fn account(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address).and_then(Option::as_ref)
    }

    /// All cached live accounts
    pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
        self.accounts
            .iter()
            .filter_map(|(address, account)| account.as_ref().map(|a| (address, a)))
    }

    /// Backend consulted for uncached accounts and slots
    pub fn backend(&self) -> Option<&dyn StateBackend> {
        self.backend.as_deref()
    }

    /// Addresses cached as absent (destroyed or never existing)
    pub fn absent_addresses(&self) -> impl Iterator<Item = &Address> {
        self.accounts
            .iter()
            .filter(|(_, account)| account.is_none())
            .map(|(address, _)| address)
    }

    // ==================== Loading ====================

    fn fetch_account(&self, address: &Address) -> Option<Account> {
        let backend = self.backend.as_deref()?;
        match backend.get_account(address) {
            Ok(info) => info.map(Account::from_info),
            Err(e) => {
                error!(%address, error = %e, "state backend account read failed");
                None
            }
        }
    }

    fn load(&mut self, address: &Address) -> Option<&mut Account> {
        if !self.accounts.contains_key(address) {
            let loaded = self.fetch_account(address);
            self.accounts.insert(*address, loaded);
        }
        self.accounts.get_mut(address).and_then(Option::as_mut)
    }

    /// Existing account, or a new empty one created under the journal
    fn account_mut(&mut self, address: Address) -> &mut Account {
        if self.load(&address).is_none() {
            self.journal.push(JournalEntry::CreateAccount {
                address,
                prev: None,
            });
        }
        self.accounts
            .entry(address)
            .or_default()
            .get_or_insert_with(Account::new)
    }

    fn load_slot(&mut self, address: &Address, key: &U256) -> Option<StorageSlot> {
        self.load(address)?;
        let backend = self.backend.as_deref();
        let account = self.accounts.get_mut(address)?.as_mut()?;
        if let Some(slot) = account.storage.get(key) {
            return Some(*slot);
        }
        let value = match backend {
            Some(backend) if !account.fresh_storage => match backend.get_storage(address, key) {
                Ok(value) => value,
                Err(e) => {
                    error!(%address, key = %key, error = %e, "state backend storage read failed");
                    U256::zero()
                }
            },
            _ => U256::zero(),
        };
        let slot = StorageSlot::new(value);
        account.storage.insert(*key, slot);
        Some(slot)
    }

    // ==================== Accounts ====================

    /// Explicit account creation (CREATE/CREATE2). Keeps any balance already
    /// sent to the address; everything else starts fresh.
    pub fn create_account(&mut self, address: Address) {
        let prev = self.load(&address).map(|a| Box::new(a.clone()));
        let balance = prev.as_ref().map(|a| a.balance).unwrap_or_default();
        let mut account = Account::new().with_balance(balance);
        account.created = true;
        account.touched = true;
        self.journal.push(JournalEntry::CreateAccount { address, prev });
        self.accounts.insert(address, Some(account));
    }

    /// Account exists
    pub fn exist(&mut self, address: &Address) -> bool {
        self.load(address).is_some()
    }

    /// Account is absent or empty (EIP-161)
    pub fn empty(&mut self, address: &Address) -> bool {
        self.load(address).map_or(true, |a| a.is_empty())
    }

    /// Mark an existing account as touched
    pub fn touch(&mut self, address: &Address) {
        if let Some(account) = self.load(address) {
            if !account.touched {
                account.touched = true;
                self.journal.push(JournalEntry::Touched { address: *address });
            }
        }
    }

    /// Balance, zero for absent accounts
    pub fn get_balance(&mut self, address: &Address) -> U256 {
        self.load(address).map(|a| a.balance).unwrap_or_default()
    }

    /// Credit `value`, creating the account if needed
    pub fn add_balance(&mut self, address: Address, value: U256) {
        let account = self.account_mut(address);
        let prev = account.balance;
        account.balance = prev.saturating_add(value);
        self.journal.push(JournalEntry::Balance { address, prev });
        self.touch(&address);
    }

    /// Debit `value`; fails without change when the balance is too low
    pub fn sub_balance(&mut self, address: Address, value: U256) -> EvmResult<()> {
        let account = self.account_mut(address);
        let prev = account.balance;
        if prev < value {
            return Err(EvmError::InsufficientBalance);
        }
        account.balance = prev - value;
        self.journal.push(JournalEntry::Balance { address, prev });
        self.touch(&address);
        Ok(())
    }

    /// Move `value` between accounts
    pub fn transfer(&mut self, from: Address, to: Address, value: U256) -> EvmResult<()> {
        if self.get_balance(&from) < value {
            return Err(EvmError::InsufficientBalance);
        }
        self.sub_balance(from, value)?;
        self.add_balance(to, value);
        Ok(())
    }

    /// Nonce, zero for absent accounts
    pub fn get_nonce(&mut self, address: &Address) -> u64 {
        self.load(address).map(|a| a.nonce).unwrap_or_default()
    }

    /// Set the nonce, creating the account if needed
    pub fn set_nonce(&mut self, address: Address, nonce: u64) {
        let account = self.account_mut(address);
        let prev = account.nonce;
        account.nonce = nonce;
        self.journal.push(JournalEntry::Nonce { address, prev });
    }

    /// Code, empty for absent accounts
    pub fn get_code(&mut self, address: &Address) -> Bytes {
        self.load(address).map(|a| a.code.clone()).unwrap_or_default()
    }

    /// Replace the code
    pub fn set_code(&mut self, address: Address, code: Bytes) {
        let account = self.account_mut(address);
        let prev_code = mem::take(&mut account.code);
        let prev_hash = account.code_hash;
        account.set_code(code);
        self.journal.push(JournalEntry::Code {
            address,
            prev_code,
            prev_hash,
        });
    }

    /// Code hash; zero for absent accounts, `KECCAK_EMPTY` for accounts
    /// without code
    pub fn get_code_hash(&mut self, address: &Address) -> H256 {
        self.load(address).map(|a| a.code_hash).unwrap_or(H256::ZERO)
    }

    /// Code length in bytes
    pub fn get_code_size(&mut self, address: &Address) -> usize {
        self.load(address).map_or(0, |a| a.code.len())
    }

    // ==================== Storage ====================

    /// Current slot value, zero when absent
    pub fn get_state(&mut self, address: &Address, key: &U256) -> U256 {
        self.load_slot(address, key)
            .map(|slot| slot.present)
            .unwrap_or_default()
    }

    /// Slot value at the start of the transaction
    pub fn get_original_state(&mut self, address: &Address, key: &U256) -> U256 {
        self.load_slot(address, key)
            .map(|slot| slot.original)
            .unwrap_or_default()
    }

    /// Write a slot, creating the account if needed
    pub fn set_state(&mut self, address: Address, key: U256, value: U256) {
        let prev = self.get_state(&address, &key);
        let account = self.account_mut(address);
        account
            .storage
            .entry(key)
            .or_insert_with(|| StorageSlot::new(prev))
            .present = value;
        self.journal.push(JournalEntry::Storage { address, key, prev });
    }

    /// Transient slot value (EIP-1153)
    pub fn get_transient_state(&self, address: &Address, key: &U256) -> U256 {
        self.transient
            .get(&(*address, *key))
            .copied()
            .unwrap_or_default()
    }

    /// Write a transient slot
    pub fn set_transient_state(&mut self, address: Address, key: U256, value: U256) {
        let prev = self.get_transient_state(&address, &key);
        if prev == value {
            return;
        }
        self.journal.push(JournalEntry::Transient { address, key, prev });
        self.write_transient(address, key, value);
    }

    fn write_transient(&mut self, address: Address, key: U256, value: U256) {
        if value.is_zero() {
            self.transient.remove(&(address, key));
        } else {
            self.transient.insert((address, key), value);
        }
    }

    // ==================== Self-destruct ====================

    /// Mark the account destroyed and zero its balance. Returns false if the
    /// account does not exist.
    pub fn suicide(&mut self, address: &Address) -> bool {
        let Some(account) = self.load(address) else {
            return false;
        };
        let entry = JournalEntry::Suicide {
            address: *address,
            prev_suicided: account.suicided,
            prev_balance: account.balance,
        };
        account.suicided = true;
        account.balance = U256::zero();
        self.journal.push(entry);
        true
    }

    /// SELFDESTRUCT already executed this transaction
    pub fn has_suicided(&mut self, address: &Address) -> bool {
        self.load(address).is_some_and(|a| a.suicided)
    }

    /// Created this transaction (EIP-6780)
    pub fn is_created(&mut self, address: &Address) -> bool {
        self.load(address).is_some_and(|a| a.created)
    }

    // ==================== Access list ====================

    /// Warm an address; returns true if it was cold
    pub fn add_address_to_access_list(&mut self, address: Address) -> bool {
        let added = self.access_list.insert_address(address);
        if added {
            self.journal.push(JournalEntry::AccessListAdd { address });
        }
        added
    }

    /// Warm a slot (and its address); returns true if the slot was cold
    pub fn add_slot_to_access_list(&mut self, address: Address, key: U256) -> bool {
        let (address_added, slot_added) = self.access_list.insert_slot(address, key);
        if address_added {
            self.journal.push(JournalEntry::AccessListAdd { address });
        }
        if slot_added {
            self.journal
                .push(JournalEntry::AccessListSlotAdd { address, key });
        }
        slot_added
    }

    /// Address is warm
    pub fn address_in_access_list(&self, address: &Address) -> bool {
        self.access_list.contains_address(address)
    }

    /// (address warm, slot warm)
    pub fn slot_in_access_list(&self, address: &Address, key: &U256) -> (bool, bool) {
        self.access_list.contains_slot(address, key)
    }

    // ==================== Refunds ====================

    /// Add to the refund counter
    pub fn add_refund(&mut self, gas: u64) {
        self.journal.push(JournalEntry::Refund { prev: self.refund });
        self.refund = self.refund.saturating_add(gas);
    }

    /// Subtract from the refund counter
    pub fn sub_refund(&mut self, gas: u64) {
        self.journal.push(JournalEntry::Refund { prev: self.refund });
        if gas > self.refund {
            debug!(refund = self.refund, gas, "refund counter below zero, clamping");
        }
        self.refund = self.refund.saturating_sub(gas);
    }

    /// Apply a signed refund delta
    pub fn adjust_refund(&mut self, delta: i64) {
        match delta {
            0 => {}
            d if d > 0 => self.add_refund(d.unsigned_abs()),
            d => self.sub_refund(d.unsigned_abs()),
        }
    }

    /// Current refund counter
    pub fn get_refund(&self) -> u64 {
        self.refund
    }

    // ==================== Logs ====================

    /// Append a log
    pub fn add_log(&mut self, log: Log) {
        self.logs.push(log);
        self.journal.push(JournalEntry::AddLog);
    }

    /// Logs emitted so far in this transaction
    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    // ==================== Snapshots ====================

    /// Snapshot id: the current journal length
    pub fn snapshot(&self) -> usize {
        self.journal.len()
    }

    /// Undo every change made after `snapshot`
    pub fn revert_to_snapshot(&mut self, snapshot: usize) {
        let entries: Vec<_> = self.journal.drain_after(snapshot).collect();
        for entry in entries {
            self.undo(entry);
        }
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::CreateAccount { address, prev } => {
                self.accounts.insert(address, prev.map(|a| *a));
            }
            JournalEntry::Balance { address, prev } => {
                if let Some(account) = self.cached_mut(&address) {
                    account.balance = prev;
                }
            }
            JournalEntry::Nonce { address, prev } => {
                if let Some(account) = self.cached_mut(&address) {
                    account.nonce = prev;
                }
            }
            JournalEntry::Code {
                address,
                prev_code,
                prev_hash,
            } => {
                if let Some(account) = self.cached_mut(&address) {
                    account.code = prev_code;
                    account.code_hash = prev_hash;
                }
            }
            JournalEntry::Storage { address, key, prev } => {
                if let Some(slot) = self
                    .cached_mut(&address)
                    .and_then(|a| a.storage.get_mut(&key))
                {
                    slot.present = prev;
                }
            }
            JournalEntry::Transient { address, key, prev } => {
                self.write_transient(address, key, prev);
            }
            JournalEntry::Suicide {
                address,
                prev_suicided,
                prev_balance,
            } => {
                if let Some(account) = self.cached_mut(&address) {
                    account.suicided = prev_suicided;
                    account.balance = prev_balance;
                }
            }
            JournalEntry::Touched { address } => {
                if let Some(account) = self.cached_mut(&address) {
                    account.touched = false;
                }
            }
            JournalEntry::AccessListAdd { address } => {
                self.access_list.remove_address(&address);
            }
            JournalEntry::AccessListSlotAdd { address, key } => {
                self.access_list.remove_slot(&address, &key);
            }
            JournalEntry::Refund { prev } => {
                self.refund = prev;
            }
            JournalEntry::AddLog => {
                self.logs.pop();
            }
        }
    }

    fn cached_mut(&mut self, address: &Address) -> Option<&mut Account> {
        self.accounts.get_mut(address).and_then(Option::as_mut)
    }

    // ==================== Transaction boundary ====================

    /// Close the transaction: delete destroyed accounts (EIP-6780 from
    /// Cancun) and touched empty accounts (EIP-161), commit storage
    /// originals, and clear the journal, transient storage, access list and
    /// refund counter. Returns the transaction's logs.
    pub fn finalize(&mut self, rules: &Rules) -> Vec<Log> {
        for (address, entry) in self.accounts.iter_mut() {
            let Some(account) = entry else { continue };
            let destroyed = account.suicided && (account.created || !rules.is_cancun);
            let dead = rules.is_eip158 && account.touched && account.is_empty();
            if destroyed || dead {
                debug!(%address, destroyed, "deleting account at transaction end");
                *entry = None;
                continue;
            }
            account.suicided = false;
            account.created = false;
            account.touched = false;
            for slot in account.storage.values_mut() {
                slot.original = slot.present;
            }
        }
        self.journal.clear();
        self.access_list.clear();
        self.transient.clear();
        self.refund = 0;
        mem::take(&mut self.logs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_crypto::KECCAK_EMPTY;
    use proptest::prelude::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64(n)
    }

    fn word(n: u64) -> U256 {
        U256::from(n)
    }

    #[test]
    fn test_absent_account_defaults() {
        let mut state = JournaledState::new();
        let a = addr(1);
        assert!(!state.exist(&a));
        assert!(state.empty(&a));
        assert_eq!(state.get_balance(&a), U256::zero());
        assert_eq!(state.get_nonce(&a), 0);
        assert_eq!(state.get_code_hash(&a), H256::ZERO);
        assert_eq!(state.get_code_size(&a), 0);
        assert_eq!(state.get_state(&a, &word(1)), U256::zero());
    }

    #[test]
    fn test_balance_changes() {
        let mut state = JournaledState::new();
        let a = addr(1);
        state.add_balance(a, word(100));
        assert!(state.exist(&a));
        assert_eq!(state.get_balance(&a), word(100));

        state.sub_balance(a, word(30)).unwrap();
        assert_eq!(state.get_balance(&a), word(70));

        assert_eq!(
            state.sub_balance(a, word(71)),
            Err(EvmError::InsufficientBalance)
        );
        assert_eq!(state.get_balance(&a), word(70));
    }

    #[test]
    fn test_transfer() {
        let mut state = JournaledState::new();
        state.add_balance(addr(1), word(50));
        state.transfer(addr(1), addr(2), word(20)).unwrap();
        assert_eq!(state.get_balance(&addr(1)), word(30));
        assert_eq!(state.get_balance(&addr(2)), word(20));
        assert!(state.transfer(addr(2), addr(1), word(21)).is_err());
    }

    #[test]
    fn test_code_and_hash() {
        let mut state = JournaledState::new();
        let a = addr(1);
        state.add_balance(a, word(1));
        assert_eq!(state.get_code_hash(&a), KECCAK_EMPTY);

        state.set_code(a, Bytes::from_static(&[0x60, 0x00]));
        assert_eq!(state.get_code_size(&a), 2);
        assert_eq!(state.get_code(&a).as_ref(), &[0x60, 0x00]);
        assert_ne!(state.get_code_hash(&a), KECCAK_EMPTY);
    }

    #[test]
    fn test_storage_original_value() {
        let mut state = JournaledState::new();
        let a = addr(1);
        state.insert_account(a, Account::new().with_storage([(word(1), word(5))]));

        state.set_state(a, word(1), word(9));
        assert_eq!(state.get_state(&a, &word(1)), word(9));
        assert_eq!(state.get_original_state(&a, &word(1)), word(5));

        state.finalize(&Rules::cancun());
        assert_eq!(state.get_original_state(&a, &word(1)), word(9));
    }

    #[test]
    fn test_revert_restores_everything() {
        let mut state = JournaledState::new();
        let a = addr(1);
        state.insert_account(
            a,
            Account::new()
                .with_balance(word(10))
                .with_storage([(word(1), word(1))]),
        );

        let snap = state.snapshot();
        state.add_balance(a, word(5));
        state.set_nonce(a, 7);
        state.set_code(a, Bytes::from_static(&[0x00]));
        state.set_state(a, word(1), word(2));
        state.set_transient_state(a, word(3), word(4));
        state.add_slot_to_access_list(a, word(1));
        state.add_refund(100);
        state.add_log(Log {
            address: a,
            topics: vec![],
            data: Bytes::new(),
        });
        state.add_balance(addr(2), word(1));
        state.suicide(&a);
        state.revert_to_snapshot(snap);

        assert_eq!(state.get_balance(&a), word(10));
        assert_eq!(state.get_nonce(&a), 0);
        assert_eq!(state.get_code_size(&a), 0);
        assert_eq!(state.get_state(&a, &word(1)), word(1));
        assert_eq!(state.get_transient_state(&a, &word(3)), U256::zero());
        assert!(!state.address_in_access_list(&a));
        assert_eq!(state.get_refund(), 0);
        assert!(state.logs().is_empty());
        assert!(!state.exist(&addr(2)));
        assert!(!state.has_suicided(&a));
    }

    #[test]
    fn test_nested_snapshots() {
        let mut state = JournaledState::new();
        let a = addr(1);
        let outer = state.snapshot();
        state.set_state(a, word(1), word(1));
        let inner = state.snapshot();
        state.set_state(a, word(1), word(2));
        state.revert_to_snapshot(inner);
        assert_eq!(state.get_state(&a, &word(1)), word(1));
        state.revert_to_snapshot(outer);
        assert_eq!(state.get_state(&a, &word(1)), U256::zero());
        assert!(!state.exist(&a));
    }

    #[test]
    fn test_create_account_keeps_balance() {
        let mut state = JournaledState::new();
        let a = addr(9);
        state.insert_account(
            a,
            Account::new()
                .with_balance(word(3))
                .with_storage([(word(1), word(1))]),
        );
        let snap = state.snapshot();
        state.create_account(a);
        assert_eq!(state.get_balance(&a), word(3));
        assert_eq!(state.get_state(&a, &word(1)), U256::zero());
        assert!(state.is_created(&a));

        state.revert_to_snapshot(snap);
        assert_eq!(state.get_state(&a, &word(1)), word(1));
        assert!(!state.is_created(&a));
    }

    #[test]
    fn test_access_list_warmth() {
        let mut state = JournaledState::new();
        let a = addr(1);
        assert!(state.add_address_to_access_list(a));
        assert!(!state.add_address_to_access_list(a));
        assert!(state.add_slot_to_access_list(a, word(1)));
        assert!(!state.add_slot_to_access_list(a, word(1)));
        assert_eq!(state.slot_in_access_list(&a, &word(1)), (true, true));
        assert_eq!(state.slot_in_access_list(&addr(2), &word(1)), (false, false));
    }

    #[test]
    fn test_refund_counter() {
        let mut state = JournaledState::new();
        state.adjust_refund(4800);
        state.adjust_refund(-800);
        assert_eq!(state.get_refund(), 4000);
        state.sub_refund(10_000);
        assert_eq!(state.get_refund(), 0);
    }

    #[test]
    fn test_transient_cleared_at_finalize() {
        let mut state = JournaledState::new();
        state.set_transient_state(addr(1), word(1), word(0xcc));
        assert_eq!(state.get_transient_state(&addr(1), &word(1)), word(0xcc));
        state.finalize(&Rules::cancun());
        assert_eq!(state.get_transient_state(&addr(1), &word(1)), U256::zero());
    }

    #[test]
    fn test_finalize_selfdestruct_cancun() {
        let rules = Rules::cancun();
        let mut state = JournaledState::new();

        // Created this transaction: deleted
        state.create_account(addr(1));
        state.set_nonce(addr(1), 1);
        state.suicide(&addr(1));

        // Pre-existing: survives under EIP-6780
        state.insert_account(addr(2), Account::new().with_nonce(1));
        state.suicide(&addr(2));

        state.finalize(&rules);
        assert!(!state.exist(&addr(1)));
        assert!(state.exist(&addr(2)));
        assert!(!state.has_suicided(&addr(2)));
    }

    #[test]
    fn test_finalize_selfdestruct_pre_cancun() {
        let shanghai = crate::config::ChainConfig::for_fork("Shanghai")
            .unwrap()
            .rules(0, 0);
        let mut state = JournaledState::new();
        state.insert_account(addr(2), Account::new().with_nonce(1));
        state.suicide(&addr(2));
        state.finalize(&shanghai);
        assert!(!state.exist(&addr(2)));
    }

    #[test]
    fn test_finalize_touched_empty_deleted() {
        let mut state = JournaledState::new();
        state.insert_account(addr(1), Account::new());
        state.insert_account(addr(2), Account::new());
        state.add_balance(addr(1), U256::zero());
        let logs = state.finalize(&Rules::cancun());

        assert!(logs.is_empty());
        assert!(!state.exist(&addr(1)));
        // Untouched empty accounts are left alone
        assert!(state.exist(&addr(2)));
    }

    #[test]
    fn test_backend_read_through() {
        let mut backend = MemoryBackend::new();
        let a = addr(5);
        backend.insert_account(
            a,
            AccountInfo {
                nonce: 2,
                balance: word(1000),
                code: Bytes::new(),
            },
        );
        backend.insert_storage(a, word(1), word(42));

        let mut state = JournaledState::with_backend(Box::new(backend));
        assert_eq!(state.get_nonce(&a), 2);
        assert_eq!(state.get_state(&a, &word(1)), word(42));
        assert_eq!(state.get_original_state(&a, &word(1)), word(42));

        // Destroyed accounts shadow the backend
        state.create_account(a);
        state.suicide(&a);
        state.finalize(&Rules::cancun());
        assert!(!state.exist(&a));
        assert_eq!(state.absent_addresses().count(), 1);
    }

    #[derive(Clone, Debug)]
    enum Op {
        AddBalance(u8, u64),
        SetNonce(u8, u64),
        SetState(u8, u8, u64),
        SetTransient(u8, u8, u64),
        WarmSlot(u8, u8),
        Refund(i32),
        Suicide(u8),
        Create(u8),
        Log(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..4, any::<u64>()).prop_map(|(a, v)| Op::AddBalance(a, v)),
            (0u8..4, any::<u64>()).prop_map(|(a, v)| Op::SetNonce(a, v)),
            (0u8..4, 0u8..4, any::<u64>()).prop_map(|(a, k, v)| Op::SetState(a, k, v)),
            (0u8..4, 0u8..4, any::<u64>()).prop_map(|(a, k, v)| Op::SetTransient(a, k, v)),
            (0u8..4, 0u8..4).prop_map(|(a, k)| Op::WarmSlot(a, k)),
            any::<i32>().prop_map(Op::Refund),
            (0u8..4).prop_map(Op::Suicide),
            (0u8..4).prop_map(Op::Create),
            (0u8..4).prop_map(Op::Log),
        ]
    }

    fn apply(state: &mut JournaledState, op: &Op) {
        let a = |n: &u8| addr(*n as u64 + 1);
        match op {
            Op::AddBalance(n, v) => state.add_balance(a(n), word(*v)),
            Op::SetNonce(n, v) => state.set_nonce(a(n), *v),
            Op::SetState(n, k, v) => state.set_state(a(n), word(*k as u64), word(*v)),
            Op::SetTransient(n, k, v) => state.set_transient_state(a(n), word(*k as u64), word(*v)),
            Op::WarmSlot(n, k) => {
                state.add_slot_to_access_list(a(n), word(*k as u64));
            }
            Op::Refund(d) => state.adjust_refund(*d as i64),
            Op::Suicide(n) => {
                state.suicide(&a(n));
            }
            Op::Create(n) => state.create_account(a(n)),
            Op::Log(n) => state.add_log(Log {
                address: a(n),
                topics: vec![],
                data: Bytes::new(),
            }),
        }
    }

    type View = Vec<(bool, U256, u64, H256, bool, Vec<(U256, U256, U256, bool)>)>;

    fn observe(state: &mut JournaledState) -> (View, u64, usize) {
        let mut view = Vec::new();
        for n in 1..=4u64 {
            let a = addr(n);
            let slots = (0..4u64)
                .map(|k| {
                    let key = word(k);
                    (
                        state.get_state(&a, &key),
                        state.get_original_state(&a, &key),
                        state.get_transient_state(&a, &key),
                        state.slot_in_access_list(&a, &key).1,
                    )
                })
                .collect();
            view.push((
                state.exist(&a),
                state.get_balance(&a),
                state.get_nonce(&a),
                state.get_code_hash(&a),
                state.has_suicided(&a),
                slots,
            ));
        }
        (view, state.get_refund(), state.logs().len())
    }

    proptest! {
        #[test]
        fn prop_snapshot_revert_restores_view(
            before in proptest::collection::vec(op_strategy(), 0..16),
            after in proptest::collection::vec(op_strategy(), 0..32),
        ) {
            let mut state = JournaledState::new();
            for op in &before {
                apply(&mut state, op);
            }
            let expected = observe(&mut state);
            let snap = state.snapshot();
            for op in &after {
                apply(&mut state, op);
            }
            state.revert_to_snapshot(snap);
            prop_assert_eq!(observe(&mut state), expected);
        }
    }
}
