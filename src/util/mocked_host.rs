use crate::{host::*, Message, Output, StatusCode};
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use parking_lot::Mutex;
use std::{cmp::min, collections::HashMap};

/// One storage slot of a mocked account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageValue {
    pub value: H256,
    /// Already modified in the current execution; drives the storage status
    /// reported for repeated writes.
    pub dirty: bool,
}

/// A mocked Ethereum account.
#[derive(Clone, Debug, Default)]
pub struct Account {
    /// The account nonce.
    pub nonce: u64,
    /// The account code.
    pub code: Bytes,
    /// The code hash. Can be a value not related to the actual code.
    pub code_hash: H256,
    /// The account balance.
    pub balance: U256,
    /// The account storage map.
    pub storage: HashMap<H256, StorageValue>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// The address of the account which created the log.
    pub creator: Address,
    /// The data attached to the log.
    pub data: Bytes,
    /// The log topics.
    pub topics: Vec<H256>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelfdestructRecord {
    /// The address of the account which has self-destructed.
    pub selfdestructed: Address,
    /// The address of the beneficiary account.
    pub beneficiary: Address,
}

/// Everything the host was asked to do, in order.
#[derive(Clone, Debug, Default)]
pub struct Recorded {
    pub account_accesses: Vec<Address>,
    pub calls: Vec<Message>,
    pub logs: Vec<LogRecord>,
    pub selfdestructs: Vec<SelfdestructRecord>,
    pub blockhashes: Vec<u64>,
}

/// In-memory host mock for tests.
#[derive(Debug)]
pub struct MockedHost {
    pub accounts: HashMap<Address, Account>,
    pub tx_context: TxContext,
    pub block_hash: H256,
    /// Output returned for every nested call.
    pub call_result: Output,
    pub recorded: Mutex<Recorded>,
}

impl Default for MockedHost {
    fn default() -> Self {
        Self {
            accounts: Default::default(),
            tx_context: Default::default(),
            block_hash: H256::zero(),
            call_result: Output {
                status_code: StatusCode::Success,
                gas_left: 0,
                output_data: Bytes::new(),
                create_address: None,
            },
            recorded: Default::default(),
        }
    }
}

impl Clone for MockedHost {
    fn clone(&self) -> Self {
        Self {
            accounts: self.accounts.clone(),
            tx_context: self.tx_context.clone(),
            block_hash: self.block_hash,
            call_result: self.call_result.clone(),
            recorded: Mutex::new(self.recorded.lock().clone()),
        }
    }
}

impl Host for MockedHost {
    fn account_exists(&self, address: Address) -> bool {
        self.recorded.lock().account_accesses.push(address);
        self.accounts.contains_key(&address)
    }

    fn get_storage(&self, address: Address, key: H256) -> H256 {
        self.accounts
            .get(&address)
            .and_then(|account| account.storage.get(&key))
            .map(|slot| slot.value)
            .unwrap_or_default()
    }

    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> StorageStatus {
        let slot = self
            .accounts
            .entry(address)
            .or_default()
            .storage
            .entry(key)
            .or_default();

        let status = if slot.value == value {
            StorageStatus::Unchanged
        } else if slot.dirty {
            StorageStatus::ModifiedAgain
        } else if slot.value.is_zero() {
            StorageStatus::Added
        } else if value.is_zero() {
            StorageStatus::Deleted
        } else {
            StorageStatus::Modified
        };

        slot.value = value;
        slot.dirty = true;

        status
    }

    fn get_balance(&self, address: Address) -> U256 {
        self.accounts
            .get(&address)
            .map(|account| account.balance)
            .unwrap_or_default()
    }

    fn get_code_size(&self, address: Address) -> U256 {
        self.accounts
            .get(&address)
            .map(|account| account.code.len().into())
            .unwrap_or_default()
    }

    fn get_code_hash(&self, address: Address) -> H256 {
        self.accounts
            .get(&address)
            .map(|account| account.code_hash)
            .unwrap_or_default()
    }

    fn copy_code(&self, address: Address, offset: usize, buffer: &mut [u8]) -> usize {
        let code = match self.accounts.get(&address) {
            Some(account) => &account.code,
            None => return 0,
        };

        if offset >= code.len() {
            return 0;
        }

        let n = min(buffer.len(), code.len() - offset);
        buffer[..n].copy_from_slice(&code[offset..offset + n]);

        n
    }

    fn selfdestruct(&mut self, address: Address, beneficiary: Address) {
        self.recorded.lock().selfdestructs.push(SelfdestructRecord {
            selfdestructed: address,
            beneficiary,
        });
    }

    fn call(&mut self, msg: &Message) -> Output {
        self.recorded.lock().calls.push(msg.clone());
        self.call_result.clone()
    }

    fn get_tx_context(&self) -> TxContext {
        self.tx_context.clone()
    }

    fn get_block_hash(&self, block_number: u64) -> H256 {
        self.recorded.lock().blockhashes.push(block_number);
        self.block_hash
    }

    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[H256]) {
        self.recorded.lock().logs.push(LogRecord {
            creator: address,
            data: Bytes::copy_from_slice(data),
            topics: topics.to_vec(),
        });
    }
}
