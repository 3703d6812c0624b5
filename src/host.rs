use crate::common::{Message, Output};
use ethereum_types::{Address, H256, U256};

/// Effect of a storage write, as reported by the host.
///
/// Feeds the revision-specific SSTORE gas and refund schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageStatus {
    /// The value of a storage item has been left unchanged: 0 -> 0 and X -> X.
    Unchanged,
    /// The value of a storage item has been modified: X -> Y.
    Modified,
    /// A storage item has been modified after being modified before: X -> Y -> Z.
    ModifiedAgain,
    /// A new storage item has been added: 0 -> X.
    Added,
    /// A storage item has been deleted: X -> 0.
    Deleted,
}

/// The transaction and block data for execution.
#[derive(Clone, Debug, Default)]
pub struct TxContext {
    /// The transaction gas price.
    pub tx_gas_price: U256,
    /// The transaction origin account.
    pub tx_origin: Address,
    /// The miner of the block.
    pub block_coinbase: Address,
    /// The block number.
    pub block_number: u64,
    /// The block timestamp.
    pub block_timestamp: u64,
    /// The block gas limit.
    pub block_gas_limit: u64,
    /// The block difficulty.
    pub block_difficulty: U256,
    /// The blockchain's ChainID.
    pub chain_id: U256,
}

/// Abstraction that exposes host context to EVM.
///
/// Calls are synchronous; a nested `call` recurses through the interpreter's
/// entry point on the same thread. Failures of nested executions are carried
/// in the returned [`Output`], never out of band.
pub trait Host {
    /// Check if an account exists.
    fn account_exists(&self, address: Address) -> bool;
    /// Get value of a storage key.
    ///
    /// Returns `H256::zero()` if it does not exist.
    fn get_storage(&self, address: Address, key: H256) -> H256;
    /// Set value of a storage key, reporting what kind of change took place.
    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> StorageStatus;
    /// Get balance of an account.
    ///
    /// Returns `0` if the account does not exist.
    fn get_balance(&self, address: Address) -> U256;
    /// Get code size of an account.
    ///
    /// Returns `0` if the account does not exist.
    fn get_code_size(&self, address: Address) -> U256;
    /// Get code hash of an account.
    ///
    /// Returns `H256::zero()` if the account does not exist.
    fn get_code_hash(&self, address: Address) -> H256;
    /// Copy code of an account starting at `offset` into `buffer`.
    ///
    /// Returns the number of bytes written, at most `buffer.len()`.
    fn copy_code(&self, address: Address, offset: usize, buffer: &mut [u8]) -> usize;
    /// Self-destruct account.
    fn selfdestruct(&mut self, address: Address, beneficiary: Address);
    /// Call to another account.
    fn call(&mut self, msg: &Message) -> Output;
    /// Retrieve transaction context.
    fn get_tx_context(&self) -> TxContext;
    /// Get block hash.
    ///
    /// Returns `H256::zero()` if the block does not exist.
    fn get_block_hash(&self, block_number: u64) -> H256;
    /// Emit a log.
    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[H256]);
}

/// Host that does not support any ops.
pub struct DummyHost;

impl Host for DummyHost {
    fn account_exists(&self, _: Address) -> bool {
        unimplemented!()
    }

    fn get_storage(&self, _: Address, _: H256) -> H256 {
        unimplemented!()
    }

    fn set_storage(&mut self, _: Address, _: H256, _: H256) -> StorageStatus {
        unimplemented!()
    }

    fn get_balance(&self, _: Address) -> U256 {
        unimplemented!()
    }

    fn get_code_size(&self, _: Address) -> U256 {
        unimplemented!()
    }

    fn get_code_hash(&self, _: Address) -> H256 {
        unimplemented!()
    }

    fn copy_code(&self, _: Address, _: usize, _: &mut [u8]) -> usize {
        unimplemented!()
    }

    fn selfdestruct(&mut self, _: Address, _: Address) {
        unimplemented!()
    }

    fn call(&mut self, _: &Message) -> Output {
        unimplemented!()
    }

    fn get_tx_context(&self) -> TxContext {
        unimplemented!()
    }

    fn get_block_hash(&self, _: u64) -> H256 {
        unimplemented!()
    }

    fn emit_log(&mut self, _: Address, _: &[u8], _: &[H256]) {
        unimplemented!()
    }
}
