use crate::{
    common::{address_to_u256, u256_to_address},
    host::*,
    state::ExecutionState,
    Revision, StatusCode,
};
use arrayvec::ArrayVec;
use ethereum_types::{H256, U256};

use super::memory::verify_memory_region;

pub(crate) fn address(state: &mut ExecutionState) {
    state.stack.push(address_to_u256(state.message.destination));
}

pub(crate) fn caller(state: &mut ExecutionState) {
    state.stack.push(address_to_u256(state.message.sender));
}

pub(crate) fn callvalue(state: &mut ExecutionState) {
    state.stack.push(state.message.value);
}

pub(crate) fn balance<H: Host>(host: &H, state: &mut ExecutionState) {
    let address = u256_to_address(state.stack.pop());
    state.stack.push(host.get_balance(address));
}

pub(crate) fn selfbalance<H: Host>(host: &H, state: &mut ExecutionState) {
    state
        .stack
        .push(host.get_balance(state.message.destination));
}

pub(crate) fn extcodesize<H: Host>(host: &H, state: &mut ExecutionState) {
    let address = u256_to_address(state.stack.pop());
    state.stack.push(host.get_code_size(address));
}

pub(crate) fn push_txcontext<H: Host>(
    host: &H,
    state: &mut ExecutionState,
    accessor: fn(TxContext) -> U256,
) {
    state.stack.push(accessor(host.get_tx_context()));
}

pub(crate) fn origin_accessor(tx_context: TxContext) -> U256 {
    address_to_u256(tx_context.tx_origin)
}

pub(crate) fn coinbase_accessor(tx_context: TxContext) -> U256 {
    address_to_u256(tx_context.block_coinbase)
}

pub(crate) fn gasprice_accessor(tx_context: TxContext) -> U256 {
    tx_context.tx_gas_price
}

pub(crate) fn timestamp_accessor(tx_context: TxContext) -> U256 {
    tx_context.block_timestamp.into()
}

pub(crate) fn number_accessor(tx_context: TxContext) -> U256 {
    tx_context.block_number.into()
}

pub(crate) fn gaslimit_accessor(tx_context: TxContext) -> U256 {
    tx_context.block_gas_limit.into()
}

pub(crate) fn difficulty_accessor(tx_context: TxContext) -> U256 {
    tx_context.block_difficulty
}

pub(crate) fn chainid_accessor(tx_context: TxContext) -> U256 {
    tx_context.chain_id
}

pub(crate) fn blockhash<H: Host>(host: &H, state: &mut ExecutionState) {
    let number = state.stack.pop();

    // Only the 256 most recent blocks are addressable.
    let upper_bound = host.get_tx_context().block_number;
    let lower_bound = upper_bound.saturating_sub(256);

    let mut header = H256::zero();
    if number <= U256::from(u64::MAX) {
        let n = number.as_u64();
        if (lower_bound..upper_bound).contains(&n) {
            header = host.get_block_hash(n);
        }
    }

    state.stack.push(U256::from_big_endian(header.as_bytes()));
}

pub(crate) fn do_log<H: Host>(
    host: &mut H,
    state: &mut ExecutionState,
    num_topics: usize,
) -> Result<(), StatusCode> {
    if state.message.is_static {
        return Err(StatusCode::StaticModeViolation);
    }

    let offset = state.stack.pop();
    let size = state.stack.pop();

    let region = verify_memory_region(state, offset, size).map_err(|_| StatusCode::OutOfGas)?;

    if let Some(region) = &region {
        let cost = region.size.get() as i64 * 8;
        state.gas_left -= cost;
        if state.gas_left < 0 {
            return Err(StatusCode::OutOfGas);
        }
    }

    let mut topics = ArrayVec::<H256, 4>::new();
    for _ in 0..num_topics {
        topics.push(H256(state.stack.pop().into()));
    }

    let data = region
        .map(|region| &state.memory[region.offset..region.offset + region.size.get()])
        .unwrap_or(&[]);
    host.emit_log(state.message.destination, data, topics.as_slice());

    Ok(())
}

pub(crate) fn sload<H: Host>(host: &H, state: &mut ExecutionState) {
    let key = H256(state.stack.pop().into());

    let value = host.get_storage(state.message.destination, key);

    state.stack.push(U256::from_big_endian(value.as_bytes()));
}

/// SSTORE with the revision-specific gas schedule.
///
/// `cumulative_cost` is the gas cost of the containing block accumulated up to
/// and including this instruction; it reconstructs the exact gas remaining for
/// the EIP-1706 stipend check.
pub(crate) fn sstore<H: Host>(
    host: &mut H,
    state: &mut ExecutionState,
    cumulative_cost: i64,
) -> Result<(), StatusCode> {
    if state.message.is_static {
        return Err(StatusCode::StaticModeViolation);
    }

    if state.evm_revision >= Revision::Istanbul {
        let correction = state.current_block_cost - cumulative_cost;
        if state.gas_left + correction <= 2300 {
            return Err(StatusCode::OutOfGas);
        }
    }

    let key = H256(state.stack.pop().into());
    let value = H256(state.stack.pop().into());

    let status = host.set_storage(state.message.destination, key, value);

    let cost = match status {
        StorageStatus::Unchanged | StorageStatus::ModifiedAgain => match state.evm_revision {
            Revision::Istanbul => 800,
            Revision::Constantinople => 200,
            _ => 5000,
        },
        StorageStatus::Modified | StorageStatus::Deleted => 5000,
        StorageStatus::Added => 20000,
    };
    state.gas_left -= cost;
    if state.gas_left < 0 {
        return Err(StatusCode::OutOfGas);
    }

    Ok(())
}

pub(crate) fn selfdestruct<H: Host>(
    host: &mut H,
    state: &mut ExecutionState,
) -> Result<(), StatusCode> {
    if state.message.is_static {
        return Err(StatusCode::StaticModeViolation);
    }

    let beneficiary = u256_to_address(state.stack.pop());

    if state.evm_revision >= Revision::Tangerine
        && (state.evm_revision == Revision::Tangerine
            || !host.get_balance(state.message.destination).is_zero())
    {
        // After Tangerine Whistle, sending a balance to a non-existing
        // account costs extra.
        if !host.account_exists(beneficiary) {
            state.gas_left -= 25000;
            if state.gas_left < 0 {
                return Err(StatusCode::OutOfGas);
            }
        }
    }

    host.selfdestruct(state.message.destination, beneficiary);

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::common::u256_to_address;
    use ethereum_types::Address;
    use hex_literal::hex;

    #[test]
    fn u256_to_address_conversion() {
        assert_eq!(
            u256_to_address(0x42.into()),
            Address::from(hex!("0000000000000000000000000000000000000042"))
        );
    }
}
