use crate::{
    common::{address_to_u256, u256_to_address, CallKind, Message},
    host::Host,
    state::ExecutionState,
    Revision, StatusCode,
};
use ethereum_types::{Address, H256, U256};
use std::cmp::min;

use super::memory::{self, num_words, MemoryRegion};

pub(crate) fn do_call<H: Host>(
    host: &mut H,
    state: &mut ExecutionState,
    kind: CallKind,
    is_static: bool,
) -> Result<(), StatusCode> {
    let gas = state.stack.pop();
    let dst = u256_to_address(state.stack.pop());
    let value = if is_static || matches!(kind, CallKind::DelegateCall) {
        U256::zero()
    } else {
        state.stack.pop()
    };
    let has_value = !value.is_zero();
    let input_offset = state.stack.pop();
    let input_size = state.stack.pop();
    let output_offset = state.stack.pop();
    let output_size = state.stack.pop();

    state.stack.push(U256::zero()); // Assume failure.

    let input_region = memory::verify_memory_region(state, input_offset, input_size)
        .map_err(|_| StatusCode::OutOfGas)?;
    let output_region = memory::verify_memory_region(state, output_offset, output_size)
        .map_err(|_| StatusCode::OutOfGas)?;

    let mut msg = Message {
        kind,
        is_static: is_static || state.message.is_static,
        depth: state.message.depth + 1,
        destination: dst,
        sender: if matches!(kind, CallKind::DelegateCall) {
            state.message.sender
        } else {
            state.message.destination
        },
        gas: i64::MAX,
        value: if matches!(kind, CallKind::DelegateCall) {
            state.message.value
        } else {
            value
        },
        input_data: input_region
            .map(|MemoryRegion { offset, size }| {
                state.memory[offset..offset + size.get()].to_vec().into()
            })
            .unwrap_or_default(),
    };

    let mut cost = if has_value { 9000 } else { 0 };

    if matches!(kind, CallKind::Call) {
        if has_value && state.message.is_static {
            return Err(StatusCode::StaticModeViolation);
        }

        // Charge for dragging a new account into existence.
        if (has_value || state.evm_revision < Revision::Spurious) && !host.account_exists(dst) {
            cost += 25000;
        }
    }
    state.gas_left -= cost;
    if state.gas_left < 0 {
        return Err(StatusCode::OutOfGas);
    }

    if gas < U256::from(msg.gas) {
        msg.gas = gas.as_u64() as i64;
    }

    if state.evm_revision >= Revision::Tangerine {
        // Forward at most 63/64 of the remaining gas.
        msg.gas = min(msg.gas, state.gas_left - state.gas_left / 64);
    } else if msg.gas > state.gas_left {
        return Err(StatusCode::OutOfGas);
    }

    if has_value {
        msg.gas += 2300; // Add stipend.
        state.gas_left += 2300;
    }

    state.return_data.clear();

    if state.message.depth < 1024
        && !(has_value && host.get_balance(state.message.destination) < value)
    {
        let msg_gas = msg.gas;
        let result = host.call(&msg);
        state.return_data = result.output_data.clone();
        *state.stack.get_mut(0) = if matches!(result.status_code, StatusCode::Success) {
            U256::one()
        } else {
            U256::zero()
        };

        if let Some(MemoryRegion { offset, size }) = output_region {
            let copy_size = min(size.get(), result.output_data.len());
            if copy_size > 0 {
                state.memory[offset..offset + copy_size]
                    .copy_from_slice(&result.output_data[..copy_size]);
            }
        }

        let gas_used = msg_gas - result.gas_left;
        state.gas_left -= gas_used;
    }

    Ok(())
}

pub(crate) fn do_create<H: Host>(
    host: &mut H,
    state: &mut ExecutionState,
    create2: bool,
) -> Result<(), StatusCode> {
    if state.message.is_static {
        return Err(StatusCode::StaticModeViolation);
    }

    let endowment = state.stack.pop();
    let init_code_offset = state.stack.pop();
    let init_code_size = state.stack.pop();

    let region = memory::verify_memory_region(state, init_code_offset, init_code_size)
        .map_err(|_| StatusCode::OutOfGas)?;

    let call_kind = if create2 {
        let salt = state.stack.pop();

        // The init code gets hashed into the new address.
        if let Some(region) = &region {
            let salt_cost = num_words(region.size.get()) * 6;
            state.gas_left -= salt_cost;
            if state.gas_left < 0 {
                return Err(StatusCode::OutOfGas);
            }
        }

        CallKind::Create2 {
            salt: H256(salt.into()),
        }
    } else {
        CallKind::Create
    };

    state.stack.push(U256::zero());
    state.return_data.clear();

    if state.message.depth < 1024
        && !(!endowment.is_zero() && host.get_balance(state.message.destination) < endowment)
    {
        let msg = Message {
            kind: call_kind,
            is_static: false,
            depth: state.message.depth + 1,
            gas: if state.evm_revision >= Revision::Tangerine {
                state.gas_left - state.gas_left / 64
            } else {
                state.gas_left
            },
            destination: Address::zero(),
            sender: state.message.destination,
            input_data: region
                .map(|MemoryRegion { offset, size }| {
                    state.memory[offset..offset + size.get()].to_vec().into()
                })
                .unwrap_or_default(),
            value: endowment,
        };
        let msg_gas = msg.gas;
        let result = host.call(&msg);
        state.gas_left -= msg_gas - result.gas_left;

        state.return_data = result.output_data;
        if result.status_code == StatusCode::Success {
            if let Some(create_address) = result.create_address {
                *state.stack.get_mut(0) = address_to_u256(create_address);
            }
        }
    }

    Ok(())
}
