use crate::{
    analysis::{BlockInfo, JumpdestMap},
    state::{ExecutionState, Stack},
    StatusCode,
};
use ethereum_types::U256;

/// Basic-block entry check: charge the whole block's gas and verify stack
/// bounds once, so the instructions inside it only pay dynamic costs.
pub(crate) fn begin_block(state: &mut ExecutionState, block: BlockInfo) -> Result<(), StatusCode> {
    if block.gas_cost > state.gas_left {
        return Err(StatusCode::OutOfGas);
    }
    state.gas_left -= block.gas_cost;

    let stack_size = state.stack.len() as i32;
    if stack_size < block.stack_req {
        return Err(StatusCode::StackUnderflow);
    }
    if stack_size + block.stack_max_growth > Stack::limit() as i32 {
        return Err(StatusCode::StackOverflow);
    }

    state.current_block_cost = block.gas_cost;

    Ok(())
}

/// Pop a jump target and translate it into a position in the pre-decoded
/// stream. Targets are validated against the original code offsets.
pub(crate) fn op_jump(
    state: &mut ExecutionState,
    jumpdest_map: &JumpdestMap,
) -> Result<usize, StatusCode> {
    let dst = state.stack.pop();
    jumpdest_map.find(dst).ok_or(StatusCode::BadJumpDestination)
}

pub(crate) fn ret(state: &mut ExecutionState) -> Result<(), StatusCode> {
    let offset = *state.stack.get(0);
    let size = *state.stack.get(1);

    if let Some(region) = super::memory::verify_memory_region(state, offset, size)
        .map_err(|_| StatusCode::OutOfGas)?
    {
        state.output_data = state.memory[region.offset..region.offset + region.size.get()]
            .to_vec()
            .into();
    }

    Ok(())
}

pub(crate) fn calldataload(state: &mut ExecutionState) {
    let index = state.stack.pop();

    let input_len = state.message.input_data.len();

    state.stack.push({
        if index > U256::from(input_len) {
            U256::zero()
        } else {
            let index_usize = index.as_usize();
            let end = core::cmp::min(index_usize + 32, input_len);

            let mut data = [0; 32];
            data[..end - index_usize].copy_from_slice(&state.message.input_data[index_usize..end]);

            data.into()
        }
    });
}

pub(crate) fn calldatasize(state: &mut ExecutionState) {
    state.stack.push(state.message.input_data.len().into());
}
