use crate::{
    analysis::{AnalyzedCode, Instr},
    common::*,
    host::Host,
    instructions::{arithmetic, bitwise, boolean, call, control, external, memory, stack_manip},
    opcode::OpCode,
    state::ExecutionState,
    tracing::Tracer,
};
use bytes::Bytes;
use ethereum_types::U256;

impl AnalyzedCode {
    /// Execute analyzed EVM bytecode.
    pub fn execute<H: Host, T: Tracer>(
        &self,
        host: &mut H,
        mut tracer: T,
        message: Message,
    ) -> Output {
        if !T::DUMMY {
            tracer.notify_execution_start(self.revision, message.clone(), self.code.clone());
        }

        let state = ExecutionState::new(message, self.revision);

        let output = match self.run(host, &mut tracer, state) {
            Ok(output) => output.into(),
            Err(status_code) => Output {
                status_code,
                gas_left: 0,
                output_data: Bytes::new(),
                create_address: None,
            },
        };

        if !T::DUMMY {
            tracer.notify_execution_end(&output);
        }

        output
    }

    fn run<H: Host, T: Tracer>(
        &self,
        host: &mut H,
        tracer: &mut T,
        mut state: ExecutionState,
    ) -> Result<SuccessfulOutput, StatusCode> {
        let state = &mut state;

        let mut reverted = false;

        let mut pc = 0;

        loop {
            let instr = self.instrs[pc];

            // Do not report the trailing synthetic STOP.
            if !T::DUMMY && pc != self.instrs.len() - 1 {
                tracer.notify_instruction_start(pc, instr.opcode(), state);
            }

            pc += 1;

            match instr {
                Instr::BeginBlock(block) => {
                    control::begin_block(state, self.blocks[block as usize])?;
                }
                Instr::PushSmall(_, value) => state.stack.push(value.into()),
                Instr::PushLarge(_, index) => state.stack.push(self.args[index as usize]),
                Instr::Pc(offset) => state.stack.push(offset.into()),
                Instr::Gas(cost_here) => {
                    let correction = state.current_block_cost - cost_here;
                    state.stack.push(U256::from((state.gas_left + correction) as u64));
                }
                Instr::Sstore(cost_here) => {
                    external::sstore(host, state, cost_here)?;
                }
                Instr::Undefined(_) => {
                    return Err(StatusCode::UndefinedInstruction);
                }
                Instr::Op(op) => match op {
                    OpCode::STOP => {
                        break;
                    }
                    OpCode::ADD => {
                        arithmetic::add(&mut state.stack);
                    }
                    OpCode::MUL => {
                        arithmetic::mul(&mut state.stack);
                    }
                    OpCode::SUB => {
                        arithmetic::sub(&mut state.stack);
                    }
                    OpCode::DIV => {
                        arithmetic::div(&mut state.stack);
                    }
                    OpCode::SDIV => {
                        arithmetic::sdiv(&mut state.stack);
                    }
                    OpCode::MOD => {
                        arithmetic::modulo(&mut state.stack);
                    }
                    OpCode::SMOD => {
                        arithmetic::smod(&mut state.stack);
                    }
                    OpCode::ADDMOD => {
                        arithmetic::addmod(&mut state.stack);
                    }
                    OpCode::MULMOD => {
                        arithmetic::mulmod(&mut state.stack);
                    }
                    OpCode::EXP => {
                        arithmetic::exp(state)?;
                    }
                    OpCode::SIGNEXTEND => {
                        arithmetic::signextend(&mut state.stack);
                    }
                    OpCode::LT => {
                        boolean::lt(&mut state.stack);
                    }
                    OpCode::GT => {
                        boolean::gt(&mut state.stack);
                    }
                    OpCode::SLT => {
                        boolean::slt(&mut state.stack);
                    }
                    OpCode::SGT => {
                        boolean::sgt(&mut state.stack);
                    }
                    OpCode::EQ => {
                        boolean::eq(&mut state.stack);
                    }
                    OpCode::ISZERO => {
                        boolean::iszero(&mut state.stack);
                    }
                    OpCode::AND => {
                        boolean::and(&mut state.stack);
                    }
                    OpCode::OR => {
                        boolean::or(&mut state.stack);
                    }
                    OpCode::XOR => {
                        boolean::xor(&mut state.stack);
                    }
                    OpCode::NOT => {
                        boolean::not(&mut state.stack);
                    }
                    OpCode::BYTE => {
                        bitwise::byte(&mut state.stack);
                    }
                    OpCode::SHL => {
                        bitwise::shl(&mut state.stack);
                    }
                    OpCode::SHR => {
                        bitwise::shr(&mut state.stack);
                    }
                    OpCode::SAR => {
                        bitwise::sar(&mut state.stack);
                    }

                    OpCode::KECCAK256 => {
                        memory::keccak256(state)?;
                    }
                    OpCode::ADDRESS => {
                        external::address(state);
                    }
                    OpCode::BALANCE => {
                        external::balance(host, state);
                    }
                    OpCode::CALLER => {
                        external::caller(state);
                    }
                    OpCode::CALLVALUE => {
                        external::callvalue(state);
                    }
                    OpCode::CALLDATALOAD => {
                        control::calldataload(state);
                    }
                    OpCode::CALLDATASIZE => {
                        control::calldatasize(state);
                    }
                    OpCode::CALLDATACOPY => {
                        memory::calldatacopy(state)?;
                    }
                    OpCode::CODESIZE => {
                        memory::codesize(&mut state.stack, &self.code);
                    }
                    OpCode::CODECOPY => {
                        memory::codecopy(state, &self.code)?;
                    }
                    OpCode::EXTCODESIZE => {
                        external::extcodesize(host, state);
                    }
                    OpCode::EXTCODECOPY => {
                        memory::extcodecopy(host, state)?;
                    }
                    OpCode::RETURNDATASIZE => {
                        memory::returndatasize(state);
                    }
                    OpCode::RETURNDATACOPY => {
                        memory::returndatacopy(state)?;
                    }
                    OpCode::EXTCODEHASH => {
                        memory::extcodehash(host, state);
                    }
                    OpCode::BLOCKHASH => {
                        external::blockhash(host, state);
                    }
                    OpCode::ORIGIN
                    | OpCode::COINBASE
                    | OpCode::GASPRICE
                    | OpCode::TIMESTAMP
                    | OpCode::NUMBER
                    | OpCode::DIFFICULTY
                    | OpCode::GASLIMIT
                    | OpCode::CHAINID => {
                        external::push_txcontext(
                            host,
                            state,
                            match op {
                                OpCode::ORIGIN => external::origin_accessor,
                                OpCode::COINBASE => external::coinbase_accessor,
                                OpCode::GASPRICE => external::gasprice_accessor,
                                OpCode::TIMESTAMP => external::timestamp_accessor,
                                OpCode::NUMBER => external::number_accessor,
                                OpCode::DIFFICULTY => external::difficulty_accessor,
                                OpCode::GASLIMIT => external::gaslimit_accessor,
                                OpCode::CHAINID => external::chainid_accessor,
                                _ => unreachable!(),
                            },
                        );
                    }
                    OpCode::SELFBALANCE => {
                        external::selfbalance(host, state);
                    }
                    OpCode::POP => {
                        stack_manip::pop(&mut state.stack);
                    }
                    OpCode::MLOAD => {
                        memory::mload(state)?;
                    }
                    OpCode::MSTORE => {
                        memory::mstore(state)?;
                    }
                    OpCode::MSTORE8 => {
                        memory::mstore8(state)?;
                    }
                    OpCode::JUMP => {
                        pc = control::op_jump(state, &self.jumpdest_map)?;
                    }
                    OpCode::JUMPI => {
                        if !state.stack.get(1).is_zero() {
                            pc = control::op_jump(state, &self.jumpdest_map)?;
                            state.stack.pop();
                        } else {
                            state.stack.pop();
                            state.stack.pop();
                        }
                    }
                    OpCode::MSIZE => {
                        memory::msize(state);
                    }
                    OpCode::SLOAD => {
                        external::sload(host, state);
                    }
                    OpCode::DUP1
                    | OpCode::DUP2
                    | OpCode::DUP3
                    | OpCode::DUP4
                    | OpCode::DUP5
                    | OpCode::DUP6
                    | OpCode::DUP7
                    | OpCode::DUP8
                    | OpCode::DUP9
                    | OpCode::DUP10
                    | OpCode::DUP11
                    | OpCode::DUP12
                    | OpCode::DUP13
                    | OpCode::DUP14
                    | OpCode::DUP15
                    | OpCode::DUP16 => {
                        stack_manip::dup(
                            &mut state.stack,
                            op.to_usize() - OpCode::DUP1.to_usize() + 1,
                        );
                    }
                    OpCode::SWAP1
                    | OpCode::SWAP2
                    | OpCode::SWAP3
                    | OpCode::SWAP4
                    | OpCode::SWAP5
                    | OpCode::SWAP6
                    | OpCode::SWAP7
                    | OpCode::SWAP8
                    | OpCode::SWAP9
                    | OpCode::SWAP10
                    | OpCode::SWAP11
                    | OpCode::SWAP12
                    | OpCode::SWAP13
                    | OpCode::SWAP14
                    | OpCode::SWAP15
                    | OpCode::SWAP16 => stack_manip::swap(
                        &mut state.stack,
                        op.to_usize() - OpCode::SWAP1.to_usize() + 1,
                    ),
                    OpCode::LOG0 | OpCode::LOG1 | OpCode::LOG2 | OpCode::LOG3 | OpCode::LOG4 => {
                        external::do_log(host, state, op.to_usize() - OpCode::LOG0.to_usize())?;
                    }
                    OpCode::CREATE | OpCode::CREATE2 => {
                        call::do_create(host, state, op == OpCode::CREATE2)?;
                    }
                    OpCode::CALL | OpCode::CALLCODE | OpCode::DELEGATECALL | OpCode::STATICCALL => {
                        call::do_call(
                            host,
                            state,
                            match op {
                                OpCode::CALL | OpCode::STATICCALL => CallKind::Call,
                                OpCode::CALLCODE => CallKind::CallCode,
                                OpCode::DELEGATECALL => CallKind::DelegateCall,
                                _ => unreachable!(),
                            },
                            op == OpCode::STATICCALL,
                        )?;
                    }
                    OpCode::RETURN | OpCode::REVERT => {
                        control::ret(state)?;
                        reverted = op == OpCode::REVERT;
                        break;
                    }
                    OpCode::INVALID => {
                        return Err(StatusCode::InvalidInstruction);
                    }
                    OpCode::SELFDESTRUCT => {
                        external::selfdestruct(host, state)?;
                        break;
                    }
                    other => {
                        unreachable!("reached unhandled opcode {} in decoded stream", other);
                    }
                },
            }
        }

        let output = SuccessfulOutput {
            reverted,
            gas_left: state.gas_left,
            output_data: state.output_data.clone(),
        };

        Ok(output)
    }
}
