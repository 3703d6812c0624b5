use crate::{
    common::Revision,
    instructions::instruction_table::get_instruction_table,
    opcode::OpCode,
};
use bytes::Bytes;
use ethereum_types::U256;
use std::cmp::min;

/// Gas and stack requirements of one basic block, enforced in a single check
/// at block entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct BlockInfo {
    /// Total base gas cost of all instructions in the block.
    pub gas_cost: i64,
    /// Stack depth required to execute the whole block.
    pub stack_req: i32,
    /// Maximum stack growth relative to the depth at block entry.
    pub stack_max_growth: i32,
}

/// A pre-decoded instruction.
///
/// Push immediates, program counters and intra-block gas positions are
/// resolved by the analyzer, so the dispatch loop never re-reads raw code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Instr {
    /// Basic-block entry: performs the block precheck. Emitted for every
    /// `JUMPDEST` and synthesized at all other block starts.
    BeginBlock(u32),
    /// `PUSH1`..`PUSH8` with the immediate inlined.
    PushSmall(OpCode, u64),
    /// `PUSH9`..`PUSH32`, immediate stored in the argument pool.
    PushLarge(OpCode, u32),
    /// `PC` with the original code offset.
    Pc(u32),
    /// `GAS` with the block gas cost accumulated up to and including it.
    Gas(i64),
    /// `SSTORE` with the block gas cost accumulated up to and including it.
    Sstore(i64),
    /// An opcode absent from the active revision's instruction table.
    Undefined(OpCode),
    /// Any other opcode, dispatched by value.
    Op(OpCode),
}

impl Instr {
    /// Opcode this instruction decodes, as reported to tracers.
    pub(crate) const fn opcode(&self) -> OpCode {
        match *self {
            Instr::BeginBlock(_) => OpCode::JUMPDEST,
            Instr::PushSmall(op, _)
            | Instr::PushLarge(op, _)
            | Instr::Undefined(op)
            | Instr::Op(op) => op,
            Instr::Pc(_) => OpCode::PC,
            Instr::Gas(_) => OpCode::GAS,
            Instr::Sstore(_) => OpCode::SSTORE,
        }
    }
}

/// Sorted map from valid jump destinations (original code offsets) to their
/// positions in the pre-decoded stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JumpdestMap(Vec<(u32, u32)>);

impl JumpdestMap {
    pub fn contains(&self, dst: U256) -> bool {
        self.find(dst).is_some()
    }

    pub(crate) fn find(&self, dst: U256) -> Option<usize> {
        if dst > U256::from(u32::MAX) {
            return None;
        }
        self.0
            .binary_search_by_key(&dst.as_u32(), |&(offset, _)| offset)
            .ok()
            .map(|pos| self.0[pos].1 as usize)
    }
}

/// Code with analysis.
///
/// Analysis is pure: the same revision and code always produce an equal
/// value. It may be reused to execute any number of messages.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzedCode {
    pub(crate) instrs: Vec<Instr>,
    pub(crate) blocks: Vec<BlockInfo>,
    pub(crate) args: Vec<U256>,
    pub(crate) jumpdest_map: JumpdestMap,
    pub(crate) code: Bytes,
    pub(crate) revision: Revision,
}

/// Immediate data bytes of the instruction at `i`; shorter than `n` if code
/// ends early.
fn immediate(code: &[u8], i: usize, n: usize) -> &[u8] {
    &code[min(i + 1, code.len())..min(i + 1 + n, code.len())]
}

impl AnalyzedCode {
    /// Analyze code and prepare it for execution under the given revision.
    pub fn analyze(revision: Revision, code: impl AsRef<[u8]>) -> Self {
        let code = code.as_ref();
        debug_assert!(code.len() <= 1 << 24);

        let table = get_instruction_table(revision);

        let mut instrs = Vec::with_capacity(code.len() + 2);
        let mut blocks = Vec::new();
        let mut args = Vec::new();
        let mut jumpdests = Vec::new();

        // Index of the block whose record is still being accumulated.
        let mut open_block: Option<usize> = None;
        let mut block = BlockInfo::default();
        let mut stack_change = 0i32;

        let mut i = 0;
        while i < code.len() {
            let op = OpCode(code[i]);
            let metrics = table[op.to_usize()];

            if open_block.is_none() || op == OpCode::JUMPDEST {
                if let Some(b) = open_block.take() {
                    blocks[b] = block;
                }
                if op == OpCode::JUMPDEST {
                    jumpdests.push((i as u32, instrs.len() as u32));
                }
                open_block = Some(blocks.len());
                instrs.push(Instr::BeginBlock(blocks.len() as u32));
                blocks.push(BlockInfo::default());
                block = BlockInfo::default();
                stack_change = 0;
            }

            if let Some(metrics) = metrics {
                block.gas_cost += i64::from(metrics.gas_cost);
                block.stack_req = block
                    .stack_req
                    .max(i32::from(metrics.stack_height_required) - stack_change);
                stack_change += i32::from(metrics.stack_height_change);
                block.stack_max_growth = block.stack_max_growth.max(stack_change);
            }

            match op {
                // The block-entry instruction emitted above doubles as the
                // runtime no-op for JUMPDEST.
                OpCode::JUMPDEST => {}
                _ if metrics.is_none() => instrs.push(Instr::Undefined(op)),
                _ if (OpCode::PUSH1..=OpCode::PUSH8).contains(&op) => {
                    let n = (op.to_u8() - OpCode::PUSH1.to_u8()) as usize + 1;
                    let data = immediate(code, i, n);
                    // Immediate bytes past the end of code read as zeroes.
                    let mut value = 0u64;
                    for pos in 0..n {
                        value = (value << 8) | u64::from(data.get(pos).copied().unwrap_or(0));
                    }
                    instrs.push(Instr::PushSmall(op, value));
                    i += n;
                }
                _ if (OpCode::PUSH9..=OpCode::PUSH32).contains(&op) => {
                    let n = (op.to_u8() - OpCode::PUSH1.to_u8()) as usize + 1;
                    let data = immediate(code, i, n);
                    let mut word = [0; 32];
                    word[32 - n..32 - n + data.len()].copy_from_slice(data);
                    args.push(U256::from_big_endian(&word));
                    instrs.push(Instr::PushLarge(op, (args.len() - 1) as u32));
                    i += n;
                }
                OpCode::PC => instrs.push(Instr::Pc(i as u32)),
                OpCode::GAS => instrs.push(Instr::Gas(block.gas_cost)),
                OpCode::SSTORE => instrs.push(Instr::Sstore(block.gas_cost)),
                _ => instrs.push(Instr::Op(op)),
            }

            i += 1;

            // Branches, terminators and call-like instructions end the basic
            // block, which also makes gas_left exact at every call site.
            if matches!(
                op,
                OpCode::JUMP
                    | OpCode::JUMPI
                    | OpCode::STOP
                    | OpCode::RETURN
                    | OpCode::REVERT
                    | OpCode::SELFDESTRUCT
                    | OpCode::INVALID
                    | OpCode::CALL
                    | OpCode::CALLCODE
                    | OpCode::DELEGATECALL
                    | OpCode::STATICCALL
                    | OpCode::CREATE
                    | OpCode::CREATE2
            ) {
                if let Some(b) = open_block.take() {
                    blocks[b] = block;
                }
            }
        }

        if let Some(b) = open_block.take() {
            blocks[b] = block;
        }

        // Guarantee termination even if code lacks one.
        instrs.push(Instr::Op(OpCode::STOP));

        Self {
            instrs,
            blocks,
            args,
            jumpdest_map: JumpdestMap(jumpdests),
            code: Bytes::copy_from_slice(code),
            revision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn analyze(code: &[u8]) -> AnalyzedCode {
        AnalyzedCode::analyze(Revision::latest(), code)
    }

    #[test]
    fn empty_code_terminates() {
        let s = analyze(&[]);
        assert_eq!(s.instrs, [Instr::Op(OpCode::STOP)]);
        assert!(s.blocks.is_empty());
    }

    #[test]
    fn single_block_accounting() {
        // PUSH1 1, PUSH1 2, ADD, STOP
        let s = analyze(&hex!("600160020100"));
        assert_eq!(
            s.instrs,
            [
                Instr::BeginBlock(0),
                Instr::PushSmall(OpCode::PUSH1, 1),
                Instr::PushSmall(OpCode::PUSH1, 2),
                Instr::Op(OpCode::ADD),
                Instr::Op(OpCode::STOP),
                Instr::Op(OpCode::STOP),
            ]
        );
        assert_eq!(
            s.blocks,
            [BlockInfo {
                gas_cost: 9,
                stack_req: 0,
                stack_max_growth: 2,
            }]
        );
    }

    #[test]
    fn stack_requirements_propagate_backwards() {
        // SWAP1 needs two items before any pushes happen in the block.
        let s = analyze(&[OpCode::SWAP1.to_u8(), OpCode::POP.to_u8()]);
        assert_eq!(
            s.blocks,
            [BlockInfo {
                gas_cost: 5,
                stack_req: 2,
                stack_max_growth: 0,
            }]
        );
    }

    #[test]
    fn jumpdest_opens_block() {
        // PUSH1 4, JUMP, STOP, JUMPDEST, STOP
        let s = analyze(&hex!("600456005b00"));

        assert_eq!(s.jumpdest_map.find(4.into()), Some(5));
        assert!(matches!(s.instrs[5], Instr::BeginBlock(_)));

        // Offsets 0..4 are not valid targets.
        for i in 0..4 {
            assert_eq!(s.jumpdest_map.find(i.into()), None);
        }
        assert!(!s.jumpdest_map.contains(U256::MAX));
    }

    #[test]
    fn jumpdest_inside_push_data_is_not_a_target() {
        // PUSH2 0x5b5b, JUMPDEST
        let s = analyze(&hex!("615b5b5b"));
        assert!(!s.jumpdest_map.contains(1.into()));
        assert!(!s.jumpdest_map.contains(2.into()));
        assert!(s.jumpdest_map.contains(3.into()));
    }

    #[test]
    fn truncated_push_reads_zero_bytes() {
        // PUSH2 with only one immediate byte available.
        let s = analyze(&hex!("61aa"));
        assert_eq!(s.instrs[1], Instr::PushSmall(OpCode::PUSH2, 0xaa00));

        // PUSH8 with none at all.
        let s = analyze(&hex!("67"));
        assert_eq!(s.instrs[1], Instr::PushSmall(OpCode::PUSH8, 0));

        // PUSH32 with four immediate bytes available.
        let s = analyze(&hex!("7fdeadbeef"));
        assert_eq!(s.instrs[1], Instr::PushLarge(OpCode::PUSH32, 0));
        assert_eq!(s.args[0], U256::from_big_endian(&hex!("deadbeef")) << (28 * 8));
    }

    #[test]
    fn large_push_goes_to_argument_pool() {
        let mut code = vec![OpCode::PUSH20.to_u8()];
        code.extend_from_slice(&[0xee; 20]);
        let s = analyze(&code);

        assert_eq!(s.instrs[1], Instr::PushLarge(OpCode::PUSH20, 0));
        assert_eq!(s.args, [U256::from_big_endian(&[0xee; 20])]);
    }

    #[test]
    fn gas_instruction_records_cumulative_block_cost() {
        // PUSH1 0, POP, GAS, GAS
        let s = analyze(&hex!("6000505a5a"));
        assert_eq!(s.instrs[3], Instr::Gas(7));
        assert_eq!(s.instrs[4], Instr::Gas(9));
        assert_eq!(s.blocks[0].gas_cost, 9);
    }

    #[test]
    fn call_closes_block() {
        // GAS, 6x PUSH1 0, CALL, PUSH1 0
        let s = analyze(&hex!("5a600060006000600060006000f16000"));
        let begin_blocks = s
            .instrs
            .iter()
            .filter(|i| matches!(i, Instr::BeginBlock(_)))
            .count();
        assert_eq!(begin_blocks, 2);
        assert_eq!(s.blocks.len(), 2);
    }

    #[test]
    fn undefined_opcodes_still_decoded() {
        let s = analyze(&[0x0c]);
        assert_eq!(s.instrs[1], Instr::Undefined(OpCode(0x0c)));

        // SHL appears only in Constantinople.
        let s = AnalyzedCode::analyze(Revision::Byzantium, [OpCode::SHL.to_u8()]);
        assert_eq!(s.instrs[1], Instr::Undefined(OpCode::SHL));
        let s = AnalyzedCode::analyze(Revision::Constantinople, [OpCode::SHL.to_u8()]);
        assert_eq!(s.instrs[1], Instr::Op(OpCode::SHL));
    }

    #[test]
    fn analysis_is_pure() {
        let mut code = [0; 1024];
        for (i, b) in code.iter_mut().enumerate() {
            *b = (i * 31) as u8;
        }

        for revision in Revision::iter() {
            assert_eq!(
                AnalyzedCode::analyze(revision, code),
                AnalyzedCode::analyze(revision, code)
            );
        }
    }
}
