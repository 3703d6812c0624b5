use crate::{common::*, opcode::OpCode, state::ExecutionState};
use bytes::Bytes;

/// Hooks observing execution progress.
///
/// Instruction notifications carry positions in the pre-decoded instruction
/// stream, not raw code offsets.
pub trait Tracer {
    /// If `true`, all notifications are compiled out of the dispatch loop.
    const DUMMY: bool = false;

    fn notify_execution_start(&mut self, revision: Revision, message: Message, code: Bytes);
    fn notify_instruction_start(&mut self, pc: usize, opcode: OpCode, state: &ExecutionState);
    fn notify_execution_end(&mut self, output: &Output);
}

/// Tracer that does nothing and costs nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopTracer;

impl Tracer for NoopTracer {
    const DUMMY: bool = true;

    fn notify_execution_start(&mut self, _: Revision, _: Message, _: Bytes) {}

    fn notify_instruction_start(&mut self, _: usize, _: OpCode, _: &ExecutionState) {}

    fn notify_execution_end(&mut self, _: &Output) {}
}

/// Tracer printing one line per executed instruction to stdout.
#[cfg(feature = "util")]
#[derive(Clone, Copy, Debug, Default)]
pub struct StdoutTracer;

#[cfg(feature = "util")]
impl Tracer for StdoutTracer {
    fn notify_execution_start(&mut self, revision: Revision, message: Message, code: Bytes) {
        println!(
            "Executing {:?} message in {} revision, gas {}",
            message.kind, revision, message.gas
        );
        println!("Code: {}", hex::encode(&code));
    }

    fn notify_instruction_start(&mut self, pc: usize, opcode: OpCode, state: &ExecutionState) {
        println!(
            "{:>4}  {:<14} gas={} stack={}",
            pc,
            opcode.to_string(),
            state.gas_left(),
            serde_json::to_string(state.stack()).unwrap()
        );
    }

    fn notify_execution_end(&mut self, output: &Output) {
        println!(
            "Execution ended with {}, gas left {}, output {}",
            output.status_code,
            output.gas_left,
            hex::encode(&output.output_data)
        );
    }
}
