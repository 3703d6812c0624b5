#![doc = include_str!("../README.md")]

pub use analysis::AnalyzedCode;
pub use common::{CallKind, Message, Output, Revision, StatusCode, SuccessfulOutput};
pub use host::Host;
pub use opcode::OpCode;
pub use state::{ExecutionState, Stack};

/// Maximum allowed EVM bytecode size.
pub const MAX_CODE_SIZE: usize = 0x6000;

mod analysis;
mod common;
pub mod host;
#[doc(hidden)]
pub mod instructions;
mod interpreter;
pub mod opcode;
mod state;
pub mod tracing;

#[cfg(feature = "util")]
pub mod util;

/// Analyze and execute EVM bytecode in one go.
///
/// Equivalent to `AnalyzedCode::analyze(revision, code).execute(..)` - use the
/// two-step form to run several messages against one analysis.
pub fn execute<H: Host>(
    host: &mut H,
    revision: Revision,
    message: Message,
    code: impl AsRef<[u8]>,
) -> Output {
    AnalyzedCode::analyze(revision, code).execute(host, tracing::NoopTracer, message)
}
