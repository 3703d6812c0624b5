mod bytecode;
mod mocked_host;
mod tester;

pub use self::{bytecode::*, mocked_host::*, tester::*};
