use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use evmjet::{opcode::*, util::*, *};
use hex_literal::hex;

#[test]
fn delegatecall() {
    let mut value = H256::zero();
    value.0[17] = 0xfe;

    EvmTester::new()
        .code(
            Bytecode::new()
                .append(hex!("6001600003600052")) // m[0] = 0xffffff...
                .append(hex!("600560046003600260016103e8f4")) // DELEGATECALL(1000, 0x01, ...)
                .append(hex!("60086000f3")),
        )
        .apply_host_fn(|host, _| {
            host.call_result.output_data = (&hex!("0a0b0c") as &[u8]).into();
            host.call_result.gas_left = 1;
        })
        .value(value.0)
        .gas(1700)
        .gas_used(1690)
        .status(StatusCode::Success)
        .output_data(hex!("ffffffff0a0b0cff"))
        .inspect_host(move |host, _| {
            let gas_left = 1700 - 736;

            let r = host.recorded.lock();

            assert_eq!(r.calls.len(), 1);
            let call_msg = r.calls.last().unwrap();
            assert_eq!(call_msg.gas, gas_left - gas_left / 64);
            assert_eq!(call_msg.input_data.len(), 3);
            assert_eq!(<[u8; 32]>::from(call_msg.value)[17], 0xfe);
        })
        .check()
}

/// Checks if DELEGATECALL forwards the "static" flag.
#[test]
fn delegatecall_static() {
    EvmTester::new()
        .set_static(true)
        .code(Bytecode::new().append_bc(CallInstruction::delegatecall(0).gas(1)))
        .status(StatusCode::Success)
        .gas_used(719)
        .inspect_host(|host, _| {
            let r = host.recorded.lock();

            assert_eq!(r.calls.len(), 1);
            let call_msg = r.calls.last().unwrap();
            assert_eq!(call_msg.gas, 1);
            assert!(call_msg.is_static);
        })
        .check()
}

#[test]
fn delegatecall_oog_depth_limit() {
    let t = EvmTester::new()
        .revision(Revision::Homestead)
        .depth(1024)
        .code(
            Bytecode::new()
                .append_bc(CallInstruction::delegatecall(0).gas(16))
                .ret_top(),
        );

    t.clone()
        .status(StatusCode::Success)
        .gas_used(73)
        .output_value(0)
        .inspect_host(|host, _| {
            assert!(host.recorded.lock().calls.is_empty());
        })
        .check();

    // Before Tangerine Whistle, requesting more gas than remains fails.
    t.gas(73).status(StatusCode::OutOfGas).gas_left(0).check();
}

#[test]
fn staticcall_propagates_static_flag() {
    EvmTester::new()
        .code(Bytecode::new().append_bc(CallInstruction::staticcall(0xaa).gas(0xee)))
        .status(StatusCode::Success)
        .inspect_host(|host, _| {
            let r = host.recorded.lock();

            assert_eq!(r.calls.len(), 1);
            let call_msg = r.calls.last().unwrap();
            assert_eq!(call_msg.kind, CallKind::Call);
            assert!(call_msg.is_static);
            assert_eq!(call_msg.value, U256::zero());
        })
        .check()
}

#[test]
fn call_with_value_in_static_mode() {
    EvmTester::new()
        .set_static(true)
        .code(Bytecode::new().append_bc(CallInstruction::call(0xaa).gas(0xee).value(1)))
        .status(StatusCode::StaticModeViolation)
        .gas_left(0)
        .check()
}

#[test]
fn call_value_with_insufficient_balance_is_not_dispatched() {
    EvmTester::new()
        .code(
            Bytecode::new()
                .append_bc(CallInstruction::call(0xaa).gas(0xffff).value(1))
                .ret_top(),
        )
        .status(StatusCode::Success)
        .output_value(0)
        .inspect_host(|host, _| {
            assert!(host.recorded.lock().calls.is_empty());
        })
        .check()
}

#[test]
fn call_charges_for_new_account_before_spurious() {
    EvmTester::new()
        .revision(Revision::Homestead)
        .code(Bytecode::new().append_bc(CallInstruction::call(5)))
        .status(StatusCode::Success)
        .gas_used(25061)
        .inspect_host(|host, _| {
            let r = host.recorded.lock();
            assert_eq!(r.calls.len(), 1);
            assert_eq!(r.calls[0].gas, 0);
        })
        .check();

    // From Spurious Dragon the charge only applies to value transfers.
    EvmTester::new()
        .code(Bytecode::new().append_bc(CallInstruction::call(5)))
        .status(StatusCode::Success)
        .gas_used(721)
        .inspect_host(|host, _| {
            assert_eq!(host.recorded.lock().calls.len(), 1);
        })
        .check()
}

#[test]
fn call_value_transfer_adds_stipend() {
    let dst = Address::from_low_u64_be(0xaa);

    EvmTester::new()
        .apply_host_fn(move |host, msg| {
            host.accounts.entry(dst).or_default();
            host.accounts.entry(msg.destination).or_default().balance = 1.into();
        })
        .code(Bytecode::new().append_bc(CallInstruction::call(0xaa).gas(100).value(1)))
        .gas(20000)
        .status(StatusCode::Success)
        .gas_used(9821)
        .inspect_host(|host, _| {
            let r = host.recorded.lock();
            assert_eq!(r.calls.len(), 1);
            assert_eq!(r.calls[0].gas, 2400);
        })
        .check()
}

#[test]
fn call_copies_output_and_keeps_return_data() {
    let t = EvmTester::new().apply_host_fn(|host, _| {
        host.call_result.output_data = (&hex!("0a0b0c") as &[u8]).into();
    });

    t.clone()
        .code(
            Bytecode::new()
                .append_bc(CallInstruction::call(3).gas(0xff).output(0, 2))
                .ret(0, 2),
        )
        .status(StatusCode::Success)
        .output_data(hex!("0a0b"))
        .check();

    t.code(
        Bytecode::new()
            .append_bc(CallInstruction::call(3).gas(0xff).output(0, 2))
            .opcode(OpCode::RETURNDATASIZE)
            .ret_top(),
    )
    .status(StatusCode::Success)
    .output_value(3)
    .check()
}

#[test]
fn call_failure_pushes_zero() {
    EvmTester::new()
        .apply_host_fn(|host, _| {
            host.call_result.status_code = StatusCode::Revert;
        })
        .code(
            Bytecode::new()
                .append_bc(CallInstruction::call(3).gas(0xff))
                .ret_top(),
        )
        .status(StatusCode::Success)
        .output_value(0)
        .check()
}

#[test]
fn returndatacopy_past_buffer() {
    EvmTester::new()
        .code(
            Bytecode::new()
                .pushv(0)
                .pushv(1)
                .pushv(0)
                .opcode(OpCode::RETURNDATACOPY),
        )
        .status(StatusCode::InvalidMemoryAccess)
        .gas_left(0)
        .check()
}

#[test]
fn create() {
    let address = Address::zero();

    EvmTester::new()
        .apply_host_fn(move |host, _| {
            host.accounts.entry(address).or_default().balance = 1.into();

            host.call_result.output_data = (&hex!("0a0b0c") as &[u8]).into();
            host.call_result
                .create_address
                .get_or_insert_with(Address::zero)
                .0[10] = 0xcc;
            host.call_result.gas_left = 200000;
        })
        .gas(300000)
        .code(hex!("602060006001f0600155"))
        .gas_used(115816)
        .status(StatusCode::Success)
        .inspect_host(move |host, _| {
            let mut key = H256::zero();
            key.0[31] = 1;
            assert_eq!(host.accounts[&address].storage[&key].value.0[22], 0xcc);

            let r = host.recorded.lock();
            assert_eq!(r.calls.len(), 1);
            assert_eq!(r.calls.last().unwrap().input_data.len(), 0x20);
        })
        .check()
}

#[test]
fn create_failure_pushes_zero() {
    EvmTester::new()
        .apply_host_fn(|host, _| {
            host.call_result.status_code = StatusCode::Revert;
            host.call_result.create_address = Some(Address::from_low_u64_be(0xcc));
        })
        .code(
            Bytecode::new()
                .pushv(0)
                .pushv(0)
                .pushv(0)
                .opcode(OpCode::CREATE)
                .ret_top(),
        )
        .status(StatusCode::Success)
        .output_value(0)
        .check()
}

#[test]
fn create_in_static_mode() {
    EvmTester::new()
        .set_static(true)
        .code(Bytecode::new().pushv(0).pushv(0).pushv(0).opcode(OpCode::CREATE))
        .status(StatusCode::StaticModeViolation)
        .gas_left(0)
        .check()
}

#[test]
fn create_at_depth_limit_is_not_dispatched() {
    EvmTester::new()
        .depth(1024)
        .code(
            Bytecode::new()
                .pushv(0)
                .pushv(0)
                .pushv(0)
                .opcode(OpCode::CREATE)
                .ret_top(),
        )
        .status(StatusCode::Success)
        .output_value(0)
        .inspect_host(|host, _| {
            assert!(host.recorded.lock().calls.is_empty());
        })
        .check()
}

#[test]
fn create2_passes_salt_and_init_code() {
    EvmTester::new()
        .revision(Revision::Constantinople)
        .destination(Address::from_low_u64_be(0xc0))
        .code(
            Bytecode::new()
                .pushv(0x5a17)
                .pushv(32)
                .pushv(0)
                .pushv(0)
                .opcode(OpCode::CREATE2),
        )
        .status(StatusCode::Success)
        .inspect_host(|host, msg| {
            let r = host.recorded.lock();
            assert_eq!(r.calls.len(), 1);
            let call_msg = &r.calls[0];
            assert_eq!(
                call_msg.kind,
                CallKind::Create2 {
                    salt: H256::from_low_u64_be(0x5a17)
                }
            );
            assert_eq!(call_msg.sender, msg.destination);
            assert_eq!(call_msg.input_data.len(), 32);
        })
        .check()
}

#[test]
fn selfdestruct_beneficiary_charges() {
    let beneficiary = 0xbe;

    // Tangerine charges for a non-existing beneficiary even with no balance.
    EvmTester::new()
        .revision(Revision::Tangerine)
        .code(Bytecode::new().pushv(beneficiary).opcode(OpCode::SELFDESTRUCT))
        .status(StatusCode::Success)
        .gas_used(30003)
        .inspect_host(|host, msg| {
            let r = host.recorded.lock();
            assert_eq!(
                r.selfdestructs,
                [SelfdestructRecord {
                    selfdestructed: msg.destination,
                    beneficiary: Address::from_low_u64_be(0xbe),
                }]
            );
        })
        .check();

    // From Spurious Dragon only accounts with balance pay it.
    EvmTester::new()
        .revision(Revision::Spurious)
        .code(Bytecode::new().pushv(beneficiary).opcode(OpCode::SELFDESTRUCT))
        .status(StatusCode::Success)
        .gas_used(5003)
        .check();

    EvmTester::new()
        .revision(Revision::Frontier)
        .code(Bytecode::new().pushv(beneficiary).opcode(OpCode::SELFDESTRUCT))
        .status(StatusCode::Success)
        .gas_used(3)
        .check()
}

#[test]
fn selfdestruct_in_static_mode() {
    EvmTester::new()
        .set_static(true)
        .code(Bytecode::new().pushv(0xbe).opcode(OpCode::SELFDESTRUCT))
        .status(StatusCode::StaticModeViolation)
        .gas_left(0)
        .check()
}

#[test]
fn call_depth_limit() {
    let code = Bytecode::new()
        .append_bc(CallInstruction::call(0xaa).gas(0xffff))
        .ret_top();

    EvmTester::new()
        .depth(1024)
        .code(code.clone())
        .status(StatusCode::Success)
        .output_value(0)
        .inspect_host(|host, _| {
            assert!(host.recorded.lock().calls.is_empty());
        })
        .check();

    EvmTester::new()
        .depth(1023)
        .code(code)
        .status(StatusCode::Success)
        .inspect_host(|host, _| {
            let r = host.recorded.lock();
            assert_eq!(r.calls.len(), 1);
            assert_eq!(r.calls[0].depth, 1024);
        })
        .check()
}

#[test]
fn nested_output_larger_than_window() {
    // Only the requested window is copied into memory.
    EvmTester::new()
        .apply_host_fn(|host, _| {
            host.call_result.output_data = Bytes::from(vec![0xee; 64]);
        })
        .code(
            Bytecode::new()
                .append_bc(CallInstruction::call(3).gas(0xff).output(0, 8))
                .opcode(OpCode::MSIZE)
                .ret_top(),
        )
        .status(StatusCode::Success)
        .output_value(32)
        .check()
}
