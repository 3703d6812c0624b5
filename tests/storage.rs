use ethereum_types::{Address, H256};
use evmjet::{opcode::*, util::*, *};

fn slot(n: u64) -> H256 {
    H256::from_low_u64_be(n)
}

fn preset_slot(value: u64) -> EvmTester {
    EvmTester::new().apply_host_fn(move |host, msg| {
        host.accounts.entry(msg.destination).or_default().storage.insert(
            slot(1),
            StorageValue {
                value: H256::from_low_u64_be(value),
                dirty: false,
            },
        );
    })
}

#[test]
fn sload_reads_host_storage() {
    preset_slot(0xaa)
        .code(Bytecode::new().sload(1).ret_top())
        .status(StatusCode::Success)
        .gas_used(218)
        .output_value(0xaa)
        .check();

    // Istanbul repriced SLOAD to 800.
    preset_slot(0xaa)
        .revision(Revision::Istanbul)
        .code(Bytecode::new().sload(1).ret_top())
        .status(StatusCode::Success)
        .gas_used(818)
        .output_value(0xaa)
        .check()
}

#[test]
fn sload_of_missing_slot_is_zero() {
    EvmTester::new()
        .code(Bytecode::new().sload(7).ret_top())
        .status(StatusCode::Success)
        .output_value(0)
        .check()
}

#[test]
fn sstore_adds_slot() {
    EvmTester::new()
        .destination(Address::from_low_u64_be(0x57))
        .code(Bytecode::new().sstore(1, 0xaa))
        .status(StatusCode::Success)
        .gas_used(20006)
        .inspect_host(|host, msg| {
            let slot_value = &host.accounts[&msg.destination].storage[&slot(1)];
            assert_eq!(slot_value.value, H256::from_low_u64_be(0xaa));
            assert!(slot_value.dirty);
        })
        .check()
}

#[test]
fn sstore_noop_write() {
    // Writing the value already present: legacy schedule charges the full
    // reset cost, net metering the no-op cost.
    for (revision, gas_used) in [
        (Revision::Byzantium, 5006),
        (Revision::Constantinople, 206),
        (Revision::Petersburg, 5006),
        (Revision::Istanbul, 806),
    ] {
        preset_slot(0xaa)
            .revision(revision)
            .code(Bytecode::new().sstore(1, 0xaa))
            .status(StatusCode::Success)
            .gas_used(gas_used)
            .check()
    }
}

#[test]
fn sstore_modify_and_delete() {
    preset_slot(0x01)
        .code(Bytecode::new().sstore(1, 0x02))
        .status(StatusCode::Success)
        .gas_used(5006)
        .check();

    preset_slot(0x01)
        .code(Bytecode::new().sstore(1, 0))
        .status(StatusCode::Success)
        .gas_used(5006)
        .check()
}

#[test]
fn sstore_same_slot_twice() {
    // First write adds the slot, the second hits the dirty-slot path.
    EvmTester::new()
        .revision(Revision::Istanbul)
        .code(Bytecode::new().sstore(1, 2).sstore(1, 3))
        .status(StatusCode::Success)
        .gas_used(12 + 20000 + 800)
        .inspect_host(|host, msg| {
            assert_eq!(
                host.accounts[&msg.destination].storage[&slot(1)].value,
                H256::from_low_u64_be(3)
            );
        })
        .check()
}

#[test]
fn sstore_requires_gas_above_stipend() {
    // From Istanbul SSTORE fails outright when at most 2300 gas remains.
    preset_slot(0xaa)
        .revision(Revision::Istanbul)
        .code(Bytecode::new().sstore(1, 0xaa))
        .gas(2306)
        .status(StatusCode::OutOfGas)
        .gas_left(0)
        .check();

    preset_slot(0xaa)
        .revision(Revision::Istanbul)
        .code(Bytecode::new().sstore(1, 0xaa))
        .gas(2307)
        .status(StatusCode::Success)
        .gas_used(806)
        .check();

    // No such rule under net metering in Constantinople.
    preset_slot(0xaa)
        .revision(Revision::Constantinople)
        .code(Bytecode::new().sstore(1, 0xaa))
        .gas(2306)
        .status(StatusCode::Success)
        .gas_used(206)
        .check()
}

#[test]
fn sstore_in_static_mode() {
    EvmTester::new()
        .set_static(true)
        .code(Bytecode::new().sstore(1, 0xaa))
        .status(StatusCode::StaticModeViolation)
        .gas_left(0)
        .check()
}
