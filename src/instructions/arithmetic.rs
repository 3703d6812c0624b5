use crate::{state::*, Revision, StatusCode};
use core::convert::TryFrom;
use ethereum_types::{U256, U512};
use i256::I256;

pub(crate) fn add(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    stack.push(a.overflowing_add(b).0);
}

pub(crate) fn mul(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    stack.push(a.overflowing_mul(b).0);
}

pub(crate) fn sub(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    stack.push(a.overflowing_sub(b).0);
}

pub(crate) fn div(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    stack.push(a.checked_div(b).unwrap_or_default());
}

pub(crate) fn modulo(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    stack.push(a.checked_rem(b).unwrap_or_default());
}

pub(crate) fn sdiv(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();

    let v = if b.is_zero() {
        U256::zero()
    } else {
        (I256::from(a) / I256::from(b)).into()
    };

    stack.push(v);
}

pub(crate) fn smod(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();

    let v = if b.is_zero() {
        U256::zero()
    } else {
        (I256::from(a) % I256::from(b)).into()
    };

    stack.push(v);
}

pub(crate) fn addmod(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    let c = stack.pop();

    let v = if c.is_zero() {
        U256::zero()
    } else {
        // The sum is taken at 512 bits, so it never wraps before the modulo.
        let m = (U512::from(a) + U512::from(b)) % U512::from(c);
        U256::try_from(m).unwrap()
    };

    stack.push(v);
}

pub(crate) fn mulmod(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    let c = stack.pop();

    let v = if c.is_zero() {
        U256::zero()
    } else {
        let m = (U512::from(a) * U512::from(b)) % U512::from(c);
        U256::try_from(m).unwrap()
    };

    stack.push(v);
}

pub(crate) fn exp(state: &mut ExecutionState) -> Result<(), StatusCode> {
    let mut base = state.stack.pop();
    let mut power = state.stack.pop();

    if !power.is_zero() {
        let per_byte = if state.evm_revision >= Revision::Spurious {
            50
        } else {
            10
        };
        let exponent_bytes = (power.bits() as i64 + 7) / 8;

        state.gas_left -= per_byte * exponent_bytes;

        if state.gas_left < 0 {
            return Err(StatusCode::OutOfGas);
        }
    }

    // Square-and-multiply over the wrapping 256-bit ring.
    let mut v = U256::one();
    while !power.is_zero() {
        if power.bit(0) {
            v = v.overflowing_mul(base).0;
        }
        power >>= 1;
        base = base.overflowing_mul(base).0;
    }

    state.stack.push(v);

    Ok(())
}

pub(crate) fn signextend(stack: &mut Stack) {
    let index = stack.pop();
    let value = stack.pop();

    let v = if index < U256::from(32) {
        // Sign bit of the (index + 1)-byte integer held in the low bytes.
        let sign_bit = index.as_usize() * 8 + 7;
        let mask = (U256::one() << sign_bit) - 1;
        if value.bit(sign_bit) {
            value | !mask
        } else {
            value & mask
        }
    } else {
        value
    };

    stack.push(v);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run2(f: fn(&mut Stack), a: U256, b: U256) -> U256 {
        let mut stack = Stack::default();
        stack.push(b);
        stack.push(a);
        f(&mut stack);
        stack.pop()
    }

    fn run3(f: fn(&mut Stack), a: U256, b: U256, c: U256) -> U256 {
        let mut stack = Stack::default();
        stack.push(c);
        stack.push(b);
        stack.push(a);
        f(&mut stack);
        stack.pop()
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(run2(div, 0xaa.into(), U256::zero()), U256::zero());
        assert_eq!(run2(modulo, 0xaa.into(), U256::zero()), U256::zero());
        assert_eq!(run2(sdiv, 0xaa.into(), U256::zero()), U256::zero());
        assert_eq!(run2(smod, 0xaa.into(), U256::zero()), U256::zero());
    }

    #[test]
    fn sdiv_negative() {
        // -4 / 2 == -2
        let minus_four = U256::MAX - 3;
        let minus_two = U256::MAX - 1;
        assert_eq!(run2(sdiv, minus_four, 2.into()), minus_two);
    }

    #[test]
    fn modular_ops_do_not_wrap_at_256_bits() {
        // 2^256 - 1 is 1 mod 7, so the sum is 2 and the product is 1.
        assert_eq!(run3(addmod, U256::MAX, U256::MAX, 7.into()), 2.into());
        assert_eq!(run3(mulmod, U256::MAX, U256::MAX, 7.into()), 1.into());

        assert_eq!(run3(addmod, 3.into(), 4.into(), U256::zero()), U256::zero());
        assert_eq!(run3(mulmod, 3.into(), 4.into(), U256::zero()), U256::zero());
    }

    #[test]
    fn signextend_byte() {
        // Extend the sign bit of the low byte 0xff across the whole word.
        assert_eq!(run2(signextend, U256::zero(), 0xff.into()), U256::MAX);
        assert_eq!(run2(signextend, U256::zero(), 0x7f.into()), 0x7f.into());

        // Indices past the word width leave the value alone.
        assert_eq!(run2(signextend, 32.into(), 0xff.into()), 0xff.into());

        // Garbage above the kept bytes is cleared for positive values.
        assert_eq!(
            run2(signextend, U256::zero(), 0xaa55.into()),
            0x55.into()
        );
    }
}
