use crate::state::Stack;
use ethereum_types::U256;
use i256::I256;

fn push_bool(stack: &mut Stack, v: bool) {
    stack.push(if v { U256::one() } else { U256::zero() })
}

#[inline]
pub(crate) fn lt(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    push_bool(stack, a < b);
}

#[inline]
pub(crate) fn gt(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    push_bool(stack, a > b);
}

#[inline]
pub(crate) fn slt(stack: &mut Stack) {
    let a = I256::from(stack.pop());
    let b = I256::from(stack.pop());
    push_bool(stack, a < b);
}

#[inline]
pub(crate) fn sgt(stack: &mut Stack) {
    let a = I256::from(stack.pop());
    let b = I256::from(stack.pop());
    push_bool(stack, a > b);
}

#[inline]
pub(crate) fn eq(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    push_bool(stack, a == b);
}

#[inline]
pub(crate) fn iszero(stack: &mut Stack) {
    let a = stack.pop();
    push_bool(stack, a.is_zero());
}

#[inline]
pub(crate) fn and(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    stack.push(a & b);
}

#[inline]
pub(crate) fn or(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    stack.push(a | b);
}

#[inline]
pub(crate) fn xor(stack: &mut Stack) {
    let a = stack.pop();
    let b = stack.pop();
    stack.push(a ^ b);
}

#[inline]
pub(crate) fn not(stack: &mut Stack) {
    let a = stack.pop();
    stack.push(!a);
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

    #[test]
    fn unsigned_comparisons() {
        // The top word is the left operand.
        assert_eq!(run2(lt, 1.into(), 2.into()), U256::one());
        assert_eq!(run2(lt, 2.into(), 2.into()), U256::zero());
        assert_eq!(run2(gt, 2.into(), 1.into()), U256::one());
        assert_eq!(run2(gt, 1.into(), 2.into()), U256::zero());
        assert_eq!(run2(eq, 2.into(), 2.into()), U256::one());
    }

    #[test]
    fn signed_comparisons_see_twos_complement() {
        let minus_one = U256::MAX;
        assert_eq!(run2(slt, minus_one, 1.into()), U256::one());
        assert_eq!(run2(sgt, 1.into(), minus_one), U256::one());

        // The unsigned view orders the same words the other way around.
        assert_eq!(run2(lt, minus_one, 1.into()), U256::zero());
    }

    #[test]
    fn iszero_and_not() {
        let mut stack = Stack::default();

        stack.push(U256::zero());
        iszero(&mut stack);
        assert_eq!(stack.pop(), U256::one());

        stack.push(U256::zero());
        not(&mut stack);
        assert_eq!(stack.pop(), U256::MAX);
    }
}
