//! Fixed-point helpers for the fee accumulator
//!
//! Token amounts carry 18 decimals, so `amount * FEE_PRECISION` or
//! `stake * accumulator_delta` routinely exceeds `u128`. The product is kept
//! as a 256-bit (hi, lo) pair and divided back down exactly.

const LOW_MASK: u128 = u64::MAX as u128;

/// Full 256-bit product of two `u128`s as `(hi, lo)`
fn widening_mul(a: u128, b: u128) -> (u128, u128) {
    let (a_hi, a_lo) = (a >> 64, a & LOW_MASK);
    let (b_hi, b_lo) = (b >> 64, b & LOW_MASK);

    let ll = a_lo * b_lo;
    let lh = a_lo * b_hi;
    let hl = a_hi * b_lo;
    let hh = a_hi * b_hi;

    let mid = (ll >> 64) + (lh & LOW_MASK) + (hl & LOW_MASK);
    let lo = (ll & LOW_MASK) | (mid << 64);
    let hi = hh + (lh >> 64) + (hl >> 64) + (mid >> 64);
    (hi, lo)
}

/// `floor(a * b / denom)` without an intermediate overflow.
///
/// Returns `None` when `denom` is zero or the quotient does not fit in `u128`.
pub fn mul_div_floor(a: u128, b: u128, denom: u128) -> Option<u128> {
    if denom == 0 {
        return None;
    }

    let (hi, lo) = widening_mul(a, b);
    if hi == 0 {
        return Some(lo / denom);
    }
    if hi >= denom {
        return None;
    }

    // Shift-subtract long division; `rem < denom` holds between steps
    let mut rem = hi;
    let mut quot: u128 = 0;
    for bit in (0..128).rev() {
        let carry = rem >> 127;
        rem = (rem << 1) | ((lo >> bit) & 1);
        quot <<= 1;
        if carry == 1 || rem >= denom {
            rem = rem.wrapping_sub(denom);
            quot |= 1;
        }
    }
    Some(quot)
}
