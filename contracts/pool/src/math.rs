use cosmwasm_std::{Uint256, Uint64};

use stableswap::pool::N_COINS;

use crate::error::ContractError;

/// The maximum number of calculation steps for Newton's method.
const ITERATIONS: u8 = 255;

pub const MAX_AMP: u64 = 1_000_000;
pub const MAX_AMP_CHANGE: u64 = 10;
pub const MIN_AMP_CHANGING_TIME: u64 = 86400;

/// Computes the stableswap invariant (D).
///
/// * **Equation**
///
/// A * sum(x_i) * n**n + D = A * D * n**n + D**(n+1) / (n**n * prod(x_i))
///
/// The iteration formula and its truncating divisions are part of the pool's
/// accounting contract; callers rely on this exact rounding.
///
/// * **amp** is the current amplification coefficient.
///
/// * **xp** is a vector of pool reserves scaled to the common 18-decimal unit.
pub(crate) fn compute_d(amp: Uint64, xp: &[Uint256]) -> Result<Uint256, ContractError> {
    let sum_x = xp.iter().fold(Uint256::zero(), |acc, x| acc + x);

    if sum_x.is_zero() {
        return Ok(Uint256::zero());
    }

    let n_coins = Uint256::from(N_COINS as u8);
    let ann = Uint256::from(amp.checked_mul(Uint64::new(N_COINS as u64))?.u64());
    let ann_sum_x = ann.checked_mul(sum_x)?;

    let mut d = sum_x;
    for _ in 0..ITERATIONS {
        // loop: D_P = D_P * D / (_x * N_COINS)
        let mut d_p = d;
        for x in xp {
            d_p = d_p.checked_multiply_ratio(d, x.checked_mul(n_coins)?)?;
        }

        let d_prev = d;
        d = (ann_sum_x.checked_add(d_p.checked_mul(n_coins)?)?).checked_mul(d)?.checked_div(
            (ann - Uint256::one())
                .checked_mul(d)?
                .checked_add((n_coins + Uint256::one()).checked_mul(d_p)?)?,
        )?;

        if d >= d_prev {
            if d - d_prev <= Uint256::one() {
                return Ok(d);
            }
        } else if d_prev - d <= Uint256::one() {
            return Ok(d);
        }
    }

    Err(ContractError::ConvergenceFailure {})
}

/// Computes the new reserve of the `to` pool if the `from` reserve is set to
/// `new_from_amount`, so that the invariant D is preserved.
///
/// Done by solving the quadratic equation iteratively.
///
/// `x_1**2 + x_1 * (sum' - (A*n**n - 1) * D / (A * n**n)) = D ** (n + 1) / (n ** (2 * n) * prod' * A)`
///
/// `x_1**2 + b*x_1 = c`
///
/// `x_1 = (x_1**2 + c) / (2*x_1 + b - D)`
pub(crate) fn calc_y(
    amp: Uint64,
    from: usize,
    to: usize,
    new_from_amount: Uint256,
    xp: &[Uint256],
) -> Result<Uint256, ContractError> {
    debug_assert!(from != to, "from and to pools must differ");

    let d = compute_d(amp, xp)?;

    solve_y(amp, to, Some((from, new_from_amount)), xp, d)
}

/// Computes the new reserve of the `to` pool for a target invariant `d`, with
/// every other reserve left untouched. Used for single-asset withdrawals.
pub(crate) fn calc_y_d(
    amp: Uint64,
    to: usize,
    xp: &[Uint256],
    d: Uint256,
) -> Result<Uint256, ContractError> {
    solve_y(amp, to, None, xp, d)
}

fn solve_y(
    amp: Uint64,
    to: usize,
    replacement: Option<(usize, Uint256)>,
    xp: &[Uint256],
    d: Uint256,
) -> Result<Uint256, ContractError> {
    let n_coins = Uint256::from(N_COINS as u8);
    let ann = Uint256::from(amp.checked_mul(Uint64::new(N_COINS as u64))?.u64());

    let mut sum = Uint256::zero();
    let mut c = d;
    for (idx, pool) in xp.iter().enumerate() {
        if idx == to {
            continue;
        }
        let x = match replacement {
            Some((from, new_from_amount)) if idx == from => new_from_amount,
            _ => *pool,
        };

        sum = sum.checked_add(x)?;
        c = c.checked_multiply_ratio(d, x.checked_mul(n_coins)?)?;
    }
    let c = c.checked_multiply_ratio(d, ann.checked_mul(n_coins)?)?;
    let b = sum.checked_add(d.checked_div(ann)?)?;

    let mut y = d;
    for _ in 0..ITERATIONS {
        let y_prev = y;
        let denominator = y.checked_add(y)?.checked_add(b)?.checked_sub(d)?;
        y = y.checked_mul(y)?.checked_add(c)?.checked_div(denominator)?;

        if y >= y_prev {
            if y - y_prev <= Uint256::one() {
                return Ok(y);
            }
        } else if y_prev - y <= Uint256::one() {
            return Ok(y);
        }
    }

    Err(ContractError::ConvergenceFailure {})
}
