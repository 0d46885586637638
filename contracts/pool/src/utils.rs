use cosmwasm_std::{
    wasm_execute, Addr, Api, CosmosMsg, Env, StdResult, Storage, Uint128, Uint256, Uint64,
};
use cw20::Cw20ExecuteMsg;
use itertools::Itertools;

use stableswap::asset::{Asset, AssetInfo};
use stableswap::pool::{FEE_DENOMINATOR, N_COINS};

use crate::error::ContractError;
use crate::math::calc_y;
use crate::state::{get_precision, Config};

/// All pool math runs in this common precision ("x-space").
pub(crate) const NORM_PRECISION: u8 = 18;

/// Helper function to check if the given asset infos are valid.
pub(crate) fn check_asset_infos(
    api: &dyn Api,
    asset_infos: &[AssetInfo],
) -> Result<(), ContractError> {
    if !asset_infos.iter().all_unique() {
        return Err(ContractError::DoublingAssets {});
    }

    asset_infos
        .iter()
        .try_for_each(|asset_info| asset_info.check(api))
        .map_err(Into::into)
}

/// Helper function to check that the assets in a given array are valid.
pub(crate) fn check_assets(api: &dyn Api, assets: &[Asset]) -> Result<(), ContractError> {
    let asset_infos = assets.iter().map(|asset| asset.info.clone()).collect_vec();
    check_asset_infos(api, &asset_infos)
}

/// Scales a native-precision amount up to the common 18-decimal unit.
/// Equivalent to `value * RATE / PRECISION` with `RATE = 10^(36 - precision)`.
pub(crate) fn normalize(value: Uint128, precision: u8) -> Uint256 {
    Uint256::from(value) * Uint256::from(10u128.pow((NORM_PRECISION - precision) as u32))
}

/// Scales an 18-decimal amount back down to the asset's native precision,
/// truncating.
pub(crate) fn denormalize(value: Uint256, precision: u8) -> Result<Uint128, ContractError> {
    let scale = Uint256::from(10u128.pow((NORM_PRECISION - precision) as u32));
    Ok(Uint128::try_from(value.checked_div(scale)?)?)
}

/// Loads the precision of every pool asset, in pool order.
pub(crate) fn asset_precisions(storage: &dyn Storage, config: &Config) -> StdResult<Vec<u8>> {
    config
        .pool_info
        .asset_infos
        .iter()
        .map(|asset_info| get_precision(storage, asset_info))
        .collect()
}

/// Returns the accounted reserves scaled to the common 18-decimal unit.
pub(crate) fn pool_xp(balances: &[Uint128], precisions: &[u8]) -> Vec<Uint256> {
    balances
        .iter()
        .zip(precisions)
        .map(|(balance, precision)| normalize(*balance, *precision))
        .collect()
}

/// Compute the current pool amplification coefficient (AMP).
pub(crate) fn compute_current_amp(config: &Config, env: &Env) -> StdResult<Uint64> {
    let block_time = env.block.time.seconds();
    if block_time < config.next_amp_time {
        let elapsed_time: Uint128 = block_time.saturating_sub(config.init_amp_time).into();
        let time_range = config
            .next_amp_time
            .saturating_sub(config.init_amp_time)
            .into();
        let init_amp = Uint128::from(config.init_amp);
        let next_amp = Uint128::from(config.next_amp);

        if next_amp > init_amp {
            let amp_range = next_amp - init_amp;
            let res = init_amp + (amp_range * elapsed_time).checked_div(time_range)?;
            Ok(res.try_into()?)
        } else {
            let amp_range = init_amp - next_amp;
            let res = init_amp - (amp_range * elapsed_time).checked_div(time_range)?;
            Ok(res.try_into()?)
        }
    } else {
        Ok(Uint64::from(config.next_amp))
    }
}

/// The fee rate applied to a deposit's or withdrawal's deviation from the
/// pool's current composition. The `n / (4 * (n - 1))` scaling makes an
/// imbalanced deposit followed by a balancing swap cost the same as swapping
/// in directly.
pub(crate) fn imbalance_fee_rate(fee: u64) -> u64 {
    fee * N_COINS as u64 / (4 * (N_COINS as u64 - 1))
}

/// Structure for internal use which represents swap result.
pub(crate) struct SwapResult {
    pub return_amount: Uint128,
    pub spread_amount: Uint128,
    pub commission_amount: Uint128,
    pub admin_fee_amount: Uint128,
}

/// Returns the result of swapping `offer_amount` of asset `offer_index` into
/// asset `ask_index`, as a [`SwapResult`].
///
/// * **quote** when true, one smallest x-space unit is shaved off the gross
/// output so that a quoted amount never exceeds the executed one.
pub(crate) fn compute_swap(
    storage: &dyn Storage,
    env: &Env,
    config: &Config,
    offer_index: usize,
    ask_index: usize,
    offer_amount: Uint128,
    quote: bool,
) -> Result<SwapResult, ContractError> {
    let precisions = asset_precisions(storage, config)?;
    let xp = pool_xp(&config.balances, &precisions);
    let amp = compute_current_amp(config, env)?;

    let offer_norm = normalize(offer_amount, precisions[offer_index]);
    let new_offer_pool = xp[offer_index].checked_add(offer_norm)?;
    let new_ask_pool = calc_y(amp, offer_index, ask_index, new_offer_pool, &xp)?;

    let mut gross_norm = xp[ask_index].checked_sub(new_ask_pool)?;
    if quote {
        gross_norm = gross_norm.saturating_sub(Uint256::one());
    }
    let gross_amount = denormalize(gross_norm, precisions[ask_index])?;

    let commission_amount = gross_amount.checked_multiply_ratio(config.fee, FEE_DENOMINATOR)?;
    let return_amount = gross_amount.checked_sub(commission_amount)?;
    let admin_fee_amount =
        commission_amount.checked_multiply_ratio(config.admin_fee, FEE_DENOMINATOR)?;

    // We consider the swap rate 1:1 in a stableswap pool, so any shortfall
    // against the offer is reported as spread.
    let offer_in_ask_precision = denormalize(offer_norm, precisions[ask_index])?;
    let spread_amount = offer_in_ask_precision.saturating_sub(gross_amount);

    Ok(SwapResult {
        return_amount,
        spread_amount,
        commission_amount,
        admin_fee_amount,
    })
}

/// Applies the imbalance fee to a deposit or withdrawal that moved the pool
/// from `old_balances` to `new_balances`, changing the invariant from `d0` to
/// `d1`.
///
/// Returns, per asset: the reserves to commit (full fee left in, admin cut
/// taken out), the fee-reduced balances the post-fee invariant is computed
/// from, and the charged fees.
pub(crate) fn apply_imbalance_fees(
    config: &Config,
    old_balances: &[Uint128],
    new_balances: &[Uint128],
    d0: Uint256,
    d1: Uint256,
) -> Result<(Vec<Uint128>, Vec<Uint128>, Vec<Uint128>), ContractError> {
    let fee_rate = imbalance_fee_rate(config.fee);

    let mut committed = Vec::with_capacity(N_COINS);
    let mut reduced = Vec::with_capacity(N_COINS);
    let mut fees = Vec::with_capacity(N_COINS);

    for (old_balance, new_balance) in old_balances.iter().zip(new_balances) {
        let ideal_balance: Uint128 = Uint256::from(*old_balance)
            .checked_multiply_ratio(d1, d0)?
            .try_into()?;
        let difference = new_balance.abs_diff(ideal_balance);

        let fee_amount = difference.checked_multiply_ratio(fee_rate, FEE_DENOMINATOR)?;
        let admin_cut = fee_amount.checked_multiply_ratio(config.admin_fee, FEE_DENOMINATOR)?;

        committed.push(new_balance.checked_sub(admin_cut)?);
        reduced.push(new_balance.checked_sub(fee_amount)?);
        fees.push(fee_amount);
    }

    Ok((committed, reduced, fees))
}

/// Pro-rata share of the reserves for `amount` of `total_share` shares,
/// truncating.
pub(crate) fn get_share_in_assets(
    config: &Config,
    amount: Uint128,
    total_share: Uint128,
) -> Result<Vec<Uint128>, ContractError> {
    if total_share.is_zero() {
        return Ok(vec![Uint128::zero(); config.balances.len()]);
    }

    config
        .balances
        .iter()
        .map(|balance| {
            balance
                .checked_multiply_ratio(amount, total_share)
                .map_err(Into::into)
        })
        .collect()
}

/// The accounted reserves together with their asset infos.
pub(crate) fn pool_assets(config: &Config) -> Vec<Asset> {
    config
        .pool_info
        .asset_infos
        .iter()
        .cloned()
        .zip(config.balances.iter().copied())
        .map(|(info, amount)| Asset { info, amount })
        .collect()
}

/// Mint share tokens for a beneficiary.
pub(crate) fn mint_liquidity_token_message(
    config: &Config,
    recipient: &Addr,
    amount: Uint128,
) -> Result<CosmosMsg, ContractError> {
    Ok(wasm_execute(
        &config.pool_info.liquidity_token,
        &Cw20ExecuteMsg::Mint {
            recipient: recipient.to_string(),
            amount,
        },
        vec![],
    )?
    .into())
}
