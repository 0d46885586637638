use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, DepsMut, StdResult, Storage, Uint128};
use cw_storage_plus::{Item, Map};

use stableswap::asset::{AssetInfo, PoolInfo};
use stableswap::querier::query_token_precision;

/// This structure stores the main stableswap pool parameters.
#[cw_serde]
pub struct Config {
    /// The contract owner; allowed to ramp the amplification and sweep admin fees
    pub owner: Addr,
    /// The pool information stored in a [`PoolInfo`] struct
    pub pool_info: PoolInfo,
    /// The accounted reserve of every pool asset, in the asset's own precision.
    /// The difference between the on-token balance and this value is the
    /// accrued admin fee.
    pub balances: Vec<Uint128>,
    /// Trade fee, out of [`stableswap::pool::FEE_DENOMINATOR`]
    pub fee: u64,
    /// Share of the trade fee diverted to the admin, out of the same denominator
    pub admin_fee: u64,
    /// This is the current amplification used in the pool
    pub init_amp: u64,
    /// This is the start time when amplification starts to scale up or down
    pub init_amp_time: u64,
    /// This is the target amplification to reach at `next_amp_time`
    pub next_amp: u64,
    /// This is the timestamp when the pool amplification should be `next_amp`
    pub next_amp_time: u64,
}

pub const CONFIG: Item<Config> = Item::new("config");

/// Stores map of AssetInfo (as String) -> precision
const PRECISIONS: Map<String, u8> = Map::new("precisions");

/// Store all token precisions and return them in the given order.
pub(crate) fn store_precisions(deps: DepsMut, asset_infos: &[AssetInfo]) -> StdResult<Vec<u8>> {
    asset_infos
        .iter()
        .map(|asset_info| {
            let precision = query_token_precision(&deps.querier, asset_info)?;
            PRECISIONS.save(deps.storage, asset_info.to_string(), &precision)?;
            Ok(precision)
        })
        .collect()
}

/// Loads precision of the given asset info.
pub(crate) fn get_precision(storage: &dyn Storage, asset_info: &AssetInfo) -> StdResult<u8> {
    PRECISIONS.load(storage, asset_info.to_string())
}
