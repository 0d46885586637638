use std::fmt;

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{wasm_execute, Addr, Api, CosmosMsg, QuerierWrapper, StdResult, Uint128};
use cw20::Cw20ExecuteMsg;

use crate::querier::query_token_balance;

/// This struct describes a pool asset together with an amount.
#[cw_serde]
pub struct Asset {
    /// Information about the asset stored in a [`AssetInfo`] struct
    pub info: AssetInfo,
    /// A token amount
    pub amount: Uint128,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.info)
    }
}

impl Asset {
    /// Returns a [`Cw20ExecuteMsg::Transfer`] moving the asset amount to
    /// `recipient`.
    pub fn into_msg(self, recipient: impl Into<String>) -> StdResult<CosmosMsg> {
        Ok(wasm_execute(
            &self.info.contract_addr,
            &Cw20ExecuteMsg::Transfer {
                recipient: recipient.into(),
                amount: self.amount,
            },
            vec![],
        )?
        .into())
    }
}

/// Identifies a pool asset by its CW20 contract address. Reserves are pulled
/// with `TransferFrom`, which only token contracts support, so native coins
/// are not representable here.
/// ## Examples
/// ```
/// # use cosmwasm_std::Addr;
/// # use stableswap::asset::AssetInfo;
/// AssetInfo { contract_addr: Addr::unchecked("dai...") };
/// ```
#[cw_serde]
#[derive(Hash, Eq)]
pub struct AssetInfo {
    /// Token contract address
    pub contract_addr: Addr,
}

impl fmt::Display for AssetInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.contract_addr)
    }
}

impl AssetInfo {
    /// Returns the balance of the token held by `account`.
    pub fn query_pool(
        &self,
        querier: &QuerierWrapper,
        account: impl Into<String>,
    ) -> StdResult<Uint128> {
        query_token_balance(querier, &self.contract_addr, account)
    }

    /// Checks that the token contract address is in a proper format.
    pub fn check(&self, api: &dyn Api) -> StdResult<()> {
        api.addr_validate(self.contract_addr.as_str())?;

        Ok(())
    }
}

/// This structure stores the main parameters of the liquidity pool.
#[cw_serde]
pub struct PoolInfo {
    /// The assets the pool trades between
    pub asset_infos: Vec<AssetInfo>,
    /// Pool contract address
    pub contract_addr: Addr,
    /// Pool share (LP) token address
    pub liquidity_token: Addr,
}

impl PoolInfo {
    /// Position of `asset_info` among the pool assets.
    pub fn index_of(&self, asset_info: &AssetInfo) -> Option<usize> {
        self.asset_infos.iter().position(|info| info == asset_info)
    }
}

/// Returns an [`Asset`] with the given amount.
pub fn token_asset(contract_addr: Addr, amount: Uint128) -> Asset {
    Asset {
        info: AssetInfo { contract_addr },
        amount,
    }
}

/// Returns an [`AssetInfo`] for the given token contract.
pub fn token_asset_info(contract_addr: Addr) -> AssetInfo {
    AssetInfo { contract_addr }
}
