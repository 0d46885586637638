use cosmwasm_std::{QuerierWrapper, StdResult, Uint128};
use cw20::{BalanceResponse, Cw20QueryMsg, TokenInfoResponse};

use crate::asset::AssetInfo;

/// Returns how much of a CW20 token `account` holds.
///
/// * **contract_addr** token contract to query.
///
/// * **account** holder address.
pub fn query_token_balance(
    querier: &QuerierWrapper,
    contract_addr: impl Into<String>,
    account: impl Into<String>,
) -> StdResult<Uint128> {
    let response: BalanceResponse = querier.query_wasm_smart(
        contract_addr,
        &Cw20QueryMsg::Balance {
            address: account.into(),
        },
    )?;

    Ok(response.balance)
}

/// Returns the total number of issued units of a CW20 token. The pool reads
/// its share supply through this instead of tracking it itself.
pub fn query_supply(
    querier: &QuerierWrapper,
    contract_addr: impl Into<String>,
) -> StdResult<Uint128> {
    let info: TokenInfoResponse =
        querier.query_wasm_smart(contract_addr, &Cw20QueryMsg::TokenInfo {})?;

    Ok(info.total_supply)
}

/// Returns the number of decimals a pool asset uses.
pub fn query_token_precision(querier: &QuerierWrapper, asset_info: &AssetInfo) -> StdResult<u8> {
    let info: TokenInfoResponse =
        querier.query_wasm_smart(&asset_info.contract_addr, &Cw20QueryMsg::TokenInfo {})?;

    Ok(info.decimals)
}
