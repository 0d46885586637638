use std::collections::HashMap;

use cosmwasm_std::testing::{MockApi, MockQuerier, MockStorage, MOCK_CONTRACT_ADDR};
use cosmwasm_std::{
    from_json, to_json_binary, Coin, Empty, OwnedDeps, Querier, QuerierResult, QueryRequest,
    SystemError, SystemResult, Uint128, WasmQuery,
};
use cw20::{BalanceResponse, Cw20QueryMsg, TokenInfoResponse};

/// mock_dependencies is a drop-in replacement for cosmwasm_std::testing::mock_dependencies.
/// This uses our custom querier which understands CW20 metadata queries.
pub fn mock_dependencies(
    contract_balance: &[Coin],
) -> OwnedDeps<MockStorage, MockApi, WasmMockQuerier> {
    let custom_querier =
        WasmMockQuerier::new(MockQuerier::new(&[(MOCK_CONTRACT_ADDR, contract_balance)]));

    OwnedDeps {
        storage: MockStorage::default(),
        api: MockApi::default(),
        querier: custom_querier,
        custom_query_type: Default::default(),
    }
}

#[derive(Clone, Default)]
struct TokenQuerier {
    /// token contract address -> (decimals, total supply)
    info: HashMap<String, (u8, Uint128)>,
    /// token contract address -> holder -> balance
    balances: HashMap<String, HashMap<String, Uint128>>,
}

pub struct WasmMockQuerier {
    base: MockQuerier,
    token_querier: TokenQuerier,
}

impl Querier for WasmMockQuerier {
    fn raw_query(&self, bin_request: &[u8]) -> QuerierResult {
        let request: QueryRequest<Empty> = match from_json(bin_request) {
            Ok(v) => v,
            Err(e) => {
                return SystemResult::Err(SystemError::InvalidRequest {
                    error: format!("Parsing query request: {e:?}"),
                    request: bin_request.into(),
                });
            }
        };
        self.handle_query(&request)
    }
}

impl WasmMockQuerier {
    pub fn new(base: MockQuerier) -> Self {
        WasmMockQuerier {
            base,
            token_querier: TokenQuerier::default(),
        }
    }

    /// Registers a CW20 token with the given metadata.
    pub fn with_token(&mut self, contract_addr: &str, decimals: u8, total_supply: u128) {
        self.token_querier
            .info
            .insert(contract_addr.to_string(), (decimals, total_supply.into()));
    }

    /// Sets a CW20 balance for a holder.
    pub fn with_balance(&mut self, contract_addr: &str, holder: &str, balance: u128) {
        self.token_querier
            .balances
            .entry(contract_addr.to_string())
            .or_default()
            .insert(holder.to_string(), balance.into());
    }

    fn handle_query(&self, request: &QueryRequest<Empty>) -> QuerierResult {
        match request {
            QueryRequest::Wasm(WasmQuery::Smart { contract_addr, msg }) => {
                match from_json(msg) {
                    Ok(Cw20QueryMsg::TokenInfo {}) => {
                        let Some((decimals, total_supply)) =
                            self.token_querier.info.get(contract_addr)
                        else {
                            return SystemResult::Err(SystemError::NoSuchContract {
                                addr: contract_addr.clone(),
                            });
                        };

                        SystemResult::Ok(
                            to_json_binary(&TokenInfoResponse {
                                name: contract_addr.clone(),
                                symbol: "mock".to_string(),
                                decimals: *decimals,
                                total_supply: *total_supply,
                            })
                            .into(),
                        )
                    }
                    Ok(Cw20QueryMsg::Balance { address }) => {
                        let balance = self
                            .token_querier
                            .balances
                            .get(contract_addr)
                            .and_then(|balances| balances.get(&address))
                            .copied()
                            .unwrap_or_default();

                        SystemResult::Ok(to_json_binary(&BalanceResponse { balance }).into())
                    }
                    _ => SystemResult::Err(SystemError::Unknown {}),
                }
            }
            _ => self.base.handle_query(request),
        }
    }
}
