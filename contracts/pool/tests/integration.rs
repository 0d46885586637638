use cosmwasm_std::{to_json_binary, Addr, Uint128, Uint64};
use cw20::{BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg, MinterResponse};
use cw_multi_test::{App, AppResponse, ContractWrapper, Executor};

use stableswap::asset::{token_asset, token_asset_info, Asset};
use stableswap::pool::{
    ConfigResponse, Cw20HookMsg, ExecuteMsg, InstantiateMsg, PoolResponse, QueryMsg,
    SimulationResponse, ReverseSimulationResponse,
};
use stableswap::token::InstantiateMsg as TokenInstantiateMsg;

use stableswap_pool::error::ContractError;

const OWNER: &str = "owner";

const ONE_DAI: u128 = 10u128.pow(18);
const ONE_USDC: u128 = 10u128.pow(6);
const ONE_USDT: u128 = 10u128.pow(6);
const ONE_SHARE: u128 = 10u128.pow(18);

fn store_token_code(app: &mut App) -> u64 {
    let token_contract = Box::new(ContractWrapper::new(
        stableswap_token::contract::execute,
        stableswap_token::contract::instantiate,
        stableswap_token::contract::query,
    ));

    app.store_code(token_contract)
}

fn store_pool_code(app: &mut App) -> u64 {
    let pool_contract = Box::new(
        ContractWrapper::new(
            stableswap_pool::contract::execute,
            stableswap_pool::contract::instantiate,
            stableswap_pool::contract::query,
        )
        .with_reply(stableswap_pool::contract::reply),
    );

    app.store_code(pool_contract)
}

struct Helper {
    app: App,
    owner: Addr,
    pool: Addr,
    lp_token: Addr,
    dai: Addr,
    usdc: Addr,
    usdt: Addr,
}

impl Helper {
    fn new() -> Self {
        Self::with_params(200, 4_000_000, 5_000_000_000)
    }

    fn with_params(amp: u64, fee: u64, admin_fee: u64) -> Self {
        let mut app = App::default();
        let owner = Addr::unchecked(OWNER);

        let token_code_id = store_token_code(&mut app);
        let pool_code_id = store_pool_code(&mut app);

        let mut tokens = vec![];
        for (name, symbol, decimals) in [
            ("Dai Stablecoin", "DAI", 18u8),
            ("USD Coin", "USDC", 6u8),
            ("Tether USD", "USDT", 6u8),
        ] {
            let token = app
                .instantiate_contract(
                    token_code_id,
                    owner.clone(),
                    &TokenInstantiateMsg {
                        name: name.to_string(),
                        symbol: symbol.to_string(),
                        decimals,
                        initial_balances: vec![],
                        mint: Some(MinterResponse {
                            minter: owner.to_string(),
                            cap: None,
                        }),
                    },
                    &[],
                    symbol,
                    None,
                )
                .unwrap();
            tokens.push(token);
        }

        let pool = app
            .instantiate_contract(
                pool_code_id,
                owner.clone(),
                &InstantiateMsg {
                    asset_infos: tokens.iter().cloned().map(token_asset_info).collect(),
                    token_code_id,
                    owner: owner.to_string(),
                    amp,
                    fee,
                    admin_fee,
                    lp_token_name: None,
                    lp_token_symbol: None,
                },
                &[],
                "3pool",
                None,
            )
            .unwrap();

        let config: ConfigResponse = app
            .wrap()
            .query_wasm_smart(&pool, &QueryMsg::Config {})
            .unwrap();

        Helper {
            app,
            owner,
            pool,
            lp_token: config.pool_info.liquidity_token,
            dai: tokens[0].clone(),
            usdc: tokens[1].clone(),
            usdt: tokens[2].clone(),
        }
    }

    fn mint(&mut self, token: &Addr, recipient: &str, amount: u128) {
        self.app
            .execute_contract(
                self.owner.clone(),
                token.clone(),
                &Cw20ExecuteMsg::Mint {
                    recipient: recipient.to_string(),
                    amount: amount.into(),
                },
                &[],
            )
            .unwrap();
    }

    /// Mints a comfortable working balance of every pool asset.
    fn fund(&mut self, user: &str) {
        let (dai, usdc, usdt) = (self.dai.clone(), self.usdc.clone(), self.usdt.clone());
        self.mint(&dai, user, 100_000 * ONE_DAI);
        self.mint(&usdc, user, 100_000 * ONE_USDC);
        self.mint(&usdt, user, 100_000 * ONE_USDT);
    }

    fn provide(
        &mut self,
        user: &str,
        amounts: [u128; 3],
        min_lp_to_receive: Option<Uint128>,
    ) -> anyhow::Result<AppResponse> {
        let mut assets = vec![];
        for (token, amount) in [
            (self.dai.clone(), amounts[0]),
            (self.usdc.clone(), amounts[1]),
            (self.usdt.clone(), amounts[2]),
        ] {
            if amount == 0 {
                continue;
            }
            self.app
                .execute_contract(
                    Addr::unchecked(user),
                    token.clone(),
                    &Cw20ExecuteMsg::IncreaseAllowance {
                        spender: self.pool.to_string(),
                        amount: amount.into(),
                        expires: None,
                    },
                    &[],
                )
                .unwrap();
            assets.push(token_asset(token, amount.into()));
        }

        self.app.execute_contract(
            Addr::unchecked(user),
            self.pool.clone(),
            &ExecuteMsg::ProvideLiquidity {
                assets,
                min_lp_to_receive,
                receiver: None,
            },
            &[],
        )
    }

    fn swap(
        &mut self,
        user: &str,
        offer_token: &Addr,
        ask_token: &Addr,
        amount: u128,
        min_receive: Option<Uint128>,
    ) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            Addr::unchecked(user),
            offer_token.clone(),
            &Cw20ExecuteMsg::Send {
                contract: self.pool.to_string(),
                amount: amount.into(),
                msg: to_json_binary(&Cw20HookMsg::Swap {
                    ask_asset_info: token_asset_info(ask_token.clone()),
                    min_receive,
                    to: None,
                })
                .unwrap(),
            },
            &[],
        )
    }

    fn withdraw(
        &mut self,
        user: &str,
        amount: u128,
        min_assets: Option<Vec<Asset>>,
    ) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            Addr::unchecked(user),
            self.lp_token.clone(),
            &Cw20ExecuteMsg::Send {
                contract: self.pool.to_string(),
                amount: amount.into(),
                msg: to_json_binary(&Cw20HookMsg::WithdrawLiquidity { min_assets }).unwrap(),
            },
            &[],
        )
    }

    fn withdraw_one_coin(
        &mut self,
        user: &str,
        amount: u128,
        ask_token: &Addr,
        min_receive: Option<Uint128>,
    ) -> anyhow::Result<AppResponse> {
        self.app.execute_contract(
            Addr::unchecked(user),
            self.lp_token.clone(),
            &Cw20ExecuteMsg::Send {
                contract: self.pool.to_string(),
                amount: amount.into(),
                msg: to_json_binary(&Cw20HookMsg::WithdrawOneCoin {
                    ask_asset_info: token_asset_info(ask_token.clone()),
                    min_receive,
                })
                .unwrap(),
            },
            &[],
        )
    }

    fn withdraw_imbalanced(
        &mut self,
        user: &str,
        sent_shares: u128,
        amounts: [(Addr, u128); 2],
    ) -> anyhow::Result<AppResponse> {
        let assets = amounts
            .into_iter()
            .map(|(token, amount)| token_asset(token, amount.into()))
            .collect();

        self.app.execute_contract(
            Addr::unchecked(user),
            self.lp_token.clone(),
            &Cw20ExecuteMsg::Send {
                contract: self.pool.to_string(),
                amount: sent_shares.into(),
                msg: to_json_binary(&Cw20HookMsg::WithdrawImbalanced { assets }).unwrap(),
            },
            &[],
        )
    }

    fn token_balance(&self, token: &Addr, user: &str) -> u128 {
        let resp: BalanceResponse = self
            .app
            .wrap()
            .query_wasm_smart(
                token,
                &Cw20QueryMsg::Balance {
                    address: user.to_string(),
                },
            )
            .unwrap();
        resp.balance.u128()
    }

    fn lp_balance(&self, user: &str) -> u128 {
        self.token_balance(&self.lp_token, user)
    }

    fn pool_reserves(&self) -> PoolResponse {
        self.app
            .wrap()
            .query_wasm_smart(&self.pool, &QueryMsg::Pool {})
            .unwrap()
    }

    fn virtual_price(&self) -> u128 {
        let price: Uint128 = self
            .app
            .wrap()
            .query_wasm_smart(&self.pool, &QueryMsg::VirtualPrice {})
            .unwrap();
        price.u128()
    }

    /// On-token balance minus accounted reserve, per asset. This is the
    /// admin's claim.
    fn admin_surplus(&self) -> [u128; 3] {
        let reserves = self.pool_reserves();
        let mut surplus = [0u128; 3];
        for (index, token) in [&self.dai, &self.usdc, &self.usdt].into_iter().enumerate() {
            let on_token = self.token_balance(token, self.pool.as_str());
            surplus[index] = on_token - reserves.assets[index].amount.u128();
        }
        surplus
    }

    fn assert_reserves_covered(&self) {
        let reserves = self.pool_reserves();
        for (index, token) in [&self.dai, &self.usdc, &self.usdt].into_iter().enumerate() {
            let on_token = self.token_balance(token, self.pool.as_str());
            assert!(
                on_token >= reserves.assets[index].amount.u128(),
                "accounted reserve of {token} exceeds its token balance"
            );
        }
    }
}

#[test]
fn first_deposit_mints_invariant() {
    let mut helper = Helper::new();
    helper.fund("alice");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();

    let minted = helper.lp_balance("alice");
    assert!(minted > 2990 * ONE_SHARE && minted < 3010 * ONE_SHARE);

    let reserves = helper.pool_reserves();
    assert_eq!(reserves.assets[0].amount.u128(), 1000 * ONE_DAI);
    assert_eq!(reserves.assets[1].amount.u128(), 1000 * ONE_USDC);
    assert_eq!(reserves.assets[2].amount.u128(), 1000 * ONE_USDT);
    assert_eq!(reserves.total_share.u128(), minted);

    assert_eq!(helper.virtual_price(), 10u128.pow(18));
    helper.assert_reserves_covered();
}

#[test]
fn balanced_deposit_mints_pro_rata() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();
    let alice_shares = helper.lp_balance("alice");

    helper
        .provide("bob", [500 * ONE_DAI, 500 * ONE_USDC, 500 * ONE_USDT], None)
        .unwrap();

    let bob_shares = helper.lp_balance("bob");
    assert!(bob_shares > 1450 * ONE_SHARE && bob_shares < 1550 * ONE_SHARE);
    assert_eq!(helper.lp_balance("alice"), alice_shares);
}

#[test]
fn imbalanced_deposit_is_penalized() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();

    let price_before = helper.virtual_price();
    helper.provide("bob", [500 * ONE_DAI, 0, 0], None).unwrap();

    let bob_shares = helper.lp_balance("bob");
    assert!(bob_shares > 480 * ONE_SHARE && bob_shares < 500 * ONE_SHARE);

    // the penalty stays with the pool and lifts the share value
    assert!(helper.virtual_price() >= price_before);
    helper.assert_reserves_covered();
}

#[test]
fn provide_respects_min_lp() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();

    let err = helper
        .provide(
            "bob",
            [500 * ONE_DAI, 0, 0],
            Some(Uint128::new(500 * ONE_SHARE)),
        )
        .unwrap_err();
    match err.downcast().unwrap() {
        ContractError::ProvideSlippageViolation(received, expected) => {
            assert_eq!(expected.u128(), 500 * ONE_SHARE);
            assert!(received.u128() < 500 * ONE_SHARE);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn swap_between_stables() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();

    // 100 DAI -> USDC
    let usdc_before = helper.token_balance(&helper.usdc.clone(), "bob");
    let (dai, usdc) = (helper.dai.clone(), helper.usdc.clone());
    helper
        .swap("bob", &dai, &usdc, 100 * ONE_DAI, None)
        .unwrap();
    let dy = helper.token_balance(&usdc, "bob") - usdc_before;
    assert!(dy > 99 * ONE_USDC && dy < 100 * ONE_USDC);

    // half of the fee accrues to the admin as unaccounted USDC
    let surplus = helper.admin_surplus();
    assert!(surplus[1] > 0);
    helper.assert_reserves_covered();

    // 50 USDC -> USDT barely moves the peg
    let usdt = helper.usdt.clone();
    let usdt_before = helper.token_balance(&usdt, "bob");
    helper
        .swap("bob", &usdc, &usdt, 50 * ONE_USDC, None)
        .unwrap();
    let dy = helper.token_balance(&usdt, "bob") - usdt_before;
    assert!(dy > 49_900_000 && dy < 50 * ONE_USDT);
}

#[test]
fn swap_respects_min_receive() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();

    let (dai, usdc) = (helper.dai.clone(), helper.usdc.clone());
    let err = helper
        .swap(
            "bob",
            &dai,
            &usdc,
            100 * ONE_DAI,
            Some(Uint128::new(100 * ONE_USDC)),
        )
        .unwrap_err();
    match err.downcast().unwrap() {
        ContractError::MinReceiveAssertion { received, .. } => {
            assert!(received.u128() < 100 * ONE_USDC);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn quote_never_exceeds_execution() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();

    let quote: SimulationResponse = helper
        .app
        .wrap()
        .query_wasm_smart(
            &helper.pool,
            &QueryMsg::Simulation {
                offer_asset: token_asset(helper.dai.clone(), Uint128::new(100 * ONE_DAI)),
                ask_asset_info: token_asset_info(helper.usdc.clone()),
            },
        )
        .unwrap();

    let (dai, usdc) = (helper.dai.clone(), helper.usdc.clone());
    let usdc_before = helper.token_balance(&usdc, "bob");
    helper
        .swap("bob", &dai, &usdc, 100 * ONE_DAI, None)
        .unwrap();
    let executed = helper.token_balance(&usdc, "bob") - usdc_before;

    assert!(quote.return_amount.u128() <= executed);
    assert!(executed - quote.return_amount.u128() <= 1);
    assert!(quote.commission_amount.u128() > 0);
}

#[test]
fn reverse_quote_is_consistent() {
    let mut helper = Helper::new();
    helper.fund("alice");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();

    let reverse: ReverseSimulationResponse = helper
        .app
        .wrap()
        .query_wasm_smart(
            &helper.pool,
            &QueryMsg::ReverseSimulation {
                ask_asset: token_asset(helper.usdc.clone(), Uint128::new(100 * ONE_USDC)),
                offer_asset_info: token_asset_info(helper.dai.clone()),
            },
        )
        .unwrap();

    // 100 USDC out of a balanced pool costs a hair over 100 DAI plus the fee
    let offer = reverse.offer_amount.u128();
    assert!(offer > 100 * ONE_DAI);
    assert!(offer < 101 * ONE_DAI);
}

#[test]
fn balanced_withdraw_is_pro_rata() {
    let mut helper = Helper::new();
    helper.fund("alice");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();
    let shares = helper.lp_balance("alice");

    let dai_before = helper.token_balance(&helper.dai.clone(), "alice");
    let usdc_before = helper.token_balance(&helper.usdc.clone(), "alice");
    let usdt_before = helper.token_balance(&helper.usdt.clone(), "alice");

    helper.withdraw("alice", shares / 2, None).unwrap();

    let dai_out = helper.token_balance(&helper.dai.clone(), "alice") - dai_before;
    let usdc_out = helper.token_balance(&helper.usdc.clone(), "alice") - usdc_before;
    let usdt_out = helper.token_balance(&helper.usdt.clone(), "alice") - usdt_before;

    // within 1% of an exact half
    assert!(dai_out >= 495 * ONE_DAI && dai_out <= 500 * ONE_DAI);
    assert!(usdc_out >= 495 * ONE_USDC && usdc_out <= 500 * ONE_USDC);
    assert!(usdt_out >= 495 * ONE_USDT && usdt_out <= 500 * ONE_USDT);

    assert_eq!(helper.lp_balance("alice"), shares - shares / 2);
    helper.assert_reserves_covered();
}

#[test]
fn balanced_withdraw_respects_min_assets() {
    let mut helper = Helper::new();
    helper.fund("alice");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();
    let shares = helper.lp_balance("alice");

    let err = helper
        .withdraw(
            "alice",
            shares / 2,
            Some(vec![token_asset(
                helper.dai.clone(),
                Uint128::new(501 * ONE_DAI),
            )]),
        )
        .unwrap_err();
    match err.downcast().unwrap() {
        ContractError::WithdrawSlippageViolation { expected, .. } => {
            assert_eq!(expected.u128(), 501 * ONE_DAI);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn withdraw_single_asset() {
    let mut helper = Helper::new();
    helper.fund("alice");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();
    let shares = helper.lp_balance("alice");
    let price_before = helper.virtual_price();

    let quoted: Uint128 = helper
        .app
        .wrap()
        .query_wasm_smart(
            &helper.pool,
            &QueryMsg::SimulateWithdrawOneCoin {
                lp_amount: Uint128::new(300 * ONE_SHARE),
                ask_asset_info: token_asset_info(helper.usdc.clone()),
            },
        )
        .unwrap();

    let usdc = helper.usdc.clone();
    let usdc_before = helper.token_balance(&usdc, "alice");
    helper
        .withdraw_one_coin("alice", 300 * ONE_SHARE, &usdc, None)
        .unwrap();
    let dy = helper.token_balance(&usdc, "alice") - usdc_before;

    // slightly under the 300 the shares were worth: curve slippage plus the
    // imbalance fee
    assert!(dy > 295 * ONE_USDC && dy < 300 * ONE_USDC);
    assert_eq!(quoted.u128(), dy);

    assert_eq!(helper.lp_balance("alice"), shares - 300 * ONE_SHARE);
    assert!(helper.virtual_price() >= price_before);
    assert!(helper.admin_surplus()[1] > 0);
    helper.assert_reserves_covered();
}

#[test]
fn withdraw_imbalanced_burns_what_is_needed() {
    let mut helper = Helper::new();
    helper.fund("alice");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();
    let shares = helper.lp_balance("alice");

    let dai_before = helper.token_balance(&helper.dai.clone(), "alice");
    let usdc_before = helper.token_balance(&helper.usdc.clone(), "alice");

    let (dai, usdc) = (helper.dai.clone(), helper.usdc.clone());
    helper
        .withdraw_imbalanced(
            "alice",
            shares,
            [(dai.clone(), 200 * ONE_DAI), (usdc.clone(), 50 * ONE_USDC)],
        )
        .unwrap();

    // exactly the requested amounts arrive
    assert_eq!(
        helper.token_balance(&dai, "alice") - dai_before,
        200 * ONE_DAI
    );
    assert_eq!(
        helper.token_balance(&usdc, "alice") - usdc_before,
        50 * ONE_USDC
    );

    // more than the pro-rata share burns, the unused rest is refunded
    let burned = shares - helper.lp_balance("alice");
    let pro_rata = shares * 250 / 3000;
    assert!(burned > pro_rata);
    assert!(burned < shares);
    helper.assert_reserves_covered();
}

#[test]
fn withdraw_imbalanced_rejects_overdraw() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();
    helper.provide("bob", [10 * ONE_DAI, 10 * ONE_USDC, 10 * ONE_USDT], None).unwrap();
    let bob_shares = helper.lp_balance("bob");

    // bob's shares cannot pay for a 200 DAI withdrawal
    let dai = helper.dai.clone();
    let usdc = helper.usdc.clone();
    let err = helper
        .withdraw_imbalanced("bob", bob_shares, [(dai, 200 * ONE_DAI), (usdc, 0)])
        .unwrap_err();
    match err.downcast().unwrap() {
        ContractError::BurnExceedsProvided { provided, required } => {
            assert_eq!(provided.u128(), bob_shares);
            assert!(required.u128() > bob_shares);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn draining_one_reserve_fails_cleanly() {
    let mut helper = Helper::new();
    helper.fund("alice");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();
    let shares = helper.lp_balance("alice");

    // requesting the entire DAI reserve zeroes a solver input
    let dai = helper.dai.clone();
    let usdc = helper.usdc.clone();
    let err = helper
        .withdraw_imbalanced("alice", shares, [(dai, 1000 * ONE_DAI), (usdc, 0)])
        .unwrap_err();
    assert!(err.downcast::<ContractError>().is_ok());
}

#[test]
fn burning_the_entire_supply_empties_the_pool() {
    let mut helper = Helper::new();
    helper.fund("alice");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();
    let shares = helper.lp_balance("alice");

    helper.withdraw("alice", shares, None).unwrap();

    assert_eq!(helper.lp_balance("alice"), 0);
    let reserves = helper.pool_reserves();
    assert_eq!(reserves.total_share.u128(), 0);
    for asset in reserves.assets {
        assert_eq!(asset.amount.u128(), 0);
    }
    // an empty pool quotes the initial virtual price again
    assert_eq!(helper.virtual_price(), 10u128.pow(18));
}

#[test]
fn round_trip_swap_loses_at_most_the_fees() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();

    let (dai, usdc) = (helper.dai.clone(), helper.usdc.clone());
    let dx = 100 * ONE_DAI;

    let usdc_before = helper.token_balance(&usdc, "bob");
    helper.swap("bob", &dai, &usdc, dx, None).unwrap();
    let received_usdc = helper.token_balance(&usdc, "bob") - usdc_before;

    let dai_before = helper.token_balance(&dai, "bob");
    helper.swap("bob", &usdc, &dai, received_usdc, None).unwrap();
    let received_back = helper.token_balance(&dai, "bob") - dai_before;

    assert!(received_back < dx);
    // near the balance point the round trip costs little more than two fees
    assert!(received_back > dx * 999 / 1000);
}

#[test]
fn provide_estimate_matches_actual_mint() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    let amounts = [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT];
    let assets = vec![
        token_asset(helper.dai.clone(), Uint128::new(amounts[0])),
        token_asset(helper.usdc.clone(), Uint128::new(amounts[1])),
        token_asset(helper.usdt.clone(), Uint128::new(amounts[2])),
    ];

    // on an empty pool the fee-free estimate is exact
    let estimate: Uint128 = helper
        .app
        .wrap()
        .query_wasm_smart(&helper.pool, &QueryMsg::SimulateProvide { assets })
        .unwrap();

    helper.provide("alice", amounts, None).unwrap();
    assert_eq!(estimate.u128(), helper.lp_balance("alice"));

    // afterwards it stays an upper bound: fees only reduce the mint
    let imbalanced = vec![token_asset(helper.dai.clone(), Uint128::new(500 * ONE_DAI))];
    let estimate: Uint128 = helper
        .app
        .wrap()
        .query_wasm_smart(
            &helper.pool,
            &QueryMsg::SimulateProvide { assets: imbalanced },
        )
        .unwrap();

    helper.provide("bob", [500 * ONE_DAI, 0, 0], None).unwrap();
    assert!(estimate.u128() >= helper.lp_balance("bob"));
}

#[test]
fn admin_fees_are_sweepable() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();

    let (dai, usdc, usdt) = (helper.dai.clone(), helper.usdc.clone(), helper.usdt.clone());
    helper.swap("bob", &dai, &usdc, 100 * ONE_DAI, None).unwrap();
    helper.swap("bob", &usdc, &usdt, 50 * ONE_USDC, None).unwrap();

    let surplus_before = helper.admin_surplus();
    assert!(surplus_before[1] > 0 && surplus_before[2] > 0);

    // only the owner can sweep
    let err = helper
        .app
        .execute_contract(
            Addr::unchecked("bob"),
            helper.pool.clone(),
            &ExecuteMsg::WithdrawAdminFees { receiver: None },
            &[],
        )
        .unwrap_err();
    assert_eq!(
        err.downcast::<ContractError>().unwrap(),
        ContractError::Unauthorized {}
    );

    let owner = helper.owner.clone();
    let pool = helper.pool.clone();
    helper
        .app
        .execute_contract(
            owner.clone(),
            pool,
            &ExecuteMsg::WithdrawAdminFees {
                receiver: Some("treasury".to_string()),
            },
            &[],
        )
        .unwrap();

    assert_eq!(helper.token_balance(&usdc, "treasury"), surplus_before[1]);
    assert_eq!(helper.token_balance(&usdt, "treasury"), surplus_before[2]);

    // after the sweep the token balances match the accounting exactly
    assert_eq!(helper.admin_surplus(), [0, 0, 0]);
}

#[test]
fn virtual_price_never_decreases() {
    let mut helper = Helper::new();
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();
    let mut last_price = helper.virtual_price();

    let (dai, usdc) = (helper.dai.clone(), helper.usdc.clone());
    helper.swap("bob", &dai, &usdc, 200 * ONE_DAI, None).unwrap();
    let price = helper.virtual_price();
    assert!(price >= last_price);
    last_price = price;

    helper.provide("bob", [0, 300 * ONE_USDC, 0], None).unwrap();
    let price = helper.virtual_price();
    assert!(price >= last_price);
    last_price = price;

    helper
        .withdraw_one_coin("bob", helper.lp_balance("bob"), &usdc.clone(), None)
        .unwrap();
    let price = helper.virtual_price();
    assert!(price >= last_price);
    last_price = price;

    helper
        .withdraw("alice", helper.lp_balance("alice") / 3, None)
        .unwrap();
    assert!(helper.virtual_price() >= last_price);
    helper.assert_reserves_covered();
}

#[test]
fn amp_ramp_moves_the_curve() {
    let mut helper = Helper::with_params(100, 4_000_000, 5_000_000_000);
    helper.fund("alice");
    helper.fund("bob");

    helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();

    let start = helper.app.block_info().time;
    let owner = helper.owner.clone();
    let pool = helper.pool.clone();
    helper
        .app
        .execute_contract(
            owner,
            pool.clone(),
            &ExecuteMsg::UpdateConfig {
                params: to_json_binary(
                    &stableswap::pool::StablePoolUpdateParams::StartChangingAmp {
                        next_amp: 1000,
                        next_amp_time: start.plus_seconds(86400).seconds(),
                    },
                )
                .unwrap(),
            },
            &[],
        )
        .unwrap();

    helper
        .app
        .update_block(|block| block.time = block.time.plus_seconds(43200));
    let config: ConfigResponse = helper
        .app
        .wrap()
        .query_wasm_smart(&pool, &QueryMsg::Config {})
        .unwrap();
    assert_eq!(config.amp, Uint64::new(550));

    helper
        .app
        .update_block(|block| block.time = block.time.plus_seconds(43200));
    let config: ConfigResponse = helper
        .app
        .wrap()
        .query_wasm_smart(&pool, &QueryMsg::Config {})
        .unwrap();
    assert_eq!(config.amp, Uint64::new(1000));

    // a higher amplification flattens the curve: the same trade returns more
    let quote: SimulationResponse = helper
        .app
        .wrap()
        .query_wasm_smart(
            &pool,
            &QueryMsg::Simulation {
                offer_asset: token_asset(helper.dai.clone(), Uint128::new(500 * ONE_DAI)),
                ask_asset_info: token_asset_info(helper.usdc.clone()),
            },
        )
        .unwrap();

    let (dai, usdc) = (helper.dai.clone(), helper.usdc.clone());
    let usdc_before = helper.token_balance(&usdc, "bob");
    helper.swap("bob", &dai, &usdc, 500 * ONE_DAI, None).unwrap();
    let dy_high_amp = helper.token_balance(&usdc, "bob") - usdc_before;
    assert!(dy_high_amp >= quote.return_amount.u128());

    let mut flat_helper = Helper::with_params(1, 4_000_000, 5_000_000_000);
    flat_helper.fund("alice");
    flat_helper.fund("bob");
    flat_helper
        .provide("alice", [1000 * ONE_DAI, 1000 * ONE_USDC, 1000 * ONE_USDT], None)
        .unwrap();
    let (dai, usdc) = (flat_helper.dai.clone(), flat_helper.usdc.clone());
    let usdc_before = flat_helper.token_balance(&usdc, "bob");
    flat_helper
        .swap("bob", &dai, &usdc, 500 * ONE_DAI, None)
        .unwrap();
    let dy_low_amp = flat_helper.token_balance(&usdc, "bob") - usdc_before;

    assert!(dy_high_amp > dy_low_amp);
}

#[test]
fn share_token_metadata() {
    let helper = Helper::new();

    let info: cw20::TokenInfoResponse = helper
        .app
        .wrap()
        .query_wasm_smart(&helper.lp_token, &Cw20QueryMsg::TokenInfo {})
        .unwrap();

    assert_eq!(info.name, "Curve.fi DAI/USDC/USDT");
    assert_eq!(info.symbol, "3CRV");
    assert_eq!(info.decimals, 18);
    assert_eq!(info.total_supply, Uint128::zero());
}
