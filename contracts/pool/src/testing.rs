use cosmwasm_std::testing::{mock_env, mock_info, MOCK_CONTRACT_ADDR};
use cosmwasm_std::{
    attr, from_json, to_json_binary, Addr, Reply, SubMsg, SubMsgResponse, SubMsgResult, Timestamp,
    Uint128, Uint64, WasmMsg,
};
use cw20::{Cw20ReceiveMsg, MinterResponse};

use stableswap::asset::{token_asset, token_asset_info};
use stableswap::pool::{
    ConfigResponse, Cw20HookMsg, ExecuteMsg, InstantiateMsg, QueryMsg, StablePoolUpdateParams,
    DEFAULT_LP_TOKEN_NAME, DEFAULT_LP_TOKEN_SYMBOL, LP_TOKEN_PRECISION,
};
use stableswap::token::InstantiateMsg as TokenInstantiateMsg;

use crate::contract::{execute, instantiate, query, reply};
use crate::error::ContractError;
use crate::mock_querier::{mock_dependencies, WasmMockQuerier};
use crate::state::CONFIG;

const OWNER: &str = "owner0000";

fn default_instantiate_msg() -> InstantiateMsg {
    InstantiateMsg {
        asset_infos: vec![
            token_asset_info(Addr::unchecked("dai0000")),
            token_asset_info(Addr::unchecked("usdc0000")),
            token_asset_info(Addr::unchecked("usdt0000")),
        ],
        token_code_id: 10,
        owner: OWNER.to_string(),
        amp: 200,
        fee: 4_000_000,
        admin_fee: 5_000_000_000,
        lp_token_name: None,
        lp_token_symbol: None,
    }
}

fn register_tokens(querier: &mut WasmMockQuerier) {
    querier.with_token("dai0000", 18, 0);
    querier.with_token("usdc0000", 6, 0);
    querier.with_token("usdt0000", 6, 0);
    querier.with_token("liquidity0000", LP_TOKEN_PRECISION, 0);
}

/// The reply the chain sends back after the share token instantiation,
/// carrying the address "liquidity0000".
fn token_instantiate_reply() -> Reply {
    Reply {
        id: 1,
        result: SubMsgResult::Ok(SubMsgResponse {
            events: vec![],
            data: Some(
                vec![
                    10, 13, 108, 105, 113, 117, 105, 100, 105, 116, 121, 48, 48, 48, 48,
                ]
                .into(),
            ),
        }),
    }
}

#[test]
fn proper_initialization() {
    let mut deps = mock_dependencies(&[]);
    register_tokens(&mut deps.querier);

    let msg = default_instantiate_msg();
    let info = mock_info("addr0000", &[]);
    let res = instantiate(deps.as_mut(), mock_env(), info, msg).unwrap();

    assert_eq!(
        res.messages,
        vec![SubMsg::reply_on_success(
            WasmMsg::Instantiate {
                admin: None,
                code_id: 10,
                msg: to_json_binary(&TokenInstantiateMsg {
                    name: DEFAULT_LP_TOKEN_NAME.to_string(),
                    symbol: DEFAULT_LP_TOKEN_SYMBOL.to_string(),
                    decimals: LP_TOKEN_PRECISION,
                    initial_balances: vec![],
                    mint: Some(MinterResponse {
                        minter: MOCK_CONTRACT_ADDR.to_string(),
                        cap: None,
                    }),
                })
                .unwrap(),
                funds: vec![],
                label: "Stableswap LP token".to_string(),
            },
            1,
        )]
    );

    reply(deps.as_mut(), mock_env(), token_instantiate_reply()).unwrap();

    let config: ConfigResponse =
        from_json(query(deps.as_ref(), mock_env(), QueryMsg::Config {}).unwrap()).unwrap();
    assert_eq!(config.owner, Addr::unchecked(OWNER));
    assert_eq!(
        config.pool_info.liquidity_token,
        Addr::unchecked("liquidity0000")
    );
    assert_eq!(config.amp, Uint64::new(200));
    assert_eq!(config.fee, 4_000_000);
    assert_eq!(config.admin_fee, 5_000_000_000);

    let state = CONFIG.load(deps.as_ref().storage).unwrap();
    assert_eq!(state.balances, vec![Uint128::zero(); 3]);
}

#[test]
fn instantiation_guards() {
    let mut deps = mock_dependencies(&[]);
    register_tokens(&mut deps.querier);
    let info = mock_info("addr0000", &[]);

    let mut msg = default_instantiate_msg();
    msg.asset_infos.pop();
    let err = instantiate(deps.as_mut(), mock_env(), info.clone(), msg).unwrap_err();
    assert_eq!(err, ContractError::InvalidNumberOfAssets {});

    let mut msg = default_instantiate_msg();
    msg.asset_infos[2] = msg.asset_infos[0].clone();
    let err = instantiate(deps.as_mut(), mock_env(), info.clone(), msg).unwrap_err();
    assert_eq!(err, ContractError::DoublingAssets {});

    let mut msg = default_instantiate_msg();
    msg.amp = 0;
    let err = instantiate(deps.as_mut(), mock_env(), info.clone(), msg).unwrap_err();
    assert_eq!(err, ContractError::IncorrectAmp {});

    let mut msg = default_instantiate_msg();
    msg.amp = 1_000_001;
    let err = instantiate(deps.as_mut(), mock_env(), info.clone(), msg).unwrap_err();
    assert_eq!(err, ContractError::IncorrectAmp {});

    let mut msg = default_instantiate_msg();
    msg.fee = 5_000_000_001;
    let err = instantiate(deps.as_mut(), mock_env(), info.clone(), msg).unwrap_err();
    assert_eq!(err, ContractError::FeeOutOfBounds {});

    let mut msg = default_instantiate_msg();
    msg.admin_fee = 10_000_000_001;
    let err = instantiate(deps.as_mut(), mock_env(), info.clone(), msg).unwrap_err();
    assert_eq!(err, ContractError::FeeOutOfBounds {});

    deps.querier.with_token("shib0000", 24, 0);
    let mut msg = default_instantiate_msg();
    msg.asset_infos[0] = token_asset_info(Addr::unchecked("shib0000"));
    let err = instantiate(deps.as_mut(), mock_env(), info, msg).unwrap_err();
    assert_eq!(err, ContractError::UnsupportedPrecision(24));
}

type PoolDeps =
    cosmwasm_std::OwnedDeps<cosmwasm_std::MemoryStorage, cosmwasm_std::testing::MockApi, WasmMockQuerier>;

fn setup_pool() -> PoolDeps {
    let mut deps = mock_dependencies(&[]);
    register_tokens(&mut deps.querier);

    instantiate(
        deps.as_mut(),
        mock_env(),
        mock_info("addr0000", &[]),
        default_instantiate_msg(),
    )
    .unwrap();
    reply(deps.as_mut(), mock_env(), token_instantiate_reply()).unwrap();

    deps
}

fn query_amp_at(deps: &PoolDeps, time: Timestamp) -> Uint64 {
    let mut env = mock_env();
    env.block.time = time;
    let config: ConfigResponse =
        from_json(query(deps.as_ref(), env, QueryMsg::Config {}).unwrap()).unwrap();
    config.amp
}

#[test]
fn amp_ramping() {
    let mut deps = setup_pool();
    let env = mock_env();
    let start = env.block.time;

    let start_ramp = |next_amp: u64, next_amp_time: Timestamp| ExecuteMsg::UpdateConfig {
        params: to_json_binary(&StablePoolUpdateParams::StartChangingAmp {
            next_amp,
            next_amp_time: next_amp_time.seconds(),
        })
        .unwrap(),
    };

    // only the owner may ramp
    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info("intruder", &[]),
        start_ramp(400, start.plus_seconds(86400)),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::Unauthorized {});

    // target bounds
    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        start_ramp(0, start.plus_seconds(86400)),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::IncorrectAmp {});

    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        start_ramp(1_000_001, start.plus_seconds(86400)),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::IncorrectAmp {});

    // the deadline must be at least a day away
    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        start_ramp(400, start.plus_seconds(86399)),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::MinAmpChangingTimeAssertion {});

    // at most a tenfold change in either direction
    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        start_ramp(2001, start.plus_seconds(86400)),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::MaxAmpChangeAssertion {});

    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        start_ramp(19, start.plus_seconds(86400)),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::MaxAmpChangeAssertion {});

    // a valid ramp commits and interpolates linearly
    execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        start_ramp(400, start.plus_seconds(86400)),
    )
    .unwrap();

    assert_eq!(query_amp_at(&deps, start), Uint64::new(200));
    assert_eq!(
        query_amp_at(&deps, start.plus_seconds(43200)),
        Uint64::new(300)
    );
    assert_eq!(
        query_amp_at(&deps, start.plus_seconds(86400)),
        Uint64::new(400)
    );
    assert_eq!(
        query_amp_at(&deps, start.plus_seconds(200_000)),
        Uint64::new(400)
    );

    // a second ramp within the first day of the active one is rejected
    let err = execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        start_ramp(300, start.plus_seconds(2 * 86400)),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::MinAmpChangingTimeAssertion {});

    // once the ramp completes, a new one may start right away
    let mut later_env = env.clone();
    later_env.block.time = start.plus_seconds(86400);
    execute(
        deps.as_mut(),
        later_env,
        mock_info(OWNER, &[]),
        start_ramp(800, start.plus_seconds(2 * 86400 + 1)),
    )
    .unwrap();
}

#[test]
fn amp_ramp_replaceable_after_first_day() {
    let mut deps = setup_pool();
    let env = mock_env();
    let start = env.block.time;

    // a three day ramp 200 -> 500
    execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::UpdateConfig {
            params: to_json_binary(&StablePoolUpdateParams::StartChangingAmp {
                next_amp: 500,
                next_amp_time: start.plus_seconds(3 * 86400).seconds(),
            })
            .unwrap(),
        },
    )
    .unwrap();

    // two days in the ramp is still active, but past its first day it may be
    // replaced; the new ramp starts from the interpolated value
    let mut env_mid = env.clone();
    env_mid.block.time = start.plus_seconds(2 * 86400);
    assert_eq!(query_amp_at(&deps, env_mid.block.time), Uint64::new(400));

    execute(
        deps.as_mut(),
        env_mid.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::UpdateConfig {
            params: to_json_binary(&StablePoolUpdateParams::StartChangingAmp {
                next_amp: 200,
                next_amp_time: env_mid.block.time.plus_seconds(86400).seconds(),
            })
            .unwrap(),
        },
    )
    .unwrap();

    let config: ConfigResponse =
        from_json(query(deps.as_ref(), env_mid, QueryMsg::Config {}).unwrap()).unwrap();
    assert_eq!(config.init_amp, 400);
    assert_eq!(config.next_amp, 200);
}

#[test]
fn amp_stop_ramping() {
    let mut deps = setup_pool();
    let env = mock_env();
    let start = env.block.time;

    execute(
        deps.as_mut(),
        env.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::UpdateConfig {
            params: to_json_binary(&StablePoolUpdateParams::StartChangingAmp {
                next_amp: 400,
                next_amp_time: start.plus_seconds(86400).seconds(),
            })
            .unwrap(),
        },
    )
    .unwrap();

    // freeze half way: amp stays at the interpolated value
    let mut env_mid = env.clone();
    env_mid.block.time = start.plus_seconds(43200);

    let err = execute(
        deps.as_mut(),
        env_mid.clone(),
        mock_info("intruder", &[]),
        ExecuteMsg::UpdateConfig {
            params: to_json_binary(&StablePoolUpdateParams::StopChangingAmp {}).unwrap(),
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::Unauthorized {});

    let res = execute(
        deps.as_mut(),
        env_mid.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::UpdateConfig {
            params: to_json_binary(&StablePoolUpdateParams::StopChangingAmp {}).unwrap(),
        },
    )
    .unwrap();
    assert!(res
        .attributes
        .contains(&attr("action", "stop_changing_amp")));

    assert_eq!(
        query_amp_at(&deps, start.plus_seconds(86400)),
        Uint64::new(300)
    );
    assert_eq!(
        query_amp_at(&deps, start.plus_seconds(10 * 86400)),
        Uint64::new(300)
    );

    // stopping resets the cooldown, so a fresh ramp may start immediately
    execute(
        deps.as_mut(),
        env_mid.clone(),
        mock_info(OWNER, &[]),
        ExecuteMsg::UpdateConfig {
            params: to_json_binary(&StablePoolUpdateParams::StartChangingAmp {
                next_amp: 600,
                next_amp_time: env_mid.block.time.plus_seconds(86400).seconds(),
            })
            .unwrap(),
        },
    )
    .unwrap();
}

#[test]
fn first_provide_mints_invariant() {
    let mut deps = setup_pool();

    let msg = ExecuteMsg::ProvideLiquidity {
        assets: vec![
            token_asset(Addr::unchecked("dai0000"), Uint128::new(1000 * 10u128.pow(18))),
            token_asset(Addr::unchecked("usdc0000"), Uint128::new(1000 * 10u128.pow(6))),
            token_asset(Addr::unchecked("usdt0000"), Uint128::new(1000 * 10u128.pow(6))),
        ],
        min_lp_to_receive: None,
        receiver: None,
    };

    let res = execute(deps.as_mut(), mock_env(), mock_info("addr0000", &[]), msg).unwrap();

    // a balanced first deposit mints exactly the invariant
    let minted = Uint128::new(3000 * 10u128.pow(18));
    assert!(res
        .attributes
        .contains(&attr("share", minted.to_string())));
    // three TransferFrom pulls plus the share mint
    assert_eq!(res.messages.len(), 4);

    let config = CONFIG.load(deps.as_ref().storage).unwrap();
    assert_eq!(
        config.balances,
        vec![
            Uint128::new(1000 * 10u128.pow(18)),
            Uint128::new(1000 * 10u128.pow(6)),
            Uint128::new(1000 * 10u128.pow(6)),
        ]
    );
}

#[test]
fn provide_guards() {
    let mut deps = setup_pool();
    let info = mock_info("addr0000", &[]);

    let err = execute(
        deps.as_mut(),
        mock_env(),
        info.clone(),
        ExecuteMsg::ProvideLiquidity {
            assets: vec![],
            min_lp_to_receive: None,
            receiver: None,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::InvalidZeroAmount {});

    let err = execute(
        deps.as_mut(),
        mock_env(),
        info.clone(),
        ExecuteMsg::ProvideLiquidity {
            assets: vec![token_asset(
                Addr::unchecked("shib0000"),
                Uint128::new(1000),
            )],
            min_lp_to_receive: None,
            receiver: None,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::InvalidAsset("shib0000".to_string()));

    // an empty pool cannot be seeded one-sided
    let err = execute(
        deps.as_mut(),
        mock_env(),
        info,
        ExecuteMsg::ProvideLiquidity {
            assets: vec![token_asset(
                Addr::unchecked("dai0000"),
                Uint128::new(1000 * 10u128.pow(18)),
            )],
            min_lp_to_receive: None,
            receiver: None,
        },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::InvalidProvideLPsWithSingleToken {});
}

#[test]
fn swap_hook_guards() {
    let mut deps = setup_pool();

    let hook = |ask: &str| Cw20HookMsg::Swap {
        ask_asset_info: token_asset_info(Addr::unchecked(ask)),
        min_receive: None,
        to: None,
    };

    // only pool asset contracts can initiate a swap
    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info("shib0000", &[]),
        ExecuteMsg::Receive(Cw20ReceiveMsg {
            sender: "addr0000".to_string(),
            amount: Uint128::new(1000),
            msg: to_json_binary(&hook("usdc0000")).unwrap(),
        }),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::Unauthorized {});

    // the ask asset must belong to the pool and differ from the offer
    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info("dai0000", &[]),
        ExecuteMsg::Receive(Cw20ReceiveMsg {
            sender: "addr0000".to_string(),
            amount: Uint128::new(1000),
            msg: to_json_binary(&hook("shib0000")).unwrap(),
        }),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::InvalidAsset("shib0000".to_string()));

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info("dai0000", &[]),
        ExecuteMsg::Receive(Cw20ReceiveMsg {
            sender: "addr0000".to_string(),
            amount: Uint128::new(1000),
            msg: to_json_binary(&hook("dai0000")).unwrap(),
        }),
    )
    .unwrap_err();
    assert_eq!(err, ContractError::SameAssets {});
}

#[test]
fn withdraw_hooks_gated_to_share_token() {
    let mut deps = setup_pool();

    for hook in [
        Cw20HookMsg::WithdrawLiquidity { min_assets: None },
        Cw20HookMsg::WithdrawOneCoin {
            ask_asset_info: token_asset_info(Addr::unchecked("dai0000")),
            min_receive: None,
        },
        Cw20HookMsg::WithdrawImbalanced { assets: vec![] },
    ] {
        let err = execute(
            deps.as_mut(),
            mock_env(),
            mock_info("dai0000", &[]),
            ExecuteMsg::Receive(Cw20ReceiveMsg {
                sender: "addr0000".to_string(),
                amount: Uint128::new(1000),
                msg: to_json_binary(&hook).unwrap(),
            }),
        )
        .unwrap_err();
        assert_eq!(err, ContractError::Unauthorized {});
    }
}

#[test]
fn virtual_price_of_empty_pool() {
    let deps = setup_pool();

    let virtual_price: Uint128 =
        from_json(query(deps.as_ref(), mock_env(), QueryMsg::VirtualPrice {}).unwrap()).unwrap();
    assert_eq!(virtual_price, Uint128::new(10u128.pow(18)));
}

#[test]
fn admin_fee_sweep_owner_only() {
    let mut deps = setup_pool();

    let err = execute(
        deps.as_mut(),
        mock_env(),
        mock_info("intruder", &[]),
        ExecuteMsg::WithdrawAdminFees { receiver: None },
    )
    .unwrap_err();
    assert_eq!(err, ContractError::Unauthorized {});

    // nothing accrued yet: no transfer messages
    let res = execute(
        deps.as_mut(),
        mock_env(),
        mock_info(OWNER, &[]),
        ExecuteMsg::WithdrawAdminFees { receiver: None },
    )
    .unwrap();
    assert!(res.messages.is_empty());
}
