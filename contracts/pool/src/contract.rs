use cosmwasm_std::{
    attr, entry_point, from_json, to_json_binary, wasm_execute, Addr, Binary, CosmosMsg, Deps,
    DepsMut, Env, MessageInfo, Reply, Response, SubMsg, Uint128, Uint256, WasmMsg,
};
use cw2::{get_contract_version, set_contract_version};
use cw20::{Cw20ExecuteMsg, Cw20ReceiveMsg, MinterResponse};
use cw_utils::parse_reply_instantiate_data;
use itertools::Itertools;

use stableswap::asset::{token_asset_info, Asset, AssetInfo, PoolInfo};
use stableswap::pool::{
    ConfigResponse, Cw20HookMsg, ExecuteMsg, InstantiateMsg, MigrateMsg, PoolResponse, QueryMsg,
    ReverseSimulationResponse, SimulationResponse, StablePoolUpdateParams, DEFAULT_LP_TOKEN_NAME,
    DEFAULT_LP_TOKEN_SYMBOL, FEE_DENOMINATOR, LP_TOKEN_PRECISION, MAX_ADMIN_FEE, MAX_FEE, N_COINS,
};
use stableswap::querier::query_supply;
use stableswap::token::InstantiateMsg as TokenInstantiateMsg;

use crate::error::ContractError;
use crate::math::{calc_y, calc_y_d, compute_d, MAX_AMP, MAX_AMP_CHANGE, MIN_AMP_CHANGING_TIME};
use crate::state::{store_precisions, Config, CONFIG};
use crate::utils::{
    apply_imbalance_fees, asset_precisions, check_asset_infos, check_assets, compute_current_amp,
    compute_swap, denormalize, get_share_in_assets, imbalance_fee_rate,
    mint_liquidity_token_message, normalize, pool_assets, pool_xp, NORM_PRECISION,
};

/// Contract name that is used for migration.
const CONTRACT_NAME: &str = "stableswap-pool";
/// Contract version that is used for migration.
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");
/// A `reply` call code ID used for the share token instantiation sub-message.
const INSTANTIATE_TOKEN_REPLY_ID: u64 = 1;

/// Creates a new pool with the specified parameters in the [`InstantiateMsg`].
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    mut deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    if msg.asset_infos.len() != N_COINS {
        return Err(ContractError::InvalidNumberOfAssets {});
    }
    check_asset_infos(deps.api, &msg.asset_infos)?;

    if msg.amp == 0 || msg.amp > MAX_AMP {
        return Err(ContractError::IncorrectAmp {});
    }
    if msg.fee > MAX_FEE || msg.admin_fee > MAX_ADMIN_FEE {
        return Err(ContractError::FeeOutOfBounds {});
    }

    let precisions = store_precisions(deps.branch(), &msg.asset_infos)?;
    if let Some(precision) = precisions.into_iter().find(|&p| p > NORM_PRECISION) {
        return Err(ContractError::UnsupportedPrecision(precision));
    }

    let block_time = env.block.time.seconds();
    let config = Config {
        owner: deps.api.addr_validate(&msg.owner)?,
        pool_info: PoolInfo {
            asset_infos: msg.asset_infos,
            contract_addr: env.contract.address.clone(),
            liquidity_token: Addr::unchecked(""),
        },
        balances: vec![Uint128::zero(); N_COINS],
        fee: msg.fee,
        admin_fee: msg.admin_fee,
        init_amp: msg.amp,
        init_amp_time: block_time,
        next_amp: msg.amp,
        next_amp_time: block_time,
    };

    CONFIG.save(deps.storage, &config)?;

    // Create the share token
    let sub_msg = SubMsg::reply_on_success(
        WasmMsg::Instantiate {
            admin: None,
            code_id: msg.token_code_id,
            msg: to_json_binary(&TokenInstantiateMsg {
                name: msg
                    .lp_token_name
                    .unwrap_or_else(|| DEFAULT_LP_TOKEN_NAME.to_string()),
                symbol: msg
                    .lp_token_symbol
                    .unwrap_or_else(|| DEFAULT_LP_TOKEN_SYMBOL.to_string()),
                decimals: LP_TOKEN_PRECISION,
                initial_balances: vec![],
                mint: Some(MinterResponse {
                    minter: env.contract.address.to_string(),
                    cap: None,
                }),
            })?,
            funds: vec![],
            label: "Stableswap LP token".to_string(),
        },
        INSTANTIATE_TOKEN_REPLY_ID,
    );

    Ok(Response::new().add_submessage(sub_msg))
}

/// The entry point to the contract for processing replies from submessages.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    if msg.id != INSTANTIATE_TOKEN_REPLY_ID {
        return Err(ContractError::FailedToParseReply {});
    }

    let mut config = CONFIG.load(deps.storage)?;

    if config.pool_info.liquidity_token != Addr::unchecked("") {
        return Err(ContractError::Unauthorized {});
    }

    let res = parse_reply_instantiate_data(msg)
        .map_err(|_| ContractError::FailedToParseReply {})?;
    config.pool_info.liquidity_token = deps.api.addr_validate(&res.contract_address)?;

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attribute("liquidity_token_addr", config.pool_info.liquidity_token))
}

/// Exposes all the execute functions available in the contract.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Receive(msg) => receive_cw20(deps, env, info, msg),
        ExecuteMsg::ProvideLiquidity {
            assets,
            min_lp_to_receive,
            receiver,
        } => provide_liquidity(deps, env, info, assets, min_lp_to_receive, receiver),
        ExecuteMsg::UpdateConfig { params } => update_config(deps, env, info, params),
        ExecuteMsg::WithdrawAdminFees { receiver } => {
            withdraw_admin_fees(deps, env, info, receiver)
        }
    }
}

/// Receives a message of type [`Cw20ReceiveMsg`] and processes it depending on
/// the received template. Swaps are initiated by sending a pool asset here;
/// withdrawals by sending share tokens.
pub fn receive_cw20(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    cw20_msg: Cw20ReceiveMsg,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let sender = deps.api.addr_validate(&cw20_msg.sender)?;

    match from_json(&cw20_msg.msg)? {
        Cw20HookMsg::Swap {
            ask_asset_info,
            min_receive,
            to,
        } => {
            // only a pool asset contract may initiate a swap
            let offer_index = config
                .pool_info
                .index_of(&token_asset_info(info.sender))
                .ok_or(ContractError::Unauthorized {})?;
            let ask_index = config
                .pool_info
                .index_of(&ask_asset_info)
                .ok_or_else(|| ContractError::InvalidAsset(ask_asset_info.to_string()))?;
            if offer_index == ask_index {
                return Err(ContractError::SameAssets {});
            }

            let to_addr = to
                .map(|addr| deps.api.addr_validate(&addr))
                .transpose()?;

            swap(
                deps,
                env,
                config,
                sender,
                offer_index,
                ask_index,
                cw20_msg.amount,
                min_receive,
                to_addr,
            )
        }
        Cw20HookMsg::WithdrawLiquidity { min_assets } => {
            withdraw_liquidity(deps, env, info, config, sender, cw20_msg.amount, min_assets)
        }
        Cw20HookMsg::WithdrawOneCoin {
            ask_asset_info,
            min_receive,
        } => withdraw_one_coin(
            deps,
            env,
            info,
            config,
            sender,
            cw20_msg.amount,
            ask_asset_info,
            min_receive,
        ),
        Cw20HookMsg::WithdrawImbalanced { assets } => {
            withdraw_imbalanced(deps, env, info, config, sender, cw20_msg.amount, assets)
        }
    }
}

/// Provides liquidity with the amounts specified in `assets`. Pool assets
/// omitted from the vector count as zero deposits.
///
/// CW20 allowances for the pool must be set up beforehand.
pub fn provide_liquidity(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    assets: Vec<Asset>,
    min_lp_to_receive: Option<Uint128>,
    receiver: Option<String>,
) -> Result<Response, ContractError> {
    check_assets(deps.api, &assets)?;

    let mut config = CONFIG.load(deps.storage)?;

    let mut deposits = vec![Uint128::zero(); N_COINS];
    for asset in &assets {
        let index = config
            .pool_info
            .index_of(&asset.info)
            .ok_or_else(|| ContractError::InvalidAsset(asset.info.to_string()))?;
        deposits[index] = asset.amount;
    }

    if deposits.iter().all(|amount| amount.is_zero()) {
        return Err(ContractError::InvalidZeroAmount {});
    }

    let total_share = query_supply(&deps.querier, &config.pool_info.liquidity_token)?;
    if total_share.is_zero() && deposits.iter().any(|amount| amount.is_zero()) {
        // the first deposit defines the balance point and must cover all assets
        return Err(ContractError::InvalidProvideLPsWithSingleToken {});
    }

    let precisions = asset_precisions(deps.storage, &config)?;
    let amp = compute_current_amp(&config, &env)?;

    let old_balances = config.balances.clone();
    let init_d = compute_d(amp, &pool_xp(&old_balances, &precisions))?;

    let new_balances = old_balances
        .iter()
        .zip(&deposits)
        .map(|(balance, deposit)| Ok(balance.checked_add(*deposit)?))
        .collect::<Result<Vec<_>, ContractError>>()?;
    let deposit_d = compute_d(amp, &pool_xp(&new_balances, &precisions))?;

    if deposit_d <= init_d {
        return Err(ContractError::InvariantNotIncreased {});
    }

    let mut fees = vec![Uint128::zero(); N_COINS];
    let share = if total_share.is_zero() {
        config.balances = new_balances;
        Uint128::try_from(deposit_d)?
    } else {
        // Charge the deviation from the pool's current composition, otherwise
        // an imbalanced deposit followed by a balancing swap would dodge the
        // swap fee.
        let (committed, reduced, charged) =
            apply_imbalance_fees(&config, &old_balances, &new_balances, init_d, deposit_d)?;
        config.balances = committed;
        fees = charged;

        let after_fee_d = compute_d(amp, &pool_xp(&reduced, &precisions))?;
        let growth = after_fee_d
            .checked_sub(init_d)
            .map_err(|_| ContractError::InvariantNotIncreased {})?;

        Uint128::try_from(Uint256::from(total_share).checked_multiply_ratio(growth, init_d)?)?
    };

    if share.is_zero() {
        return Err(ContractError::LiquidityAmountTooSmall {});
    }
    if let Some(min_lp_to_receive) = min_lp_to_receive {
        if share < min_lp_to_receive {
            return Err(ContractError::ProvideSlippageViolation(
                share,
                min_lp_to_receive,
            ));
        }
    }

    let mut messages: Vec<CosmosMsg> = vec![];
    for (index, deposit) in deposits.iter().enumerate() {
        if deposit.is_zero() {
            continue;
        }
        messages.push(
            wasm_execute(
                &config.pool_info.asset_infos[index].contract_addr,
                &Cw20ExecuteMsg::TransferFrom {
                    owner: info.sender.to_string(),
                    recipient: env.contract.address.to_string(),
                    amount: *deposit,
                },
                vec![],
            )?
            .into(),
        );
    }

    let receiver = receiver
        .map(|addr| deps.api.addr_validate(&addr))
        .transpose()?
        .unwrap_or_else(|| info.sender.clone());
    messages.push(mint_liquidity_token_message(&config, &receiver, share)?);

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_messages(messages).add_attributes(vec![
        attr("action", "provide_liquidity"),
        attr("sender", info.sender.as_str()),
        attr("receiver", receiver.as_str()),
        attr("assets", assets.iter().join(", ")),
        attr("share", share.to_string()),
        attr("fees", fees.iter().map(|fee| fee.to_string()).join(", ")),
    ]))
}

/// Performs a swap that was initiated through a CW20 send hook.
#[allow(clippy::too_many_arguments)]
pub fn swap(
    deps: DepsMut,
    env: Env,
    mut config: Config,
    sender: Addr,
    offer_index: usize,
    ask_index: usize,
    offer_amount: Uint128,
    min_receive: Option<Uint128>,
    to: Option<Addr>,
) -> Result<Response, ContractError> {
    if offer_amount.is_zero() {
        return Err(ContractError::InvalidZeroAmount {});
    }

    let result = compute_swap(
        deps.storage,
        &env,
        &config,
        offer_index,
        ask_index,
        offer_amount,
        false,
    )?;

    if let Some(min_receive) = min_receive {
        if result.return_amount < min_receive {
            return Err(ContractError::MinReceiveAssertion {
                min_receive,
                received: result.return_amount,
            });
        }
    }

    // The LP share of the fee stays in the reserve; the admin share is left on
    // the token balance but removed from the accounting.
    config.balances[offer_index] = config.balances[offer_index].checked_add(offer_amount)?;
    config.balances[ask_index] = config.balances[ask_index]
        .checked_sub(result.return_amount.checked_add(result.admin_fee_amount)?)?;

    CONFIG.save(deps.storage, &config)?;

    let receiver = to.unwrap_or_else(|| sender.clone());
    let offer_asset_info = &config.pool_info.asset_infos[offer_index];
    let ask_asset_info = &config.pool_info.asset_infos[ask_index];

    let messages = vec![Asset {
        info: ask_asset_info.clone(),
        amount: result.return_amount,
    }
    .into_msg(&receiver)?];

    Ok(Response::new().add_messages(messages).add_attributes(vec![
        attr("action", "swap"),
        attr("sender", sender.as_str()),
        attr("receiver", receiver.as_str()),
        attr("offer_asset", offer_asset_info.to_string()),
        attr("ask_asset", ask_asset_info.to_string()),
        attr("offer_amount", offer_amount.to_string()),
        attr("return_amount", result.return_amount.to_string()),
        attr("spread_amount", result.spread_amount.to_string()),
        attr("commission_amount", result.commission_amount.to_string()),
        attr("admin_fee_amount", result.admin_fee_amount.to_string()),
    ]))
}

/// Withdraws liquidity proportionally to the current pool composition. The
/// share tokens must arrive through the share token's send hook.
pub fn withdraw_liquidity(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    mut config: Config,
    sender: Addr,
    amount: Uint128,
    min_assets: Option<Vec<Asset>>,
) -> Result<Response, ContractError> {
    if info.sender != config.pool_info.liquidity_token {
        return Err(ContractError::Unauthorized {});
    }
    if amount.is_zero() {
        return Err(ContractError::ZeroBurnAmount {});
    }

    let total_share = query_supply(&deps.querier, &config.pool_info.liquidity_token)?;
    let refund_amounts = get_share_in_assets(&config, amount, total_share)?;

    if let Some(min_assets) = &min_assets {
        check_assets(deps.api, min_assets)?;
        for asset in min_assets {
            let index = config
                .pool_info
                .index_of(&asset.info)
                .ok_or_else(|| ContractError::InvalidAsset(asset.info.to_string()))?;
            if refund_amounts[index] < asset.amount {
                return Err(ContractError::WithdrawSlippageViolation {
                    asset_name: asset.info.to_string(),
                    received: refund_amounts[index],
                    expected: asset.amount,
                });
            }
        }
    }

    for (balance, refund) in config.balances.iter_mut().zip(&refund_amounts) {
        *balance = balance.checked_sub(*refund)?;
    }

    let refund_assets = config
        .pool_info
        .asset_infos
        .iter()
        .cloned()
        .zip(refund_amounts)
        .map(|(asset_info, amount)| Asset {
            info: asset_info,
            amount,
        })
        .collect_vec();

    let mut messages: Vec<CosmosMsg> = refund_assets
        .iter()
        .filter(|asset| !asset.amount.is_zero())
        .map(|asset| asset.clone().into_msg(&sender))
        .collect::<Result<_, _>>()?;
    messages.push(
        wasm_execute(
            &config.pool_info.liquidity_token,
            &Cw20ExecuteMsg::Burn { amount },
            vec![],
        )?
        .into(),
    );

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_messages(messages).add_attributes(vec![
        attr("action", "withdraw_liquidity"),
        attr("sender", sender.as_str()),
        attr("withdrawn_share", amount.to_string()),
        attr("refund_assets", refund_assets.iter().join(", ")),
    ]))
}

/// Withdraws liquidity in a single pool asset.
#[allow(clippy::too_many_arguments)]
pub fn withdraw_one_coin(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    mut config: Config,
    sender: Addr,
    amount: Uint128,
    ask_asset_info: AssetInfo,
    min_receive: Option<Uint128>,
) -> Result<Response, ContractError> {
    if info.sender != config.pool_info.liquidity_token {
        return Err(ContractError::Unauthorized {});
    }
    if amount.is_zero() {
        return Err(ContractError::ZeroBurnAmount {});
    }

    let index = config
        .pool_info
        .index_of(&ask_asset_info)
        .ok_or_else(|| ContractError::InvalidAsset(ask_asset_info.to_string()))?;

    let total_share = query_supply(&deps.querier, &config.pool_info.liquidity_token)?;
    let precisions = asset_precisions(deps.storage, &config)?;
    let xp = pool_xp(&config.balances, &precisions);
    let amp = compute_current_amp(&config, &env)?;

    let init_d = compute_d(amp, &xp)?;
    let withdraw_d =
        init_d.checked_sub(init_d.checked_multiply_ratio(amount, total_share)?)?;
    let new_ask_pool = calc_y_d(amp, index, &xp, withdraw_d)?;

    let gross_amount = denormalize(xp[index].checked_sub(new_ask_pool)?, precisions[index])?;

    // deviation from a pro-rata withdrawal is charged the imbalance fee
    let ideal_amount = config.balances[index].checked_multiply_ratio(amount, total_share)?;
    let difference = gross_amount.abs_diff(ideal_amount);
    let fee_amount =
        difference.checked_multiply_ratio(imbalance_fee_rate(config.fee), FEE_DENOMINATOR)?;
    let return_amount = gross_amount.checked_sub(fee_amount)?;
    let admin_fee_amount = fee_amount.checked_multiply_ratio(config.admin_fee, FEE_DENOMINATOR)?;

    if let Some(min_receive) = min_receive {
        if return_amount < min_receive {
            return Err(ContractError::MinReceiveAssertion {
                min_receive,
                received: return_amount,
            });
        }
    }

    config.balances[index] = config.balances[index]
        .checked_sub(return_amount.checked_add(admin_fee_amount)?)?;

    CONFIG.save(deps.storage, &config)?;

    let refund_asset = Asset {
        info: ask_asset_info,
        amount: return_amount,
    };
    let messages = vec![
        refund_asset.clone().into_msg(&sender)?,
        wasm_execute(
            &config.pool_info.liquidity_token,
            &Cw20ExecuteMsg::Burn { amount },
            vec![],
        )?
        .into(),
    ];

    Ok(Response::new().add_messages(messages).add_attributes(vec![
        attr("action", "withdraw_one_coin"),
        attr("sender", sender.as_str()),
        attr("withdrawn_share", amount.to_string()),
        attr("refund_asset", refund_asset.to_string()),
        attr("commission_amount", fee_amount.to_string()),
        attr("admin_fee_amount", admin_fee_amount.to_string()),
    ]))
}

/// Withdraws the exact asset amounts requested, burning only as many of the
/// sent shares as the withdrawal is worth and refunding the rest.
pub fn withdraw_imbalanced(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    mut config: Config,
    sender: Addr,
    provided_amount: Uint128,
    assets: Vec<Asset>,
) -> Result<Response, ContractError> {
    if info.sender != config.pool_info.liquidity_token {
        return Err(ContractError::Unauthorized {});
    }

    check_assets(deps.api, &assets)?;

    let mut amounts = vec![Uint128::zero(); N_COINS];
    for asset in &assets {
        let index = config
            .pool_info
            .index_of(&asset.info)
            .ok_or_else(|| ContractError::InvalidAsset(asset.info.to_string()))?;
        amounts[index] = asset.amount;
    }

    let precisions = asset_precisions(deps.storage, &config)?;
    let amp = compute_current_amp(&config, &env)?;

    let old_balances = config.balances.clone();
    let new_balances = old_balances
        .iter()
        .zip(&amounts)
        .map(|(balance, amount)| Ok(balance.checked_sub(*amount)?))
        .collect::<Result<Vec<_>, ContractError>>()?;

    let init_d = compute_d(amp, &pool_xp(&old_balances, &precisions))?;
    let withdraw_d = compute_d(amp, &pool_xp(&new_balances, &precisions))?;

    let (committed, reduced, fees) =
        apply_imbalance_fees(&config, &old_balances, &new_balances, init_d, withdraw_d)?;
    let after_fee_d = compute_d(amp, &pool_xp(&reduced, &precisions))?;

    let total_share = query_supply(&deps.querier, &config.pool_info.liquidity_token)?;
    let shrink = init_d
        .checked_sub(after_fee_d)
        .map_err(|_| ContractError::ZeroBurnAmount {})?;
    let burn_amount =
        Uint128::try_from(Uint256::from(total_share).checked_multiply_ratio(shrink, init_d)?)?;
    if burn_amount.is_zero() {
        return Err(ContractError::ZeroBurnAmount {});
    }
    // round against the caller
    let burn_amount = burn_amount.checked_add(Uint128::one())?;
    if burn_amount > provided_amount {
        return Err(ContractError::BurnExceedsProvided {
            required: burn_amount,
            provided: provided_amount,
        });
    }

    config.balances = committed;
    CONFIG.save(deps.storage, &config)?;

    let mut messages: Vec<CosmosMsg> = vec![wasm_execute(
        &config.pool_info.liquidity_token,
        &Cw20ExecuteMsg::Burn {
            amount: burn_amount,
        },
        vec![],
    )?
    .into()];

    let unused_shares = provided_amount - burn_amount;
    if !unused_shares.is_zero() {
        messages.push(
            wasm_execute(
                &config.pool_info.liquidity_token,
                &Cw20ExecuteMsg::Transfer {
                    recipient: sender.to_string(),
                    amount: unused_shares,
                },
                vec![],
            )?
            .into(),
        );
    }

    let refund_assets = config
        .pool_info
        .asset_infos
        .iter()
        .cloned()
        .zip(amounts)
        .map(|(asset_info, amount)| Asset {
            info: asset_info,
            amount,
        })
        .collect_vec();
    for asset in &refund_assets {
        if !asset.amount.is_zero() {
            messages.push(asset.clone().into_msg(&sender)?);
        }
    }

    Ok(Response::new().add_messages(messages).add_attributes(vec![
        attr("action", "withdraw_imbalanced"),
        attr("sender", sender.as_str()),
        attr("withdrawn_share", burn_amount.to_string()),
        attr("refund_assets", refund_assets.iter().join(", ")),
        attr("fees", fees.iter().map(|fee| fee.to_string()).join(", ")),
    ]))
}

/// Updates the pool configuration with the specified parameters in `params`
/// (amplification ramp control). Owner only.
pub fn update_config(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    params: Binary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if info.sender != config.owner {
        return Err(ContractError::Unauthorized {});
    }

    match from_json::<StablePoolUpdateParams>(&params)? {
        StablePoolUpdateParams::StartChangingAmp {
            next_amp,
            next_amp_time,
        } => start_changing_amp(config, deps, env, next_amp, next_amp_time),
        StablePoolUpdateParams::StopChangingAmp {} => stop_changing_amp(config, deps, env),
    }
}

/// Start changing the AMP value, linearly in wall time towards `next_amp`.
fn start_changing_amp(
    mut config: Config,
    deps: DepsMut,
    env: Env,
    next_amp: u64,
    next_amp_time: u64,
) -> Result<Response, ContractError> {
    if next_amp == 0 || next_amp > MAX_AMP {
        return Err(ContractError::IncorrectAmp {});
    }

    let block_time = env.block.time.seconds();

    if next_amp_time < block_time + MIN_AMP_CHANGING_TIME {
        return Err(ContractError::MinAmpChangingTimeAssertion {});
    }
    // a ramp may not be replaced during its first day
    if block_time < config.next_amp_time
        && block_time < config.init_amp_time + MIN_AMP_CHANGING_TIME
    {
        return Err(ContractError::MinAmpChangingTimeAssertion {});
    }

    let current_amp = compute_current_amp(&config, &env)?.u64();

    let within_change_bound = if next_amp >= current_amp {
        next_amp <= current_amp * MAX_AMP_CHANGE
    } else {
        next_amp * MAX_AMP_CHANGE >= current_amp
    };
    if !within_change_bound {
        return Err(ContractError::MaxAmpChangeAssertion {});
    }

    config.init_amp = current_amp;
    config.next_amp = next_amp;
    config.init_amp_time = block_time;
    config.next_amp_time = next_amp_time;

    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "start_changing_amp"),
        attr("init_amp", current_amp.to_string()),
        attr("next_amp", next_amp.to_string()),
        attr("next_amp_time", next_amp_time.to_string()),
    ]))
}

/// Stop changing the AMP value, freezing it at its current interpolated value.
fn stop_changing_amp(mut config: Config, deps: DepsMut, env: Env) -> Result<Response, ContractError> {
    let current_amp = compute_current_amp(&config, &env)?.u64();
    let block_time = env.block.time.seconds();

    config.init_amp = current_amp;
    config.next_amp = current_amp;
    config.init_amp_time = block_time;
    config.next_amp_time = block_time;

    // now (block_time < next_amp_time) is always False, so the saved AMP is returned
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new().add_attributes(vec![
        attr("action", "stop_changing_amp"),
        attr("amp", current_amp.to_string()),
    ]))
}

/// Transfers the accrued admin fees (the excess of every on-token balance over
/// the accounted reserve) to `receiver`. Owner only.
pub fn withdraw_admin_fees(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    receiver: Option<String>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    if info.sender != config.owner {
        return Err(ContractError::Unauthorized {});
    }

    let receiver = receiver
        .map(|addr| deps.api.addr_validate(&addr))
        .transpose()?
        .unwrap_or_else(|| config.owner.clone());

    let mut messages: Vec<CosmosMsg> = vec![];
    let mut swept = vec![Uint128::zero(); N_COINS];
    for (index, asset_info) in config.pool_info.asset_infos.iter().enumerate() {
        let on_token_balance = asset_info.query_pool(&deps.querier, &env.contract.address)?;
        let surplus = on_token_balance.checked_sub(config.balances[index])?;
        if !surplus.is_zero() {
            messages.push(
                Asset {
                    info: asset_info.clone(),
                    amount: surplus,
                }
                .into_msg(&receiver)?,
            );
            swept[index] = surplus;
        }
    }

    Ok(Response::new().add_messages(messages).add_attributes(vec![
        attr("action", "withdraw_admin_fees"),
        attr("receiver", receiver.as_str()),
        attr("fees", swept.iter().map(|fee| fee.to_string()).join(", ")),
    ]))
}

/// Exposes all the queries available in the contract.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> Result<Binary, ContractError> {
    match msg {
        QueryMsg::Pool {} => Ok(to_json_binary(&query_pool(deps)?)?),
        QueryMsg::Config {} => Ok(to_json_binary(&query_config(deps, env)?)?),
        QueryMsg::Share { amount } => Ok(to_json_binary(&query_share(deps, amount)?)?),
        QueryMsg::Simulation {
            offer_asset,
            ask_asset_info,
        } => Ok(to_json_binary(&query_simulation(
            deps,
            env,
            offer_asset,
            ask_asset_info,
        )?)?),
        QueryMsg::ReverseSimulation {
            ask_asset,
            offer_asset_info,
        } => Ok(to_json_binary(&query_reverse_simulation(
            deps,
            env,
            ask_asset,
            offer_asset_info,
        )?)?),
        QueryMsg::VirtualPrice {} => Ok(to_json_binary(&query_virtual_price(deps, env)?)?),
        QueryMsg::SimulateProvide { assets } => {
            Ok(to_json_binary(&query_simulate_provide(deps, env, assets)?)?)
        }
        QueryMsg::SimulateWithdraw { assets } => Ok(to_json_binary(&query_simulate_withdraw(
            deps, env, assets,
        )?)?),
        QueryMsg::SimulateWithdrawOneCoin {
            lp_amount,
            ask_asset_info,
        } => Ok(to_json_binary(&query_simulate_withdraw_one_coin(
            deps,
            env,
            lp_amount,
            ask_asset_info,
        )?)?),
    }
}

/// Returns the accounted reserves and the total amount of issued shares.
pub fn query_pool(deps: Deps) -> Result<PoolResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let total_share = query_supply(&deps.querier, &config.pool_info.liquidity_token)?;

    Ok(PoolResponse {
        assets: pool_assets(&config),
        total_share,
    })
}

pub fn query_config(deps: Deps, env: Env) -> Result<ConfigResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let amp = compute_current_amp(&config, &env)?;

    Ok(ConfigResponse {
        pool_info: config.pool_info,
        owner: config.owner,
        fee: config.fee,
        admin_fee: config.admin_fee,
        amp,
        init_amp: config.init_amp,
        init_amp_time: config.init_amp_time,
        next_amp: config.next_amp,
        next_amp_time: config.next_amp_time,
    })
}

/// Returns the assets that `amount` shares would currently withdraw.
pub fn query_share(deps: Deps, amount: Uint128) -> Result<Vec<Asset>, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let total_share = query_supply(&deps.querier, &config.pool_info.liquidity_token)?;
    let refund_amounts = get_share_in_assets(&config, amount, total_share)?;

    Ok(config
        .pool_info
        .asset_infos
        .iter()
        .cloned()
        .zip(refund_amounts)
        .map(|(asset_info, amount)| Asset {
            info: asset_info,
            amount,
        })
        .collect())
}

/// Simulates a swap. The quote errs on the low side so that it is never above
/// what execution would pay out.
pub fn query_simulation(
    deps: Deps,
    env: Env,
    offer_asset: Asset,
    ask_asset_info: AssetInfo,
) -> Result<SimulationResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let offer_index = config
        .pool_info
        .index_of(&offer_asset.info)
        .ok_or_else(|| ContractError::InvalidAsset(offer_asset.info.to_string()))?;
    let ask_index = config
        .pool_info
        .index_of(&ask_asset_info)
        .ok_or_else(|| ContractError::InvalidAsset(ask_asset_info.to_string()))?;
    if offer_index == ask_index {
        return Err(ContractError::SameAssets {});
    }

    let result = compute_swap(
        deps.storage,
        &env,
        &config,
        offer_index,
        ask_index,
        offer_asset.amount,
        true,
    )?;

    Ok(SimulationResponse {
        return_amount: result.return_amount,
        spread_amount: result.spread_amount,
        commission_amount: result.commission_amount,
    })
}

/// Returns the offer amount required to receive `ask_asset` net of fees.
pub fn query_reverse_simulation(
    deps: Deps,
    env: Env,
    ask_asset: Asset,
    offer_asset_info: AssetInfo,
) -> Result<ReverseSimulationResponse, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let ask_index = config
        .pool_info
        .index_of(&ask_asset.info)
        .ok_or_else(|| ContractError::InvalidAsset(ask_asset.info.to_string()))?;
    let offer_index = config
        .pool_info
        .index_of(&offer_asset_info)
        .ok_or_else(|| ContractError::InvalidAsset(offer_asset_info.to_string()))?;
    if offer_index == ask_index {
        return Err(ContractError::SameAssets {});
    }

    let precisions = asset_precisions(deps.storage, &config)?;
    let xp = pool_xp(&config.balances, &precisions);
    let amp = compute_current_amp(&config, &env)?;

    // gross up the desired output by the fee
    let gross_amount = ask_asset
        .amount
        .checked_multiply_ratio(FEE_DENOMINATOR, FEE_DENOMINATOR - config.fee)?;
    let commission_amount = gross_amount.checked_sub(ask_asset.amount)?;

    let new_ask_pool = xp[ask_index]
        .checked_sub(normalize(gross_amount, precisions[ask_index]))?;
    let new_offer_pool = calc_y(amp, ask_index, offer_index, new_ask_pool, &xp)?;

    let offer_norm = new_offer_pool.checked_sub(xp[offer_index])?;
    let offer_amount = denormalize(offer_norm, precisions[offer_index])?;

    let gross_in_offer_precision = denormalize(
        normalize(gross_amount, precisions[ask_index]),
        precisions[offer_index],
    )?;
    let spread_amount = offer_amount.saturating_sub(gross_in_offer_precision);

    Ok(ReverseSimulationResponse {
        offer_amount,
        spread_amount,
        commission_amount,
    })
}

/// Returns the invariant per issued share, an 18-decimal fixed-point number
/// that never decreases while the pool operates.
pub fn query_virtual_price(deps: Deps, env: Env) -> Result<Uint128, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let total_share = query_supply(&deps.querier, &config.pool_info.liquidity_token)?;

    if total_share.is_zero() {
        return Ok(Uint128::new(10u128.pow(NORM_PRECISION as u32)));
    }

    let precisions = asset_precisions(deps.storage, &config)?;
    let xp = pool_xp(&config.balances, &precisions);
    let amp = compute_current_amp(&config, &env)?;
    let d = compute_d(amp, &xp)?;

    Ok(Uint128::try_from(d.checked_multiply_ratio(
        10u128.pow(NORM_PRECISION as u32),
        total_share,
    )?)?)
}

/// Fee-free estimate of the shares a deposit would mint.
pub fn query_simulate_provide(
    deps: Deps,
    env: Env,
    assets: Vec<Asset>,
) -> Result<Uint128, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let (init_d, new_d, total_share) = simulate_balance_change(&deps, &env, &config, &assets, true)?;

    if total_share.is_zero() {
        return Ok(Uint128::try_from(new_d)?);
    }

    let growth = new_d
        .checked_sub(init_d)
        .map_err(|_| ContractError::InvariantNotIncreased {})?;
    Ok(Uint128::try_from(
        Uint256::from(total_share).checked_multiply_ratio(growth, init_d)?,
    )?)
}

/// Fee-free estimate of the shares an imbalanced withdrawal would burn.
pub fn query_simulate_withdraw(
    deps: Deps,
    env: Env,
    assets: Vec<Asset>,
) -> Result<Uint128, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let (init_d, new_d, total_share) =
        simulate_balance_change(&deps, &env, &config, &assets, false)?;

    let shrink = init_d
        .checked_sub(new_d)
        .map_err(|_| ContractError::ZeroBurnAmount {})?;
    Ok(Uint128::try_from(
        Uint256::from(total_share).checked_multiply_ratio(shrink, init_d)?,
    )?)
}

/// Computes D before and after adding (or removing) the given amounts.
fn simulate_balance_change(
    deps: &Deps,
    env: &Env,
    config: &Config,
    assets: &[Asset],
    is_deposit: bool,
) -> Result<(Uint256, Uint256, Uint128), ContractError> {
    check_assets(deps.api, assets)?;

    let mut amounts = vec![Uint128::zero(); N_COINS];
    for asset in assets {
        let index = config
            .pool_info
            .index_of(&asset.info)
            .ok_or_else(|| ContractError::InvalidAsset(asset.info.to_string()))?;
        amounts[index] = asset.amount;
    }

    let precisions = asset_precisions(deps.storage, config)?;
    let amp = compute_current_amp(config, env)?;

    let new_balances = config
        .balances
        .iter()
        .zip(&amounts)
        .map(|(balance, amount)| {
            Ok(if is_deposit {
                balance.checked_add(*amount)?
            } else {
                balance.checked_sub(*amount)?
            })
        })
        .collect::<Result<Vec<_>, ContractError>>()?;

    let init_d = compute_d(amp, &pool_xp(&config.balances, &precisions))?;
    let new_d = compute_d(amp, &pool_xp(&new_balances, &precisions))?;

    let total_share = query_supply(&deps.querier, &config.pool_info.liquidity_token)?;

    Ok((init_d, new_d, total_share))
}

/// Returns the amount a single-asset withdrawal of `lp_amount` shares would
/// pay out, net of fees.
pub fn query_simulate_withdraw_one_coin(
    deps: Deps,
    env: Env,
    lp_amount: Uint128,
    ask_asset_info: AssetInfo,
) -> Result<Uint128, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let index = config
        .pool_info
        .index_of(&ask_asset_info)
        .ok_or_else(|| ContractError::InvalidAsset(ask_asset_info.to_string()))?;

    let total_share = query_supply(&deps.querier, &config.pool_info.liquidity_token)?;
    let precisions = asset_precisions(deps.storage, &config)?;
    let xp = pool_xp(&config.balances, &precisions);
    let amp = compute_current_amp(&config, &env)?;

    let init_d = compute_d(amp, &xp)?;
    let withdraw_d =
        init_d.checked_sub(init_d.checked_multiply_ratio(lp_amount, total_share)?)?;
    let new_ask_pool = calc_y_d(amp, index, &xp, withdraw_d)?;

    let gross_amount = denormalize(xp[index].checked_sub(new_ask_pool)?, precisions[index])?;
    let ideal_amount = config.balances[index].checked_multiply_ratio(lp_amount, total_share)?;
    let difference = gross_amount.abs_diff(ideal_amount);
    let fee_amount =
        difference.checked_multiply_ratio(imbalance_fee_rate(config.fee), FEE_DENOMINATOR)?;

    Ok(gross_amount.checked_sub(fee_amount)?)
}

/// Manages contract migration.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    let contract_version = get_contract_version(deps.storage)?;

    match contract_version.contract.as_ref() {
        CONTRACT_NAME => match contract_version.version.as_ref() {
            CONTRACT_VERSION => {}
            _ => return Err(ContractError::MigrationError {}),
        },
        _ => return Err(ContractError::MigrationError {}),
    }

    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    Ok(Response::new()
        .add_attribute("previous_contract_name", contract_version.contract)
        .add_attribute("previous_contract_version", contract_version.version))
}
