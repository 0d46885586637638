use cosmwasm_schema::{cw_serde, QueryResponses};

use crate::asset::{Asset, AssetInfo, PoolInfo};

use cosmwasm_std::{Addr, Binary, Uint128, Uint64};
use cw20::Cw20ReceiveMsg;

/// The number of assets in the pool.
pub const N_COINS: usize = 3;

/// Every fee fraction is expressed with this denominator.
pub const FEE_DENOMINATOR: u64 = 10_000_000_000;
/// The maximum allowed trade fee (half of the output).
pub const MAX_FEE: u64 = 5_000_000_000;
/// The maximum allowed admin share of collected fees (all of them).
pub const MAX_ADMIN_FEE: u64 = 10_000_000_000;

/// Default name of the pool share token.
pub const DEFAULT_LP_TOKEN_NAME: &str = "Curve.fi DAI/USDC/USDT";
/// Default ticker of the pool share token.
pub const DEFAULT_LP_TOKEN_SYMBOL: &str = "3CRV";
/// Share tokens are denominated in the common 18-decimal unit.
pub const LP_TOKEN_PRECISION: u8 = 18;

/// This structure describes the parameters used for creating a pool contract.
#[cw_serde]
pub struct InstantiateMsg {
    /// The three CW20 assets the pool trades between
    pub asset_infos: Vec<AssetInfo>,
    /// The code ID used to instantiate the share token contract
    pub token_code_id: u64,
    /// Address allowed to ramp the amplification and sweep admin fees
    pub owner: String,
    /// The amplification coefficient
    pub amp: u64,
    /// Trade fee, out of [`FEE_DENOMINATOR`]
    pub fee: u64,
    /// Share of the trade fee diverted to the admin, out of [`FEE_DENOMINATOR`]
    pub admin_fee: u64,
    /// Share token name; defaults to [`DEFAULT_LP_TOKEN_NAME`]
    pub lp_token_name: Option<String>,
    /// Share token ticker; defaults to [`DEFAULT_LP_TOKEN_SYMBOL`]
    pub lp_token_symbol: Option<String>,
}

/// This structure describes the execute messages available in the contract.
#[cw_serde]
pub enum ExecuteMsg {
    /// Receives a message of type [`Cw20ReceiveMsg`]
    Receive(Cw20ReceiveMsg),
    /// ProvideLiquidity allows someone to deposit into the pool.
    /// Deposited CW20 tokens must be pre-approved for the pool contract.
    ProvideLiquidity {
        /// The amounts to deposit; pool assets omitted here count as zero
        assets: Vec<Asset>,
        /// The minimum amount of share tokens to receive
        min_lp_to_receive: Option<Uint128>,
        /// The receiver of the minted shares
        receiver: Option<String>,
    },
    /// Update the pool configuration (amplification ramp control)
    UpdateConfig { params: Binary },
    /// Transfer accrued admin fees out of the pool (owner only)
    WithdrawAdminFees { receiver: Option<String> },
}

/// This structure describes a CW20 hook message.
#[cw_serde]
pub enum Cw20HookMsg {
    /// Swap the sent tokens for another pool asset
    Swap {
        ask_asset_info: AssetInfo,
        min_receive: Option<Uint128>,
        to: Option<String>,
    },
    /// Withdraw liquidity proportionally to the current pool composition
    WithdrawLiquidity { min_assets: Option<Vec<Asset>> },
    /// Withdraw liquidity in a single pool asset
    WithdrawOneCoin {
        ask_asset_info: AssetInfo,
        min_receive: Option<Uint128>,
    },
    /// Withdraw exact asset amounts, burning as many of the sent shares as
    /// needed and refunding the rest
    WithdrawImbalanced { assets: Vec<Asset> },
}

/// This enum stores the options available to start and stop changing the pool amplification.
#[cw_serde]
pub enum StablePoolUpdateParams {
    StartChangingAmp { next_amp: u64, next_amp_time: u64 },
    StopChangingAmp {},
}

/// This structure describes the query messages available in the contract.
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Returns the accounted reserves and total share supply
    #[returns(PoolResponse)]
    Pool {},
    /// Returns the pool configuration
    #[returns(ConfigResponse)]
    Config {},
    /// Returns the assets a given amount of shares would withdraw proportionally
    #[returns(Vec<Asset>)]
    Share { amount: Uint128 },
    /// Simulates a swap and returns the quoted output
    #[returns(SimulationResponse)]
    Simulation {
        offer_asset: Asset,
        ask_asset_info: AssetInfo,
    },
    /// Returns the offer amount required to receive a given ask amount
    #[returns(ReverseSimulationResponse)]
    ReverseSimulation {
        ask_asset: Asset,
        offer_asset_info: AssetInfo,
    },
    /// Returns the invariant per share, as an 18-decimal fixed-point number
    #[returns(Uint128)]
    VirtualPrice {},
    /// Fee-free estimate of the shares minted by a deposit
    #[returns(Uint128)]
    SimulateProvide { assets: Vec<Asset> },
    /// Fee-free estimate of the shares burned by an imbalanced withdrawal
    #[returns(Uint128)]
    SimulateWithdraw { assets: Vec<Asset> },
    /// Returns the amount a single-asset withdrawal would pay out
    #[returns(Uint128)]
    SimulateWithdrawOneCoin {
        lp_amount: Uint128,
        ask_asset_info: AssetInfo,
    },
}

/// This struct is used to return a query result with the total amount of share
/// tokens and the accounted pool reserves.
#[cw_serde]
pub struct PoolResponse {
    /// The pool reserves together with asset info
    pub assets: Vec<Asset>,
    /// The total amount of share tokens currently issued
    pub total_share: Uint128,
}

/// This struct is used to return a query result with the general contract configuration.
#[cw_serde]
pub struct ConfigResponse {
    /// The pool assets and share token address
    pub pool_info: PoolInfo,
    /// Address allowed to ramp the amplification and sweep admin fees
    pub owner: Addr,
    /// Trade fee, out of [`FEE_DENOMINATOR`]
    pub fee: u64,
    /// Admin share of the trade fee, out of [`FEE_DENOMINATOR`]
    pub admin_fee: u64,
    /// The amplification currently in effect (interpolated while ramping)
    pub amp: Uint64,
    /// Amplification ramp start value
    pub init_amp: u64,
    /// Amplification ramp start time, in seconds
    pub init_amp_time: u64,
    /// Amplification ramp target value
    pub next_amp: u64,
    /// Amplification ramp target time, in seconds
    pub next_amp_time: u64,
}

/// This structure holds the parameters that are returned from a swap simulation response.
#[cw_serde]
pub struct SimulationResponse {
    /// The amount of ask assets returned by the swap
    pub return_amount: Uint128,
    /// The deviation from a 1:1 swap rate
    pub spread_amount: Uint128,
    /// The amount of fees charged by the transaction
    pub commission_amount: Uint128,
}

/// This structure holds the parameters that are returned from a reverse swap simulation response.
#[cw_serde]
pub struct ReverseSimulationResponse {
    /// The amount of offer assets needed for the swap
    pub offer_amount: Uint128,
    /// The deviation from a 1:1 swap rate
    pub spread_amount: Uint128,
    /// The amount of fees charged by the transaction
    pub commission_amount: Uint128,
}

/// This structure describes a migration message.
/// We currently take no arguments for migrations.
#[cw_serde]
pub struct MigrateMsg {}
