use cosmwasm_std::{
    CheckedMultiplyRatioError, ConversionOverflowError, DivideByZeroError, OverflowError, StdError,
    Uint128,
};
use thiserror::Error;

use stableswap::pool::{MAX_ADMIN_FEE, MAX_FEE, N_COINS};

use crate::math::{MAX_AMP, MAX_AMP_CHANGE, MIN_AMP_CHANGING_TIME};

/// This enum describes pool contract errors
#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("{0}")]
    CheckedMultiplyRatioError(#[from] CheckedMultiplyRatioError),

    #[error("Unauthorized")]
    Unauthorized {},

    #[error("Invalid number of assets. This pool supports only {} assets", N_COINS)]
    InvalidNumberOfAssets {},

    #[error("Doubling assets in asset infos")]
    DoublingAssets {},

    #[error("Asset precision {0} exceeds the supported maximum of 18")]
    UnsupportedPrecision(u8),

    #[error("The asset {0} does not belong to the pool")]
    InvalidAsset(String),

    #[error("Source and target assets are the same")]
    SameAssets {},

    #[error("Event of zero transfer")]
    InvalidZeroAmount {},

    #[error("Withdrawal amounts do not require burning any shares")]
    ZeroBurnAmount {},

    #[error("Operation would not increase the pool invariant")]
    InvariantNotIncreased {},

    #[error("Insufficient amount of liquidity")]
    LiquidityAmountTooSmall {},

    #[error("It is not possible to provide liquidity with one token for an empty pool")]
    InvalidProvideLPsWithSingleToken {},

    #[error("Swap returned {received} but at least {min_receive} was asked for")]
    MinReceiveAssertion {
        min_receive: Uint128,
        received: Uint128,
    },

    #[error("Slippage is more than expected: received {0}, expected {1} LP tokens")]
    ProvideSlippageViolation(Uint128, Uint128),

    #[error("Received {received} {asset_name} but expected {expected}")]
    WithdrawSlippageViolation {
        asset_name: String,
        received: Uint128,
        expected: Uint128,
    },

    #[error("Withdrawal requires burning {required} LP tokens but only {provided} were sent")]
    BurnExceedsProvided {
        required: Uint128,
        provided: Uint128,
    },

    #[error("Trade fee must not exceed {} and admin fee {}", MAX_FEE, MAX_ADMIN_FEE)]
    FeeOutOfBounds {},

    #[error(
        "Amp coefficient must be greater than 0 and less than or equal to {}",
        MAX_AMP
    )]
    IncorrectAmp {},

    #[error(
        "The difference between the old and new amp value must not exceed {} times",
        MAX_AMP_CHANGE
    )]
    MaxAmpChangeAssertion {},

    #[error(
        "Amp coefficient cannot be changed more often than once per {} seconds",
        MIN_AMP_CHANGING_TIME
    )]
    MinAmpChangingTimeAssertion {},

    #[error("The invariant calculation did not converge")]
    ConvergenceFailure {},

    #[error("Failed to parse or process reply message")]
    FailedToParseReply {},

    #[error("Contract can't be migrated!")]
    MigrationError {},
}

impl From<OverflowError> for ContractError {
    fn from(o: OverflowError) -> Self {
        StdError::from(o).into()
    }
}

impl From<DivideByZeroError> for ContractError {
    fn from(o: DivideByZeroError) -> Self {
        StdError::from(o).into()
    }
}

impl From<ConversionOverflowError> for ContractError {
    fn from(o: ConversionOverflowError) -> Self {
        StdError::from(o).into()
    }
}
