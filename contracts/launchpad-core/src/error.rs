use casper_types::ApiError;

/// Reasons a launchpad call is rejected.
///
/// Every variant aborts the whole call; nothing is written before the
/// failing check. Codes are stable because the contract reverts with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[repr(u16)]
pub enum LaunchpadError {
    #[error("amount must be greater than zero")]
    ZeroAmount = 1,
    #[error("insufficient reserve")]
    InsufficientReserve = 2,
    #[error("slippage exceeded")]
    SlippageExceeded = 3,
    #[error("curve has migrated")]
    CurveMigrated = 4,
    #[error("transfer not approved")]
    TransferNotApproved = 5,
    #[error("insufficient creation fee")]
    InsufficientCreationFee = 6,
    #[error("salt already used")]
    SaltAlreadyUsed = 7,
    #[error("unknown token")]
    UnknownToken = 8,
    #[error("unauthorized")]
    Unauthorized = 9,
    #[error("price oracle unavailable")]
    OracleUnavailable = 10,
    #[error("insufficient token balance")]
    InsufficientBalance = 11,
    #[error("fee rate must be below 10000 bps")]
    InvalidFeeRate = 12,
    #[error("invalid token name")]
    InvalidName = 13,
    #[error("invalid token symbol")]
    InvalidSymbol = 14,
    #[error("withdrawal exceeds collected fees")]
    InsufficientFeeBalance = 15,
    #[error("invalid launchpad configuration")]
    InvalidConfig = 16,
    #[error("arithmetic overflow")]
    Overflow = 17,
}

impl LaunchpadError {
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl From<LaunchpadError> for ApiError {
    fn from(error: LaunchpadError) -> Self {
        ApiError::User(error as u16)
    }
}

pub type Result<T> = core::result::Result<T, LaunchpadError>;
