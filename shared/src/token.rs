use num_bigint::BigInt;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AsInvalidResponse, CirculationError};
use crate::ser::{parse_amount, parse_decimals};

/// Body of `GET /api/v1/tokens/{token}`, reduced to the fields the supply
/// calculation reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenInfoResponse {
    #[serde(default)]
    pub total_supply: Option<Value>,
    #[serde(default)]
    pub decimals: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSupplyInfo {
    pub total_supply: BigInt,
    pub decimals: u32,
}

impl TokenSupplyInfo {
    pub fn from_response(
        token: &str,
        response: TokenInfoResponse,
    ) -> Result<Self, CirculationError> {
        let total_supply = match response.total_supply {
            Some(ref value) => parse_amount(value)
                .into_invalid_response("token total_supply")?,
            None => {
                return Err(CirculationError::invalid_response(format!(
                    "token info for {token} has no total_supply"
                )))
            }
        };

        let decimals = match response.decimals {
            Some(ref value) => {
                parse_decimals(value).into_invalid_response("token decimals")?
            }
            None => 0,
        };

        Ok(Self {
            total_supply,
            decimals,
        })
    }
}
