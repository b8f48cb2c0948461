use num_bigint::BigInt;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AsInvalidResponse, CirculationError};
use crate::id::EntityId;
use crate::ser::parse_amount;

/// Body of `GET /api/v1/balances?account.id={account}`. Only the first page
/// is ever consulted, so `links.next` is not modelled.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalancesResponse {
    #[serde(default)]
    pub balances: Vec<AccountBalance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountBalance {
    #[serde(default)]
    pub tokens: Vec<TokenBalance>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenBalance {
    #[serde(default)]
    pub token_id: Option<String>,
    #[serde(default)]
    pub balance: Option<Value>,
}

/// Amount of the target token held by one treasury, in smallest units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreasuryBalance {
    pub treasury: EntityId,
    pub balance: BigInt,
}

impl BalancesResponse {
    /// Looks up `token` in the account's first balance snapshot. `None` means
    /// the treasury holds no record for the token and is left out of the
    /// results rather than counted as zero.
    pub fn token_balance(
        &self,
        token: &EntityId,
    ) -> Result<Option<BigInt>, CirculationError> {
        let Some(snapshot) = self.balances.first() else {
            return Ok(None);
        };

        let Some(entry) = snapshot
            .tokens
            .iter()
            .find(|entry| entry.token_id.as_deref() == Some(token.as_str()))
        else {
            return Ok(None);
        };

        match entry.balance {
            Some(ref value) => parse_amount(value)
                .into_invalid_response("token balance")
                .map(Some),
            None => Ok(Some(BigInt::from(0))),
        }
    }

    pub fn treasury_balance(
        &self,
        treasury: &EntityId,
        token: &EntityId,
    ) -> Result<Option<TreasuryBalance>, CirculationError> {
        Ok(self.token_balance(token)?.map(|balance| TreasuryBalance {
            treasury: treasury.clone(),
            balance,
        }))
    }
}
