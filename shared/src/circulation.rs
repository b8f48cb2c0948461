use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::balance::TreasuryBalance;
use crate::client::{base_url, MirrorClient};
use crate::error::CirculationError;
use crate::id::EntityId;
use crate::token::TokenSupplyInfo;
use crate::utils::current_query_timestamp;

/// Circulating supply of one token at one instant. Amounts are raw smallest
/// units in base 10; `decimals` is reported but never applied to them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Circulation {
    pub token: String,
    pub decimals: u32,
    pub total_supply: String,
    pub circulating: String,
    pub treasury_balances: Vec<TreasuryHolding>,
    pub timestamp: String,
    pub source: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreasuryHolding {
    pub treasury: String,
    pub balance: String,
}

impl From<&TreasuryBalance> for TreasuryHolding {
    fn from(value: &TreasuryBalance) -> Self {
        Self {
            treasury: value.treasury.to_string(),
            balance: value.balance.to_string(),
        }
    }
}

impl Circulation {
    pub fn new(
        query: &CirculationQuery,
        supply: &TokenSupplyInfo,
        treasury_balances: &[TreasuryBalance],
        timestamp: String,
    ) -> Self {
        let circulating =
            circulating_supply(&supply.total_supply, treasury_balances);

        Self {
            token: query.token.to_string(),
            decimals: supply.decimals,
            total_supply: supply.total_supply.to_string(),
            circulating: circulating.to_string(),
            treasury_balances: treasury_balances
                .iter()
                .map(TreasuryHolding::from)
                .collect(),
            timestamp,
            source: query.source.clone(),
        }
    }
}

/// Total supply less everything held by treasuries. Not clamped: holdings
/// above the reported supply yield a negative figure.
pub fn circulating_supply(
    total_supply: &BigInt,
    treasury_balances: &[TreasuryBalance],
) -> BigInt {
    let held: BigInt = treasury_balances.iter().map(|t| &t.balance).sum();
    total_supply - held
}

/// Validated inputs of one circulation calculation.
#[derive(Clone, Debug)]
pub struct CirculationQuery {
    source: String,
    token: EntityId,
    treasuries: Vec<EntityId>,
}

impl CirculationQuery {
    pub fn new<S: AsRef<str>>(
        source: &str,
        token: &str,
        treasuries: &[S],
    ) -> Result<Self, CirculationError> {
        base_url(source)?;

        let token = token.parse::<EntityId>().map_err(|_| {
            CirculationError::invalid_argument(format!(
                "Invalid token ID {token}"
            ))
        })?;

        let treasuries = treasuries
            .iter()
            .map(|treasury| {
                let treasury = treasury.as_ref();
                treasury.parse::<EntityId>().map_err(|_| {
                    CirculationError::invalid_argument(format!(
                        "Invalid treasury ID {treasury}"
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            source: source.to_owned(),
            token,
            treasuries,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn token(&self) -> &EntityId {
        &self.token
    }

    pub fn treasuries(&self) -> &[EntityId] {
        &self.treasuries
    }

    pub async fn execute(
        &self,
        client: &MirrorClient,
    ) -> Result<Circulation, CirculationError> {
        self.execute_at(client, current_query_timestamp()).await
    }

    /// Runs every mirror query against the ledger state at `timestamp`, so
    /// supply and balances describe the same instant.
    pub async fn execute_at(
        &self,
        client: &MirrorClient,
        timestamp: String,
    ) -> Result<Circulation, CirculationError> {
        tracing::debug!(token = %self.token, %timestamp, "Query token...");
        let supply =
            client.fetch_token_supply(&self.token, &timestamp).await?;

        let treasury_balances =
            self.query_treasury_balances(client, &timestamp).await?;

        let circulation =
            Circulation::new(self, &supply, &treasury_balances, timestamp);

        tracing::info!(
            token = %circulation.token,
            total_supply = %circulation.total_supply,
            circulating = %circulation.circulating,
            treasuries = circulation.treasury_balances.len(),
            "Computed circulating supply"
        );

        Ok(circulation)
    }

    /// One request at a time, in caller order. The first failure aborts the
    /// whole batch.
    async fn query_treasury_balances(
        &self,
        client: &MirrorClient,
        timestamp: &str,
    ) -> Result<Vec<TreasuryBalance>, CirculationError> {
        let mut result = Vec::with_capacity(self.treasuries.len());

        for treasury in &self.treasuries {
            tracing::debug!(%treasury, "Query treasury balance...");
            let balances =
                client.fetch_account_balance(treasury, timestamp).await?;

            match balances.treasury_balance(treasury, &self.token)? {
                Some(balance) => result.push(balance),
                None => tracing::debug!(
                    %treasury,
                    token = %self.token,
                    "Treasury holds no balance record for token"
                ),
            }
        }

        Ok(result)
    }
}

/// Validates the inputs, opens a connection pool for this call only and
/// computes the circulating supply of `token` as reported by `source`.
pub async fn get_token_circulation<S: AsRef<str>>(
    source: &str,
    token: &str,
    treasuries: &[S],
) -> Result<Circulation, CirculationError> {
    let query = CirculationQuery::new(source, token, treasuries)?;
    let client = MirrorClient::new(query.source())?;

    query.execute(&client).await
}
