use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::balance::BalancesResponse;
use crate::error::{AsInvalidResponse, CirculationError};
use crate::id::EntityId;
use crate::token::{TokenInfoResponse, TokenSupplyInfo};

mod routes {
    pub const API: &str = "api";
    pub const API_VERSION: &str = "v1";

    pub const TOKENS: &str = "tokens";
    pub const BALANCES: &str = "balances";

    pub const ACCOUNT_ID: &str = "account.id";
    pub const TIMESTAMP: &str = "timestamp";
}

type PathSegments<'a> = &'a [&'a str];
type Params<'a> = &'a [(&'a str, &'a str)];

const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Read-only client for a mirror node's REST API.
///
/// Clones share the same connection pool, so one TLS session is reused for
/// every query issued during a calculation.
#[derive(Clone, Debug)]
pub struct MirrorClient {
    url: Url,
    reqwest_client: Client,
}

impl MirrorClient {
    pub fn new(source: &str) -> Result<Self, CirculationError> {
        let reqwest_client = Client::builder()
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .tcp_keepalive(POOL_IDLE_TIMEOUT)
            .build()?;

        Ok(Self {
            url: base_url(source)?,
            reqwest_client,
        })
    }

    async fn send_get_request(
        &self,
        path: PathSegments<'_>,
        params: Params<'_>,
    ) -> Result<(StatusCode, Vec<u8>), CirculationError> {
        let url = create_api_url(&self.url, path, params);
        tracing::debug!(%url, "Querying mirror node");

        let response = self.reqwest_client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        Ok((status, body.to_vec()))
    }

    pub async fn fetch_token_info(
        &self,
        token: &EntityId,
        timestamp: &str,
    ) -> Result<TokenInfoResponse, CirculationError> {
        let (status, body) = self
            .send_get_request(
                &[
                    routes::API,
                    routes::API_VERSION,
                    routes::TOKENS,
                    token.as_str(),
                ],
                &[(routes::TIMESTAMP, timestamp)],
            )
            .await?;

        if status != StatusCode::OK {
            tracing::warn!(%token, %status, "Token info query failed");
            return Err(CirculationError::TokenNotFound {
                token: token.to_string(),
                status,
            });
        }

        decode(&body, "token info")
    }

    pub async fn fetch_token_supply(
        &self,
        token: &EntityId,
        timestamp: &str,
    ) -> Result<TokenSupplyInfo, CirculationError> {
        let info = self.fetch_token_info(token, timestamp).await?;

        TokenSupplyInfo::from_response(token.as_str(), info)
    }

    pub async fn fetch_account_balance(
        &self,
        account: &EntityId,
        timestamp: &str,
    ) -> Result<BalancesResponse, CirculationError> {
        let (status, body) = self
            .send_get_request(
                &[routes::API, routes::API_VERSION, routes::BALANCES],
                &[
                    (routes::ACCOUNT_ID, account.as_str()),
                    (routes::TIMESTAMP, timestamp),
                ],
            )
            .await?;

        if status != StatusCode::OK {
            tracing::warn!(%account, %status, "Balance query failed");
            return Err(CirculationError::AccountNotFound {
                account: account.to_string(),
                status,
            });
        }

        decode(&body, "account balances")
    }
}

fn decode<T: DeserializeOwned>(
    body: &[u8],
    what: &str,
) -> Result<T, CirculationError> {
    serde_json::from_slice(body).into_invalid_response(what)
}

/// A bare host is reached over https; an explicit scheme is kept as given.
pub fn base_url(source: &str) -> Result<Url, CirculationError> {
    let source = source.trim();
    if source.is_empty() {
        return Err(CirculationError::invalid_argument(
            "Source (mirror node) must be defined.",
        ));
    }

    let url = if source.contains("://") {
        Url::parse(source)
    } else {
        Url::parse(&format!("https://{source}"))
    }
    .map_err(|e| {
        CirculationError::invalid_argument(format!(
            "Invalid mirror node {source}: {e}"
        ))
    })?;

    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(CirculationError::invalid_argument(format!(
            "Invalid mirror node {source}"
        )));
    }

    Ok(url)
}

fn create_api_url(
    base: &Url,
    segments: PathSegments<'_>,
    params: Params<'_>,
) -> Url {
    let mut url = base.clone();
    if let Ok(mut path_segments) = url.path_segments_mut() {
        path_segments.pop_if_empty().extend(segments);
    }

    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }

    url
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;
    use test_helpers::mirror::{balances_body, token_info_body, MockMirror};

    use super::*;

    const TIMESTAMP: &str = "1700000000.123456789";

    fn id(value: &str) -> EntityId {
        EntityId::from_str(value).unwrap()
    }

    #[test]
    fn bare_host_defaults_to_https() {
        let url = base_url("mainnet-public.mirrornode.hedera.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://mainnet-public.mirrornode.hedera.com/"
        );
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let url = base_url("http://127.0.0.1:5551").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5551/");
    }

    #[test]
    fn empty_source_is_rejected() {
        for source in ["", "   "] {
            let error = base_url(source).unwrap_err();
            assert!(matches!(error, CirculationError::InvalidArgument(_)));
            assert_eq!(
                error.to_string(),
                "Source (mirror node) must be defined."
            );
        }
    }

    #[test]
    fn api_urls_carry_path_and_query() {
        let base = base_url("example.mirror").unwrap();

        let url = create_api_url(
            &base,
            &["api", "v1", "balances"],
            &[("account.id", "0.0.2"), ("timestamp", TIMESTAMP)],
        );
        assert_eq!(
            url.as_str(),
            concat!(
                "https://example.mirror/api/v1/balances",
                "?account.id=0.0.2&timestamp=1700000000.123456789"
            )
        );

        let nested = base_url("http://localhost:8080/mirror/").unwrap();
        let url =
            create_api_url(&nested, &["api", "v1", "tokens", "0.0.1"], &[]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/mirror/api/v1/tokens/0.0.1"
        );
    }

    #[tokio::test]
    async fn fetches_token_supply_at_timestamp() {
        let mut mirror = MockMirror::start().await;
        mirror
            .token_at(
                "0.0.859814",
                TIMESTAMP,
                token_info_body("0.0.859814", "1000000000", Some("6")),
            )
            .await;

        let client = MirrorClient::new(&mirror.url()).unwrap();
        let supply = client
            .fetch_token_supply(&id("0.0.859814"), TIMESTAMP)
            .await
            .unwrap();

        assert_eq!(supply.total_supply.to_string(), "1000000000");
        assert_eq!(supply.decimals, 6);
        mirror.assert_hits().await;
    }

    #[tokio::test]
    async fn token_lookup_failure_is_token_not_found() {
        let mut mirror = MockMirror::start().await;
        mirror.token_status("0.0.404", 404).await;

        let client = MirrorClient::new(&mirror.url()).unwrap();
        let error = client
            .fetch_token_supply(&id("0.0.404"), TIMESTAMP)
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            CirculationError::TokenNotFound { ref token, status }
                if token == "0.0.404" && status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn fetches_account_balances() {
        let mut mirror = MockMirror::start().await;
        mirror
            .balances_at(
                "0.0.2",
                TIMESTAMP,
                balances_body("0.0.2", &[("0.0.859814", json!(200))]),
            )
            .await;

        let client = MirrorClient::new(&mirror.url()).unwrap();
        let balances = client
            .fetch_account_balance(&id("0.0.2"), TIMESTAMP)
            .await
            .unwrap();

        assert_eq!(balances.balances.len(), 1);
        assert_eq!(
            balances.token_balance(&id("0.0.859814")).unwrap(),
            Some(200.into())
        );
        mirror.assert_hits().await;
    }

    #[tokio::test]
    async fn balance_lookup_failure_is_account_not_found() {
        let mut mirror = MockMirror::start().await;
        mirror.balances_status("0.0.2", 500).await;

        let client = MirrorClient::new(&mirror.url()).unwrap();
        let error = client
            .fetch_account_balance(&id("0.0.2"), TIMESTAMP)
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "Balance for 0.0.2 was not found, code: 500"
        );
    }

    #[tokio::test]
    async fn malformed_body_is_invalid_response() {
        let mut mirror = MockMirror::start().await;
        mirror.token_raw("0.0.1", "<html>maintenance</html>").await;

        let client = MirrorClient::new(&mirror.url()).unwrap();
        let error = client
            .fetch_token_info(&id("0.0.1"), TIMESTAMP)
            .await
            .unwrap_err();

        assert!(matches!(error, CirculationError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_mirror_is_transport_error() {
        let client = MirrorClient::new("http://127.0.0.1:1").unwrap();
        let error = client
            .fetch_token_info(&id("0.0.1"), TIMESTAMP)
            .await
            .unwrap_err();

        assert!(matches!(error, CirculationError::Transport(_)));
    }
}
