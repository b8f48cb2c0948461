use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::{json, Value};

/// Query timestamps are `seconds.nanoseconds` with exactly nine fractional
/// digits.
pub const TIMESTAMP_QUERY: &str = r"(^|&)timestamp=\d+\.\d{9}(&|$)";

/// An in-process mirror node answering the two REST resources the supply
/// calculation reads. Registered mocks live as long as the `MockMirror`.
pub struct MockMirror {
    server: ServerGuard,
    mocks: Vec<Mock>,
}

impl MockMirror {
    pub async fn start() -> Self {
        Self {
            server: Server::new_async().await,
            mocks: Vec::new(),
        }
    }

    /// Base url including the `http://` scheme, usable as a mirror source.
    pub fn url(&self) -> String {
        self.server.url()
    }

    fn token_path(token: &str) -> String {
        format!("/api/v1/tokens/{token}")
    }

    fn timestamp_query(timestamp: Option<&str>) -> Matcher {
        match timestamp {
            Some(timestamp) => Matcher::UrlEncoded(
                "timestamp".to_string(),
                timestamp.to_string(),
            ),
            None => Matcher::Regex(TIMESTAMP_QUERY.to_string()),
        }
    }

    fn balances_query(account: &str, timestamp: Option<&str>) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("account.id".to_string(), account.to_string()),
            Self::timestamp_query(timestamp),
        ])
    }

    async fn register(
        &mut self,
        path: String,
        query: Matcher,
        status: usize,
        body: String,
    ) -> &mut Self {
        let mock = self
            .server
            .mock("GET", path.as_str())
            .match_query(query)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        self.mocks.push(mock);
        self
    }

    pub async fn token(&mut self, token: &str, body: Value) -> &mut Self {
        self.register(
            Self::token_path(token),
            Self::timestamp_query(None),
            200,
            body.to_string(),
        )
        .await
    }

    pub async fn token_at(
        &mut self,
        token: &str,
        timestamp: &str,
        body: Value,
    ) -> &mut Self {
        self.register(
            Self::token_path(token),
            Self::timestamp_query(Some(timestamp)),
            200,
            body.to_string(),
        )
        .await
    }

    pub async fn token_raw(&mut self, token: &str, body: &str) -> &mut Self {
        self.register(
            Self::token_path(token),
            Self::timestamp_query(None),
            200,
            body.to_string(),
        )
        .await
    }

    pub async fn token_status(
        &mut self,
        token: &str,
        status: usize,
    ) -> &mut Self {
        self.register(
            Self::token_path(token),
            Self::timestamp_query(None),
            status,
            json!({ "_status": { "messages": [{ "message": "Not found" }] } })
                .to_string(),
        )
        .await
    }

    pub async fn balances(&mut self, account: &str, body: Value) -> &mut Self {
        self.register(
            "/api/v1/balances".to_string(),
            Self::balances_query(account, None),
            200,
            body.to_string(),
        )
        .await
    }

    pub async fn balances_at(
        &mut self,
        account: &str,
        timestamp: &str,
        body: Value,
    ) -> &mut Self {
        self.register(
            "/api/v1/balances".to_string(),
            Self::balances_query(account, Some(timestamp)),
            200,
            body.to_string(),
        )
        .await
    }

    pub async fn balances_status(
        &mut self,
        account: &str,
        status: usize,
    ) -> &mut Self {
        self.register(
            "/api/v1/balances".to_string(),
            Self::balances_query(account, None),
            status,
            json!({ "_status": { "messages": [{ "message": "Bad request" }] } })
                .to_string(),
        )
        .await
    }

    /// Token with the given supply, `decimals` omitted when `None`.
    pub async fn token_supply(
        &mut self,
        token: &str,
        total_supply: &str,
        decimals: Option<&str>,
    ) -> &mut Self {
        self.token(token, token_info_body(token, total_supply, decimals))
            .await
    }

    /// Treasury whose first snapshot holds `balance` of `token`.
    pub async fn treasury(
        &mut self,
        account: &str,
        token: &str,
        balance: Value,
    ) -> &mut Self {
        self.balances(account, balances_body(account, &[(token, balance)]))
            .await
    }

    /// Every registered mock must have been requested exactly once.
    pub async fn assert_hits(&self) {
        for mock in &self.mocks {
            mock.assert_async().await;
        }
    }
}

pub fn token_info_body(
    token: &str,
    total_supply: &str,
    decimals: Option<&str>,
) -> Value {
    let mut body = json!({
        "token_id": token,
        "type": "FUNGIBLE_COMMON",
        "name": "Test Token",
        "symbol": "TEST",
        "total_supply": total_supply,
        "treasury_account_id": "0.0.2",
    });
    if let Some(decimals) = decimals {
        body["decimals"] = json!(decimals);
    }
    body
}

pub fn balances_body(account: &str, tokens: &[(&str, Value)]) -> Value {
    let tokens: Vec<Value> = tokens
        .iter()
        .map(|(token_id, balance)| {
            json!({ "token_id": token_id, "balance": balance })
        })
        .collect();

    json!({
        "timestamp": "1700000000.000000000",
        "balances": [{
            "account": account,
            "balance": 0,
            "tokens": tokens,
        }],
        "links": { "next": null },
    })
}
