use reqwest::StatusCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CirculationError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error("HTS Token {token} was not found, code: {}", .status.as_u16())]
    TokenNotFound { token: String, status: StatusCode },
    #[error("Balance for {account} was not found, code: {}", .status.as_u16())]
    AccountNotFound { account: String, status: StatusCode },
    #[error("Mirror node request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Unexpected mirror node response: {0}")]
    InvalidResponse(String),
}

impl CirculationError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }
}

pub trait AsInvalidResponse<T> {
    fn into_invalid_response(self, what: &str) -> Result<T, CirculationError>;
}

impl<T, E: std::fmt::Display> AsInvalidResponse<T> for Result<T, E> {
    #[inline]
    fn into_invalid_response(self, what: &str) -> Result<T, CirculationError> {
        self.map_err(|reason| {
            tracing::error!(%reason, "Failed to decode {}", what);
            CirculationError::InvalidResponse(format!("{what}: {reason}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_messages_carry_status_code() {
        let error = CirculationError::TokenNotFound {
            token: "0.0.859814".to_owned(),
            status: StatusCode::NOT_FOUND,
        };
        assert_eq!(
            error.to_string(),
            "HTS Token 0.0.859814 was not found, code: 404"
        );

        let error = CirculationError::AccountNotFound {
            account: "0.0.2".to_owned(),
            status: StatusCode::BAD_REQUEST,
        };
        assert_eq!(
            error.to_string(),
            "Balance for 0.0.2 was not found, code: 400"
        );
    }

    #[test]
    fn invalid_response_keeps_reason() {
        let result: Result<u32, _> = "six".parse::<u32>();
        let error = result.into_invalid_response("decimals").unwrap_err();

        assert!(matches!(error, CirculationError::InvalidResponse(_)));
        assert!(error
            .to_string()
            .starts_with("Unexpected mirror node response: decimals"));
    }
}
