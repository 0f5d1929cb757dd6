//! Telegram error types.

use teloxide::RequestError;
use thiserror::Error;

/// Errors that can occur while talking to the Bot API.
#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Flood wait required: {0} seconds")]
    FloodWait(u32),

    #[error("Bot account has no username, referral links cannot be built")]
    MissingUsername,

    #[error("API request error: {0}")]
    Request(RequestError),
}

impl From<RequestError> for TelegramError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::RetryAfter(wait) => Self::FloodWait(wait.seconds()),
            other => Self::Request(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use teloxide::ApiError;
    use teloxide::types::Seconds;

    use super::*;

    #[test]
    fn test_request_error_mapping() {
        let err = TelegramError::from(RequestError::RetryAfter(Seconds::from_seconds(30)));
        assert!(matches!(err, TelegramError::FloodWait(30)));

        let err = TelegramError::from(RequestError::Api(ApiError::BotBlocked));
        assert!(matches!(err, TelegramError::Request(RequestError::Api(ApiError::BotBlocked))));
    }
}
