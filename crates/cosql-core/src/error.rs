use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(String),
    #[error("request failed with status {code}: {message}")]
    Status { code: u16, message: String },
    #[error("unreadable payload: {0}")]
    Payload(String),
}

#[cfg(test)]
mod tests {
    use super::FetchError;

    #[test]
    fn display_includes_status_code() {
        let err = FetchError::Status {
            code: 400,
            message: "Syntax error near 'form'".into(),
        };
        assert_eq!(
            err.to_string(),
            "request failed with status 400: Syntax error near 'form'"
        );
        assert_eq!(FetchError::Transport("dns".into()).to_string(), "dns");
    }
}
