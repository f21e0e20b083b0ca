use crate::transport::TransportError;
use quarry::response::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The request failed validation, or the response could not be decoded
    #[error(transparent)]
    Request(#[from] quarry::Error),

    #[error("transport failed: {0}")]
    Transport(#[source] TransportError),

    #[error("store returned status {status}{}", describe(.error))]
    Status {
        status: u16,
        error: Option<StoreError>,
    },
}

fn describe(error: &Option<StoreError>) -> String {
    match error {
        Some(error) => format!(": {error}"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = ClientError::Status {
            status: 404,
            error: Some(serde_json::from_str(r#"{"type":"index_not_found_exception","reason":"no such index [x]"}"#).unwrap()),
        };
        assert_eq!(
            err.to_string(),
            "store returned status 404: index_not_found_exception: no such index [x]"
        );

        let bare = ClientError::Status {
            status: 503,
            error: None,
        };
        assert_eq!(bare.to_string(), "store returned status 503");
    }
}
