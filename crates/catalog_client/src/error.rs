use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("sign in required")]
    AuthRequired,
    #[error("not permitted")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("server rejected request ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("invalid response body: {0}")]
    Decode(String),
    #[error("invalid base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl CatalogError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound)
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, CatalogError::AuthRequired)
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            CatalogError::Decode(value.to_string())
        } else {
            CatalogError::Transport(value.to_string())
        }
    }
}
