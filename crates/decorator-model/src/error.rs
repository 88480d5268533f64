use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid label prefix: {0:?} (expected a lowercase DNS subdomain)")]
    InvalidPrefix(String),
}
