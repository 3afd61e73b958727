use crate::options::ConfigError;

/// Errors that abort a shaking pass. The stylesheet is left untouched.
#[derive(Debug, thiserror::Error)]
pub enum ShakeError {
    #[error(transparent)]
    Parse(#[from] css::ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
