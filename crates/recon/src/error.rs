use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad tolerance, empty prefix, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// Wrong number of fixed-phrase rules (7, 8, 9).
    #[error("phrase_rules must list exactly {expected} entries, found {found}")]
    PhraseRuleCount { expected: usize, found: usize },
}
