pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read dataset {source_name}: {error}")]
    Io {
        source_name: String,
        #[source]
        error: std::io::Error,
    },

    #[error("malformed CSV in {source_name}: {error}")]
    Csv {
        source_name: String,
        #[source]
        error: csv::Error,
    },

    #[error("dataset {source_name} has no `{column}` column")]
    MissingColumn {
        source_name: String,
        column: &'static str,
    },

    #[error("invalid layout config: {message}")]
    InvalidConfig { message: String },

    #[error("layout config JSON error: {0}")]
    ConfigJson(#[from] serde_json::Error),
}
