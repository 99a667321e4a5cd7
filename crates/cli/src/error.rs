use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Diagnostic(#[from] loginsrv_directive::Diagnostic),

    #[error(transparent)]
    Setup(#[from] loginsrv_directive::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no {0} directive found")]
    NoDirective(&'static str),
}
