use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShowScoutError {
    #[error("Render error: {0}")]
    Render(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
