use thiserror::Error;

pub type CarouselResult<T> = Result<T, CarouselError>;

#[derive(Debug, Error)]
pub enum CarouselError {
    #[error("invalid carousel config: {0}")]
    InvalidConfig(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
