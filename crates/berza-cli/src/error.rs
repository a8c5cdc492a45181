use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] berza_core::ValidationError),

    #[error(transparent)]
    Store(#[from] berza_core::StoreError),

    #[error(transparent)]
    Warehouse(#[from] berza_warehouse::WarehouseError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Store(_) => 3,
            Self::Warehouse(_) => 3,
            Self::Io(_) => 10,
        }
    }
}
