/// Accrual settings loaded from the TOML configuration file
pub mod accrual;

/// Database configuration and connection management
pub mod database;
