use std::env;

use carescope_core::{AppError, TenantId};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub default_tenant_id: Option<TenantId>,
}

impl CliConfig {
    pub fn load() -> Result<Self, AppError> {
        let database_url = required_env("DATABASE_URL")?;
        let max_connections = parse_env_u32("DATABASE_MAX_CONNECTIONS", 5)?;
        if max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        let default_tenant_id = env::var("CARESCOPE_DEFAULT_TENANT_ID")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| {
                TenantId::parse(value.as_str()).map_err(|error| {
                    AppError::Validation(format!("invalid CARESCOPE_DEFAULT_TENANT_ID: {error}"))
                })
            })
            .transpose()?;

        Ok(Self {
            database_url,
            max_connections,
            default_tenant_id,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, AppError> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<u32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
