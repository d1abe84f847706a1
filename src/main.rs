//! payslip-engine server.
//!
//! Environment:
//! - `PAYSLIP_CONFIG_DIR`: directory holding `payroll.yaml` and
//!   `tax_brackets.yaml` (default `./config/default`)
//! - `PAYSLIP_SEED_FILE`: optional YAML file of employees, salaries, periods
//!   and compensation records to serve
//! - `PAYSLIP_BIND`: listen address (default `0.0.0.0:3000`)
//! - `RUST_LOG`: tracing filter (default `payslip_engine=info`)

use payslip_engine::api::{AppState, create_router};
use payslip_engine::config::ConfigLoader;
use payslip_engine::store::{InMemoryPayroll, PayrollSnapshot};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "payslip_engine=info".into()),
        )
        .init();

    let config_dir =
        std::env::var("PAYSLIP_CONFIG_DIR").unwrap_or_else(|_| "./config/default".to_string());
    let loader = ConfigLoader::load(&config_dir)?;
    let config = loader.config().clone();
    tracing::info!(
        config_dir = %config_dir,
        brackets = config.tax_brackets().len(),
        "Configuration loaded"
    );

    let store = match std::env::var("PAYSLIP_SEED_FILE") {
        Ok(seed) => {
            tracing::info!(seed_file = %seed, "Seeding payroll store");
            InMemoryPayroll::from_yaml_file(&seed, config)?
        }
        Err(_) => InMemoryPayroll::new(PayrollSnapshot::default(), config),
    };

    let app = create_router(AppState::new(loader, store));

    let bind = std::env::var("PAYSLIP_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!("payslip-engine listening on {bind}");

    axum::serve(listener, app).await?;
    Ok(())
}
