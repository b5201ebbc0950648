use std::sync::Arc;

use grouprelay_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), grouprelay_core::Error> {
    grouprelay_core::logging::init("grouprelay")?;

    let cfg = match Config::load() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            tracing::error!("{e}");
            return Err(e);
        }
    };

    grouprelay_telegram::router::run_polling(cfg)
        .await
        .map_err(|e| grouprelay_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
