use std::process;

use anyhow::Result;
use label_webhook::{LabelWebhook, cli, config::Config, config::SERVICE_NAME, tracing::setup_tracing};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    let config = Config::from_args(&matches)?;

    setup_tracing(&config.log_level, &config.log_fmt, config.log_no_color)?;
    info!(
        service = SERVICE_NAME,
        version = env!("CARGO_PKG_VERSION"),
        "starting"
    );

    let webhook = match LabelWebhook::new_from_config(config).await {
        Ok(webhook) => webhook,
        Err(e) => fatal_error(e.to_string()),
    };

    if let Err(e) = webhook.run().await {
        fatal_error(e.to_string());
    }

    Ok(())
}

fn fatal_error(msg: String) -> ! {
    error!("{}", msg);
    process::exit(1);
}
