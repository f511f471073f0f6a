use axum::Router;
use label_policy::{LabelPolicy, PolicySettings};
use label_webhook::{LabelWebhook, config::Config};
use std::net::SocketAddr;

pub(crate) fn default_test_config() -> Config {
    Config {
        addr: SocketAddr::from(([127, 0, 0, 1], 8999)),
        tls_config: None,
        policy: LabelPolicy::new(PolicySettings::default()).unwrap(),
        log_level: "info".to_owned(),
        log_fmt: "json".to_owned(),
        log_no_color: false,
    }
}

pub(crate) async fn app(config: Config) -> Router {
    let server = LabelWebhook::new_from_config(config).await.unwrap();

    server.router()
}
