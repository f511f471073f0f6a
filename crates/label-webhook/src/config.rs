use anyhow::{Result, anyhow};
use clap::ArgMatches;
use label_policy::{LabelPolicy, PolicySettings};
use lazy_static::lazy_static;
use std::fs::File;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

pub static SERVICE_NAME: &str = "label-webhook";

lazy_static! {
    pub(crate) static ref HOSTNAME: String =
        std::env::var("HOSTNAME").unwrap_or_else(|_| String::from("unknown"));
}

pub struct Config {
    pub addr: SocketAddr,
    pub tls_config: Option<TlsConfig>,
    pub policy: LabelPolicy,
    pub log_level: String,
    pub log_fmt: String,
    pub log_no_color: bool,
}

pub struct TlsConfig {
    pub cert_file: PathBuf,
    pub key_file: PathBuf,
}

impl Config {
    pub fn from_args(matches: &ArgMatches) -> Result<Self> {
        let addr = api_bind_address(matches)?;
        let policy = label_policy(matches)?;

        let log_level = matches
            .get_one::<String>("log-level")
            .expect("This should not happen, there's a default value for log-level")
            .to_owned();
        let log_fmt = matches
            .get_one::<String>("log-fmt")
            .expect("This should not happen, there's a default value for log-fmt")
            .to_owned();
        let log_no_color = matches
            .get_one::<bool>("log-no-color")
            .expect("clap should have assigned a default value")
            .to_owned();

        let (cert_file, key_file) = tls_files(matches)?;
        let tls_config = if cert_file.is_empty() {
            None
        } else {
            Some(TlsConfig {
                cert_file: PathBuf::from(cert_file),
                key_file: PathBuf::from(key_file),
            })
        };

        Ok(Self {
            addr,
            tls_config,
            policy,
            log_level,
            log_fmt,
            log_no_color,
        })
    }
}

fn api_bind_address(matches: &clap::ArgMatches) -> Result<SocketAddr> {
    format!(
        "{}:{}",
        matches
            .get_one::<String>("address")
            .expect("This should not happen, there's a default value for addr"),
        matches
            .get_one::<String>("port")
            .expect("This should not happen, there's a default value for port")
    )
    .parse()
    .map_err(|e| anyhow!("error parsing arguments: {}", e))
}

fn tls_files(matches: &clap::ArgMatches) -> Result<(String, String)> {
    let cert_file = matches
        .get_one::<String>("cert-file")
        .cloned()
        .unwrap_or_default();
    let key_file = matches
        .get_one::<String>("key-file")
        .cloned()
        .unwrap_or_default();
    if cert_file.is_empty() != key_file.is_empty() {
        Err(anyhow!(
            "error parsing arguments: either both --cert-file and --key-file must be provided, or neither"
        ))
    } else {
        Ok((cert_file, key_file))
    }
}

fn label_policy(matches: &clap::ArgMatches) -> Result<LabelPolicy> {
    let settings = match matches.get_one::<String>("policy-settings") {
        None => PolicySettings::default(),
        Some(path) => {
            let settings_file = Path::new(path);
            read_policy_settings_file(settings_file).map_err(|e| {
                anyhow!(
                    "error while loading policy settings from {:?}: {}",
                    settings_file,
                    e
                )
            })?
        }
    };

    LabelPolicy::new(settings).map_err(|e| anyhow!("invalid policy settings: {}", e))
}

/// Reads the policy settings file. Keys left out of the file keep their
/// default value.
fn read_policy_settings_file(path: &Path) -> Result<PolicySettings> {
    let settings_file = File::open(path)?;
    let settings: PolicySettings = serde_yaml::from_reader(&settings_file)?;
    Ok(settings)
}
