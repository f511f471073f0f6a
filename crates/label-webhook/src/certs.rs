use std::{path::Path, sync::Arc};

use anyhow::{Result, anyhow};
use axum_server::tls_rustls::RustlsConfig;
use rustls::ServerConfig;
use rustls_pki_types::{CertificateDer, PrivateKeyDer, pem::SliceIter};
use tracing::warn;

use crate::config::TlsConfig;

/// Build the TLS configuration of the https server from the PEM files
/// referenced by `tls_config`.
///
/// The certificate files are read once: provisioning and rotating them is
/// left to the deployment.
pub(crate) async fn create_tls_config(tls_config: &TlsConfig) -> Result<RustlsConfig> {
    let (cert, key) = load_server_cert_and_key(&tls_config.cert_file, &tls_config.key_file).await?;
    let server_config = build_tls_server_config(cert, key)?;

    Ok(RustlsConfig::from_config(Arc::new(server_config)))
}

fn build_tls_server_config(
    cert: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
) -> Result<ServerConfig> {
    let mut server_config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()?
            .with_no_client_auth()
            .with_single_cert(cert, key)?;
    server_config.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

    Ok(server_config)
}

async fn load_server_cert_and_key(
    cert_file: &Path,
    key_file: &Path,
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)> {
    let cert_contents = tokio::fs::read(cert_file)
        .await
        .map_err(|e| anyhow!("Error opening certificate file {:?}: {}", cert_file, e))?;
    let key_contents = tokio::fs::read(key_file)
        .await
        .map_err(|e| anyhow!("Error opening key file {:?}: {}", key_file, e))?;

    let cert_iterator: SliceIter<CertificateDer> = SliceIter::new(&cert_contents[..]);
    let certs: Vec<CertificateDer<'static>> = cert_iterator
        .filter_map(|it| {
            if let Err(ref e) = it {
                warn!("Cannot parse certificate: {e}");
            }
            it.ok()
        })
        .collect();

    if certs.len() != 1 {
        return Err(anyhow!(
            "Expected exactly one certificate in certificate file, found {}",
            certs.len()
        ));
    }

    let key_iterator: SliceIter<PrivateKeyDer> = SliceIter::new(&key_contents[..]);
    let mut keys: Vec<PrivateKeyDer<'static>> = key_iterator
        .filter_map(|it| {
            if let Err(ref e) = it {
                warn!("Cannot parse private key: {e}");
            }
            it.ok()
        })
        .collect();

    if keys.len() != 1 {
        return Err(anyhow!(
            "Expected exactly one key in key file, found {}",
            keys.len()
        ));
    }

    Ok((certs, keys.remove(0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> tempfile::TempPath {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(contents.as_bytes()).unwrap();
        temp_file.into_temp_path()
    }

    #[tokio::test]
    async fn missing_certificate_file() {
        let tls_config = TlsConfig {
            cert_file: "/does/not/exist/tls.crt".into(),
            key_file: "/does/not/exist/tls.key".into(),
        };

        let error = create_tls_config(&tls_config).await.err().unwrap();

        assert!(error.to_string().contains("Error opening certificate file"));
    }

    #[tokio::test]
    async fn certificate_file_without_certificates() {
        let cert_file = file_with("this is not a certificate\n");
        let key_file = file_with("this is not a key\n");
        let tls_config = TlsConfig {
            cert_file: cert_file.to_path_buf(),
            key_file: key_file.to_path_buf(),
        };

        let error = create_tls_config(&tls_config).await.err().unwrap();

        assert_eq!(
            error.to_string(),
            "Expected exactly one certificate in certificate file, found 0"
        );
    }
}
