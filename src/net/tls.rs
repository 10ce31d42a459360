//! Listener certificate loading.

use std::io;
use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;

use crate::config::TlsConfig;

/// Load the PEM certificate chain and private key named by `tls`.
///
/// Missing files are reported by path before rustls gets to see them.
pub async fn load_tls_config(tls: &TlsConfig) -> Result<RustlsConfig, io::Error> {
    let cert_path = Path::new(&tls.cert_path);
    let key_path = Path::new(&tls.key_path);

    for (what, path) in [("Certificate", cert_path), ("Private key", key_path)] {
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} file not found: {}", what, path.display()),
            ));
        }
    }

    RustlsConfig::from_pem_file(cert_path, key_path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_missing_certificate() {
        let key = tempfile::NamedTempFile::new().unwrap();
        let tls = TlsConfig {
            cert_path: "/nonexistent/server.pem".into(),
            key_path: key.path().display().to_string(),
        };

        let err = load_tls_config(&tls).await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("Certificate file not found"));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let cert = tempfile::NamedTempFile::new().unwrap();
        let tls = TlsConfig {
            cert_path: cert.path().display().to_string(),
            key_path: "/nonexistent/server.key".into(),
        };

        let err = load_tls_config(&tls).await.unwrap_err();
        assert!(err.to_string().contains("Private key file not found"));
    }

    #[tokio::test]
    async fn test_files_without_pem_blocks_are_rejected() {
        let mut cert = tempfile::NamedTempFile::new().unwrap();
        let mut key = tempfile::NamedTempFile::new().unwrap();
        writeln!(cert, "not a certificate").unwrap();
        writeln!(key, "not a key").unwrap();

        let tls = TlsConfig {
            cert_path: cert.path().display().to_string(),
            key_path: key.path().display().to_string(),
        };
        assert!(load_tls_config(&tls).await.is_err());
    }
}
