//! TLS trust and identity material for [`HttpTransport`](crate::HttpTransport).
//!
//! This is the only place that reads certificates. The client itself just
//! receives a transport that is already configured.

use std::path::{Path, PathBuf};

use reqwest::{Certificate, Identity};

#[derive(Debug, thiserror::Error)]
pub enum TlsError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid certificate in {path}: {source}")]
    Certificate {
        path: PathBuf,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid client identity ({cert} / {key}): {source}")]
    Identity {
        cert: PathBuf,
        key: PathBuf,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

/// Certificates to trust, plus an optional client identity.
#[derive(Debug, Clone, Default)]
pub struct TlsMaterial {
    ca_certificates: Vec<Certificate>,
    identity: Option<Identity>,
}

impl TlsMaterial {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trust every certificate in a PEM bundle.
    pub fn with_ca_pem(mut self, pem: &[u8], origin: &Path) -> Result<Self, TlsError> {
        let certs = Certificate::from_pem_bundle(pem).map_err(|source| TlsError::Certificate {
            path: origin.to_path_buf(),
            source,
        })?;
        self.ca_certificates.extend(certs);
        Ok(self)
    }

    /// Load a PEM CA bundle from disk.
    pub fn with_ca_file(self, path: &Path) -> Result<Self, TlsError> {
        let pem = read(path)?;
        self.with_ca_pem(&pem, path)
    }

    /// Present a client certificate for mutual TLS.
    ///
    /// Both files are PEM; they may be the same file when it holds the
    /// certificate chain and the private key together.
    pub fn with_identity_files(mut self, cert: &Path, key: &Path) -> Result<Self, TlsError> {
        let mut pem = read(cert)?;
        if key != cert {
            pem.push(b'\n');
            pem.extend(read(key)?);
        }
        let identity = Identity::from_pem(&pem).map_err(|source| TlsError::Identity {
            cert: cert.to_path_buf(),
            key: key.to_path_buf(),
            source,
        })?;
        self.identity = Some(identity);
        Ok(self)
    }

    pub fn ca_certificates(&self) -> &[Certificate] {
        &self.ca_certificates
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }
}

fn read(path: &Path) -> Result<Vec<u8>, TlsError> {
    std::fs::read(path).map_err(|source| TlsError::Read {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HttpTransport;
    use tempfile::TempDir;

    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures/tls")
            .join(name)
    }

    #[test]
    fn missing_ca_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.pem");
        let err = TlsMaterial::new().with_ca_file(&path).unwrap_err();
        match err {
            TlsError::Read { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_material_has_no_identity() {
        let tls = TlsMaterial::new();
        assert!(tls.ca_certificates().is_empty());
        assert!(tls.identity().is_none());
    }

    #[test]
    fn loads_every_certificate_in_ca_bundle() -> Result<(), TlsError> {
        let single = TlsMaterial::new().with_ca_file(&fixture("ca.pem"))?;
        assert_eq!(single.ca_certificates().len(), 1);

        let bundle = TlsMaterial::new().with_ca_file(&fixture("ca-bundle.pem"))?;
        assert_eq!(bundle.ca_certificates().len(), 2);
        assert!(bundle.identity().is_none());
        Ok(())
    }

    #[test]
    fn identity_from_separate_cert_and_key() -> Result<(), TlsError> {
        let tls = TlsMaterial::new()
            .with_ca_file(&fixture("ca.pem"))?
            .with_identity_files(&fixture("client.pem"), &fixture("client.key"))?;
        assert_eq!(tls.ca_certificates().len(), 1);
        assert!(tls.identity().is_some());
        Ok(())
    }

    #[test]
    fn identity_from_combined_file() -> Result<(), TlsError> {
        let combined = fixture("client-combined.pem");
        let tls = TlsMaterial::new().with_identity_files(&combined, &combined)?;
        assert!(tls.identity().is_some());
        assert!(tls.ca_certificates().is_empty());
        Ok(())
    }

    #[test]
    fn certificate_without_key_is_not_an_identity() {
        let cert = fixture("client.pem");
        let err = TlsMaterial::new()
            .with_identity_files(&cert, &cert)
            .unwrap_err();
        assert!(matches!(err, TlsError::Identity { .. }), "got {err}");
    }

    #[test]
    fn transport_builds_from_mutual_tls_material() -> Result<(), TlsError> {
        let tls = TlsMaterial::new()
            .with_ca_file(&fixture("ca-bundle.pem"))?
            .with_identity_files(&fixture("client.pem"), &fixture("client.key"))?;
        HttpTransport::from_tls(&tls, Some(std::time::Duration::from_secs(5)))?;
        HttpTransport::from_tls(&TlsMaterial::new(), None)?;
        Ok(())
    }
}
