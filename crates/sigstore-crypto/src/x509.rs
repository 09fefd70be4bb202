//! X.509 certificate decoding

use crate::error::{Error, Result};
use x509_cert::der::{Decode, Encode};
use x509_cert::Certificate;

/// Decode a DER-encoded X.509 certificate
pub fn parse_certificate(cert_der: &[u8]) -> Result<Certificate> {
    Certificate::from_der(cert_der)
        .map_err(|e| Error::InvalidCertificate(format!("failed to parse certificate: {}", e)))
}

/// DER SubjectPublicKeyInfo of a certificate
pub fn certificate_public_key_der(cert: &Certificate) -> Result<Vec<u8>> {
    cert.tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| Error::InvalidCertificate(format!("failed to encode SPKI: {}", e)))
}

/// Subject distinguished name in RFC 4514 form
pub fn subject_name(cert: &Certificate) -> String {
    cert.tbs_certificate.subject.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{Curve, KeyType, PublicKeyInfo};
    use base64::{engine::general_purpose::STANDARD, Engine};

    const LEAF_B64: &str = "MIIBlTCCARygAwIBAgIUEZEjxOPkYuN23bCaCywUy5Nc5UMwCgYIKoZIzj0EAwMwNzEVMBMGA1UECgwMc2lnc3RvcmUuZGV2MR4wHAYDVQQDDBVzaWdzdG9yZS1pbnRlcm1lZGlhdGUwHhcNMjQwNDAyMTkxOTA5WhcNMjQwNDAyMTkyOTA5WjAtMRUwEwYDVQQKDAxzaWdzdG9yZS5kZXYxFDASBgNVBAMMC3Rlc3Qtc2lnbmVyMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEvDdq26Ze+J7vCEY05BSSDC6X6aHH85WSgpG2CSsiI87XDkZ0rOws5np4rGB7AQfaco7UvZ3IF/v3Yr/dywE/dqMQMA4wDAYDVR0TAQH/BAIwADAKBggqhkjOPQQDAwNnADBkAjAdhMYioyofZDSQh7/bNWpypi8XqwMs0/GVMyBY5Sg7crO4pZYiTPhT96u777plRgsCME26L/s1Vs/Q+b7Gmz97W7V/NoyFy7b6YnIGNgNyIXj2SP0IFyTxUURANI3bLRgzVA==";

    #[test]
    fn test_parse_leaf() {
        let der = STANDARD.decode(LEAF_B64).unwrap();
        let cert = parse_certificate(&der).unwrap();
        assert!(subject_name(&cert).contains("CN=test-signer"));

        let spki = certificate_public_key_der(&cert).unwrap();
        let info = PublicKeyInfo::from_der(&spki).unwrap();
        assert_eq!(info.key_type, KeyType::Ecdsa(Curve::P256));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            parse_certificate(&[0x30, 0x03, 0x02, 0x01]),
            Err(Error::InvalidCertificate(_))
        ));
    }
}
