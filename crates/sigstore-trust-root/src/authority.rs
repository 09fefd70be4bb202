//! Certificate and timestamping authorities

use crate::validity::ValidityPeriod;
use crate::verifier::ExpiringKey;
use crate::wire::{RawCertChain, RawCertificate, RawCertificateAuthority, RawSubject};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sigstore_crypto::{
    certificate_public_key_der, parse_certificate, sha256_hex, subject_name, PublicKeyInfo,
    VerificationKey,
};
use sigstore_types::DerCertificate;
use x509_cert::Certificate;

/// Organization and common name of an authority
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthoritySubject {
    /// Organization name
    pub organization: String,
    /// Common name
    pub common_name: String,
}

/// An ordered X.509 chain, leaf-most certificate first and root last
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateChain {
    der: Vec<DerCertificate>,
    certificates: Vec<Certificate>,
}

impl CertificateChain {
    /// Decode a chain and check that each certificate is issued by the next
    pub fn from_der(der: Vec<DerCertificate>) -> Result<Self> {
        if der.is_empty() {
            return Err(Error::MalformedTrustRoot(
                "certificate chain is empty".to_string(),
            ));
        }

        let certificates = der
            .iter()
            .map(|c| parse_certificate(c.as_bytes()).map_err(|e| Error::Certificate(e.to_string())))
            .collect::<Result<Vec<_>>>()?;

        for pair in certificates.windows(2) {
            if pair[0].tbs_certificate.issuer != pair[1].tbs_certificate.subject {
                return Err(Error::MalformedTrustRoot(format!(
                    "certificate {} is not issued by {}",
                    subject_name(&pair[0]),
                    subject_name(&pair[1])
                )));
            }
        }

        Ok(Self { der, certificates })
    }

    /// DER encodings in chain order
    pub fn der(&self) -> &[DerCertificate] {
        &self.der
    }

    /// Decoded certificates in chain order
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// The root (last) certificate
    pub fn root(&self) -> &Certificate {
        &self.certificates[self.certificates.len() - 1]
    }

    /// The leaf-most (first) certificate
    pub fn first(&self) -> &Certificate {
        &self.certificates[0]
    }

    /// Hex SHA-256 of the first certificate's DER, used as the chain's identifier
    fn id(&self) -> String {
        sha256_hex(self.der[0].as_bytes())
    }

    /// Verifier for the first certificate's public key
    fn verifier(&self, validity: ValidityPeriod) -> Result<ExpiringKey> {
        let spki = certificate_public_key_der(self.first())?;
        let info = PublicKeyInfo::from_der(&spki)
            .map_err(|e| Error::UnsupportedAlgorithm(e.to_string()))?;
        let key = VerificationKey::new(info.raw_key.clone(), info.default_scheme());
        Ok(ExpiringKey::new(key, validity))
    }

    fn to_raw(&self) -> RawCertChain {
        RawCertChain {
            certificates: self
                .der
                .iter()
                .map(|c| RawCertificate { raw_bytes: c.clone() })
                .collect(),
        }
    }
}

fn subject_from_raw(raw: Option<&RawSubject>) -> Option<AuthoritySubject> {
    raw.map(|s| AuthoritySubject {
        organization: s.organization.clone(),
        common_name: s.common_name.clone(),
    })
}

fn subject_to_raw(subject: Option<&AuthoritySubject>) -> Option<RawSubject> {
    subject.map(|s| RawSubject {
        organization: s.organization.clone(),
        common_name: s.common_name.clone(),
    })
}

/// A Fulcio-style certificate authority
///
/// The chain holds optional intermediates followed by the root; leaves are
/// issued at signing time and never stored here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateAuthority {
    id: String,
    chain: CertificateChain,
    /// Period during which the CA is trusted
    pub validity: ValidityPeriod,
    /// URI of the CA
    pub uri: Option<String>,
    /// Subject of the CA
    pub subject: Option<AuthoritySubject>,
}

impl CertificateAuthority {
    /// Create a CA from its chain
    pub fn new(chain: CertificateChain, validity: ValidityPeriod) -> Self {
        Self {
            id: chain.id(),
            chain,
            validity,
            uri: None,
            subject: None,
        }
    }

    /// Hex SHA-256 of the first certificate in the chain
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The full chain
    pub fn chain(&self) -> &CertificateChain {
        &self.chain
    }

    /// The root certificate
    pub fn root(&self) -> &Certificate {
        self.chain.root()
    }

    /// Intermediate certificates, leaf-most first
    pub fn intermediates(&self) -> &[Certificate] {
        let certs = self.chain.certificates();
        &certs[..certs.len() - 1]
    }

    /// Whether the CA was trusted at `time`
    pub fn valid_at_time(&self, time: DateTime<Utc>) -> bool {
        self.validity.contains(time)
    }

    /// Verifier for the leaf-most certificate's key
    pub fn verifier(&self) -> Result<ExpiringKey> {
        self.chain.verifier(self.validity)
    }

    pub(crate) fn from_raw(raw: &RawCertificateAuthority) -> Result<Self> {
        let chain = CertificateChain::from_der(
            raw.cert_chain
                .certificates
                .iter()
                .map(|c| c.raw_bytes.clone())
                .collect(),
        )?;
        let mut ca = Self::new(chain, ValidityPeriod::from_raw(raw.valid_for.as_ref())?);
        ca.uri = Some(raw.uri.clone()).filter(|u| !u.is_empty());
        ca.subject = subject_from_raw(raw.subject.as_ref());
        Ok(ca)
    }

    pub(crate) fn to_raw(&self) -> RawCertificateAuthority {
        RawCertificateAuthority {
            subject: subject_to_raw(self.subject.as_ref()),
            uri: self.uri.clone().unwrap_or_default(),
            cert_chain: self.chain.to_raw(),
            valid_for: self.validity.to_raw(),
        }
    }
}

/// An RFC 3161 timestamping authority
///
/// The chain runs from the signing (leaf) certificate to the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampingAuthority {
    id: String,
    chain: CertificateChain,
    /// Period during which the TSA is trusted
    pub validity: ValidityPeriod,
    /// URI of the TSA
    pub uri: Option<String>,
    /// Subject of the TSA
    pub subject: Option<AuthoritySubject>,
}

impl TimestampingAuthority {
    /// Create a TSA from its chain
    pub fn new(chain: CertificateChain, validity: ValidityPeriod) -> Self {
        Self {
            id: chain.id(),
            chain,
            validity,
            uri: None,
            subject: None,
        }
    }

    /// Hex SHA-256 of the leaf certificate
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The full chain
    pub fn chain(&self) -> &CertificateChain {
        &self.chain
    }

    /// The timestamp signing certificate
    pub fn leaf(&self) -> &Certificate {
        self.chain.first()
    }

    /// Certificates between the leaf and the root
    pub fn intermediates(&self) -> &[Certificate] {
        let certs = self.chain.certificates();
        if certs.len() < 3 {
            return &[];
        }
        &certs[1..certs.len() - 1]
    }

    /// The root certificate
    pub fn root(&self) -> &Certificate {
        self.chain.root()
    }

    /// Whether the TSA was trusted at `time`
    pub fn valid_at_time(&self, time: DateTime<Utc>) -> bool {
        self.validity.contains(time)
    }

    /// Verifier for the signing certificate's key
    pub fn verifier(&self) -> Result<ExpiringKey> {
        self.chain.verifier(self.validity)
    }

    pub(crate) fn from_raw(raw: &RawCertificateAuthority) -> Result<Self> {
        let chain = CertificateChain::from_der(
            raw.cert_chain
                .certificates
                .iter()
                .map(|c| c.raw_bytes.clone())
                .collect(),
        )?;
        let mut tsa = Self::new(chain, ValidityPeriod::from_raw(raw.valid_for.as_ref())?);
        tsa.uri = Some(raw.uri.clone()).filter(|u| !u.is_empty());
        tsa.subject = subject_from_raw(raw.subject.as_ref());
        Ok(tsa)
    }

    pub(crate) fn to_raw(&self) -> RawCertificateAuthority {
        RawCertificateAuthority {
            subject: subject_to_raw(self.subject.as_ref()),
            uri: self.uri.clone().unwrap_or_default(),
            cert_chain: self.chain.to_raw(),
            valid_for: self.validity.to_raw(),
        }
    }
}
