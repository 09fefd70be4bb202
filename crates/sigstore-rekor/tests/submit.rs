use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use sigstore_rekor::{
    CreateLogEntryCreated, CreateLogEntryParams, Error, LogEntry, LogEntryClient, LogEntryResponse,
    ProposedEntry, Rekor, RekorInclusionProof, RekorOptions, Result, Transparency, Verification,
};
use sigstore_crypto::{digest, KeyPair};
use sigstore_types::{
    Bundle, CanonicalizedBody, DerCertificate, DigestBytes, DsseEnvelope, DsseSignature,
    HashAlgorithm, MessageDigest, MessageSignature, PayloadBytes, SignatureBytes,
    SignatureContent, TransparencyLogEntry, VerificationMaterial,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const PUBLIC_KEY_PEM: &[u8] = b"-----BEGIN PUBLIC KEY-----\nMCowBQYDK2VwAyEAvEJG0iHYa+zNf7hb8BF73XrRiWoPz8U6VpUDzF8JMUM=\n-----END PUBLIC KEY-----\n";
const LOG_ID: &str = "c0d23d6ad406973f9559f3ba2d1ca01f84147d8ffc5b8445c224f98b9591801d";

/// Answers every submission with one entry and records what it was sent
struct StubClient {
    log_index: i64,
    submitted: Mutex<Vec<ProposedEntry>>,
}

impl StubClient {
    fn new(log_index: i64) -> Arc<Self> {
        Arc::new(Self {
            log_index,
            submitted: Mutex::new(Vec::new()),
        })
    }

    fn submitted(&self) -> Vec<ProposedEntry> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl LogEntryClient for StubClient {
    async fn create_log_entry(&self, params: CreateLogEntryParams) -> Result<CreateLogEntryCreated> {
        let body = format!(
            r#"{{"apiVersion":"{}","kind":"{}","spec":{{}}}}"#,
            params.proposed_entry.api_version(),
            params.proposed_entry.kind()
        );
        self.submitted.lock().unwrap().push(params.proposed_entry);

        let uuid = format!("entry-{}", self.log_index);
        let entry = LogEntry {
            uuid: String::new(),
            body: CanonicalizedBody::new(body.into_bytes()),
            integrated_time: 1_700_000_000,
            log_id: LOG_ID.to_string(),
            log_index: self.log_index,
            verification: Some(Verification {
                inclusion_proof: Some(RekorInclusionProof {
                    checkpoint: "rekor.sigstore.dev - 1\n2\nAAAA\n".to_string(),
                    hashes: vec!["11".repeat(32)],
                    log_index: self.log_index,
                    root_hash: "22".repeat(32),
                    tree_size: self.log_index + 1,
                }),
                signed_entry_timestamp: None,
            }),
        };

        let mut payload = LogEntryResponse::new();
        payload.insert(uuid.clone(), entry);
        Ok(CreateLogEntryCreated {
            etag: Some(uuid),
            location: None,
            payload,
        })
    }
}

/// Never answers
struct HangingClient;

#[async_trait]
impl LogEntryClient for HangingClient {
    async fn create_log_entry(&self, _params: CreateLogEntryParams) -> Result<CreateLogEntryCreated> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(Error::Http("unreachable".to_string()))
    }
}

/// Times out once at the request level, then succeeds after one backoff
struct RetryingClient {
    inner: Arc<StubClient>,
    timeouts: Mutex<Vec<Option<Duration>>>,
}

#[async_trait]
impl LogEntryClient for RetryingClient {
    async fn create_log_entry(&self, params: CreateLogEntryParams) -> Result<CreateLogEntryCreated> {
        let per_request = params.timeout.unwrap_or_default();
        self.timeouts.lock().unwrap().push(params.timeout);
        tokio::time::sleep(per_request).await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.inner.create_log_entry(params).await
    }
}

/// Always fails at the transport
struct FailingClient;

#[async_trait]
impl LogEntryClient for FailingClient {
    async fn create_log_entry(&self, _params: CreateLogEntryParams) -> Result<CreateLogEntryCreated> {
        Err(Error::Api("failed to create entry: 500 Internal Server Error".to_string()))
    }
}

fn dsse_bundle() -> Bundle {
    let envelope = DsseEnvelope::new(
        "application/vnd.in-toto+json",
        PayloadBytes::new(br#"{"_type":"https://in-toto.io/Statement/v1"}"#.to_vec()),
        vec![DsseSignature {
            keyid: String::new(),
            sig: SignatureBytes::new(vec![0x30, 0x44, 0x02, 0x20]),
        }],
    );
    Bundle::new(
        VerificationMaterial::with_public_key_hint("key"),
        SignatureContent::DsseEnvelope(envelope),
    )
}

fn message_signature(with_digest: bool) -> SignatureContent {
    SignatureContent::MessageSignature(MessageSignature {
        message_digest: with_digest.then(|| MessageDigest {
            algorithm: HashAlgorithm::Sha2256,
            digest: DigestBytes::new(vec![0xab; 32]),
        }),
        signature: SignatureBytes::new(b"signature".to_vec()),
    })
}

fn options(client: Arc<dyn LogEntryClient>) -> RekorOptions {
    RekorOptions::staging().with_client(client)
}

fn existing_entry() -> TransparencyLogEntry {
    serde_json::from_value(serde_json::json!({
        "logIndex": "1",
        "logId": {"keyId": STANDARD.encode([7u8; 32])},
        "kindVersion": {"kind": "dsse", "version": "0.0.1"},
        "integratedTime": "1600000000",
        "canonicalizedBody": STANDARD.encode("{}")
    }))
    .unwrap()
}

#[tokio::test]
async fn test_dsse_submission_appends_entry() {
    let stub = StubClient::new(99);
    let rekor = Rekor::new(options(stub.clone()));

    let mut bundle = dsse_bundle();
    bundle.add_tlog_entry(existing_entry());

    rekor
        .submit_artifact(&CancellationToken::new(), PUBLIC_KEY_PEM, &mut bundle)
        .await
        .unwrap();

    let entries = bundle.tlog_entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0], existing_entry());

    let added = &entries[1];
    assert_eq!(added.log_index, 99);
    assert_eq!(added.kind_version.kind, "dsse");
    assert_eq!(added.kind_version.version, "0.0.1");
    assert_eq!(hex::encode(added.log_id.key_id.as_bytes()), LOG_ID);
    let proof = added.inclusion_proof.as_ref().unwrap();
    assert_eq!(proof.tree_size, 100);
    assert_eq!(proof.root_hash.to_hex(), "22".repeat(32));

    let submitted = stub.submitted();
    assert_eq!(submitted.len(), 1);
    let ProposedEntry::Dsse(dsse) = &submitted[0] else {
        panic!("expected a dsse entry");
    };
    let sent: DsseEnvelope = serde_json::from_str(&dsse.spec.proposed_content.envelope).unwrap();
    assert_eq!(Some(&sent), bundle.dsse_envelope());
    assert_eq!(
        dsse.spec.proposed_content.verifiers,
        vec![STANDARD.encode(PUBLIC_KEY_PEM)]
    );
}

#[tokio::test]
async fn test_message_signature_submission() {
    let artifact = b"hello sigstore";
    let key = KeyPair::generate_ecdsa_p256().unwrap();
    let signature = key.sign(artifact).unwrap();
    let public_key = key.public_key_to_pem().unwrap();

    let stub = StubClient::new(5);
    let rekor = Rekor::new(options(stub.clone()));
    let mut bundle = Bundle::new(
        VerificationMaterial::with_certificate(DerCertificate::new(vec![0x30, 0x00])),
        SignatureContent::MessageSignature(MessageSignature {
            message_digest: Some(MessageDigest {
                algorithm: HashAlgorithm::Sha2384,
                digest: DigestBytes::new(digest(HashAlgorithm::Sha2384, artifact).unwrap()),
            }),
            signature: SignatureBytes::new(signature.clone()),
        }),
    );

    rekor
        .submit_artifact(
            &CancellationToken::new(),
            public_key.as_str().as_bytes(),
            &mut bundle,
        )
        .await
        .unwrap();
    assert_eq!(bundle.tlog_entries().len(), 1);
    assert_eq!(bundle.tlog_entries()[0].kind_version.kind, "hashedrekord");

    let submitted = stub.submitted();
    let ProposedEntry::HashedRekord(rekord) = &submitted[0] else {
        panic!("expected a hashedrekord entry");
    };
    assert_eq!(rekord.spec.data.hash.algorithm, "sha384");
    assert_eq!(rekord.spec.data.hash.value.len(), 96);
    assert_eq!(rekord.spec.signature.content, STANDARD.encode(&signature));
    let sent_key = STANDARD.decode(&rekord.spec.signature.public_key.content).unwrap();
    assert!(String::from_utf8(sent_key)
        .unwrap()
        .starts_with("-----BEGIN PUBLIC KEY-----"));
}

#[tokio::test]
async fn test_message_signature_requires_certificate() {
    let stub = StubClient::new(1);
    let rekor = Rekor::new(options(stub.clone()));
    let mut bundle = Bundle::new(
        VerificationMaterial::with_public_key_hint("key"),
        message_signature(true),
    );
    bundle.add_tlog_entry(existing_entry());
    let before = bundle.clone();

    let err = rekor
        .submit_artifact(&CancellationToken::new(), PUBLIC_KEY_PEM, &mut bundle)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingCertificate));
    assert_eq!(err.to_string(), "hashedrekord requires X.509 certificate");
    assert_eq!(bundle, before);
    assert!(stub.submitted().is_empty());
}

#[tokio::test]
async fn test_message_signature_requires_digest() {
    let rekor = Rekor::new(options(StubClient::new(1)));
    let mut bundle = Bundle::new(
        VerificationMaterial::with_certificate(DerCertificate::new(vec![0x30, 0x00])),
        message_signature(false),
    );
    assert!(matches!(
        rekor
            .submit_artifact(&CancellationToken::new(), PUBLIC_KEY_PEM, &mut bundle)
            .await,
        Err(Error::MissingMessageDigest)
    ));
}

#[tokio::test]
async fn test_bundle_without_signature() {
    let rekor = Rekor::new(options(StubClient::new(1)));
    let mut bundle = dsse_bundle();
    bundle.content = None;

    assert!(matches!(
        rekor
            .submit_artifact(&CancellationToken::new(), PUBLIC_KEY_PEM, &mut bundle)
            .await,
        Err(Error::NoSignaturePresent)
    ));
    assert!(bundle.tlog_entries().is_empty());
}

#[tokio::test]
async fn test_transport_failure_is_propagated() {
    let rekor = Rekor::new(options(Arc::new(FailingClient)));
    let mut bundle = dsse_bundle();

    let err = rekor
        .submit_artifact(&CancellationToken::new(), PUBLIC_KEY_PEM, &mut bundle)
        .await
        .unwrap_err();
    assert!(err.is_transport_failure());
    assert!(err.to_string().contains("500"));
    assert!(bundle.tlog_entries().is_empty());
}

#[tokio::test]
async fn test_cancellation_aborts_submission() {
    let rekor = Rekor::new(options(Arc::new(HangingClient)).with_timeout(None));
    let mut bundle = dsse_bundle();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        trigger.cancel();
    });

    let err = tokio::time::timeout(
        Duration::from_secs(5),
        rekor.submit_artifact(&cancel, PUBLIC_KEY_PEM, &mut bundle),
    )
    .await
    .expect("cancellation should end the call")
    .unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
    assert!(bundle.tlog_entries().is_empty());
}

#[tokio::test]
async fn test_timeout_applies_per_request() {
    let client = Arc::new(RetryingClient {
        inner: StubClient::new(5),
        timeouts: Mutex::new(Vec::new()),
    });
    let rekor = Rekor::new(
        options(client.clone())
            .with_timeout(Some(Duration::from_millis(200)))
            .with_retries(1),
    );
    let mut bundle = dsse_bundle();

    rekor
        .submit_artifact(&CancellationToken::new(), PUBLIC_KEY_PEM, &mut bundle)
        .await
        .unwrap();
    assert_eq!(bundle.tlog_entries().len(), 1);
    assert_eq!(
        *client.timeouts.lock().unwrap(),
        vec![Some(Duration::from_millis(200))]
    );
}

#[tokio::test]
async fn test_timeout_aborts_submission() {
    let rekor = Rekor::new(
        options(Arc::new(HangingClient)).with_timeout(Some(Duration::from_millis(50))),
    );
    let mut bundle = dsse_bundle();

    let err = rekor
        .submit_artifact(&CancellationToken::new(), PUBLIC_KEY_PEM, &mut bundle)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled(_)));
    assert!(!err.is_transport_failure());
}

#[tokio::test]
async fn test_submit_to_several_logs() {
    let logs: Vec<Box<dyn Transparency>> = vec![
        Box::new(Rekor::new(options(StubClient::new(10)))),
        Box::new(Rekor::new(options(StubClient::new(20)))),
    ];
    let mut bundle = dsse_bundle();
    let cancel = CancellationToken::new();

    for log in &logs {
        log.get_transparency_log_entry(&cancel, PUBLIC_KEY_PEM, &mut bundle)
            .await
            .unwrap();
    }

    let indexes: Vec<_> = bundle.tlog_entries().iter().map(|e| e.log_index).collect();
    assert_eq!(indexes, vec![10, 20]);

    // The updated bundle still serializes
    let reparsed = Bundle::from_json(&bundle.to_json().unwrap()).unwrap();
    assert_eq!(reparsed.tlog_entries().len(), 2);
}
