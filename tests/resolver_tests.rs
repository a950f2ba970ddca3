//! Resolver tests: classification of pasted/scanned input, remote fetch
//! dispatch, and idempotence of resolution.

use async_trait::async_trait;
use sendflow::{
    Network, PaymentRequestResolver, ProtocolOutput, ProtocolRequest, RequestError,
    RequestFetcher, ResolvedRequest,
};
use std::sync::atomic::{AtomicUsize, Ordering};

const MAINNET_ADDR: &str = "bc1qcr8te4kr609gcawutmrza0j4xv80jy8z306fyu";

fn protocol_request(amount_sat: u64) -> ProtocolRequest {
    ProtocolRequest {
        outputs: vec![ProtocolOutput { address: MAINNET_ADDR.into(), amount_sat }],
        memo: Some("invoice #42".into()),
        common_name: Some("merchant.example".into()),
        pki_type: "x509+sha256".into(),
        error_message: None,
        expires_at: None,
        expired: false,
    }
}

/// Records fetch calls; resolves with a fixed request or a fixed error.
struct MockFetcher {
    calls: AtomicUsize,
    response: Result<ProtocolRequest, String>,
}

impl MockFetcher {
    fn ok(request: ProtocolRequest) -> Self {
        Self { calls: AtomicUsize::new(0), response: Ok(request) }
    }

    fn failing(message: &str) -> Self {
        Self { calls: AtomicUsize::new(0), response: Err(message.to_string()) }
    }
}

#[async_trait]
impl RequestFetcher for MockFetcher {
    async fn fetch(&self, _url: &str) -> anyhow::Result<ProtocolRequest> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(request) => Ok(request.clone()),
            Err(message) => anyhow::bail!("{}", message),
        }
    }
}

#[tokio::test]
async fn empty_and_whitespace_input_is_rejected() {
    let resolver = PaymentRequestResolver::new(Network::Bitcoin);
    let fetcher = MockFetcher::failing("unused");

    assert_eq!(resolver.resolve("", &fetcher).await, Err(RequestError::EmptyInput));
    assert_eq!(resolver.resolve("   \n\t", &fetcher).await, Err(RequestError::EmptyInput));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn bare_address_resolves_local_without_amount() {
    let resolver = PaymentRequestResolver::new(Network::Bitcoin);
    let fetcher = MockFetcher::failing("unused");

    let resolved = resolver.resolve(MAINNET_ADDR, &fetcher).await.unwrap();
    assert_eq!(
        resolved,
        ResolvedRequest::Local {
            address: MAINNET_ADDR.into(),
            amount_sat: None,
            label: None,
        }
    );
}

#[tokio::test]
async fn bip21_uri_carries_amount_and_label() {
    let resolver = PaymentRequestResolver::new(Network::Bitcoin);
    let fetcher = MockFetcher::failing("unused");

    let input = format!("bitcoin:{}?amount=0.0005&label=Rent", MAINNET_ADDR);
    let resolved = resolver.resolve(&input, &fetcher).await.unwrap();
    assert_eq!(
        resolved,
        ResolvedRequest::Local {
            address: MAINNET_ADDR.into(),
            amount_sat: Some(50_000),
            label: Some("Rent".into()),
        }
    );
}

#[tokio::test]
async fn garbage_input_is_invalid_address() {
    let resolver = PaymentRequestResolver::new(Network::Bitcoin);
    let fetcher = MockFetcher::failing("unused");

    assert_eq!(
        resolver.resolve("definitely not money", &fetcher).await,
        Err(RequestError::InvalidAddress)
    );
    // Address from the wrong network is invalid too.
    assert_eq!(
        resolver
            .resolve("tb1q6rz28mcfaxtmd6v789l9rrlrusdprr9pqcpvkl", &fetcher)
            .await,
        Err(RequestError::InvalidAddress)
    );
}

#[tokio::test]
async fn remote_uri_dispatches_fetch() {
    let resolver = PaymentRequestResolver::new(Network::Bitcoin);
    let fetcher = MockFetcher::ok(protocol_request(75_000));

    let resolved = resolver
        .resolve("bitcoin:?r=https%3A%2F%2Fmerchant.example%2Fpay%2F42", &fetcher)
        .await
        .unwrap();
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    match resolved {
        ResolvedRequest::Remote(request) => assert_eq!(request.total_sat(), 75_000),
        other => panic!("expected remote request, got {:?}", other),
    }
}

#[tokio::test]
async fn bare_https_url_dispatches_fetch() {
    let resolver = PaymentRequestResolver::new(Network::Bitcoin);
    let fetcher = MockFetcher::ok(protocol_request(10_000));

    let resolved = resolver
        .resolve("https://merchant.example/pay/9", &fetcher)
        .await
        .unwrap();
    assert!(matches!(resolved, ResolvedRequest::Remote(_)));
}

#[tokio::test]
async fn failed_fetch_surfaces_fetch_failed() {
    let resolver = PaymentRequestResolver::new(Network::Bitcoin);
    let fetcher = MockFetcher::failing("connection refused");

    let result = resolver.resolve("https://merchant.example/pay/9", &fetcher).await;
    match result {
        Err(RequestError::FetchFailed(message)) => {
            assert!(message.contains("connection refused"))
        }
        other => panic!("expected fetch failure, got {:?}", other),
    }
}

#[tokio::test]
async fn resolution_is_idempotent() {
    let resolver = PaymentRequestResolver::new(Network::Bitcoin);
    let fetcher = MockFetcher::failing("unused");

    let input = format!("bitcoin:{}?amount=0.001", MAINNET_ADDR);
    let first = resolver.resolve(&input, &fetcher).await;
    let second = resolver.resolve(&input, &fetcher).await;
    assert_eq!(first, second);
    assert!(first.is_ok());
}

#[test]
fn resolve_local_rejects_remote_forms() {
    let resolver = PaymentRequestResolver::new(Network::Bitcoin);
    assert_eq!(
        resolver.resolve_local("https://merchant.example/pay/9"),
        Err(RequestError::InvalidAddress)
    );
    assert!(resolver.resolve_local(MAINNET_ADDR).is_ok());
}
