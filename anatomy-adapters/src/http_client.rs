use std::sync::Arc;
use std::time::Duration;

use hyper::client::HttpConnector;
use hyper::{Body, Client};
use hyper_rustls::HttpsConnector;
use rustls::{ClientConfig, OwnedTrustAnchor, RootCertStore};

pub(crate) type HyperClient = Client<HttpsConnector<HttpConnector>, Body>;

/// Mozilla's root set, bundled at compile time.
fn trust_roots() -> RootCertStore {
    let mut store = RootCertStore::empty();
    store.add_trust_anchors(webpki_roots::TLS_SERVER_ROOTS.iter().map(|root| {
        OwnedTrustAnchor::from_subject_spki_name_constraints(
            root.subject,
            root.spki,
            root.name_constraints,
        )
    }));
    store
}

/// Client for the sequential, low-volume traffic of the classifiers: one
/// pooled connection per host, dropped after 30s idle.
pub(crate) fn build_https_client(connect_timeout: Duration) -> HyperClient {
    let tls = ClientConfig::builder()
        .with_safe_defaults()
        .with_root_certificates(trust_roots())
        .with_no_client_auth();

    let mut tcp = HttpConnector::new();
    tcp.enforce_http(false);
    tcp.set_connect_timeout(Some(connect_timeout));

    Client::builder()
        .pool_idle_timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(1)
        .build(HttpsConnector::from((tcp, Arc::new(tls))))
}
