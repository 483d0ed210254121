//! Issuer demo server.
//!
//! Serves the issuer on `localhost:8080`, signing with the key configured in
//! the JSON file passed as the first argument, or with the Ed25519 test key
//! when no configuration is given.
//!
//! ```bash
//! RUST_LOG=debug cargo run --bin issuer -- issuer.json
//! curl http://localhost:8080/.well-known/openid-configuration
//! curl -X POST http://localhost:8080/credential \
//!     -H "Authorization: Bearer normal-user-token" \
//!     -H "Content-Type: application/json" \
//!     -d '{"format": "jwt_vc", "types": ["DiplomaCredential"]}'
//! ```

use anyhow::Result;
use credibil_vci_issuer::{Issuer, IssuerConfig};
use demos::issuer;
use test_utils::{Realm, keys};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const ADDR: &str = "localhost:8080";

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let issuer = match std::env::args().nth(1) {
        Some(path) => Issuer::new(IssuerConfig::from_file(path)?)?,
        None => keys::issuer(keys::ED25519, None, true),
    };
    tracing::info!(algorithm = %issuer.signer().algorithm(), "issuer configured");

    let jh = issuer::serve(ADDR, issuer, Realm::new()).await?;
    tokio::signal::ctrl_c().await?;
    jh.abort();

    Ok(())
}
