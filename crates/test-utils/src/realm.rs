//! # Mock Realm
//!
//! An in-memory [`Provider`](credibil_vci_issuer::provider::Provider) populated
//! from the JSON fixtures under `data/`.

use anyhow::{Context, Result, anyhow};
use credibil_vci_issuer::provider::{Mappers, Metadata, Subject};
use credibil_vci_issuer::{Authorized, ClientConfig, MapperConfig};
use serde_json::{Map, Value};

use crate::keys::ISSUER_ID;
use crate::store::Mockstore;

const OPENID_CONFIGURATION: &[u8] = include_bytes!("../data/openid-configuration.json");
const CLIENTS: &[u8] = include_bytes!("../data/clients.json");
const MAPPERS: &[u8] = include_bytes!("../data/mappers.json");
const SESSIONS: &[u8] = include_bytes!("../data/sessions.json");

const METADATA: &str = "METADATA";
const CLIENT: &str = "CLIENT";
const MAPPER: &str = "MAPPER";
const SESSION: &str = "SESSION";

/// Wallet client declaring `DiplomaCredential` and `ProofOfAge`.
pub const WALLET_CLIENT: &str = "did:web:wallet.example.com";

/// Access token for a user of the wallet client.
pub const NORMAL_USER: &str = "normal-user-token";

/// Access token for an employee of the employer client.
pub const EMPLOYEE: &str = "employee-token";

/// Access token for a session without a user.
pub const ANONYMOUS: &str = "anonymous-token";

/// A mock realm holding the issuer's clients, mappers and sessions.
#[derive(Clone, Debug)]
pub struct Realm {
    store: Mockstore,
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

impl Realm {
    /// A realm populated from the JSON fixtures.
    ///
    /// # Panics
    ///
    /// Panics if the fixtures are invalid.
    #[must_use]
    pub fn new() -> Self {
        let store = Mockstore::open();
        store.put(METADATA, ISSUER_ID, OPENID_CONFIGURATION).expect("should store");

        let clients: Vec<Value> = serde_json::from_slice(CLIENTS).expect("should parse clients");
        for client in clients {
            let id = client["clientId"].as_str().expect("should have client id");
            let bytes = serde_json::to_vec(&client).expect("should serialize");
            store.put(CLIENT, id, &bytes).expect("should store");
        }

        let mappers: Map<String, Value> =
            serde_json::from_slice(MAPPERS).expect("should parse mappers");
        for (client_id, configs) in mappers {
            let bytes = serde_json::to_vec(&configs).expect("should serialize");
            store.put(MAPPER, &client_id, &bytes).expect("should store");
        }

        let sessions: Map<String, Value> =
            serde_json::from_slice(SESSIONS).expect("should parse sessions");
        for (token, session) in sessions {
            let bytes = serde_json::to_vec(&session).expect("should serialize");
            store.put(SESSION, &token, &bytes).expect("should store");
        }

        Self { store }
    }

    /// A realm with no clients, mappers or sessions and an empty base
    /// configuration.
    ///
    /// # Panics
    ///
    /// Panics if the store cannot be written.
    #[must_use]
    pub fn empty() -> Self {
        let store = Mockstore::open();
        store.put(METADATA, ISSUER_ID, b"{}").expect("should store");
        Self { store }
    }

    /// Add or replace a client.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be stored.
    pub fn add_client(&self, client: &ClientConfig) {
        let bytes = serde_json::to_vec(client).expect("should serialize");
        self.store.put(CLIENT, &client.client_id, &bytes).expect("should store");
    }

    /// Replace a client's mappers.
    ///
    /// # Panics
    ///
    /// Panics if the mappers cannot be stored.
    pub fn set_mappers(&self, client_id: &str, mappers: &[MapperConfig]) {
        let bytes = serde_json::to_vec(mappers).expect("should serialize");
        self.store.put(MAPPER, client_id, &bytes).expect("should store");
    }

    /// Bind an access token to a client and session.
    ///
    /// # Panics
    ///
    /// Panics if the session cannot be stored.
    pub fn add_session(&self, token: &str, authorized: &Authorized) {
        let bytes = serde_json::to_vec(authorized).expect("should serialize");
        self.store.put(SESSION, token, &bytes).expect("should store");
    }
}

impl Metadata for Realm {
    async fn configuration(&self, issuer: &str) -> Result<Map<String, Value>> {
        let Some(bytes) = self.store.get(METADATA, issuer)? else {
            return Err(anyhow!("issuer {issuer} not found"));
        };
        serde_json::from_slice(&bytes).context("parsing configuration")
    }

    async fn clients(&self, _issuer: &str) -> Result<Vec<ClientConfig>> {
        self.store
            .get_all(CLIENT)?
            .into_iter()
            .map(|(_, bytes)| serde_json::from_slice(&bytes).context("parsing client"))
            .collect()
    }
}

impl Mappers for Realm {
    async fn mappers(&self, client_id: &str) -> Result<Vec<MapperConfig>> {
        let Some(bytes) = self.store.get(MAPPER, client_id)? else {
            return Ok(vec![]);
        };
        serde_json::from_slice(&bytes).context("parsing mappers")
    }
}

impl Subject for Realm {
    async fn authorize(&self, access_token: &str) -> Result<Authorized> {
        let Some(bytes) = self.store.get(SESSION, access_token)? else {
            return Err(anyhow!("access token not found"));
        };
        serde_json::from_slice(&bytes).context("parsing session")
    }
}
