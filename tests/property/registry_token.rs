// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Registry Entries
//!
//! The hub reads a spoke's bearer token out of the registry entry's
//! `config` document. Whatever token the spoke's secret holds (base64 in
//! `data.token`), the decoded `bearerToken` must carry the same bytes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use cim_multicloud_kubernetes::registry::{
    decode_bearer_token, ClusterConnectionConfig, ClusterRegistryEntry,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

proptest! {
    /// Property: decode(encode(token)) = token
    #[test]
    fn prop_bearer_token_round_trip(token in "\\PC{1,256}") {
        let encoded = STANDARD.encode(token.as_bytes());
        prop_assert_eq!(decode_bearer_token(&encoded).unwrap(), token);
    }

    /// Property: Arbitrary token bytes decode to those bytes, never an error
    ///
    /// UTF-8 tokens come back unchanged; other bytes are replaced, not rejected.
    #[test]
    fn prop_arbitrary_token_bytes_decode(bytes in prop::collection::vec(any::<u8>(), 1..256)) {
        let decoded = decode_bearer_token(&STANDARD.encode(&bytes)).unwrap();
        prop_assert_eq!(&decoded, &String::from_utf8_lossy(&bytes).into_owned());
        if let Ok(text) = std::str::from_utf8(&bytes) {
            prop_assert_eq!(decoded.as_bytes(), text.as_bytes());
        }
    }

    /// Property: The config document carries the decoded token and the CA as given
    #[test]
    fn prop_config_document_round_trip(
        token in "[A-Za-z0-9._-]{1,128}",
        ca in "[A-Za-z0-9+/]{4,64}",
    ) {
        let config = ClusterConnectionConfig::from_token_secret(&STANDARD.encode(&token), &ca)
            .unwrap();
        let document = config.to_json().unwrap();
        let parsed: ClusterConnectionConfig = serde_json::from_str(&document).unwrap();

        prop_assert_eq!(&parsed.bearer_token, &token);
        prop_assert_eq!(&parsed.tls_client_config.ca_data, &ca);
        prop_assert!(!parsed.tls_client_config.insecure);

        let data = BTreeMap::from([
            ("name".to_string(), "spoke".to_string()),
            ("server".to_string(), "https://spoke.example".to_string()),
            ("clusterResources".to_string(), "true".to_string()),
            ("config".to_string(), document),
        ]);
        let entry = ClusterRegistryEntry::from_string_data(&data).unwrap();
        prop_assert_eq!(entry.config, parsed);
    }

    /// Property: Non-base64 tokens are rejected, never passed through
    #[test]
    fn prop_invalid_base64_rejected(garbage in "[!@#$%^&*]{1,32}") {
        prop_assert!(decode_bearer_token(&garbage).is_err());
    }
}
