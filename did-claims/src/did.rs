use std::fmt::Debug;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use log::debug;
use serde::Serialize;

use crate::{
    crypto::{
        did::{strip_fragment, DidParser},
        ed25519::Ed25519KeyMaterial,
        KeyMaterial,
    },
    error::{Error, Result},
    jws::{DagJws, DecodedToken, JwsHeader, JwsSignature, VerifiedJws},
    serde::Base64Encode,
};

const DID_KEY_PREFIX: &str = "did:key:";

/// Extra checks applied when verifying a token
#[derive(Clone, Debug, Default)]
pub struct VerifyOptions {
    /// When set, the token must have been issued by this DID
    pub issuer: Option<String>,
}

/// A decentralized identity: an optional key provider that can sign, and a
/// resolver that turns DIDs back into key material for verification.
///
/// A `Did` with a provider must be authenticated before it can sign. A `Did`
/// without one can still verify tokens issued by anybody its resolver knows.
pub struct Did {
    provider: Option<Box<dyn KeyMaterial>>,
    resolver: DidParser,
    id: Option<String>,
}

impl Debug for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Did")
            .field("id", &self.id)
            .field("has_provider", &self.provider.is_some())
            .finish()
    }
}

impl Did {
    /// A verify-only DID
    pub fn new(resolver: DidParser) -> Self {
        Did {
            provider: None,
            resolver,
            id: None,
        }
    }

    pub fn with_provider(provider: Box<dyn KeyMaterial>, resolver: DidParser) -> Self {
        Did {
            provider: Some(provider),
            resolver,
            id: None,
        }
    }

    pub fn authenticated(&self) -> bool {
        self.id.is_some()
    }

    /// The DID string, available once authenticated
    pub fn id(&self) -> Result<&str> {
        self.id.as_deref().ok_or(Error::NotAuthenticated)
    }

    /// The key id used in JWS headers: the DID followed by its key fragment
    pub fn kid(&self) -> Result<String> {
        let id = self.id()?;
        let fingerprint = id.strip_prefix(DID_KEY_PREFIX).unwrap_or(id);
        Ok(format!("{id}#{fingerprint}"))
    }

    /// Resolve the provider's DID and prove the provider holds the private
    /// half of the resolved key by signing a challenge with it.
    pub async fn authenticate(&mut self) -> Result<&str> {
        let provider = self.provider.as_ref().ok_or_else(|| Error::Authentication {
            reason: "No key provider to authenticate with".into(),
        })?;

        let did = provider
            .get_did()
            .await
            .map_err(|error| Error::Authentication {
                reason: format!("{error:#}"),
            })?;

        let resolved = self.resolver.parse(&did).map_err(|error| Error::Authentication {
            reason: format!("Could not resolve {did}: {error:#}"),
        })?;

        if resolved.public_key_bytes() != provider.public_key_bytes() {
            return Err(Error::Authentication {
                reason: format!("{did} resolves to a different key than the provider holds"),
            });
        }

        let challenge = format!("authenticate:{did}");
        let signature = provider
            .sign(challenge.as_bytes())
            .await
            .map_err(|error| Error::Authentication {
                reason: format!("{error:#}"),
            })?;
        resolved
            .verify(challenge.as_bytes(), &signature)
            .await
            .map_err(|error| Error::Authentication {
                reason: format!("{error:#}"),
            })?;

        debug!("Authenticated {}", did);
        Ok(self.id.insert(did).as_str())
    }

    /// Sign a payload (normally a claims object) into a single-signature JWS
    pub async fn create_jws<T: Serialize>(&self, payload: &T) -> Result<DagJws> {
        let provider = match (&self.provider, &self.id) {
            (Some(provider), Some(_)) => provider,
            _ => return Err(Error::NotAuthenticated),
        };

        let header = JwsHeader {
            alg: provider.get_jwt_algorithm_name(),
            kid: self.kid()?,
        };

        let to_claim_signing_error = |error: anyhow::Error| Error::ClaimSigning {
            reason: format!("{error:#}"),
        };
        let protected = header.jwt_base64_encode().map_err(to_claim_signing_error)?;
        let payload = payload.jwt_base64_encode().map_err(to_claim_signing_error)?;

        let data_to_sign = format!("{protected}.{payload}");
        let signature = provider
            .sign(data_to_sign.as_bytes())
            .await
            .map_err(to_claim_signing_error)?;

        Ok(DagJws {
            payload,
            signatures: vec![JwsSignature {
                protected,
                signature: URL_SAFE_NO_PAD.encode(signature),
            }],
        })
    }

    /// Verify a compact JWS against the key its header names
    pub async fn verify_jws(&self, compact: &str) -> Result<VerifiedJws> {
        self.verify_jws_with(compact, &VerifyOptions::default())
            .await
    }

    pub async fn verify_jws_with(
        &self,
        compact: &str,
        options: &VerifyOptions,
    ) -> Result<VerifiedJws> {
        let jws = DagJws::from_compact(compact)?;
        let signature = jws.signatures.first().ok_or(Error::MissingSignature)?;
        let header = JwsHeader::decode(&signature.protected)?;
        let issuer = strip_fragment(&header.kid).to_string();

        if let Some(expected) = &options.issuer {
            if strip_fragment(expected) != issuer {
                return Err(Error::IssuerMismatch {
                    expected: expected.clone(),
                    actual: issuer,
                });
            }
        }

        let key = self
            .resolver
            .parse(&issuer)
            .map_err(|error| Error::Resolution {
                did: issuer.clone(),
                reason: format!("{error:#}"),
            })?;

        if header.alg != key.get_jwt_algorithm_name() {
            return Err(Error::InvalidSignature {
                issuer,
                reason: format!(
                    "Header claims {} but the issuer key uses {}",
                    header.alg,
                    key.get_jwt_algorithm_name()
                ),
            });
        }

        let signature_bytes =
            URL_SAFE_NO_PAD
                .decode(&signature.signature)
                .map_err(|error| Error::MalformedToken {
                    reason: format!("Could not decode signature: {error}"),
                })?;

        key.verify(&jws.signing_input()?, &signature_bytes)
            .await
            .map_err(|error| Error::InvalidSignature {
                issuer: issuer.clone(),
                reason: format!("{error:#}"),
            })?;

        let payload_bytes =
            URL_SAFE_NO_PAD
                .decode(&jws.payload)
                .map_err(|error| Error::MalformedToken {
                    reason: format!("Could not decode payload: {error}"),
                })?;
        let payload_json = String::from_utf8(payload_bytes).map_err(|error| Error::MalformedToken {
            reason: format!("Payload is not UTF-8: {error}"),
        })?;
        let payload = serde_json::from_str(&payload_json).map_err(|error| Error::MalformedToken {
            reason: format!("Payload is not JSON: {error}"),
        })?;

        debug!("Verified token issued by {}", issuer);
        Ok(VerifiedJws {
            kid: header.kid,
            issuer,
            payload,
            payload_json,
        })
    }
}

/// Build and authenticate an Ed25519 `did:key` identity from a 32-byte seed
pub async fn derive_did(seed: &[u8; 32]) -> Result<Did> {
    let provider = Ed25519KeyMaterial::from_seed(seed);
    let mut did = Did::with_provider(Box::new(provider), DidParser::default());
    did.authenticate().await?;
    Ok(did)
}

/// Sign a claims object (or any serializable payload) with an authenticated DID
pub async fn sign<T: Serialize>(did: &Did, claims: &T) -> Result<DagJws> {
    did.create_jws(claims).await
}

/// Verify a compact token and return its issuer and payload
pub async fn decode(did: &Did, compact: &str) -> Result<DecodedToken> {
    did.verify_jws(compact).await.map(DecodedToken::from)
}
