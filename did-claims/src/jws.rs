use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    claims::Claims,
    error::{Error, Result},
    serde::Base64Decode,
};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct JwsHeader {
    pub alg: String,
    pub kid: String,
}

impl JwsHeader {
    pub fn decode(protected: &str) -> Result<Self> {
        JwsHeader::jwt_base64_decode(protected).map_err(|error| Error::MalformedToken {
            reason: format!("Could not decode protected header: {error}"),
        })
    }
}

/// One signature over a [`DagJws`] payload. Both fields are base64url.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct JwsSignature {
    pub protected: String,
    pub signature: String,
}

/// A general-form JWS as produced by signing a claims object: a base64url
/// payload plus one or more protected-header/signature pairs.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct DagJws {
    pub payload: String,
    pub signatures: Vec<JwsSignature>,
}

impl DagJws {
    /// Produce the compact `header.payload.signature` serialization. Only the
    /// first signature is used.
    pub fn serialize(&self) -> Result<String> {
        let first = self.signatures.first().ok_or(Error::MissingSignature)?;
        Ok(format!(
            "{}.{}.{}",
            first.protected, self.payload, first.signature
        ))
    }

    /// Parse a compact serialization back into a single-signature JWS
    pub fn from_compact(compact: &str) -> Result<Self> {
        let parts: Vec<&str> = compact.trim().split('.').collect();

        match parts.as_slice() {
            [protected, payload, signature]
                if !protected.is_empty() && !payload.is_empty() && !signature.is_empty() =>
            {
                Ok(DagJws {
                    payload: payload.to_string(),
                    signatures: vec![JwsSignature {
                        protected: protected.to_string(),
                        signature: signature.to_string(),
                    }],
                })
            }
            _ => Err(Error::MalformedToken {
                reason: format!(
                    "Expected 3 non-empty dot-separated segments, found {}",
                    parts.len()
                ),
            }),
        }
    }

    /// The bytes covered by the first signature
    pub fn signing_input(&self) -> Result<Vec<u8>> {
        let first = self.signatures.first().ok_or(Error::MissingSignature)?;
        Ok(format!("{}.{}", first.protected, self.payload).into_bytes())
    }
}

impl FromStr for DagJws {
    type Err = Error;

    fn from_str(compact: &str) -> Result<Self, Self::Err> {
        DagJws::from_compact(compact)
    }
}

/// Everything learned from verifying a compact JWS
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedJws {
    /// The key id from the protected header
    pub kid: String,
    /// The resolved issuer DID
    pub issuer: String,
    /// The decoded payload
    pub payload: serde_json::Value,
    /// The decoded payload as the exact JSON text that was signed
    pub payload_json: String,
}

/// The issuer and payload recovered from a verified token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedToken {
    pub issuer: String,
    pub payload: String,
}

impl DecodedToken {
    /// Parse the payload back into a claims object
    pub fn claims(&self) -> Result<Claims> {
        serde_json::from_str(&self.payload).map_err(|error| Error::MalformedToken {
            reason: format!("Payload is not a claims object: {error}"),
        })
    }
}

impl From<VerifiedJws> for DecodedToken {
    fn from(verified: VerifiedJws) -> Self {
        DecodedToken {
            issuer: verified.issuer,
            payload: verified.payload_json,
        }
    }
}
