//! Claims entered by the user and the claims object they fold into

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Number of claim entries a [`ClaimForm`] holds
pub const MAX_CLAIMS: usize = 3;

/// The claims object signed into a token. Keys are unique; the map keeps
/// them sorted so the serialized payload is stable.
pub type Claims = BTreeMap<String, String>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub key: String,
    pub value: String,
}

impl Claim {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Claim {
            key: key.into(),
            value: value.into(),
        }
    }

    /// A claim contributes to the claims object only when both halves are set
    pub fn is_complete(&self) -> bool {
        !self.key.is_empty() && !self.value.is_empty()
    }
}

/// Fold claim entries into a claims object. Entries with an empty key or an
/// empty value are skipped; a repeated key keeps the last value seen.
pub fn build_claims<'a, I>(entries: I) -> Claims
where
    I: IntoIterator<Item = &'a Claim>,
{
    entries
        .into_iter()
        .filter(|claim| claim.is_complete())
        .map(|claim| (claim.key.clone(), claim.value.clone()))
        .collect()
}

/// The fixed set of claim inputs a user fills in before signing
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimForm {
    entries: [Claim; MAX_CLAIMS],
}

impl ClaimForm {
    pub fn new(entries: [Claim; MAX_CLAIMS]) -> Self {
        ClaimForm { entries }
    }

    /// Replace the entry at `index` (zero-based). Returns `false` when the
    /// index is outside the form.
    pub fn set(&mut self, index: usize, claim: Claim) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                *entry = claim;
                true
            }
            None => false,
        }
    }

    pub fn entries(&self) -> &[Claim] {
        &self.entries
    }

    pub fn claims(&self) -> Claims {
        build_claims(&self.entries)
    }
}

impl TryFrom<Vec<Claim>> for ClaimForm {
    type Error = Vec<Claim>;

    /// Fill a form from at most [`MAX_CLAIMS`] entries; too many entries are
    /// handed back unchanged.
    fn try_from(claims: Vec<Claim>) -> Result<Self, Self::Error> {
        if claims.len() > MAX_CLAIMS {
            return Err(claims);
        }
        let mut form = ClaimForm::default();
        for (index, claim) in claims.into_iter().enumerate() {
            form.entries[index] = claim;
        }
        Ok(form)
    }
}
