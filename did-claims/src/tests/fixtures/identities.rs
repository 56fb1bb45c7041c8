use crate::did::{derive_did, Did};

/// The `did:key` of the Ed25519 key whose seed is 32 zero bytes
pub const ZERO_SEED_DID: &str = "did:key:z6MkiTBz1ymuepAQ4HEHYSF1H8quG5GLVVQR3djdX3mDooWp";

pub struct Identities {
    pub alice: Did,
    pub bob: Did,
    pub mallory: Did,

    pub alice_did: String,
    pub bob_did: String,
    pub mallory_did: String,
}

impl Identities {
    pub async fn new() -> Self {
        let alice = derive_did(&[1u8; 32]).await.unwrap();
        let bob = derive_did(&[2u8; 32]).await.unwrap();
        let mallory = derive_did(&[3u8; 32]).await.unwrap();

        Identities {
            alice_did: alice.id().unwrap().to_string(),
            bob_did: bob.id().unwrap().to_string(),
            mallory_did: mallory.id().unwrap().to_string(),

            alice,
            bob,
            mallory,
        }
    }
}
