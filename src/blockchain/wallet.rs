//! Key loading and transaction signing.
//!
//! # Security
//! - Private keys come from the environment or `.env`, through config
//! - Keys are never logged or serialized
//! - The signing key zeroizes itself on drop

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use ed25519_dalek::{Signer as _, SigningKey, SECRET_KEY_LENGTH};

use crate::blockchain::transaction::TransactionData;
use crate::blockchain::types::{blake2b256, BlockchainError, BlockchainResult, SuiAddress};

/// Signature scheme flag for Ed25519 keys and signatures.
pub const ED25519_FLAG: u8 = 0x00;

/// Intent prefix for transaction data: scope, version, app id.
const TRANSACTION_INTENT: [u8; 3] = [0, 0, 0];

/// Ed25519 keypair and the address derived from it.
pub struct Wallet {
    /// The underlying signing key.
    signing_key: SigningKey,
    /// Address derived from the public key.
    address: SuiAddress,
}

impl Wallet {
    /// Create a wallet from raw seed bytes.
    pub fn from_seed(seed: [u8; SECRET_KEY_LENGTH]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let public = signing_key.verifying_key();
        let address = SuiAddress::new(blake2b256(&[&[ED25519_FLAG], public.as_bytes()]));
        Self {
            signing_key,
            address,
        }
    }

    /// Create a wallet from a base64 private key.
    ///
    /// Accepts `flag || seed` (33 bytes, flag must be Ed25519) or a bare
    /// 32-byte seed.
    ///
    /// # Security
    /// The key material is never logged.
    pub fn from_base64(private_key: &str) -> BlockchainResult<Self> {
        let bytes = BASE64
            .decode(private_key.trim())
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key encoding: {}", e)))?;

        let seed = match bytes.as_slice() {
            [flag, rest @ ..] if rest.len() == SECRET_KEY_LENGTH => {
                if *flag != ED25519_FLAG {
                    return Err(BlockchainError::Wallet(format!(
                        "Unsupported key scheme flag {:#04x}",
                        flag
                    )));
                }
                rest
            }
            seed if seed.len() == SECRET_KEY_LENGTH => seed,
            other => {
                return Err(BlockchainError::Wallet(format!(
                    "Invalid private key length: {} bytes",
                    other.len()
                )))
            }
        };

        let mut buf = [0u8; SECRET_KEY_LENGTH];
        buf.copy_from_slice(seed);
        let wallet = Self::from_seed(buf);

        tracing::debug!(address = %wallet.address, "Wallet loaded");
        Ok(wallet)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> SuiAddress {
        self.address
    }

    /// Public key bytes.
    pub fn public_key(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }

    /// Sign transaction data.
    ///
    /// # Returns
    /// The base64 serialized signature `flag || signature || public key`.
    pub fn sign_transaction(&self, data: &TransactionData) -> BlockchainResult<String> {
        if data.sender() != self.address {
            return Err(BlockchainError::Wallet(format!(
                "Transaction sender {} does not match signer {}",
                data.sender(),
                self.address
            )));
        }
        let bytes = data.to_bytes()?;
        let digest = blake2b256(&[&TRANSACTION_INTENT, &bytes]);
        let signature = self.signing_key.sign(&digest);

        let mut serialized = Vec::with_capacity(1 + 64 + 32);
        serialized.push(ED25519_FLAG);
        serialized.extend_from_slice(&signature.to_bytes());
        serialized.extend_from_slice(&self.public_key());
        Ok(BASE64.encode(serialized))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::transaction::{MoveTarget, TransactionBuilder};
    use ed25519_dalek::{Signature, Verifier, VerifyingKey};

    fn test_key(flag: Option<u8>) -> String {
        let mut bytes = Vec::new();
        if let Some(flag) = flag {
            bytes.push(flag);
        }
        bytes.extend_from_slice(&[7u8; 32]);
        BASE64.encode(bytes)
    }

    fn mint_data(sender: SuiAddress) -> TransactionData {
        let mut tx = TransactionBuilder::new();
        let target: MoveTarget = "0x1::suispresso::new_employee_card".parse().unwrap();
        tx.move_call(target, vec![], vec![]).unwrap();
        let pt = tx.resolve(|_| None).unwrap();
        TransactionData::new_programmable(sender, vec![], pt, 1_000, 1)
    }

    #[test]
    fn test_flagged_and_bare_keys_match() {
        let flagged = Wallet::from_base64(&test_key(Some(ED25519_FLAG))).unwrap();
        let bare = Wallet::from_base64(&test_key(None)).unwrap();
        assert_eq!(flagged.address(), bare.address());
    }

    #[test]
    fn test_address_is_hash_of_flag_and_public_key() {
        let wallet = Wallet::from_seed([7u8; 32]);
        let expected = blake2b256(&[&[ED25519_FLAG], &wallet.public_key()]);
        assert_eq!(wallet.address().as_bytes(), &expected);
    }

    #[test]
    fn test_other_schemes_rejected() {
        let result = Wallet::from_base64(&test_key(Some(0x01)));
        assert!(result.unwrap_err().to_string().contains("Unsupported key scheme"));
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(Wallet::from_base64("not base64!").is_err());
        let short = BASE64.encode([0u8; 10]);
        assert!(Wallet::from_base64(&short)
            .unwrap_err()
            .to_string()
            .contains("Invalid private key length"));
    }

    #[test]
    fn test_signature_verifies_over_intent_digest() {
        let wallet = Wallet::from_seed([3u8; 32]);
        let data = mint_data(wallet.address());
        let encoded = wallet.sign_transaction(&data).unwrap();
        let raw = BASE64.decode(encoded).unwrap();
        assert_eq!(raw.len(), 97);
        assert_eq!(raw[0], ED25519_FLAG);
        assert_eq!(&raw[65..], &wallet.public_key());

        let signature = Signature::from_slice(&raw[1..65]).unwrap();
        let key = VerifyingKey::from_bytes(&wallet.public_key()).unwrap();
        let digest = blake2b256(&[&TRANSACTION_INTENT, &data.to_bytes().unwrap()]);
        assert!(key.verify(&digest, &signature).is_ok());
    }

    #[test]
    fn test_foreign_sender_rejected() {
        let wallet = Wallet::from_seed([3u8; 32]);
        let data = mint_data(SuiAddress::ZERO);
        assert!(wallet.sign_transaction(&data).is_err());
    }

    #[test]
    fn test_debug_hides_key() {
        let wallet = Wallet::from_seed([9u8; 32]);
        let rendered = format!("{:?}", wallet);
        assert!(rendered.contains("address"));
        assert!(!rendered.contains("signing_key"));
    }
}
