//! [`Eip1559SigningAuthority`]: the only [`SigningAuthority`] implementation
//! in this crate, over `alloy-signer-local::PrivateKeySigner`.
//!
//! Grounded on the teacher's EIP-712 pure-signing pattern in
//! `exact/client.rs`: no network I/O, a key and a fully-formed input in,
//! signed bytes out.

use alloy_consensus::{SignableTransaction, TxEip1559};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::TxKind;
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use rescue_types::signer::{SigningAuthority, TxTemplate};
use rescue_types::types::RawSignedTx;

/// Errors raised while signing. Rare in practice: the input is already
/// validated by construction (see `rescue-orchestrator`'s Bundle Planner).
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The underlying secp256k1 signing operation failed.
    #[error(transparent)]
    Sign(#[from] alloy_signer::Error),
}

/// Signs EIP-1559 (type-2) transactions with a local private key.
///
/// Stateless: every call is independent, so one instance is shared across
/// both the sponsor and the executor key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Eip1559SigningAuthority;

impl SigningAuthority for Eip1559SigningAuthority {
    type Key = PrivateKeySigner;
    type Error = SignerError;

    fn sign(&self, key: &Self::Key, template: &TxTemplate) -> Result<RawSignedTx, Self::Error> {
        let tx = TxEip1559 {
            chain_id: template.chain_id,
            nonce: template.nonce,
            gas_limit: template.gas_limit,
            max_fee_per_gas: template.max_fee_per_gas,
            max_priority_fee_per_gas: template.max_priority_fee_per_gas,
            to: TxKind::Call(template.to),
            value: template.value,
            access_list: Default::default(),
            input: template.data.clone(),
        };

        let signature_hash = tx.signature_hash();
        let signature = key.sign_hash_sync(&signature_hash)?;
        let signed = tx.into_signed(signature);

        Ok(RawSignedTx {
            raw: signed.encoded_2718().into(),
            hash: *signed.hash(),
            nonce: template.nonce,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloy_primitives::{address, bytes, U256};

    use super::*;

    fn template() -> TxTemplate {
        TxTemplate {
            chain_id: 1,
            nonce: 7,
            to: address!("000000000000000000000000000000000000aa"),
            value: U256::ZERO,
            data: bytes!(""),
            gas_limit: 21_000,
            max_fee_per_gas: 50_000_000_000,
            max_priority_fee_per_gas: 1_000_000_000,
        }
    }

    #[test]
    fn signing_is_deterministic() {
        let key: PrivateKeySigner =
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
                .parse()
                .unwrap();
        let authority = Eip1559SigningAuthority;

        let first = authority.sign(&key, &template()).unwrap();
        let second = authority.sign(&key, &template()).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.nonce, 7);
    }

    #[test]
    fn distinct_templates_yield_distinct_hashes() {
        let key: PrivateKeySigner =
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318"
                .parse()
                .unwrap();
        let authority = Eip1559SigningAuthority;

        let mut bumped = template();
        bumped.nonce += 1;

        let a = authority.sign(&key, &template()).unwrap();
        let b = authority.sign(&key, &bumped).unwrap();
        assert_ne!(a.hash, b.hash);
    }
}
