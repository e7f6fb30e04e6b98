//! Sighash pre-image construction, and ECDSA sign/verify over it.
//!
//! Two pre-image algorithms share one public surface, selected by the
//! `SIGHASH_FORKID` bit: the current (BIP143-style) layout used by every
//! caller that doesn't need historical compatibility, and the legacy
//! pre-fork layout kept behind the `legacy-sighash` feature.

use bitflags::bitflags;
use secp256k1::{Message, Secp256k1, Signature};
use thiserror::Error;

use crate::keys::PubKey;
use crate::script::Script;
use crate::serialization::sha256d::{self, Sha256dHash};
use crate::serialization::BitcoinSerialize;
use crate::transaction::Tx;
use crate::transparent::TxOut;

bitflags! {
    /// The low bits of a sighash type byte select which parts of the
    /// transaction a signature commits to; `FORKID` picks the pre-image
    /// algorithm.
    pub struct SigHashType: u8 {
        const ALL = 0x01;
        const NONE = 0x02;
        const SINGLE = 0x03;
        const ANYONECANPAY = 0x80;
        const FORKID = 0x40;
    }
}

impl SigHashType {
    /// `ALL` with `FORKID` set: the default for ordinary P2PKH spends.
    pub fn all_forkid() -> SigHashType {
        SigHashType::ALL | SigHashType::FORKID
    }

    fn base(self) -> SigHashType {
        self & SigHashType::from_bits_truncate(0x1f)
    }

    fn anyone_can_pay(self) -> bool {
        self.contains(SigHashType::ANYONECANPAY)
    }

    fn forkid(self) -> bool {
        self.contains(SigHashType::FORKID)
    }
}

#[derive(Error, Debug)]
pub enum SighashError {
    #[error("input index {vin} out of range for a transaction with {len} inputs")]
    InputOutOfRange { vin: usize, len: usize },
    #[error("SIGHASH_SINGLE with no corresponding output (legacy path)")]
    SingleOutOfRange,
    #[error("malformed DER signature")]
    MalformedSignature(#[from] secp256k1::Error),
    #[error("signature is too short to carry a trailing sighash type byte")]
    EmptySignature,
    #[error("legacy (non-forkid) sighash requires the `legacy-sighash` feature")]
    LegacyNotSupported,
}

fn double_hash_of<T: BitcoinSerialize>(items: &[T]) -> Sha256dHash {
    let mut writer = sha256d::Writer::default();
    for item in items {
        item.bitcoin_serialize(&mut writer)
            .expect("writing to a hasher cannot fail");
    }
    writer.finish()
}

/// The BIP143-style pre-image, used whenever `SIGHASH_FORKID` is set.
fn forkid_preimage(tx: &Tx, vin: usize, subscript: &Script, satoshis: u64, sighash_type: SigHashType) -> Vec<u8> {
    let input = &tx.inputs[vin];

    let hash_prevouts = if sighash_type.anyone_can_pay() {
        Sha256dHash::default()
    } else {
        double_hash_of(&tx.inputs.iter().map(|i| i.prev_outpoint).collect::<Vec<_>>())
    };

    let hash_sequence = if sighash_type.anyone_can_pay()
        || sighash_type.base() == SigHashType::SINGLE
        || sighash_type.base() == SigHashType::NONE
    {
        Sha256dHash::default()
    } else {
        let mut writer = sha256d::Writer::default();
        for i in &tx.inputs {
            i.sequence
                .bitcoin_serialize(&mut writer)
                .expect("writing to a hasher cannot fail");
        }
        writer.finish()
    };

    let hash_outputs = match sighash_type.base() {
        SigHashType::NONE => Sha256dHash::default(),
        SigHashType::SINGLE => {
            if vin < tx.outputs.len() {
                double_hash_of(std::slice::from_ref(&tx.outputs[vin]))
            } else {
                Sha256dHash::default()
            }
        }
        _ => double_hash_of(&tx.outputs),
    };

    let mut buf = Vec::new();
    tx.version.bitcoin_serialize(&mut buf).unwrap();
    hash_prevouts.bitcoin_serialize(&mut buf).unwrap();
    hash_sequence.bitcoin_serialize(&mut buf).unwrap();
    input.prev_outpoint.bitcoin_serialize(&mut buf).unwrap();
    subscript.bitcoin_serialize(&mut buf).unwrap();
    satoshis.bitcoin_serialize(&mut buf).unwrap();
    input.sequence.bitcoin_serialize(&mut buf).unwrap();
    hash_outputs.bitcoin_serialize(&mut buf).unwrap();
    tx.lock_time.bitcoin_serialize(&mut buf).unwrap();
    (sighash_type.bits() as u32).bitcoin_serialize(&mut buf).unwrap();
    buf
}

/// The original, pre-fork pre-image: mutate a clone of the transaction per
/// the sighash flags, serialize it, append the type byte.
///
/// Gated behind the `legacy-sighash` feature: almost no BSV caller signs
/// with `SIGHASH_FORKID` unset, but §4.3 requires the path to exist.
#[cfg(feature = "legacy-sighash")]
fn legacy_preimage(
    tx: &Tx,
    vin: usize,
    subscript: &Script,
    sighash_type: SigHashType,
) -> Result<Vec<u8>, SighashError> {
    let stripped = subscript.without_codeseparators();
    let mut inputs: Vec<_> = tx
        .inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let mut input = input.clone();
            if i == vin {
                input.script = stripped.clone();
            } else {
                input.script = Script::empty();
                if sighash_type.base() == SigHashType::NONE || sighash_type.base() == SigHashType::SINGLE {
                    input.sequence = 0;
                }
            }
            input
        })
        .collect();

    let mut outputs = tx.outputs.clone();

    match sighash_type.base() {
        SigHashType::NONE => outputs.clear(),
        SigHashType::SINGLE => {
            if vin >= outputs.len() {
                return Err(SighashError::SingleOutOfRange);
            }
            outputs.truncate(vin + 1);
            for out in outputs.iter_mut().take(vin) {
                *out = TxOut::new(u64::MAX, Script::empty());
            }
        }
        _ => {}
    }

    if sighash_type.anyone_can_pay() {
        inputs = vec![inputs[vin].clone()];
    }

    let clone = Tx::new(tx.version, inputs, outputs, tx.lock_time);
    let mut buf = clone.bitcoin_serialize_to_vec().expect("serializing to a Vec cannot fail");
    (sighash_type.bits() as u32).bitcoin_serialize(&mut buf).unwrap();
    Ok(buf)
}

fn preimage(
    tx: &Tx,
    vin: usize,
    subscript: &Script,
    satoshis: u64,
    sighash_type: SigHashType,
) -> Result<Vec<u8>, SighashError> {
    if vin >= tx.inputs.len() {
        return Err(SighashError::InputOutOfRange {
            vin,
            len: tx.inputs.len(),
        });
    }

    if sighash_type.forkid() {
        Ok(forkid_preimage(tx, vin, subscript, satoshis, sighash_type))
    } else {
        #[cfg(feature = "legacy-sighash")]
        {
            legacy_preimage(tx, vin, subscript, sighash_type)
        }
        #[cfg(not(feature = "legacy-sighash"))]
        {
            let _ = satoshis;
            Err(SighashError::LegacyNotSupported)
        }
    }
}

/// `SHA256(SHA256(pre-image))`.
pub fn sighash(
    tx: &Tx,
    vin: usize,
    subscript: &Script,
    satoshis: u64,
    sighash_type: SigHashType,
) -> Result<Sha256dHash, SighashError> {
    let pre = preimage(tx, vin, subscript, satoshis, sighash_type)?;
    Ok(sha256d::hash(&pre))
}

/// Signs `sighash(tx, vin, ...)` with `secret`, returning a DER signature
/// with the sighash type byte appended — the form that goes directly onto
/// an unlocking script's stack.
pub fn sign(
    tx: &Tx,
    vin: usize,
    subscript: &Script,
    satoshis: u64,
    sighash_type: SigHashType,
    secret: &secp256k1::SecretKey,
) -> Result<Vec<u8>, SighashError> {
    let digest = sighash(tx, vin, subscript, satoshis, sighash_type)?;
    let message = Message::from_slice(digest.as_bytes()).expect("32-byte digest is always a valid message");
    let secp = Secp256k1::signing_only();
    let signature = secp.sign(&message, secret);
    let mut der = signature.serialize_der().to_vec();
    der.push(sighash_type.bits());
    Ok(der)
}

/// Verifies `sig` (DER, with a trailing sighash type byte) against `pubkey`,
/// recomputing the pre-image with the type the signature itself carries.
pub fn verify(
    tx: &Tx,
    vin: usize,
    subscript: &Script,
    satoshis: u64,
    sig: &[u8],
    pubkey: &PubKey,
) -> Result<bool, SighashError> {
    if sig.is_empty() {
        return Err(SighashError::EmptySignature);
    }
    let (der, type_byte) = sig.split_at(sig.len() - 1);
    let sighash_type = SigHashType::from_bits_truncate(type_byte[0]);
    let digest = sighash(tx, vin, subscript, satoshis, sighash_type)?;
    let message = Message::from_slice(digest.as_bytes()).expect("32-byte digest is always a valid message");
    let signature = Signature::from_der(der)?;
    let secp = Secp256k1::verification_only();
    Ok(secp.verify(&message, &signature, pubkey.point()).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::PrivKey;
    use crate::script::{Chunk, Opcode};
    use crate::transparent::{OutPoint, TxIn};

    fn p2pkh_pair() -> (PrivKey, PubKey) {
        let secp = Secp256k1::new();
        let privkey = PrivKey::from_bytes(&bsv_test::vectors::TEST_PRIVKEY_SCALAR, true).unwrap();
        let pubkey = PubKey::from_secret(&secp, privkey.secret_key(), true);
        (privkey, pubkey)
    }

    fn sample_tx(subscript: &Script) -> Tx {
        Tx::new(
            1,
            vec![TxIn::new(
                OutPoint {
                    hash: Sha256dHash::from([0x11; 32]),
                    vout: 0,
                },
                Script::empty(),
            )],
            vec![TxOut::new(49_000, subscript.clone())],
            0,
        )
    }

    fn p2pkh_script(pubkey: &PubKey) -> Script {
        let address = crate::keys::Address::from_pubkey(crate::parameters::Network::Main, pubkey);
        Script::new(vec![
            Chunk::op(Opcode::Dup),
            Chunk::op(Opcode::Hash160),
            Chunk::push(address.hash().to_vec()),
            Chunk::op(Opcode::EqualVerify),
            Chunk::op(Opcode::CheckSig),
        ])
    }

    #[test]
    fn sign_then_verify_round_trips() {
        let (privkey, pubkey) = p2pkh_pair();
        let subscript = p2pkh_script(&pubkey);
        let tx = sample_tx(&subscript);

        let sig = sign(
            &tx,
            0,
            &subscript,
            50_000,
            SigHashType::all_forkid(),
            privkey.secret_key(),
        )
        .unwrap();

        assert!(verify(&tx, 0, &subscript, 50_000, &sig, &pubkey).unwrap());
    }

    #[test]
    fn tampered_satoshis_fails_verification() {
        let (privkey, pubkey) = p2pkh_pair();
        let subscript = p2pkh_script(&pubkey);
        let tx = sample_tx(&subscript);

        let sig = sign(
            &tx,
            0,
            &subscript,
            50_000,
            SigHashType::all_forkid(),
            privkey.secret_key(),
        )
        .unwrap();

        assert!(!verify(&tx, 0, &subscript, 50_001, &sig, &pubkey).unwrap());
    }

    #[test]
    fn single_out_of_range_zeroes_hash_outputs_under_forkid() {
        let (_, pubkey) = p2pkh_pair();
        let subscript = p2pkh_script(&pubkey);
        let tx = sample_tx(&subscript);
        let sighash_type = SigHashType::SINGLE | SigHashType::FORKID;

        let pre = preimage(&tx, 0, &subscript, 50_000, sighash_type).unwrap();
        let hash_outputs = &pre[pre.len() - 40..pre.len() - 8];
        assert_eq!(hash_outputs, &[0u8; 32]);
    }

    #[test]
    fn input_out_of_range_is_rejected() {
        let (_, pubkey) = p2pkh_pair();
        let subscript = p2pkh_script(&pubkey);
        let tx = sample_tx(&subscript);
        assert!(matches!(
            sighash(&tx, 5, &subscript, 50_000, SigHashType::all_forkid()),
            Err(SighashError::InputOutOfRange { vin: 5, len: 1 })
        ));
    }

    #[test]
    fn anyone_can_pay_zeroes_prevouts_hash() {
        let (_, pubkey) = p2pkh_pair();
        let subscript = p2pkh_script(&pubkey);
        let tx = sample_tx(&subscript);
        let sighash_type = SigHashType::ALL | SigHashType::FORKID | SigHashType::ANYONECANPAY;

        let pre = preimage(&tx, 0, &subscript, 50_000, sighash_type).unwrap();
        let hash_prevouts = &pre[4..36];
        assert_eq!(hash_prevouts, &[0u8; 32]);
    }

    /// Pins a known-good sighash digest end to end, rather than only
    /// checking that `sign`/`verify` are self-consistent: a P2PKH spend of a
    /// 50,000-satoshi prevout, keyed by a fixed WIF, signed `ALL|FORKID`
    /// (`0x41`), on the same minimal single-input/single-output transaction
    /// shape every other test in this module uses.
    #[test]
    fn forkid_sighash_matches_the_known_vector() {
        let (privkey, _network) =
            PrivKey::from_wif("KyGHAK8MNohVPdeGPYXveiAbTfLARVrQuJVtd3qMqN41UEnTWDkF").unwrap();
        let secp = Secp256k1::new();
        let pubkey = PubKey::from_secret(&secp, privkey.secret_key(), true);
        let subscript = p2pkh_script(&pubkey);
        let tx = sample_tx(&subscript);
        let sighash_type = SigHashType::from_bits_truncate(0x41);

        let digest = sighash(&tx, 0, &subscript, 50_000, sighash_type).unwrap();
        assert_eq!(
            hex::encode(digest.as_bytes()),
            "b8424e696736e3c45eb2da7d0d61bc3571ebdc977aea5cc764229c1f3c3d173b"
        );
    }

    #[cfg(feature = "legacy-sighash")]
    #[test]
    fn legacy_single_out_of_range_is_an_error() {
        let (_, pubkey) = p2pkh_pair();
        let subscript = p2pkh_script(&pubkey);
        let mut tx = sample_tx(&subscript);
        tx.inputs.push(TxIn::new(
            OutPoint {
                hash: Sha256dHash::from([0x22; 32]),
                vout: 0,
            },
            Script::empty(),
        ));
        // vin=1 is a valid input but there is only one output, so SINGLE has
        // no matching output to commit to.
        let sighash_type = SigHashType::SINGLE;
        let result = sighash(&tx, 1, &subscript, 50_000, sighash_type);
        assert!(result.is_err());
    }
}
