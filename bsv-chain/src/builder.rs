//! `TxBuilder`: assembles a transaction from per-input and per-output
//! contracts, computing the fee and an optional change output, then signs
//! each input against the transaction it ends up a part of.
//!
//! There's no teacher precedent for this layer; it follows [`Script`]'s own
//! `&mut self -> &mut Self` builder style rather than [`super::contract`]'s
//! consuming one, since nothing here needs the "thread a value through
//! closures" shape that motivated that choice.

use crate::contract::{render_locking_script, render_unlocking_script, Template, TxContext};
use crate::transaction::Tx;
use crate::transparent::{OutPoint, TxIn, TxOut};
use crate::varint::VarInt;

/// Per-byte rates for the two output classes fee calculation and the dust
/// threshold distinguish: `standard` (ordinary spendable outputs, and every
/// non-output component) and `data` (`OP_FALSE OP_RETURN` outputs).
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassRates {
    pub data: u64,
    pub standard: u64,
}

/// The rate schedule `calc_required_fee`/`build` consult. A flat rate
/// applies to both classes; a nested schedule separates the rate used to
/// size the fee (`mine`) from the rate used to size the dust threshold
/// (`relay`) — a relay will happily forward a transaction priced below what
/// the miner who builds it would charge itself.
#[derive(Debug, Clone, Copy)]
pub enum Rates {
    Flat(u64),
    ByClass(ClassRates),
    Nested { mine: ClassRates, relay: ClassRates },
}

impl Rates {
    fn mine(&self) -> ClassRates {
        match *self {
            Rates::Flat(r) => ClassRates { data: r, standard: r },
            Rates::ByClass(c) => c,
            Rates::Nested { mine, .. } => mine,
        }
    }

    fn relay(&self) -> ClassRates {
        match *self {
            Rates::Flat(r) => ClassRates { data: r, standard: r },
            Rates::ByClass(c) => c,
            Rates::Nested { relay, .. } => relay,
        }
    }
}

struct InputSlot {
    contract: Template,
    prev_outpoint: OutPoint,
    prev_txout: TxOut,
    sequence: u32,
}

struct OutputSlot {
    contract: Template,
    satoshis: u64,
}

/// Assembles a [`Tx`] from contracts rather than raw scripts. Mutable by
/// design — there is nothing to share, and each `add_*` call narrows what
/// `build` will eventually produce.
pub struct TxBuilder {
    version: u32,
    lock_time: u32,
    inputs: Vec<InputSlot>,
    outputs: Vec<OutputSlot>,
    change: Option<Template>,
    sort: bool,
}

impl TxBuilder {
    pub fn new(version: u32, lock_time: u32) -> Self {
        TxBuilder {
            version,
            lock_time,
            inputs: Vec::new(),
            outputs: Vec::new(),
            change: None,
            sort: false,
        }
    }

    pub fn add_input(
        &mut self,
        contract: Template,
        prev_outpoint: OutPoint,
        prev_txout: TxOut,
        sequence: u32,
    ) -> &mut Self {
        self.inputs.push(InputSlot {
            contract,
            prev_outpoint,
            prev_txout,
            sequence,
        });
        self
    }

    pub fn add_output(&mut self, contract: Template, satoshis: u64) -> &mut Self {
        self.outputs.push(OutputSlot { contract, satoshis });
        self
    }

    /// Sets the contract a leftover-satoshi change output renders against.
    /// `build` only emits it when the computed change clears the dust
    /// threshold.
    pub fn with_change(&mut self, contract: Template) -> &mut Self {
        self.change = Some(contract);
        self
    }

    /// Enables BIP-69 input/output ordering in `build`.
    pub fn sorted(&mut self, sort: bool) -> &mut Self {
        self.sort = sort;
        self
    }

    fn unsigned_inputs(&self) -> Vec<TxIn> {
        self.inputs
            .iter()
            .map(|slot| TxIn {
                prev_outpoint: slot.prev_outpoint,
                script: render_unlocking_script(&slot.contract, None),
                sequence: slot.sequence,
            })
            .collect()
    }

    fn rendered_outputs(&self) -> Vec<TxOut> {
        self.outputs
            .iter()
            .map(|slot| TxOut::new(slot.satoshis, render_locking_script(&slot.contract, None)))
            .collect()
    }

    fn fee_for(inputs: &[TxIn], outputs: &[TxOut], mine: &ClassRates) -> u64 {
        let mut standard_bytes = 8u64; // u32 version + u32 lock_time
        standard_bytes += VarInt::size(inputs.len() as u64) as u64;
        standard_bytes += VarInt::size(outputs.len() as u64) as u64;
        for input in inputs {
            standard_bytes += input.size() as u64;
        }
        let mut data_bytes = 0u64;
        for output in outputs {
            if output.is_data_output() {
                data_bytes += output.size() as u64;
            } else {
                standard_bytes += output.size() as u64;
            }
        }
        standard_bytes * mine.standard + data_bytes * mine.data
    }

    /// The fee this transaction would need, given its inputs and outputs as
    /// they stand now (rendered with no `(tx, vin)` context, so signatures
    /// count at their placeholder length).
    pub fn calc_required_fee(&self, rates: &Rates) -> u64 {
        let inputs = self.unsigned_inputs();
        let outputs = self.rendered_outputs();
        Self::fee_for(&inputs, &outputs, &rates.mine())
    }

    /// Renders every contract, adds a change output if one was configured
    /// and clears dust, and signs each input against the resulting
    /// transaction.
    pub fn build(&mut self, rates: &Rates) -> Tx {
        if self.sort {
            self.inputs.sort_by_key(|slot| bip69_input_key(&slot.prev_outpoint));
        }

        let mine = rates.mine();
        let relay = rates.relay();

        let inputs = self.unsigned_inputs();
        let mut outputs = self.rendered_outputs();
        let fee = Self::fee_for(&inputs, &outputs, &mine);

        if let Some(change_template) = &self.change {
            let change_script = render_locking_script(change_template, None);
            let candidate = TxOut::new(0, change_script.clone());
            let change_rate = if candidate.is_data_output() { mine.data } else { mine.standard };
            let change_output_fee = candidate.size() as u64 * change_rate;

            let input_sum: u64 = self.inputs.iter().map(|s| s.prev_txout.satoshis).sum();
            let output_sum: u64 = self.outputs.iter().map(|s| s.satoshis).sum();
            let available = input_sum
                .saturating_sub(output_sum)
                .saturating_sub(fee)
                .saturating_sub(change_output_fee);

            let priced_change = TxOut::new(available, change_script);
            if available >= dust_threshold(&priced_change, &relay) {
                outputs.push(priced_change);
            }
        }

        if self.sort {
            outputs.sort_by_key(bip69_output_key);
        }

        let mut tx = Tx::new(self.version, inputs, outputs, self.lock_time);

        for (vin, slot) in self.inputs.iter().enumerate() {
            let tx_ctx = TxContext { tx: tx.clone(), vin };
            tx.inputs[vin].script = render_unlocking_script(&slot.contract, Some(tx_ctx));
        }

        tx
    }
}

/// `3 × floor((TxOut.size() + 148) × relay.standard)`, always against the
/// relay's standard rate regardless of the candidate's own class.
fn dust_threshold(txout: &TxOut, relay: &ClassRates) -> u64 {
    3 * ((txout.size() as u64 + 148) * relay.standard)
}

fn bip69_input_key(outpoint: &OutPoint) -> (Vec<u8>, u32) {
    let mut hash = outpoint.hash.as_bytes().to_vec();
    hash.reverse();
    (hash, outpoint.vout)
}

fn bip69_output_key(txout: &TxOut) -> (u64, Vec<u8>) {
    (txout.satoshis, txout.script.to_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::templates::{OpReturn, P2pkh, Unlock};
    use crate::keys::{Address, PrivKey, PubKey};
    use crate::parameters::Network;
    use crate::serialization::sha256d::Sha256dHash;
    use crate::sighash::SigHashType;
    use secp256k1::Secp256k1;

    fn pair(byte: u8) -> (PrivKey, PubKey) {
        let secp = Secp256k1::new();
        let privkey = PrivKey::from_bytes(&[byte; 32], true).unwrap();
        let pubkey = PubKey::from_secret(&secp, privkey.secret_key(), true);
        (privkey, pubkey)
    }

    fn p2pkh_template(pubkey: &PubKey, unlock: Option<Unlock>) -> Template {
        let hash = *Address::from_pubkey(Network::Main, pubkey).hash();
        Template::P2pkh(P2pkh { pubkey_hash: hash, unlock })
    }

    fn funding_outpoint(byte: u8) -> OutPoint {
        OutPoint { hash: Sha256dHash::from([byte; 32]), vout: 0 }
    }

    #[test]
    fn build_signs_every_input_against_the_final_tx() {
        let (privkey, pubkey) = pair(0xaa);
        let locking = render_locking_script(&p2pkh_template(&pubkey, None), None);
        let prev_txout = TxOut::new(100_000, locking);

        let unlock = Unlock {
            privkey,
            pubkey,
            prev_txout: prev_txout.clone(),
            sighash_type: SigHashType::all_forkid(),
        };

        let mut builder = TxBuilder::new(1, 0);
        builder.add_input(
            p2pkh_template(&pubkey, Some(unlock)),
            funding_outpoint(0x11),
            prev_txout,
            TxIn::DEFAULT_SEQUENCE,
        );
        builder.add_output(p2pkh_template(&pubkey, None), 90_000);

        let tx = builder.build(&Rates::Flat(1));
        assert_eq!(tx.inputs.len(), 1);
        assert_ne!(tx.inputs[0].script.chunks().len(), 0);
        // A zero-filled placeholder signature would leave verification
        // trivially false; a real one (computed against this exact `tx`)
        // must pass.
        let script = &tx.inputs[0].script;
        let sig = match script.chunks().first() {
            Some(crate::script::Chunk::Push(bytes)) => bytes.clone(),
            other => panic!("expected a signature push, got {:?}", other),
        };
        assert_ne!(sig, vec![0u8; crate::contract::push_tx::ZERO_SIG_LEN]);
    }

    #[test]
    fn change_output_is_added_when_above_dust() {
        let (_, pubkey) = pair(0xbb);
        let locking = render_locking_script(&p2pkh_template(&pubkey, None), None);
        let prev_txout = TxOut::new(100_000, locking);

        let mut builder = TxBuilder::new(1, 0);
        builder.add_input(
            p2pkh_template(&pubkey, None),
            funding_outpoint(0x22),
            prev_txout,
            TxIn::DEFAULT_SEQUENCE,
        );
        builder.add_output(p2pkh_template(&pubkey, None), 50_000);
        builder.with_change(p2pkh_template(&pubkey, None));

        let tx = builder.build(&Rates::Flat(1));
        assert_eq!(tx.outputs.len(), 2);
        assert!(tx.outputs[1].satoshis > 0);
    }

    #[test]
    fn change_below_dust_is_omitted() {
        let (_, pubkey) = pair(0xcc);
        let locking = render_locking_script(&p2pkh_template(&pubkey, None), None);
        // Leave almost nothing behind for change once the fee is paid.
        let prev_txout = TxOut::new(50_010, locking);

        let mut builder = TxBuilder::new(1, 0);
        builder.add_input(
            p2pkh_template(&pubkey, None),
            funding_outpoint(0x33),
            prev_txout,
            TxIn::DEFAULT_SEQUENCE,
        );
        builder.add_output(p2pkh_template(&pubkey, None), 50_000);
        builder.with_change(p2pkh_template(&pubkey, None));

        let tx = builder.build(&Rates::Flat(1));
        assert_eq!(tx.outputs.len(), 1);
    }

    #[test]
    fn data_outputs_are_charged_the_data_rate() {
        let (_, pubkey) = pair(0xdd);
        let locking = render_locking_script(&p2pkh_template(&pubkey, None), None);
        let prev_txout = TxOut::new(100_000, locking);

        let mut builder = TxBuilder::new(1, 0);
        builder.add_input(
            p2pkh_template(&pubkey, None),
            funding_outpoint(0x44),
            prev_txout,
            TxIn::DEFAULT_SEQUENCE,
        );
        builder.add_output(Template::OpReturn(OpReturn { data: vec![vec![0xAB; 50]] }), 0);

        let cheap = builder.calc_required_fee(&Rates::Nested {
            mine: ClassRates { data: 0, standard: 2 },
            relay: ClassRates { data: 0, standard: 2 },
        });
        let pricier = builder.calc_required_fee(&Rates::Nested {
            mine: ClassRates { data: 5, standard: 2 },
            relay: ClassRates { data: 0, standard: 2 },
        });
        assert!(pricier > cheap);
    }

    #[test]
    fn sorted_inputs_follow_bip69_order() {
        let (_, pubkey) = pair(0xee);
        let locking = render_locking_script(&p2pkh_template(&pubkey, None), None);

        let mut builder = TxBuilder::new(1, 0);
        builder.sorted(true);
        builder.add_input(
            p2pkh_template(&pubkey, None),
            OutPoint { hash: Sha256dHash::from([0xFF; 32]), vout: 0 },
            TxOut::new(10_000, locking.clone()),
            TxIn::DEFAULT_SEQUENCE,
        );
        builder.add_input(
            p2pkh_template(&pubkey, None),
            OutPoint { hash: Sha256dHash::from([0x01; 32]), vout: 0 },
            TxOut::new(10_000, locking),
            TxIn::DEFAULT_SEQUENCE,
        );
        builder.add_output(p2pkh_template(&pubkey, None), 15_000);

        let tx = builder.build(&Rates::Flat(1));
        let mut first_hash = tx.inputs[0].prev_outpoint.hash.as_bytes().to_vec();
        first_hash.reverse();
        let mut second_hash = tx.inputs[1].prev_outpoint.hash.as_bytes().to_vec();
        second_hash.reverse();
        assert!(first_hash < second_hash);
    }
}
