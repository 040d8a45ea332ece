//! Property-based checks for the §8 invariants that hold for *all* inputs,
//! not just the fixed S1–S6 scenarios — the DER integer round trip and the
//! `Digest` compute/validate pair, mirroring the way the pack's own
//! `cim-keys` crate reaches for `proptest` for this kind of compositional
//! law instead of a handful of hand-picked examples.

use proptest::prelude::*;

use psd2_qcert::der::{encode, Reader};
use psd2_qcert::httpsig::digest::{Digest, DigestAlgorithm};

proptest! {
    /// §8 invariant 2 (round trip), specialized to `INTEGER`: encoding then
    /// decoding any `i64` returns the original value.
    #[test]
    fn der_integer_round_trips(value in any::<i64>()) {
        let der = encode::sequence(|w| encode::integer_i64(w, value));
        let mut r = Reader::new(&der);
        let decoded = r.read_sequence(|seq| seq.read_integer_i64()).unwrap();
        prop_assert_eq!(decoded, value);
    }

    /// §8 invariant 3: for any body, `Digest.compute(body).validate(body)`
    /// is true, and flipping any single bit of the body makes it false.
    #[test]
    fn digest_validates_only_the_exact_body(
        body in prop::collection::vec(any::<u8>(), 0..256),
        flip_byte in any::<usize>(),
        flip_bit in 0u32..8,
    ) {
        let digest = Digest::compute(DigestAlgorithm::Sha256, &body);
        prop_assert!(digest.validate(&body));

        if !body.is_empty() {
            let mut tampered = body.clone();
            let idx = flip_byte % tampered.len();
            tampered[idx] ^= 1 << flip_bit;
            prop_assert!(!digest.validate(&tampered));
        }
    }

    /// The same round trip for the 20-byte, high-bit-cleared serial number
    /// shape `pki::manager::random_serial` produces (§4.4): any buffer with
    /// a cleared high bit decodes back to the same non-negative magnitude.
    #[test]
    fn serial_like_integer_round_trips(mut bytes in prop::collection::vec(any::<u8>(), 1..21)) {
        bytes[0] &= 0x7f;
        let der = encode::sequence(|w| encode::integer_bytes(w, &bytes));
        let mut r = Reader::new(&der);
        let decoded = r.read_sequence(|seq| seq.read_integer_bytes().map(|b| b.to_vec())).unwrap();

        let trimmed: &[u8] = {
            let mut s = bytes.as_slice();
            while s.len() > 1 && s[0] == 0 {
                s = &s[1..];
            }
            s
        };
        prop_assert_eq!(decoded.as_slice(), trimmed);
    }
}
