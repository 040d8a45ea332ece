//! Minimal ASN.1/DER codec (C1).
//!
//! Encoding is built on top of [`yasna`], the same DER writer the teacher
//! crate uses to assemble certificates. Decoding is hand-rolled: `yasna`'s
//! reader accepts the more permissive BER grammar and does not track byte
//! offsets, neither of which fits the strict-canonical-DER contract this
//! crate promises (round-trip stability, rejection of non-minimal lengths
//! and indefinite forms). [`Reader`] enforces that contract directly.

mod decode;
pub mod encode;
pub mod oid;

pub use decode::Reader;

/// What went wrong while decoding a DER value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerErrorKind {
    /// The tag byte did not match what the caller expected.
    UnexpectedTag,
    /// The length encoding was malformed (indefinite form, overlong form, or
    /// simply ran past the end of the input).
    InvalidLength,
    /// The input ended before a value's declared length was satisfied.
    Truncated,
    /// The value decoded, but was not in canonical DER form (e.g. a SET OF
    /// whose elements are not sorted, or an INTEGER with a redundant
    /// leading byte).
    NonCanonical,
    /// A numeric value did not fit the target integer type.
    Overflow,
}

impl std::fmt::Display for DerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DerErrorKind::UnexpectedTag => "unexpected tag",
            DerErrorKind::InvalidLength => "invalid length",
            DerErrorKind::Truncated => "truncated input",
            DerErrorKind::NonCanonical => "non-canonical encoding",
            DerErrorKind::Overflow => "integer overflow",
        };
        f.write_str(s)
    }
}

/// A DER decode error, with the byte offset at which it was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerError {
    /// What went wrong.
    pub kind: DerErrorKind,
    /// Offset into the original input.
    pub offset: usize,
}

impl DerError {
    pub(crate) fn new(kind: DerErrorKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

impl std::fmt::Display for DerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset)
    }
}

impl std::error::Error for DerError {}

/// Universal class tag numbers used throughout the codec.
pub mod tag {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const BIT_STRING: u8 = 0x03;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    pub const UTF8_STRING: u8 = 0x0c;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;
    pub const PRINTABLE_STRING: u8 = 0x13;
    pub const IA5_STRING: u8 = 0x16;
    pub const UTC_TIME: u8 = 0x17;
    pub const GENERALIZED_TIME: u8 = 0x18;
    /// Constructed bit, ORed onto SEQUENCE/SET/context-constructed tags.
    pub const CONSTRUCTED: u8 = 0x20;
    /// Context-specific class bits.
    pub const CONTEXT: u8 = 0x80;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_sequence_of_integers() {
        let der = encode::sequence(|w| {
            encode::integer_i64(w, 1);
            encode::integer_i64(w, 300);
            encode::integer_i64(w, -5);
        });
        let mut r = Reader::new(&der);
        let values = r
            .read_sequence(|inner| {
                let a = inner.read_integer_i64()?;
                let b = inner.read_integer_i64()?;
                let c = inner.read_integer_i64()?;
                Ok((a, b, c))
            })
            .unwrap();
        assert_eq!(values, (1, 300, -5));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut der = encode::sequence(|w| encode::integer_i64(w, 7));
        der.push(0x00);
        let mut r = Reader::new(&der);
        r.read_sequence(|inner| inner.read_integer_i64()).unwrap();
        let err = r.finish().unwrap_err();
        assert_eq!(err.kind, DerErrorKind::NonCanonical);
    }

    #[test]
    fn rejects_non_minimal_length() {
        // SEQUENCE tag, long-form length 0x81 0x01 (one byte, should have
        // been encoded in short form: 0x01).
        let bytes = [tag::SEQUENCE, 0x81, 0x01, 0x02];
        let mut r = Reader::new(&bytes);
        let err = r.read_sequence(|_| Ok(())).unwrap_err();
        assert_eq!(err.kind, DerErrorKind::NonCanonical);
    }

    #[test]
    fn oid_round_trips() {
        let der = encode::sequence(|w| encode::oid(w, &oid::QC_STATEMENTS));
        let mut r = Reader::new(&der);
        let got = r.read_sequence(|inner| inner.read_oid()).unwrap();
        assert_eq!(got, oid::QC_STATEMENTS);
    }
}
