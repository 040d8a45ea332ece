//! DER encoding helpers built on [`yasna`], the teacher crate's own DER
//! writer. These are thin, certificate-domain-shaped wrappers: callers
//! compose `SEQUENCE`/`SET OF` closures the same way the teacher's
//! `write_cert`/`write_name` do.

use chrono::{DateTime, Datelike, Utc};
use num_bigint::{BigInt, Sign};
use yasna::models::{GeneralizedTime, ObjectIdentifier, UTCTime};
use yasna::{DERWriter, Tag};

/// Builds a top-level DER `SEQUENCE` from a writer closure.
pub fn sequence(f: impl FnOnce(&mut yasna::DERWriterSeq)) -> Vec<u8> {
    yasna::construct_der(|writer| {
        writer.write_sequence(|writer_seq| f(writer_seq));
    })
}

/// Writes an `INTEGER` from an `i64`.
pub fn integer_i64(writer: &mut yasna::DERWriterSeq, value: i64) {
    writer.next().write_i64(value);
}

/// Writes an `INTEGER` from an arbitrary-length big-endian magnitude buffer
/// (used for 20-byte certificate serial numbers, always non-negative).
pub fn integer_bytes(writer: &mut yasna::DERWriterSeq, bytes: &[u8]) {
    let value = BigInt::from_bytes_be(Sign::Plus, bytes);
    writer.next().write_bigint(&value);
}

/// Writes an `OBJECT IDENTIFIER`.
pub fn oid(writer: &mut yasna::DERWriterSeq, arcs: &[u64]) {
    writer.next().write_oid(&ObjectIdentifier::from_slice(arcs));
}

/// Writes a `UTF8String`.
pub fn utf8_string(writer: &mut yasna::DERWriterSeq, s: &str) {
    writer.next().write_utf8_string(s);
}

/// Writes an `IA5String` (used for URIs and e-mail addresses).
pub fn ia5_string(writer: &mut yasna::DERWriterSeq, s: &str) {
    writer.next().write_ia5_string(s);
}

/// Writes a `PrintableString`.
pub fn printable_string(writer: &mut yasna::DERWriterSeq, s: &str) {
    writer.next().write_printable_string(s);
}

/// Writes a `BOOLEAN`.
pub fn boolean(writer: &mut yasna::DERWriterSeq, value: bool) {
    writer.next().write_bool(value);
}

/// Writes an `OCTET STRING`.
pub fn octet_string(writer: &mut yasna::DERWriterSeq, bytes: &[u8]) {
    writer.next().write_bytes(bytes);
}

/// Writes a `BIT STRING` with zero unused bits (the common case: DER-encoded
/// sub-values and subjectPublicKey material are always byte-aligned here).
pub fn bit_string(writer: &mut yasna::DERWriterSeq, bytes: &[u8]) {
    let bv = bit_vec::BitVec::from_bytes(bytes);
    writer.next().write_bitvec(&bv);
}

/// Writes pre-encoded DER bytes verbatim (used to splice an already-built
/// `SEQUENCE`/`SET` value, e.g. an extension's `extnValue` payload).
pub fn raw(writer: &mut yasna::DERWriterSeq, der: &[u8]) {
    writer.next().write_der(der);
}

/// Writes a `SEQUENCE` nested inside a `SEQUENCE`.
pub fn nested_sequence(writer: &mut yasna::DERWriterSeq, f: impl FnOnce(&mut yasna::DERWriterSeq)) {
    writer.next().write_sequence(|inner| f(inner));
}

/// Writes a canonical DER `SET OF`: each element is independently DER
/// encoded, then the elements are reordered by their encoded bytes
/// (lexicographic order), as required for canonical `SET OF` per X.690 §11.6.
pub fn set_of(writer: &mut yasna::DERWriterSeq, mut elements: Vec<Vec<u8>>) {
    elements.sort();
    writer.next().write_set_of(|set_writer| {
        for element in &elements {
            set_writer.next().write_der(element);
        }
    });
}

/// Writes an explicit context tag `[n] EXPLICIT`.
pub fn explicit_tag(writer: &mut yasna::DERWriterSeq, tag_number: u64, f: impl FnOnce(DERWriter)) {
    writer.next().write_tagged(Tag::context(tag_number), f);
}

/// Writes an implicit context tag `[n] IMPLICIT` wrapping a primitive value
/// writer (e.g. an IA5String used as a `GeneralName.uniformResourceIdentifier`).
pub fn implicit_ia5_string(writer: &mut yasna::DERWriterSeq, tag_number: u64, s: &str) {
    writer
        .next()
        .write_tagged_implicit(Tag::context(tag_number), |w| w.write_ia5_string(s));
}

/// Chooses between `UTCTime` (years 1950-2049, per RFC 5280 §4.1.2.5.1) and
/// `GeneralizedTime` (everything else), then writes the chosen form.
pub fn time(writer: &mut yasna::DERWriterSeq, dt: &DateTime<Utc>) {
    let year = dt.year();
    if (1950..=2049).contains(&year) {
        writer.next().write_utctime(&UTCTime::from_datetime(dt));
    } else {
        writer
            .next()
            .write_generalized_time(&GeneralizedTime::from_datetime(dt));
    }
}
