//! Plutus data building blocks: constructor framing and byte strings.

use minicbor::data::{Tag, Type};
use minicbor::{decode, encode, Decoder, Encoder};
use oracle_types::MAX_FIELD_BYTES;

use crate::DatumError;

/// CBOR tag for Plutus constructor alternative 0.
pub(crate) const CONSTR_0: u64 = 121;

/// Plutus byte strings longer than this are split into indefinite chunks.
const BYTES_CHUNK: usize = 64;

pub(crate) fn to_cbor<T: minicbor::Encode<()>>(value: &T) -> Result<Vec<u8>, DatumError> {
    minicbor::to_vec(value).map_err(|e| DatumError::Encode(e.to_string()))
}

pub(crate) fn from_cbor<'b, T: minicbor::Decode<'b, ()>>(bytes: &'b [u8]) -> Result<T, DatumError> {
    let mut d = Decoder::new(bytes);
    let value: T = d.decode().map_err(|e| DatumError::Decode(e.to_string()))?;
    let trailing = bytes.len() - d.position();
    if trailing > 0 {
        return Err(DatumError::TrailingBytes(trailing));
    }
    Ok(value)
}

pub(crate) fn check_bounded(field: &'static str, value: &[u8]) -> Result<(), DatumError> {
    if value.len() > MAX_FIELD_BYTES {
        return Err(DatumError::FieldTooLong {
            field,
            len: value.len(),
            max: MAX_FIELD_BYTES,
        });
    }
    Ok(())
}

/// Start a constructor-0 value. Fields follow as an indefinite list,
/// matching what the reference off-chain libraries emit.
pub(crate) fn begin_constr<W: encode::Write>(
    e: &mut Encoder<W>,
) -> Result<(), encode::Error<W::Error>> {
    e.tag(Tag::new(CONSTR_0))?.begin_array()?;
    Ok(())
}

pub(crate) fn end_constr<W: encode::Write>(
    e: &mut Encoder<W>,
) -> Result<(), encode::Error<W::Error>> {
    e.end()?;
    Ok(())
}

pub(crate) fn put_bytes<W: encode::Write>(
    e: &mut Encoder<W>,
    value: &[u8],
) -> Result<(), encode::Error<W::Error>> {
    if value.len() <= BYTES_CHUNK {
        e.bytes(value)?;
    } else {
        e.begin_bytes()?;
        for chunk in value.chunks(BYTES_CHUNK) {
            e.bytes(chunk)?;
        }
        e.end()?;
    }
    Ok(())
}

/// Open a constructor-0 value with `arity` fields.
///
/// Returns the definite length if one was used, `None` for an indefinite list
/// that must be closed with [`close_constr`].
pub(crate) fn open_constr(d: &mut Decoder<'_>, arity: u64) -> Result<Option<u64>, decode::Error> {
    let tag = d.tag()?;
    if tag.as_u64() != CONSTR_0 {
        return Err(decode::Error::message(format!(
            "expected constructor tag {CONSTR_0}, found {}",
            tag.as_u64()
        )));
    }
    let len = d.array()?;
    if let Some(n) = len {
        if n != arity {
            return Err(decode::Error::message(format!(
                "expected {arity} fields, found {n}"
            )));
        }
    }
    Ok(len)
}

pub(crate) fn close_constr(d: &mut Decoder<'_>, len: Option<u64>) -> Result<(), decode::Error> {
    if len.is_none() {
        if d.datatype()? != Type::Break {
            return Err(decode::Error::message("constructor has extra fields"));
        }
        d.set_position(d.position() + 1);
    }
    Ok(())
}

/// Read a byte string, joining indefinite-length chunks.
pub(crate) fn take_bytes(d: &mut Decoder<'_>) -> Result<Vec<u8>, decode::Error> {
    let mut out = Vec::new();
    for chunk in d.bytes_iter()? {
        out.extend_from_slice(chunk?);
    }
    Ok(out)
}
