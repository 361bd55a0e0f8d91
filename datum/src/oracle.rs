//! The record published by register and replaced by every update.

use minicbor::{decode, encode, Decode, Decoder, Encode, Encoder};

use crate::plutus;
use crate::{DatumCodec, DatumError};

/// Upper bound on `rngoutput`, the largest `rnlen` a request may ask for.
const MAX_RNG_DIGITS: usize = 8;

/// `Constr 0 [publisher, initiator, rngfid, seedtxid, rngoutput]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleDatum {
    /// Payment key hash of the wallet that published this value.
    pub publisher: Vec<u8>,
    /// Payment key hash of the wallet that initiated the request.
    pub initiator: Vec<u8>,
    /// UTF-8 bytes of the request id.
    pub rngfid: Vec<u8>,
    /// UTF-8 bytes of the hex hash of the seed transaction.
    pub seedtxid: Vec<u8>,
    /// ASCII digits extracted from the seed block's VRF output.
    pub rngoutput: Vec<u8>,
}

impl OracleDatum {
    pub fn validate(&self) -> Result<(), DatumError> {
        plutus::check_bounded("publisher", &self.publisher)?;
        plutus::check_bounded("initiator", &self.initiator)?;
        plutus::check_bounded("rngfid", &self.rngfid)?;
        let digits = &self.rngoutput;
        let in_range = (1..=MAX_RNG_DIGITS).contains(&digits.len());
        if !in_range || !digits.iter().all(u8::is_ascii_digit) {
            return Err(DatumError::InvalidRngOutput(
                String::from_utf8_lossy(digits).into_owned(),
            ));
        }
        Ok(())
    }

    /// The random digits as text.
    pub fn rng_output_text(&self) -> Result<&str, DatumError> {
        std::str::from_utf8(&self.rngoutput).map_err(|_| DatumError::NotText("rngoutput"))
    }

    pub fn rngfid_text(&self) -> Result<&str, DatumError> {
        std::str::from_utf8(&self.rngfid).map_err(|_| DatumError::NotText("rngfid"))
    }
}

impl DatumCodec for OracleDatum {
    fn to_cbor(&self) -> Result<Vec<u8>, DatumError> {
        self.validate()?;
        plutus::to_cbor(self)
    }

    fn from_cbor(bytes: &[u8]) -> Result<Self, DatumError> {
        let datum: Self = plutus::from_cbor(bytes)?;
        datum.validate()?;
        Ok(datum)
    }
}

impl<C> Encode<C> for OracleDatum {
    fn encode<W: encode::Write>(
        &self,
        e: &mut Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), encode::Error<W::Error>> {
        plutus::begin_constr(e)?;
        plutus::put_bytes(e, &self.publisher)?;
        plutus::put_bytes(e, &self.initiator)?;
        plutus::put_bytes(e, &self.rngfid)?;
        plutus::put_bytes(e, &self.seedtxid)?;
        plutus::put_bytes(e, &self.rngoutput)?;
        plutus::end_constr(e)
    }
}

impl<'b, C> Decode<'b, C> for OracleDatum {
    fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
        let len = plutus::open_constr(d, 5)?;
        let publisher = plutus::take_bytes(d)?;
        let initiator = plutus::take_bytes(d)?;
        let rngfid = plutus::take_bytes(d)?;
        let seedtxid = plutus::take_bytes(d)?;
        let rngoutput = plutus::take_bytes(d)?;
        plutus::close_constr(d, len)?;
        Ok(Self {
            publisher,
            initiator,
            rngfid,
            seedtxid,
            rngoutput,
        })
    }
}
