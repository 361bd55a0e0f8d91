//! The record locked by an initiate transaction.

use minicbor::{decode, encode, Decode, Decoder, Encode, Encoder};
use oracle_types::RnLen;

use crate::plutus;
use crate::{DatumCodec, DatumError};

/// `Constr 0 [initiator, rngfid, rnlen]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InitiateDatum {
    /// Payment key hash of the requesting wallet.
    pub initiator: Vec<u8>,
    /// UTF-8 bytes of the request id.
    pub rngfid: Vec<u8>,
    /// Number of digits requested.
    pub rnlen: u8,
}

impl InitiateDatum {
    pub fn validate(&self) -> Result<(), DatumError> {
        plutus::check_bounded("initiator", &self.initiator)?;
        plutus::check_bounded("rngfid", &self.rngfid)?;
        RnLen::new(self.rnlen as u64).map_err(|_| DatumError::RnLenOutOfRange(self.rnlen as u64))?;
        Ok(())
    }

    pub fn rngfid_text(&self) -> Result<&str, DatumError> {
        std::str::from_utf8(&self.rngfid).map_err(|_| DatumError::NotText("rngfid"))
    }
}

impl DatumCodec for InitiateDatum {
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

impl<C> Encode<C> for InitiateDatum {
    fn encode<W: encode::Write>(
        &self,
        e: &mut Encoder<W>,
        _ctx: &mut C,
    ) -> Result<(), encode::Error<W::Error>> {
        plutus::begin_constr(e)?;
        plutus::put_bytes(e, &self.initiator)?;
        plutus::put_bytes(e, &self.rngfid)?;
        e.u8(self.rnlen)?;
        plutus::end_constr(e)
    }
}

impl<'b, C> Decode<'b, C> for InitiateDatum {
    fn decode(d: &mut Decoder<'b>, _ctx: &mut C) -> Result<Self, decode::Error> {
        let len = plutus::open_constr(d, 3)?;
        let initiator = plutus::take_bytes(d)?;
        let rngfid = plutus::take_bytes(d)?;
        let rnlen = d.u64()?;
        plutus::close_constr(d, len)?;
        let rnlen = u8::try_from(rnlen)
            .map_err(|_| decode::Error::message(format!("rnlen {rnlen} out of range")))?;
        Ok(Self {
            initiator,
            rngfid,
            rnlen,
        })
    }
}
