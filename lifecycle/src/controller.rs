//! The oracle lifecycle.
//!
//! ```text
//! initiate ──► register ──► update ──► update ...
//!                 │            │
//!                 └── query ◄──┘
//! ```
//!
//! `initiate` locks an [`InitiateDatum`]; its transaction is the seed.
//! `register` and `update` both turn the seed's block into random digits
//! and publish an [`OracleDatum`]; `update` additionally spends the
//! previous oracle output. `query` reads the digits back.

use std::sync::Arc;
use std::time::Duration;

use oracle_datum::{DatumCodec, InitiateDatum, OracleDatum};
use oracle_explorer::{BlockHeightResolver, ExplorerError, LedgerExplorer, ResolvedBlock};
use oracle_types::{AssetUnit, Network, OutRef, RngFid, TxHash};
use oracle_utils::tracing_spans::oracle_op_span;
use oracle_vrf::{extract, VrfLocator};
use tracing::{debug, info, warn, Instrument};

use crate::request::{
    ChainSyncUrl, InitiateReceipt, InitiateRequest, OracleReceipt, OracleRequest,
};
use crate::tx::TxBuilder;
use crate::OracleError;

/// Default bound on a single VRF lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(30);

pub struct OracleController {
    explorer: Arc<dyn LedgerExplorer>,
    resolver: BlockHeightResolver,
    locator: VrfLocator,
    tx_builder: Arc<dyn TxBuilder>,
    lookup_timeout: Duration,
}

impl OracleController {
    pub fn new(
        explorer: Arc<dyn LedgerExplorer>,
        locator: VrfLocator,
        tx_builder: Arc<dyn TxBuilder>,
    ) -> Self {
        Self {
            resolver: BlockHeightResolver::new(explorer.clone()),
            explorer,
            locator,
            tx_builder,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Lock a new randomness request.
    pub async fn initiate(&self, req: InitiateRequest) -> Result<InitiateReceipt, OracleError> {
        let rngfid = match req.rngfid {
            Some(id) => id,
            None => RngFid::generate().map_err(|e| {
                OracleError::UpstreamUnavailable(format!("cannot generate rngfid: {e}"))
            })?,
        };
        let span = oracle_op_span("initiate");
        span.record("rngfid", rngfid.as_str());

        async move {
            let initiator = self.tx_builder.payment_key_hash(&req.submitter).await?;
            let datum = InitiateDatum {
                initiator,
                rngfid: rngfid.as_bytes().to_vec(),
                rnlen: req.rnlen.get(),
            };
            datum.validate()?;
            let datum_hex = datum.to_hex()?;

            let locked = self
                .tx_builder
                .lock_initiate(&req.submitter, &datum, &rngfid)
                .await?;
            let unit = AssetUnit::new(&locked.policy_id, rngfid.as_bytes()).map_err(|e| {
                OracleError::Protocol(format!("tx service returned an unusable policy id: {e}"))
            })?;

            info!(tx = %locked.tx_hash, %unit, rnlen = req.rnlen.get(), "request locked");
            Ok(InitiateReceipt {
                tx_hash: locked.tx_hash,
                datum: datum_hex,
                rngfid,
                rnlen: req.rnlen,
                unit,
            })
        }
        .instrument(span)
        .await
    }

    /// Publish the first oracle datum for a request.
    pub async fn register(&self, req: OracleRequest) -> Result<OracleReceipt, OracleError> {
        self.publish_oracle(req, None).await
    }

    /// Replace the oracle datum published by `prior_tx`.
    pub async fn update(
        &self,
        req: OracleRequest,
        prior_tx: TxHash,
    ) -> Result<OracleReceipt, OracleError> {
        self.publish_oracle(req, Some(OutRef::first(prior_tx))).await
    }

    /// Digits held by the oracle output of `oracle_tx`.
    pub async fn query(&self, network: Network, oracle_tx: TxHash) -> Result<String, OracleError> {
        let span = oracle_op_span("query");
        let out_ref = OutRef::first(oracle_tx);

        async {
            let datum = self.oracle_datum_at(network, &out_ref).await?;
            if let Ok(id) = datum.rngfid_text() {
                tracing::Span::current().record("rngfid", id);
            }
            let output = datum
                .rng_output_text()
                .map_err(|e| OracleError::Protocol(format!("oracle datum at {out_ref}: {e}")))?;
            debug!(%out_ref, output, "queried oracle");
            Ok(output.to_string())
        }
        .instrument(span)
        .await
    }

    /// Register and update share this pipeline: seed tx → block → VRF →
    /// digits → datum → transaction.
    async fn publish_oracle(
        &self,
        req: OracleRequest,
        predecessor: Option<OutRef>,
    ) -> Result<OracleReceipt, OracleError> {
        let span = oracle_op_span(if predecessor.is_some() { "update" } else { "register" });
        span.record("rngfid", req.rngfid.as_str());

        async move {
            let network = req.submitter.network;
            if let Some(prior) = &predecessor {
                self.check_predecessor(network, prior, &req).await?;
            }

            let block = self.resolver.resolve_anchored(network, &req.seed_tx).await?;
            let seed = self.seed_datum(network, &req).await?;
            let publisher = self.tx_builder.payment_key_hash(&req.submitter).await?;
            let initiator = match seed {
                Some(d) => d.initiator,
                None => publisher.clone(),
            };

            let vrf = self.lookup_vrf(&req.chain_sync, &block).await?;
            let rnlen = req.rnlen.as_usize();
            let rng_output = extract(&vrf, rnlen);
            if rng_output.len() < rnlen {
                warn!(block = %block.target, found = rng_output.len(), rnlen, "VRF output too short");
                return Err(OracleError::Protocol(format!(
                    "VRF output of block {} has {} digits, {rnlen} requested",
                    block.target,
                    rng_output.len()
                )));
            }

            let datum = OracleDatum {
                publisher,
                initiator,
                rngfid: req.rngfid.as_bytes().to_vec(),
                seedtxid: req.seed_tx.to_hex().into_bytes(),
                rngoutput: rng_output.clone().into_bytes(),
            };
            datum.validate()?;

            let tx_hash = match &predecessor {
                Some(prior) => {
                    self.tx_builder
                        .supersede_oracle(&req.submitter, prior, &datum, &req.unit)
                        .await?
                }
                None => {
                    self.tx_builder
                        .publish_oracle(&req.submitter, &datum, &req.unit)
                        .await?
                }
            };

            info!(tx = %tx_hash, block = %block.target, %rng_output, "oracle published");
            Ok(OracleReceipt {
                tx_hash,
                unit: req.unit,
                rng_output,
            })
        }
        .instrument(span)
        .await
    }

    /// The prior oracle output must be unspent and belong to the same request.
    async fn check_predecessor(
        &self,
        network: Network,
        prior: &OutRef,
        req: &OracleRequest,
    ) -> Result<(), OracleError> {
        let utxo = self.explorer.utxo_at(network, prior).await?;
        if utxo.spent {
            return Err(OracleError::Validation(format!(
                "oracle output {prior} has already been superseded"
            )));
        }
        let datum = decode_oracle(prior, utxo.inline_datum)?;
        if datum.rngfid != req.rngfid.as_bytes() {
            return Err(OracleError::Validation(format!(
                "oracle output {prior} belongs to a different rngfid"
            )));
        }
        Ok(())
    }

    /// The request parameters locked by the seed transaction, if it holds an
    /// initiate datum. They must agree with the caller's.
    async fn seed_datum(
        &self,
        network: Network,
        req: &OracleRequest,
    ) -> Result<Option<InitiateDatum>, OracleError> {
        let out_ref = OutRef::first(req.seed_tx);
        let utxo = match self.explorer.utxo_at(network, &out_ref).await {
            Ok(utxo) => utxo,
            Err(ExplorerError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let Some(bytes) = utxo.inline_datum else {
            return Ok(None);
        };
        let datum = match InitiateDatum::from_cbor(&bytes) {
            Ok(datum) => datum,
            Err(e) => {
                debug!(%out_ref, error = %e, "seed output holds no initiate datum");
                return Ok(None);
            }
        };

        if datum.rngfid != req.rngfid.as_bytes() {
            return Err(OracleError::Validation(format!(
                "rngfid {} does not match the request locked in {}",
                req.rngfid, req.seed_tx
            )));
        }
        if datum.rnlen != req.rnlen.get() {
            return Err(OracleError::Validation(format!(
                "rnlen {} does not match the {} locked in {}",
                req.rnlen.get(),
                datum.rnlen,
                req.seed_tx
            )));
        }
        Ok(Some(datum))
    }

    async fn oracle_datum_at(
        &self,
        network: Network,
        out_ref: &OutRef,
    ) -> Result<OracleDatum, OracleError> {
        let utxo = self.explorer.utxo_at(network, out_ref).await?;
        if utxo.spent {
            return Err(OracleError::NotFound(format!(
                "oracle output {out_ref} has been superseded"
            )));
        }
        decode_oracle(out_ref, utxo.inline_datum)
    }

    /// VRF output of the resolved block, bounded by the lookup timeout.
    ///
    /// On expiry the lookup future is dropped, which releases its connection.
    async fn lookup_vrf(
        &self,
        endpoint: &ChainSyncUrl,
        block: &ResolvedBlock,
    ) -> Result<String, OracleError> {
        let lookup = self
            .locator
            .locate_from(endpoint.as_str(), block.anchor(), &block.target);
        match tokio::time::timeout(self.lookup_timeout, lookup).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(OracleError::UpstreamUnavailable(format!(
                "VRF lookup for block {} timed out after {:?}",
                block.target, self.lookup_timeout
            ))),
        }
    }
}

fn decode_oracle(out_ref: &OutRef, inline_datum: Option<Vec<u8>>) -> Result<OracleDatum, OracleError> {
    let bytes = inline_datum
        .ok_or_else(|| OracleError::NotFound(format!("no oracle datum at {out_ref}")))?;
    OracleDatum::from_cbor(&bytes).map_err(|e| {
        OracleError::NotFound(format!("output {out_ref} does not hold an oracle datum: {e}"))
    })
}
