//! Nullable transaction service: records every write, returns fixed hashes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use oracle_datum::{InitiateDatum, OracleDatum};
use oracle_lifecycle::{LockedInitiate, Submitter, TxBuilder, TxError};
use oracle_types::{AssetUnit, OutRef, RngFid, TxHash};

/// Policy id reported for every initiate lock.
pub const NULL_POLICY_ID: &str = "5eed5eed5eed5eed5eed5eed5eed5eed5eed5eed5eed5eed5eed5eed";

/// A write the builder was asked to perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TxCall {
    Lock {
        datum: InitiateDatum,
        rngfid: RngFid,
    },
    Publish {
        datum: OracleDatum,
        unit: AssetUnit,
    },
    Supersede {
        prior: OutRef,
        datum: OracleDatum,
        unit: AssetUnit,
    },
}

pub struct NullTxBuilder {
    key_hash: Vec<u8>,
    calls: Mutex<Vec<TxCall>>,
    reject: AtomicBool,
}

impl NullTxBuilder {
    /// A builder whose wallet has payment key hash `key_hash`.
    pub fn new(key_hash: Vec<u8>) -> Self {
        Self {
            key_hash,
            calls: Mutex::new(Vec::new()),
            reject: AtomicBool::new(false),
        }
    }

    /// Refuse every subsequent write.
    pub fn set_rejecting(&self, reject: bool) {
        self.reject.store(reject, Ordering::SeqCst);
    }

    /// All writes so far (for assertions).
    pub fn calls(&self) -> Vec<TxCall> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TxCall>> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The n-th write gets hash `[n + 1; 32]`.
    fn record(&self, call: TxCall) -> Result<TxHash, TxError> {
        if self.reject.load(Ordering::SeqCst) {
            return Err(TxError::Rejected("null tx builder rejecting".into()));
        }
        let mut calls = self.lock();
        calls.push(call);
        Ok(Self::hash_for(calls.len()))
    }

    /// Hash returned for the `n`-th (1-based) write.
    pub fn hash_for(n: usize) -> TxHash {
        TxHash::new([n as u8; 32])
    }
}

impl Default for NullTxBuilder {
    fn default() -> Self {
        Self::new(vec![0xab; 28])
    }
}

#[async_trait]
impl TxBuilder for NullTxBuilder {
    async fn payment_key_hash(&self, _submitter: &Submitter) -> Result<Vec<u8>, TxError> {
        Ok(self.key_hash.clone())
    }

    async fn lock_initiate(
        &self,
        _submitter: &Submitter,
        datum: &InitiateDatum,
        rngfid: &RngFid,
    ) -> Result<LockedInitiate, TxError> {
        let tx_hash = self.record(TxCall::Lock {
            datum: datum.clone(),
            rngfid: rngfid.clone(),
        })?;
        Ok(LockedInitiate {
            tx_hash,
            policy_id: NULL_POLICY_ID.to_string(),
        })
    }

    async fn publish_oracle(
        &self,
        _submitter: &Submitter,
        datum: &OracleDatum,
        unit: &AssetUnit,
    ) -> Result<TxHash, TxError> {
        self.record(TxCall::Publish {
            datum: datum.clone(),
            unit: unit.clone(),
        })
    }

    async fn supersede_oracle(
        &self,
        _submitter: &Submitter,
        prior: &OutRef,
        datum: &OracleDatum,
        unit: &AssetUnit,
    ) -> Result<TxHash, TxError> {
        self.record(TxCall::Supersede {
            prior: *prior,
            datum: datum.clone(),
            unit: unit.clone(),
        })
    }
}
