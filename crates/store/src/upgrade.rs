//! One-shot schema upgrades, applied in order when a store opens.
//!
//! Each upgrader receives the version read from the sentinel and returns
//! the version it upgraded to, or 0 when it had nothing to do. Upgrades
//! rewrite every blob in place and must be idempotent.

use log::info;
use rlp::Rlp;

use innertx_types::step::TxTrace;

use crate::{db::BlobDb, error::StoreError, store::VERSION_KEY};

type UpgradeFn<D> = fn(&mut D, u64) -> Result<u64, StoreError>;

pub(crate) fn current_version<D: BlobDb>(db: &D) -> Result<u64, StoreError> {
    let Some(bytes) = db.get(VERSION_KEY)? else {
        return Ok(0);
    };
    let text = String::from_utf8(bytes).map_err(|e| StoreError::Version(e.to_string()))?;
    text.parse()
        .map_err(|_| StoreError::Version(text.clone()))
}

pub(crate) fn run_upgrades<D: BlobDb>(db: &mut D) -> Result<(), StoreError> {
    let upgraders: [UpgradeFn<D>; 1] = [upgrade_add_err_msg];
    for upgrade in upgraders {
        let version = current_version(db)?;
        let new_version = upgrade(db, version)?;
        if new_version > 0 {
            db.put(VERSION_KEY, new_version.to_string().as_bytes())?;
        }
    }
    Ok(())
}

/// v0 -> v1: step records gain a trailing errMsg field.
///
/// Blobs are decoded with the layout-tolerant codec (a v0 record reads as
/// having an empty errMsg) and rewritten in the v1 shape.
fn upgrade_add_err_msg<D: BlobDb>(db: &mut D, version: u64) -> Result<u64, StoreError> {
    if version >= 1 {
        return Ok(0);
    }
    let mut rewritten = 0usize;
    for key in db.keys()? {
        if key == VERSION_KEY {
            continue;
        }
        let Some(blob) = db.get(&key)? else { continue };
        let traces: Vec<TxTrace> = Rlp::new(&blob).as_list()?;
        db.put(&key, &rlp::encode_list::<TxTrace, TxTrace>(&traces))?;
        rewritten += 1;
    }
    info!("trace store upgraded to schema version 1 ({rewritten} blobs rewritten)");
    Ok(1)
}
