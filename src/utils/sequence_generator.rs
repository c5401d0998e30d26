//! Numeric ids for users and punishments, one counter document per sequence.

use mockall_double::double;
use mongodb::{
    bson::{doc, Document},
    options::{FindOneAndUpdateOptions, ReturnDocument},
};

use crate::constants::*;

#[double]
use crate::database::AppDatabase;

/// Atomically increments the `seq_id` counter and returns the new value, starting at 1
pub async fn next_seq_val(seq_id: &str, db: &AppDatabase) -> anyhow::Result<u32> {
    let mut options = FindOneAndUpdateOptions::default();
    options.upsert = Some(true);
    options.return_document = Some(ReturnDocument::After);
    let counter = db
        .find_one_and_update::<Document>(
            DB_NAME,
            COLL_SEQUENCES,
            doc! {"_id": seq_id},
            doc! {"$inc": {"val": 1}}.into(),
            Some(options),
        )
        .await?
        .ok_or(anyhow::anyhow!("Sequence {seq_id} returned no document"))?;
    // `$inc` on a fresh document stores an int32, a counter past i32::MAX comes back as int64
    let val = match counter.get_i32("val") {
        Ok(val) => val as i64,
        Err(_) => counter.get_i64("val")?,
    };
    u32::try_from(val).ok().filter(|val| *val > 0).ok_or(anyhow::anyhow!(
        "Sequence {seq_id} produced an invalid value: {val}"
    ))
}
