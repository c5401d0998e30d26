use crate::constants::*;
use futures::stream::StreamExt;
use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, Result as MongoResult, WriteFailure};
use mongodb::options::{
    FindOneAndUpdateOptions, FindOneOptions, FindOptions, IndexOptions, UpdateModifications,
};
use mongodb::IndexModel;
use mongodb::{options::ClientOptions, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

pub struct AppDatabase(Client);

#[cfg_attr(test, automock)]
impl AppDatabase {
    pub async fn new() -> anyhow::Result<Self> {
        // get all database parameters from environment
        let uri = std::env::var("MONGODB_URI")
            .map_err(|_| anyhow::anyhow!("MONGODB_URI not found in .env file"))?;
        let min_pool = std::env::var("MONGODB_MIN_POOL_SIZE").unwrap_or_default();
        let max_pool = std::env::var("MONGODB_MAX_POOL_SIZE").unwrap_or_default();
        let min_pool = min_pool.parse::<u32>().unwrap_or(MONGO_MIN_POOL_SIZE);
        let max_pool = max_pool.parse::<u32>().unwrap_or(MONGO_MAX_POOL_SIZE);
        let timeout = Duration::from_secs(MONGO_CONN_TIMEOUT);
        // create the mongodb client options
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.max_pool_size = Some(max_pool);
        client_options.min_pool_size = Some(min_pool);
        client_options.connect_timeout = Some(timeout);
        // create the client and return Result object
        let client = Client::with_options(client_options)?;
        let app_db = Self(client);
        Ok(app_db)
    }

    /// Create the indexes the stores rely on. Safe to call on every start.
    pub async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.0.database(DB_NAME);
        let unique = |keys: Document, partial: Option<Document>| {
            let options = IndexOptions::builder()
                .unique(true)
                .partial_filter_expression(partial)
                .build();
            IndexModel::builder().keys(keys).options(options).build()
        };
        let users = database.collection::<Document>(COLL_USERS);
        users
            .create_index(unique(doc! {"email": 1}, None), None)
            .await?;
        // at most one stored active punishment per user
        let punishments = database.collection::<Document>(COLL_PUNISHMENTS);
        let active_only = Some(doc! {"status": "active"});
        punishments
            .create_index(unique(doc! {"user_id": 1}, active_only), None)
            .await?;
        let history = IndexModel::builder()
            .keys(doc! {"user_id": 1, "suspended_at": -1})
            .build();
        punishments.create_index(history, None).await?;
        let otps = database.collection::<Document>(COLL_OTP);
        let lookup = IndexModel::builder()
            .keys(doc! {"email": 1, "purpose": 1, "is_used": 1})
            .build();
        otps.create_index(lookup, None).await?;
        // at most one unused code per email and purpose
        let unused_only = Some(doc! {"is_used": false});
        otps.create_index(unique(doc! {"email": 1, "purpose": 1}, unused_only), None)
            .await?;
        let resets = database.collection::<Document>(COLL_PASSWORD_RESETS);
        resets
            .create_index(unique(doc! {"token": 1}, None), None)
            .await?;
        Ok(())
    }

    pub async fn find_one<T>(
        &self,
        db: &str,
        coll: &str,
        filter: Option<Document>,
        options: Option<FindOneOptions>,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync + 'static,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        coll.find_one(filter, options).await
    }

    pub async fn find<T>(
        &self,
        db: &str,
        coll: &str,
        filter: Option<Document>,
        options: Option<FindOptions>,
    ) -> MongoResult<Vec<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync + 'static,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        let mut cursor = coll.find(filter, options).await?;
        let mut data = vec![];
        while let Some(doc) = cursor.next().await {
            data.push(doc?);
        }
        Ok(data)
    }

    pub async fn insert_one<T>(&self, db: &str, coll: &str, doc: &T) -> MongoResult<()>
    where
        T: Serialize + Send + Sync + 'static,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        coll.insert_one(doc, None).await?;
        Ok(())
    }

    /// Returns how many documents matched `filter`
    pub async fn update_one(
        &self,
        db: &str,
        coll: &str,
        filter: Document,
        update: Document,
    ) -> MongoResult<u64> {
        let coll = self.0.database(db).collection::<Document>(coll);
        let result = coll.update_one(filter, update, None).await?;
        Ok(result.matched_count)
    }

    pub async fn find_one_and_update<T>(
        &self,
        db: &str,
        coll: &str,
        filter: Document,
        update: UpdateModifications,
        options: Option<FindOneAndUpdateOptions>,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync + 'static,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        coll.find_one_and_update(filter, update, options).await
    }

    pub async fn find_one_and_delete<T>(
        &self,
        db: &str,
        coll: &str,
        filter: Document,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync + 'static,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        coll.find_one_and_delete(filter, None).await
    }

    pub async fn delete_many(
        &self,
        db: &str,
        coll: &str,
        filter: Document,
    ) -> MongoResult<u64> {
        let coll = self.0.database(db).collection::<Document>(coll);
        let result = coll.delete_many(filter, None).await?;
        Ok(result.deleted_count)
    }
}

/// True when the write failed on an unique index
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => write_err.code == 11000,
        _ => false,
    }
}

/// A write error as the server reports it for an unique index violation
#[cfg(test)]
pub fn duplicate_key_error() -> mongodb::error::Error {
    write_error(11000)
}

#[cfg(test)]
pub fn write_error(code: i32) -> mongodb::error::Error {
    let write_err: mongodb::error::WriteError = mongodb::bson::from_document(doc! {
        "code": code,
        "codeName": "WriteError",
        "errmsg": format!("E{code} write failed"),
    })
    .unwrap();
    ErrorKind::Write(WriteFailure::WriteError(write_err)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_duplicate_key() {
        assert!(is_duplicate_key(&duplicate_key_error()));
        assert!(!is_duplicate_key(&write_error(121)));
    }
}
