use crate::constants::*;
use futures::stream::StreamExt;
use mongodb::bson::Document;
use mongodb::error::{Error as MongoError, ErrorKind, Result as MongoResult, WriteFailure};
use mongodb::options::{FindOneOptions, FindOptions, IndexOptions};
use mongodb::{options::ClientOptions, Client, IndexModel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

/// Outcome of an update_one/update_many call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateStat {
    pub matched_count: u64,
    pub modified_count: u64,
}

pub struct AppDatabase(Client);

#[cfg_attr(test, automock)]
impl AppDatabase {
    pub async fn new() -> MongoResult<Self> {
        // get all database parameters from environment
        // when not found in environment it should panic
        let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI not found in .env file");
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

    pub async fn update_one(
        &self,
        db: &str,
        coll: &str,
        filter: Document,
        update: Document,
    ) -> MongoResult<UpdateStat> {
        let coll = self.0.database(db).collection::<Document>(coll);
        let result = coll.update_one(filter, update, None).await?;
        Ok(UpdateStat {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    pub async fn update_many(
        &self,
        db: &str,
        coll: &str,
        filter: Document,
        update: Document,
    ) -> MongoResult<UpdateStat> {
        let coll = self.0.database(db).collection::<Document>(coll);
        let result = coll.update_many(filter, update, None).await?;
        Ok(UpdateStat {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    pub async fn delete_many(&self, db: &str, coll: &str, filter: Document) -> MongoResult<u64> {
        let coll = self.0.database(db).collection::<Document>(coll);
        let result = coll.delete_many(filter, None).await?;
        Ok(result.deleted_count)
    }

    pub async fn find_one_and_update<T>(
        &self,
        db: &str,
        coll: &str,
        filter: Document,
        update: Document,
        options: Option<mongodb::options::FindOneAndUpdateOptions>,
    ) -> MongoResult<Option<T>>
    where
        T: DeserializeOwned + Unpin + Send + Sync + 'static,
    {
        let coll = self.0.database(db).collection::<T>(coll);
        coll.find_one_and_update(filter, update, options).await
    }

    pub async fn create_index(
        &self,
        db: &str,
        coll: &str,
        keys: Document,
        unique: bool,
    ) -> MongoResult<()> {
        let options = IndexOptions::builder().unique(unique).build();
        let index = IndexModel::builder().keys(keys).options(options).build();
        let coll = self.0.database(db).collection::<Document>(coll);
        coll.create_index(index, None).await?;
        Ok(())
    }
}

/// Checks whether a mongodb error is a unique index violation (E11000).
/// The unique index on the code column turns generator collisions and
/// concurrent config creation into this error.
pub fn is_duplicate_key_error(err: &MongoError) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => write_err.code == 11000,
        ErrorKind::Command(command_err) => command_err.code == 11000,
        ErrorKind::BulkWrite(bulk_err) => bulk_err
            .write_errors
            .as_ref()
            .map(|errs| errs.iter().any(|e| e.code == 11000))
            .unwrap_or(false),
        _ => false,
    }
}
