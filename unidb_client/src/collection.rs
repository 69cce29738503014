use std::marker::PhantomData;

use reqwest::Method;
use serde::{Serialize, de::DeserializeOwned};

use crate::{Client, Result, transport::encode};

/// Body of a read request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindRequest<'a, Q: ?Sized> {
    query: &'a Q,
    find_one: bool,
}

/// Body of a create request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateRequest<'a, D: ?Sized> {
    query: &'a D,
    insert_one: bool,
}

/// Body of an update-by-filter request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindAndUpdateRequest<'a, Q: ?Sized, U: ?Sized> {
    query: &'a Q,
    update: &'a U,
    find_one: bool,
}

/// Body of a delete request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest<'a, Q: ?Sized> {
    query: &'a Q,
    delete_many: bool,
    find_one: bool,
}

#[derive(Debug, Serialize)]
struct IdQuery<'a> {
    id: &'a str,
}

/// A handle to one confirmed collection of `T` records
///
/// Produced by [`Client::collection`]. Handles hold no state of their own beyond the collection
/// name, so they are cheap to create and can be dropped freely.
///
/// The remote store keys its behaviour on the `findOne`, `insertOne` and `deleteMany` flags of
/// each request body, not on the HTTP verb alone.
#[derive(Debug)]
pub struct Collection<'c, T> {
    client: &'c Client,
    name: String,
    /// `name` as a single percent-encoded path segment
    path: String,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<'_, T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            name: self.name.clone(),
            path: self.path.clone(),
            _record: PhantomData,
        }
    }
}

impl<'c, T> Collection<'c, T>
where
    T: Serialize + DeserializeOwned + Send + Sync,
{
    pub(crate) fn new(client: &'c Client, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            client,
            path: urlencoding::encode(&name).into_owned(),
            name,
            _record: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up the record whose `id` is `id`
    ///
    /// Sends `GET <name>` with `{"query": {"id": id}, "findOne": true}`.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<T>> {
        self.find_one(&IdQuery { id }).await
    }

    /// Look up a single record matching `filter`
    ///
    /// Sends `GET <name>` with `{"query": filter, "findOne": true}`.
    pub async fn find_one<Q>(&self, filter: &Q) -> Result<Option<T>>
    where
        Q: Serialize + Sync + ?Sized,
    {
        let body = encode(&FindRequest {
            query: filter,
            find_one: true,
        })?;
        self.client.transport.get(&self.path, Some(body)).await
    }

    /// Create a record
    ///
    /// Sends `POST <name>` with `{"query": data, "insertOne": false}`.
    pub async fn create(&self, data: &T) -> Result<Option<T>> {
        self.create_one(data, false).await
    }

    /// Create a record with strict single-insert semantics
    ///
    /// Sends `POST <name>` with `{"query": data, "insertOne": true}`.
    pub async fn insert_one(&self, data: &T) -> Result<Option<T>> {
        self.create_one(data, true).await
    }

    async fn create_one(&self, data: &T, insert_one: bool) -> Result<Option<T>> {
        let body = encode(&CreateRequest {
            query: data,
            insert_one,
        })?;
        self.client.transport.post(&self.path, Some(body)).await
    }

    /// Apply the partial update `data` to the record whose `id` is `id`
    ///
    /// Sends `PUT <name>/<id>` with `data` as the body, without an envelope.
    pub async fn update_by_id<U>(&self, id: &str, data: &U) -> Result<Option<T>>
    where
        U: Serialize + Sync + ?Sized,
    {
        let path = format!("{}/{}", self.path, urlencoding::encode(id));
        self.client.transport.put(&path, Some(encode(data)?)).await
    }

    /// Apply the partial update `data` to a single record matching `filter`, returning the
    /// updated record
    ///
    /// Sends `PUT <name>` with `{"query": filter, "update": data, "findOne": true}`.
    pub async fn find_one_and_update<Q, U>(&self, filter: &Q, data: &U) -> Result<Option<T>>
    where
        Q: Serialize + Sync + ?Sized,
        U: Serialize + Sync + ?Sized,
    {
        let body = encode(&FindAndUpdateRequest {
            query: filter,
            update: data,
            find_one: true,
        })?;
        self.client.transport.put(&self.path, Some(body)).await
    }

    /// Delete at most one record matching `filter`
    ///
    /// Sends `DELETE <name>` with `{"query": filter, "deleteMany": false, "findOne": false}`.
    pub async fn delete_one<Q>(&self, filter: &Q) -> Result<()>
    where
        Q: Serialize + Sync + ?Sized,
    {
        self.delete(filter, false).await
    }

    /// Delete every record matching `filter`
    ///
    /// Sends `DELETE <name>` with `{"query": filter, "deleteMany": true, "findOne": false}`.
    pub async fn delete_many<Q>(&self, filter: &Q) -> Result<()>
    where
        Q: Serialize + Sync + ?Sized,
    {
        self.delete(filter, true).await
    }

    async fn delete<Q>(&self, filter: &Q, delete_many: bool) -> Result<()>
    where
        Q: Serialize + Sync + ?Sized,
    {
        let body = encode(&DeleteRequest {
            query: filter,
            delete_many,
            find_one: false,
        })?;
        self.client
            .transport
            .request(Method::DELETE, &self.path, Some(body))
            .await?;
        Ok(())
    }

    /// Delete a single record matching `filter`, returning the deleted record
    ///
    /// Sends `DELETE <name>` with `{"query": filter, "deleteMany": false, "findOne": true}`.
    pub async fn find_one_and_delete<Q>(&self, filter: &Q) -> Result<Option<T>>
    where
        Q: Serialize + Sync + ?Sized,
    {
        let body = encode(&DeleteRequest {
            query: filter,
            delete_many: false,
            find_one: true,
        })?;
        self.client.transport.delete(&self.path, Some(body)).await
    }
}
