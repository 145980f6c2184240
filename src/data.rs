use serde_json::{Map, Value};

use crate::client::Client;
use crate::error::Result;
use crate::query::Query;
use crate::request::Request;
use crate::transport::Transport;

const DATA_PREAMBLE: &str = "/api/v/1/data";

fn collection_path(collection_id: &str) -> String {
    format!("{DATA_PREAMBLE}/{collection_id}")
}

/// Collection data CRUD, shared by the end-user and developer roles.
impl<T: Transport> Client<T> {
    /// Inserts an item into the collection.
    ///
    /// # Errors
    ///
    /// Transport failures and non-200 statuses surface as errors.
    pub fn insert_data(&self, collection_id: &str, item: Value) -> Result<()> {
        let request = Request::post(collection_path(collection_id)).with_body(item);
        self.dispatch(request)?;
        Ok(())
    }

    /// Retrieves the collection records matched by the filter, or all
    /// records when no filter is supplied.
    ///
    /// # Errors
    ///
    /// Transport failures and non-200 statuses surface as errors, as does
    /// a response that is not a JSON object.
    pub fn get_data(
        &self,
        collection_id: &str,
        filter: Option<&Query>,
    ) -> Result<Map<String, Value>> {
        let request = Request::get(collection_path(collection_id)).with_filter(filter);
        self.dispatch(request)?.into_object()
    }

    /// Applies the given field changes to the collection records matched
    /// by the filter.
    ///
    /// The request body is always `{ "query": <filter>, "$set": <changes> }`,
    /// for every role.
    ///
    /// # Errors
    ///
    /// Transport failures and non-200 statuses surface as errors.
    pub fn update_data(
        &self,
        collection_id: &str,
        filter: Option<&Query>,
        changes: Map<String, Value>,
    ) -> Result<()> {
        let request = Request::update(collection_path(collection_id), filter, changes);
        self.dispatch(request)?;
        Ok(())
    }

    /// Deletes the collection records matched by the filter.
    ///
    /// # Errors
    ///
    /// A filter is mandatory: its absence is a precondition error raised
    /// before any network call. Transport failures and non-200 statuses
    /// surface as errors.
    pub fn delete_data(&self, collection_id: &str, filter: Option<&Query>) -> Result<()> {
        let request = Request::delete_matching(collection_path(collection_id), filter)?;
        self.dispatch(request)?;
        Ok(())
    }
}
