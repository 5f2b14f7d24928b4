//! Buffered deletes by id and by query.
//!
//! Works like [`BufferedAdd`](crate::plugin::BufferedAdd): directives are
//! buffered in order and sent in batches of `buffer_size`, one update
//! request per batch.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::debug;

use crate::client::Client;
use crate::error::{Result, SolriumError};
use crate::event::{DeleteDirective, Event};
use crate::query::update::RequestFormat;
use crate::query::{UpdateQuery, UpdateResult};

use super::buffered_add::DEFAULT_BUFFER_SIZE;

#[derive(Debug)]
pub struct BufferedDelete {
    client: Arc<Client>,
    buffer: Vec<DeleteDirective>,
    buffer_size: usize,
    endpoint: Option<String>,
    request_format: RequestFormat,
    dispatch_events: bool,
}

impl BufferedDelete {
    pub fn new(client: Arc<Client>) -> Self {
        BufferedDelete {
            client,
            buffer: Vec::new(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            endpoint: None,
            request_format: RequestFormat::default(),
            dispatch_events: true,
        }
    }

    pub fn with_buffer_size(mut self, size: usize) -> Result<Self> {
        self.set_buffer_size(size)?;
        Ok(self)
    }

    pub fn set_buffer_size(&mut self, size: usize) -> Result<Option<UpdateResult>> {
        if size == 0 {
            return Err(SolriumError::invalid_argument("Buffer size must be at least 1"));
        }
        self.buffer_size = size;
        if self.buffer.len() >= size {
            return self.flush();
        }
        Ok(None)
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    pub fn set_endpoint<S: Into<String>>(&mut self, key: S) -> &mut Self {
        self.endpoint = Some(key.into());
        self
    }

    pub fn set_request_format(&mut self, format: RequestFormat) -> &mut Self {
        self.request_format = format;
        self
    }

    pub fn directives(&self) -> &[DeleteDirective] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn add_delete_by_id<S: Into<String>>(&mut self, id: S) -> Result<Option<UpdateResult>> {
        self.add(DeleteDirective::Id(id.into()))
    }

    pub fn add_delete_by_ids<I, S>(&mut self, ids: I) -> Result<Vec<UpdateResult>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut results = Vec::new();
        for id in ids {
            if let Some(result) = self.add_delete_by_id(id)? {
                results.push(result);
            }
        }
        Ok(results)
    }

    pub fn add_delete_by_query<S: Into<String>>(&mut self, query: S) -> Result<Option<UpdateResult>> {
        self.add(DeleteDirective::Query(query.into()))
    }

    fn add(&mut self, directive: DeleteDirective) -> Result<Option<UpdateResult>> {
        if self.dispatch_events {
            self.client
                .events()
                .dispatch(&Event::BufferedDeleteAdd { directive: &directive });
        }
        self.buffer.push(directive);
        if self.buffer.len() >= self.buffer_size {
            return self.flush();
        }
        Ok(None)
    }

    /// Consecutive ids go into one delete command; order is kept.
    fn update_query(&self, with_commit: bool) -> UpdateQuery {
        let mut query = UpdateQuery::new();
        query.set_request_format(self.request_format);
        let mut ids: Vec<String> = Vec::new();
        for directive in &self.buffer {
            match directive {
                DeleteDirective::Id(id) => ids.push(id.clone()),
                DeleteDirective::Query(q) => {
                    if !ids.is_empty() {
                        query.add_delete_by_ids(std::mem::take(&mut ids));
                    }
                    query.add_delete_by_query(q.as_str());
                }
            }
        }
        if !ids.is_empty() {
            query.add_delete_by_ids(ids);
        }
        if with_commit {
            query.add_commit();
        }
        query
    }

    fn send(&self, query: &UpdateQuery) -> Result<UpdateResult> {
        match &self.endpoint {
            Some(key) => self.client.update_on(query, key),
            None => self.client.update(query),
        }
    }

    /// Send the buffered directives; `None` when the buffer is empty.
    pub fn flush(&mut self) -> Result<Option<UpdateResult>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        if self.dispatch_events {
            self.client
                .events()
                .dispatch(&Event::BufferedDeletePreFlush { buffer: &self.buffer });
        }
        let result = self.send(&self.update_query(false))?;
        debug!(directives = self.buffer.len(), "Flushed delete buffer");
        self.buffer.clear();
        if self.dispatch_events {
            self.client
                .events()
                .dispatch(&Event::BufferedDeletePostFlush { result: &result });
        }
        Ok(Some(result))
    }

    /// Send the remaining directives and a commit in one request.
    pub fn commit(&mut self) -> Result<UpdateResult> {
        if self.dispatch_events {
            self.client
                .events()
                .dispatch(&Event::BufferedDeletePreCommit { buffer: &self.buffer });
        }
        let result = self.send(&self.update_query(true))?;
        debug!(directives = self.buffer.len(), "Committed delete buffer");
        self.buffer.clear();
        if self.dispatch_events {
            self.client
                .events()
                .dispatch(&Event::BufferedDeletePostCommit { result: &result });
        }
        Ok(result)
    }
}

/// [`BufferedDelete`] without event dispatching.
#[derive(Debug)]
pub struct BufferedDeleteLite(BufferedDelete);

impl BufferedDeleteLite {
    pub fn new(client: Arc<Client>) -> Self {
        let mut inner = BufferedDelete::new(client);
        inner.dispatch_events = false;
        BufferedDeleteLite(inner)
    }

    pub fn with_buffer_size(mut self, size: usize) -> Result<Self> {
        self.0.set_buffer_size(size)?;
        Ok(self)
    }
}

impl Deref for BufferedDeleteLite {
    type Target = BufferedDelete;

    fn deref(&self) -> &BufferedDelete {
        &self.0
    }
}

impl DerefMut for BufferedDeleteLite {
    fn deref_mut(&mut self) -> &mut BufferedDelete {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Adapter;
    use crate::endpoint::Endpoint;
    use crate::event::EventKind;
    use crate::registry::QueryTypeRegistry;
    use crate::request::Request;
    use crate::response::Response;
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct Recorder {
        bodies: Mutex<Vec<String>>,
    }

    impl Adapter for Recorder {
        fn execute(&self, request: &Request, _endpoint: &Endpoint) -> Result<Response> {
            let body = String::from_utf8_lossy(request.raw_data().unwrap_or_default()).into_owned();
            self.bodies.lock().push(body);
            Ok(Response::ok(r#"{"responseHeader":{"status":0,"QTime":1}}"#))
        }
    }

    fn setup() -> (Arc<Client>, Arc<Recorder>) {
        let adapter = Arc::new(Recorder::default());
        let client = Client::with_registry(adapter.clone(), QueryTypeRegistry::with_defaults());
        client
            .add_endpoint(Endpoint::builder("local").core("books").build())
            .unwrap();
        (Arc::new(client), adapter)
    }

    #[test]
    fn test_order_is_kept() {
        let (client, adapter) = setup();
        let mut buffer = BufferedDelete::new(client);
        buffer.add_delete_by_ids(["1", "2"]).unwrap();
        buffer.add_delete_by_query("cat:obsolete").unwrap();
        buffer.add_delete_by_id("3").unwrap();
        buffer.commit().unwrap();

        let bodies = adapter.bodies.lock();
        assert_eq!(
            bodies[0],
            "<update><delete><id>1</id><id>2</id></delete>\
             <delete><query>cat:obsolete</query></delete>\
             <delete><id>3</id></delete><commit/></update>"
        );
    }

    #[test]
    fn test_auto_flush() {
        let (client, adapter) = setup();
        let flushed = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&flushed);
        client.events().subscribe(EventKind::BufferedDeletePreFlush, move |event| {
            if let Event::BufferedDeletePreFlush { buffer } = event {
                *counter.lock() += buffer.len();
            }
        });

        let mut buffer = BufferedDelete::new(Arc::clone(&client)).with_buffer_size(2).unwrap();
        let results = buffer.add_delete_by_ids(["1", "2", "3", "4", "5"]).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(buffer.len(), 1);
        assert_eq!(*flushed.lock(), 4);

        let mut lite = BufferedDeleteLite::new(client).with_buffer_size(2).unwrap();
        lite.add_delete_by_ids(["6", "7"]).unwrap();
        assert!(lite.flush().unwrap().is_none());
        assert_eq!(*flushed.lock(), 4);
        assert_eq!(adapter.bodies.lock().len(), 3);
    }
}
