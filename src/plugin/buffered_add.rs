//! Buffered document indexing.
//!
//! [`BufferedAdd`] collects documents and sends them in batches of
//! `buffer_size` documents, one update request per batch. The buffer never
//! holds more than `buffer_size` documents: adding the document that fills
//! it sends the batch. [`BufferedAdd::commit`] sends whatever is left
//! together with a commit in a single request.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use solrium::client::Client;
//! use solrium::document::Document;
//! use solrium::plugin::BufferedAdd;
//!
//! let client = Arc::new(Client::http().unwrap());
//! let mut buffer = BufferedAdd::new(client).with_buffer_size(500).unwrap();
//! for i in 0..1200 {
//!     buffer.add_document(Document::builder().field("id", i).build()).unwrap();
//! }
//! buffer.commit().unwrap();
//! ```

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use tracing::debug;

use crate::client::Client;
use crate::document::Document;
use crate::error::{Result, SolriumError};
use crate::event::Event;
use crate::query::update::{CommitCommand, RequestFormat};
use crate::query::{UpdateQuery, UpdateResult};

pub const DEFAULT_BUFFER_SIZE: usize = 100;

#[derive(Debug)]
pub struct BufferedAdd {
    client: Arc<Client>,
    buffer: Vec<Document>,
    buffer_size: usize,
    overwrite: Option<bool>,
    commit_within: Option<u32>,
    endpoint: Option<String>,
    request_format: RequestFormat,
    commit: CommitCommand,
    dispatch_events: bool,
}

impl BufferedAdd {
    pub fn new(client: Arc<Client>) -> Self {
        BufferedAdd {
            client,
            buffer: Vec::with_capacity(DEFAULT_BUFFER_SIZE),
            buffer_size: DEFAULT_BUFFER_SIZE,
            overwrite: None,
            commit_within: None,
            endpoint: None,
            request_format: RequestFormat::default(),
            commit: CommitCommand::default(),
            dispatch_events: true,
        }
    }

    pub fn with_buffer_size(mut self, size: usize) -> Result<Self> {
        self.set_buffer_size(size)?;
        Ok(self)
    }

    /// Change the buffer size; a buffer already holding that many
    /// documents is flushed.
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

    pub fn set_overwrite(&mut self, overwrite: Option<bool>) -> &mut Self {
        self.overwrite = overwrite;
        self
    }

    pub fn set_commit_within(&mut self, millis: Option<u32>) -> &mut Self {
        self.commit_within = millis;
        self
    }

    /// Send batches to this endpoint instead of the client's default.
    pub fn set_endpoint<S: Into<String>>(&mut self, key: S) -> &mut Self {
        self.endpoint = Some(key.into());
        self
    }

    pub fn set_request_format(&mut self, format: RequestFormat) -> &mut Self {
        self.request_format = format;
        self
    }

    /// Options of the commit sent by [`BufferedAdd::commit`].
    pub fn set_commit_options(
        &mut self,
        soft_commit: Option<bool>,
        wait_searcher: Option<bool>,
        expunge_deletes: Option<bool>,
    ) -> &mut Self {
        self.commit = CommitCommand {
            soft_commit,
            wait_searcher,
            expunge_deletes,
        };
        self
    }

    pub fn documents(&self) -> &[Document] {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Drop buffered documents without sending them.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Buffer a document; returns the flush result when it filled the buffer.
    pub fn add_document(&mut self, document: Document) -> Result<Option<UpdateResult>> {
        if self.dispatch_events {
            self.client
                .events()
                .dispatch(&Event::BufferedAddAdd { document: &document });
        }
        self.buffer.push(document);
        if self.buffer.len() >= self.buffer_size {
            return self.flush();
        }
        Ok(None)
    }

    /// Buffer documents; returns the results of the flushes they caused.
    pub fn add_documents<I>(&mut self, documents: I) -> Result<Vec<UpdateResult>>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut results = Vec::new();
        for document in documents {
            if let Some(result) = self.add_document(document)? {
                results.push(result);
            }
        }
        Ok(results)
    }

    fn update_query(&self, with_commit: bool) -> UpdateQuery {
        let mut query = UpdateQuery::new();
        query.set_request_format(self.request_format);
        if !self.buffer.is_empty() {
            query.add_documents(self.buffer.iter().cloned(), self.overwrite, self.commit_within);
        }
        if with_commit {
            query.add_commit_with(
                self.commit.soft_commit,
                self.commit.wait_searcher,
                self.commit.expunge_deletes,
            );
        }
        query
    }

    fn send(&self, query: &UpdateQuery) -> Result<UpdateResult> {
        match &self.endpoint {
            Some(key) => self.client.update_on(query, key),
            None => self.client.update(query),
        }
    }

    /// Send the buffered documents in one update request. `None` when the
    /// buffer is empty. On failure the buffer is kept.
    pub fn flush(&mut self) -> Result<Option<UpdateResult>> {
        if self.buffer.is_empty() {
            return Ok(None);
        }
        if self.dispatch_events {
            self.client
                .events()
                .dispatch(&Event::BufferedAddPreFlush { buffer: &self.buffer });
        }
        let result = self.send(&self.update_query(false))?;
        debug!(documents = self.buffer.len(), "Flushed document buffer");
        self.buffer.clear();
        if self.dispatch_events {
            self.client
                .events()
                .dispatch(&Event::BufferedAddPostFlush { result: &result });
        }
        Ok(Some(result))
    }

    /// Send the remaining documents and a commit in one request.
    pub fn commit(&mut self) -> Result<UpdateResult> {
        if self.dispatch_events {
            self.client
                .events()
                .dispatch(&Event::BufferedAddPreCommit { buffer: &self.buffer });
        }
        let result = self.send(&self.update_query(true))?;
        debug!(documents = self.buffer.len(), "Committed document buffer");
        self.buffer.clear();
        if self.dispatch_events {
            self.client
                .events()
                .dispatch(&Event::BufferedAddPostCommit { result: &result });
        }
        Ok(result)
    }
}

/// [`BufferedAdd`] without event dispatching.
#[derive(Debug)]
pub struct BufferedAddLite(BufferedAdd);

impl BufferedAddLite {
    pub fn new(client: Arc<Client>) -> Self {
        let mut inner = BufferedAdd::new(client);
        inner.dispatch_events = false;
        BufferedAddLite(inner)
    }

    pub fn with_buffer_size(mut self, size: usize) -> Result<Self> {
        self.0.set_buffer_size(size)?;
        Ok(self)
    }
}

impl Deref for BufferedAddLite {
    type Target = BufferedAdd;

    fn deref(&self) -> &BufferedAdd {
        &self.0
    }
}

impl DerefMut for BufferedAddLite {
    fn deref_mut(&mut self) -> &mut BufferedAdd {
        &mut self.0
    }
}
