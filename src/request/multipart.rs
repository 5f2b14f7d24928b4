//! Streaming `multipart/form-data` bodies for file uploads.
//!
//! The body is a chain of readers (part header, file content, trailer), so
//! large files are never buffered in memory.

use std::fs::File;
use std::io::{Cursor, Read, Seek, SeekFrom};

use crate::error::{Result, SolriumError};
use crate::request::FileUpload;

/// A readable multipart body with a known length.
pub struct MultipartBody {
    reader: Box<dyn Read + Send>,
    len: u64,
}

impl MultipartBody {
    /// Open the upload and assemble the body around it.
    ///
    /// Paths are opened here and closed when the body is dropped. For
    /// caller-owned handles a cloned handle is rewound and read; the
    /// caller's handle stays open.
    pub fn open(upload: &FileUpload, boundary: &str) -> Result<Self> {
        let mut file = match upload {
            FileUpload::Path(path) => File::open(path).map_err(|e| {
                SolriumError::file_access(format!("Cannot open '{}': {e}", path.display()))
            })?,
            FileUpload::Handle { file, name } => {
                let mut clone = file.try_clone().map_err(|e| {
                    SolriumError::file_access(format!("Cannot clone handle for '{name}': {e}"))
                })?;
                clone.seek(SeekFrom::Start(0))?;
                clone
            }
        };
        let content_len = file.metadata()?.len();
        // keep the handle positioned at the start for reading
        file.seek(SeekFrom::Start(0))?;

        let head = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            upload.file_name().replace('"', "\\\"")
        )
        .into_bytes();
        let tail = format!("\r\n--{boundary}--\r\n").into_bytes();
        let len = head.len() as u64 + content_len + tail.len() as u64;

        let reader = Cursor::new(head).chain(file).chain(Cursor::new(tail));
        Ok(MultipartBody {
            reader: Box::new(reader),
            len,
        })
    }

    /// Total body length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consume the body into a boxed reader.
    pub fn into_reader(self) -> Box<dyn Read + Send> {
        self.reader
    }
}

impl Read for MultipartBody {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.reader.read(buf)
    }
}

impl std::fmt::Debug for MultipartBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartBody").field("len", &self.len).finish()
    }
}
