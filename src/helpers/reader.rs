use crate::error::ReducerError;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceReaderError {
    #[error("No data in uploaded file: '{0}'")]
    EmptySourceError(String),
}

/// Signature at the start of every ZIP container (xlsx, xlsm)
const ZIP_SIGNATURE: &[u8] = b"PK\x03\x04";

/// Signature of OLE compound files (legacy xls, password protected xlsx)
const CFB_SIGNATURE: &[u8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// A reader over either a local file or an uploaded byte buffer
pub(crate) enum SourceReader {
    /// Local file reader
    Local(BufReader<File>),
    /// Uploaded content kept in memory
    Memory(Cursor<Vec<u8>>),
}

impl SourceReader {
    /// Opens a local file for reading
    pub(crate) fn open(path: &Path) -> Result<SourceReader, ReducerError> {
        let file = File::open(path)?;
        Ok(SourceReader::Local(BufReader::new(file)))
    }

    /// Wraps an uploaded byte buffer, rejecting empty uploads
    pub(crate) fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<SourceReader, ReducerError> {
        if bytes.is_empty() {
            Err(SourceReaderError::EmptySourceError(name.to_owned()))?;
        }
        Ok(SourceReader::Memory(Cursor::new(bytes)))
    }

    /// Peeks at the first bytes and rewinds, used for format sniffing
    pub(crate) fn signature(&mut self) -> Result<Vec<u8>, ReducerError> {
        let mut buffer = [0u8; 8];
        let mut filled = 0usize;
        while filled < buffer.len() {
            let count = self.read(&mut buffer[filled..])?;
            if count == 0 {
                break;
            }
            filled += count;
        }
        self.rewind()?;
        Ok(buffer[..filled].to_vec())
    }

    /// Returns true if the content starts like a ZIP container
    pub(crate) fn is_zip(&mut self) -> Result<bool, ReducerError> {
        Ok(self.signature()?.starts_with(ZIP_SIGNATURE))
    }

    /// Returns true if the content is an OLE compound file
    pub(crate) fn is_compound_file(&mut self) -> Result<bool, ReducerError> {
        Ok(self.signature()?.starts_with(CFB_SIGNATURE))
    }
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            SourceReader::Local(reader) => reader.read(buf),
            SourceReader::Memory(reader) => reader.read(buf),
        }
    }
}

impl Seek for SourceReader {
    fn seek(&mut self, pos: std::io::SeekFrom) -> std::io::Result<u64> {
        match self {
            SourceReader::Local(reader) => reader.seek(pos),
            SourceReader::Memory(reader) => reader.seek(pos),
        }
    }
}
