//! ZIP archive helpers for Office Open XML workbooks.
//! Provides lookup of archive entries and XML readers over them, plus a
//! writer-side helper for storing XML parts.

use crate::error::ReducerError;
use crate::helpers::xml::XmlReader;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use zip::read::ZipFile;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;

/// Helper trait for reading entries out of a ZIP archive
pub(crate) trait ZipHelper<RS: Read + Seek> {
    /// Gets a file from the archive by name (case-insensitive, path separator agnostic)
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, ReducerError>;

    /// Creates an XML reader for a file within the archive
    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, ReducerError>;
}

impl<RS: Read + Seek> ZipHelper<RS> for ZipArchive<RS> {
    fn file(&'_ mut self, name: &str) -> Result<Option<ZipFile<'_, RS>>, ReducerError> {
        let pattern = name.replace('\\', "/");
        let path = self.file_names()
            .find(|file_name| pattern.eq_ignore_ascii_case(file_name))
            .map(|file_name| file_name.to_owned());
        match path.map(|file_name| self.by_name(&file_name)).transpose() {
            Ok(Some(file)) => Ok(Some(file)),
            Ok(None) | Err(ZipError::FileNotFound) => Ok(None),
            Err(error) => Err(error)?,
        }
    }

    fn xml_reader(
        &'_ mut self,
        name: &str,
    ) -> Result<Option<XmlReader<BufReader<ZipFile<'_, RS>>>>, ReducerError> {
        let reader = self
            .file(name)?
            .map(|file| XmlReader::new(BufReader::new(file)));
        Ok(reader)
    }
}

/// Helper trait for writing XML parts into a ZIP archive
pub(crate) trait ZipWriterHelper {
    /// Stores a deflated part under the given archive path
    fn put(&mut self, name: &str, content: &[u8]) -> Result<(), ReducerError>;
}

impl<W: Write + Seek> ZipWriterHelper for ZipWriter<W> {
    fn put(&mut self, name: &str, content: &[u8]) -> Result<(), ReducerError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.start_file(name, options)?;
        self.write_all(content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer.put("xl/workbook.xml", b"<workbook/>").unwrap();
        let cursor = writer.finish().unwrap();

        let mut archive = ZipArchive::new(cursor).unwrap();
        let mut content = String::new();
        archive.file("XL\\Workbook.xml").unwrap().unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "<workbook/>");
        assert!(archive.file("xl/styles.xml").unwrap().is_none());
    }
}
