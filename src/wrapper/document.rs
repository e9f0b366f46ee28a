//! The document lifecycle controller.
//!
//! A render is bracketed by [`DocumentWrapper::start`] and
//! [`DocumentWrapper::end`]: `start` seeds the workbook (empty or from a
//! template file) and applies the properties bag, the template layer then
//! fills sheets through [`DocumentWrapper::book_mut`], and `end` picks a
//! writer and streams the serialized document. `end` always clears the
//! in-progress workbook, even when serialization fails.

use crate::error::SheetError;
use crate::loader::TemplateLoader;
use crate::reader;
use crate::wrapper::properties::{self, RenderParameters};
use crate::RenderContext;
use serde::Deserialize;
use serde_json::{Map, Value};
use sheetpress_model::Book;
use sheetpress_write::{write_book, Format, WriterOptions};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Deployment-level settings, typically deserialized from the host
/// application's configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Attributes {
    /// Substitute cached formula results in formats without live formulas.
    pub pre_calculate_formulas: bool,
    /// Spool serialized output through temporary files in this directory.
    /// Created on first use if missing.
    pub disk_caching_directory: Option<PathBuf>,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            pre_calculate_formulas: true,
            disk_caching_directory: None,
        }
    }
}

/// Drives one document render from `start` to `end`.
#[derive(Debug)]
pub struct DocumentWrapper {
    context: RenderContext,
    loader: TemplateLoader,
    attributes: Attributes,
    book: Option<Book>,
    parameters: RenderParameters,
}

impl DocumentWrapper {
    pub fn new(context: RenderContext, loader: TemplateLoader, attributes: Attributes) -> Self {
        Self {
            context,
            loader,
            attributes,
            book: None,
            parameters: RenderParameters::default(),
        }
    }

    /// Opens a document and applies the properties bag.
    ///
    /// When the bag carries a `template` property, that path is resolved
    /// through the namespace registry and the referenced workbook seeds the
    /// document; otherwise the document starts empty. Properties are applied
    /// after seeding, so explicit metadata overrides whatever the template
    /// carried.
    pub fn start(&mut self, properties: &Map<String, Value>) -> Result<(), SheetError> {
        self.parameters = RenderParameters::default();

        let mut book = match properties.get("template") {
            Some(value) => {
                let template = value
                    .as_str()
                    .ok_or_else(|| SheetError::property("template", "expected a string"))?;
                let path = self.loader.resolve(template);
                reader::load_book(&path)?
            }
            None => Book::new(),
        };

        properties::apply(&mut book, &mut self.parameters, properties)?;
        self.book = Some(book);
        Ok(())
    }

    /// The in-progress workbook, if a render is open.
    pub fn book(&self) -> Option<&Book> {
        self.book.as_ref()
    }

    pub fn book_mut(&mut self) -> Option<&mut Book> {
        self.book.as_mut()
    }

    /// Replaces the in-progress workbook, opening a render if none is.
    pub fn set_book(&mut self, book: Book) {
        self.book = Some(book);
    }

    /// Closes the document and serializes it to `out`.
    ///
    /// The output format is the `format` property if one was given, else the
    /// format the request context carries, else xlsx. An unrecognized format
    /// is an error even when no render is open; `end` without a matching
    /// `start` is otherwise a no-op. The in-progress workbook and the render
    /// parameters are cleared before the writer runs.
    pub fn end(&mut self, out: &mut dyn Write) -> Result<(), SheetError> {
        let format_name = self
            .parameters
            .format
            .clone()
            .or_else(|| self.context.request_format().map(str::to_string))
            .unwrap_or_else(|| Format::default().to_string());
        self.parameters = RenderParameters::default();
        let book = self.book.take();

        // Parse after clearing, so a failed render never leaks its document
        // into the next one, and an unknown format errors even with nothing
        // to serialize.
        let format: Format = format_name.parse()?;
        let Some(book) = book else {
            log::debug!("end without an open document, nothing to serialize");
            return Ok(());
        };

        let options = WriterOptions {
            pre_calculate_formulas: self.attributes.pre_calculate_formulas,
            disk_cache_dir: self.prepare_cache_dir()?,
        };

        let writer = sheetpress_write::for_format(format).map_err(SheetError::Write)?;
        write_book(writer.as_ref(), &book, &options, out)?;
        Ok(())
    }

    fn prepare_cache_dir(&self) -> Result<Option<PathBuf>, SheetError> {
        let Some(dir) = &self.attributes.disk_caching_directory else {
            return Ok(None);
        };
        if !dir.is_dir() {
            fs::create_dir_all(dir)
                .map_err(|e| SheetError::Cache(format!("{}: {e}", dir.display())))?;
        }
        Ok(Some(dir.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wrapper() -> DocumentWrapper {
        DocumentWrapper::new(
            RenderContext::new(),
            TemplateLoader::new(),
            Attributes::default(),
        )
    }

    fn bag(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_attributes_deserialize_with_defaults() {
        let attributes: Attributes = serde_json::from_value(json!({})).unwrap();
        assert!(attributes.pre_calculate_formulas);
        assert!(attributes.disk_caching_directory.is_none());

        let attributes: Attributes = serde_json::from_value(json!({
            "pre_calculate_formulas": false,
            "disk_caching_directory": "/tmp/spool",
        }))
        .unwrap();
        assert!(!attributes.pre_calculate_formulas);
        assert_eq!(
            attributes.disk_caching_directory,
            Some(PathBuf::from("/tmp/spool"))
        );
    }

    #[test]
    fn test_start_opens_an_empty_document() {
        let mut wrapper = wrapper();
        assert!(wrapper.book().is_none());

        wrapper.start(&bag(json!({"title": "Report"}))).unwrap();
        let book = wrapper.book().unwrap();
        assert_eq!(book.sheet_count(), 0);
        assert_eq!(book.metadata().title.as_deref(), Some("Report"));
    }

    #[test]
    fn test_end_without_start_is_a_no_op() {
        let mut wrapper = wrapper();
        let mut out = Vec::new();
        wrapper.end(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_end_rejects_unknown_format_even_without_start() {
        let mut context_wrapper = DocumentWrapper::new(
            RenderContext::new().with_request_format("docx"),
            TemplateLoader::new(),
            Attributes::default(),
        );
        let mut out = Vec::new();
        let result = context_wrapper.end(&mut out);
        assert!(matches!(result, Err(SheetError::UnknownFormat(_))));
    }

    #[test]
    fn test_end_clears_the_document() {
        let mut wrapper = wrapper();
        wrapper
            .start(&bag(json!({"format": "nonsense"})))
            .unwrap();
        wrapper.book_mut().unwrap().add_sheet("Data");

        let mut out = Vec::new();
        // The bad format surfaces before any bytes are written...
        assert!(wrapper.end(&mut out).is_err());
        assert!(out.is_empty());
        // ...and the document is still gone afterwards.
        assert!(wrapper.book().is_none());

        // A later end falls back to the default, with nothing to write.
        wrapper.end(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_format_property_beats_request_format() {
        let mut wrapper = DocumentWrapper::new(
            RenderContext::new().with_request_format("xlsx"),
            TemplateLoader::new(),
            Attributes::default(),
        );
        wrapper.start(&bag(json!({"format": "csv"}))).unwrap();
        if let Some(book) = wrapper.book_mut() {
            book.add_sheet("Data").set_value(0, 0, "hello");
        }

        let mut out = Vec::new();
        wrapper.end(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().trim(), "hello");
    }

    #[test]
    fn test_format_parameter_does_not_leak_into_next_render() {
        let mut wrapper = wrapper();
        wrapper.start(&bag(json!({"format": "csv"}))).unwrap();
        let mut out = Vec::new();
        wrapper.end(&mut out).unwrap();

        // Second render without a format property serializes as xlsx (zip).
        wrapper.start(&bag(json!({}))).unwrap();
        wrapper.book_mut().unwrap().add_sheet("Data");
        let mut out = Vec::new();
        wrapper.end(&mut out).unwrap();
        assert_eq!(&out[..2], b"PK");
    }

    #[test]
    fn test_missing_cache_directory_is_created() {
        let root = tempfile::tempdir().unwrap();
        let cache = root.path().join("spool/deep");
        let mut wrapper = DocumentWrapper::new(
            RenderContext::new(),
            TemplateLoader::new(),
            Attributes {
                pre_calculate_formulas: true,
                disk_caching_directory: Some(cache.clone()),
            },
        );

        wrapper.start(&bag(json!({"format": "csv"}))).unwrap();
        wrapper.book_mut().unwrap().add_sheet("Data").set_value(0, 0, 1.0);

        let mut out = Vec::new();
        wrapper.end(&mut out).unwrap();
        assert!(cache.is_dir());
        assert_eq!(String::from_utf8(out).unwrap().trim(), "1");
    }
}
