use serde_json::{json, Map, Value};
use sheetpress::{Attributes, DocumentWrapper, Format, RenderContext, SheetError, TemplateLoader};

fn properties(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
}

fn render(wrapper: &mut DocumentWrapper, bag: Value) -> Result<Vec<u8>, SheetError> {
    wrapper.start(&properties(bag))?;
    if let Some(book) = wrapper.book_mut() {
        let sheet = book.add_sheet("Data");
        sheet.set_value(0, 0, "label");
        sheet.set_value(0, 1, 42.0);
    }
    let mut out = Vec::new();
    wrapper.end(&mut out)?;
    Ok(out)
}

#[test]
fn test_every_format_produces_its_container() {
    for format in Format::ALL {
        let mut wrapper = DocumentWrapper::new(
            RenderContext::new(),
            TemplateLoader::new(),
            Attributes::default(),
        );
        let out = render(&mut wrapper, json!({"format": format.extension()})).unwrap();
        assert!(!out.is_empty(), "{format} output is empty");

        match format {
            Format::Csv => assert_eq!(String::from_utf8(out).unwrap().trim(), "label,42"),
            Format::Ods | Format::Xlsx => assert_eq!(&out[..2], b"PK", "{format} is not a zip"),
            Format::Xls => assert_eq!(
                &out[..8],
                &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1],
                "xls is not a compound file"
            ),
            Format::Pdf => assert_eq!(&out[..5], b"%PDF-"),
        }
    }
}

#[test]
fn test_default_format_is_xlsx() {
    let mut wrapper = DocumentWrapper::new(
        RenderContext::new(),
        TemplateLoader::new(),
        Attributes::default(),
    );
    let out = render(&mut wrapper, json!({})).unwrap();

    use calamine::Reader;
    let mut workbook: calamine::Xlsx<_> =
        calamine::open_workbook_from_rs(std::io::Cursor::new(out)).unwrap();
    let range = workbook.worksheet_range("Data").unwrap();
    assert_eq!(range.get_value((0, 0)), Some(&calamine::Data::String("label".to_string())));
    assert_eq!(range.get_value((0, 1)), Some(&calamine::Data::Float(42.0)));
}

#[test]
fn test_request_format_applies_when_no_property_is_given() {
    let mut wrapper = DocumentWrapper::new(
        RenderContext::new().with_request_format("csv"),
        TemplateLoader::new(),
        Attributes::default(),
    );
    let out = render(&mut wrapper, json!({})).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().trim(), "label,42");
}

#[test]
fn test_format_property_overrides_request_format() {
    let mut wrapper = DocumentWrapper::new(
        RenderContext::new().with_request_format("pdf"),
        TemplateLoader::new(),
        Attributes::default(),
    );
    let out = render(&mut wrapper, json!({"format": "csv"})).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().trim(), "label,42");
}

#[test]
fn test_unknown_format_is_rejected() {
    let mut wrapper = DocumentWrapper::new(
        RenderContext::new(),
        TemplateLoader::new(),
        Attributes::default(),
    );
    let result = render(&mut wrapper, json!({"format": "docx"}));
    assert!(matches!(result, Err(SheetError::UnknownFormat(_))));
    // The failed render did not leak into the wrapper.
    assert!(wrapper.book().is_none());
}

#[test]
fn test_end_without_start_writes_nothing() {
    let mut wrapper = DocumentWrapper::new(
        RenderContext::new(),
        TemplateLoader::new(),
        Attributes::default(),
    );
    let mut out = Vec::new();
    wrapper.end(&mut out).unwrap();
    assert!(out.is_empty());
}

#[test]
fn test_disk_caching_spools_and_creates_directory() {
    let root = tempfile::tempdir().unwrap();
    let cache = root.path().join("render-cache");
    let mut wrapper = DocumentWrapper::new(
        RenderContext::new(),
        TemplateLoader::new(),
        Attributes {
            pre_calculate_formulas: true,
            disk_caching_directory: Some(cache.clone()),
        },
    );

    let out = render(&mut wrapper, json!({"format": "csv"})).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().trim(), "label,42");
    assert!(cache.is_dir());
}

#[test]
fn test_properties_reach_the_written_document() {
    let mut wrapper = DocumentWrapper::new(
        RenderContext::new(),
        TemplateLoader::new(),
        Attributes::default(),
    );
    wrapper
        .start(&properties(json!({
            "creator": "integration-test",
            "title": "Totals",
            "security": {"lock_structure": true},
        })))
        .unwrap();
    wrapper.book_mut().unwrap().add_sheet("Data").set_value(0, 0, 1.0);

    let book = wrapper.book().unwrap();
    assert_eq!(book.metadata().creator.as_deref(), Some("integration-test"));
    assert_eq!(book.metadata().title.as_deref(), Some("Totals"));
    assert!(book.security().lock_structure);

    let mut out = Vec::new();
    wrapper.end(&mut out).unwrap();
    assert_eq!(&out[..2], b"PK");
}
