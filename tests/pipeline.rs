//! Document extraction pipeline with fake PDF and OCR backends.

mod common;

use std::sync::Arc;

use docsift::config::ExtractionConfig;
use docsift::models::{DocumentResult, ExtractionMethod};
use docsift::ocr::ExtractionError;

use common::*;

#[test]
fn test_mixed_pdf_ocrs_only_the_short_page() {
    let p1 = long_text("Page one");
    let p3 = long_text("Page three");
    let ocr = Arc::new(ScriptedOcr::new("scanned page two"));
    let extractor = extractor(FakePdf::new(&[&p1, "short text", &p3]), ocr.clone());

    let result = extractor
        .extract(&pdf_document(b"%PDF-1.7 mixed"), &ExtractionConfig::default())
        .unwrap();

    assert_eq!(result.page_count, 3);
    assert_eq!(result.pages[0].method, ExtractionMethod::Native);
    assert_eq!(result.pages[1].method, ExtractionMethod::Ocr);
    assert_eq!(result.pages[1].text, "scanned page two");
    assert_eq!(result.pages[2].method, ExtractionMethod::Native);

    // Page 2 rendered at 2x: 100x20 points -> 200x40 pixels.
    assert_eq!(ocr.calls(), vec![(200, 40, "eng+ara".to_string())]);

    let expected = format!(
        "\n\n=== Page 1 ===\n\n{}\n\n=== Page 2 ===\n\nscanned page two\n\n=== Page 3 ===\n\n{}",
        p1, p3
    );
    assert_eq!(result.concatenated_text, expected);
    assert_eq!(result.source_metadata.format.as_deref(), Some("PDF-1.7"));
}

#[test]
fn test_markers_are_ascending_and_pages_numbered() {
    let texts: Vec<String> = (1..=5).map(|n| long_text(&format!("Page {}", n))).collect();
    let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let extractor = extractor(FakePdf::new(&refs), Arc::new(PanicOcr));

    let result = extractor
        .extract(&pdf_document(b"%PDF"), &ExtractionConfig::default())
        .unwrap();

    let mut last = 0;
    for n in 1..=5u32 {
        let pos = result
            .concatenated_text
            .find(&DocumentResult::page_marker(n))
            .unwrap();
        assert!(n == 1 || pos > last);
        last = pos;
        assert_eq!(result.pages[(n - 1) as usize].page_number, n);
    }
}

#[test]
fn test_exactly_threshold_skips_ocr() {
    let fifty = "x".repeat(50);
    let extractor = extractor(FakePdf::new(&[&fifty]), Arc::new(PanicOcr));

    let result = extractor
        .extract(&pdf_document(b"%PDF"), &ExtractionConfig::default())
        .unwrap();

    assert_eq!(result.pages[0].text, fifty);
    assert_eq!(result.pages[0].character_count, 50);
}

#[test]
fn test_padded_short_text_still_ocrs() {
    let padded = format!("   {}   ", "y".repeat(49));
    let ocr = Arc::new(ScriptedOcr::new("recognized"));
    let extractor = extractor(FakePdf::new(&[&padded]), ocr.clone());

    let result = extractor
        .extract(&pdf_document(b"%PDF"), &ExtractionConfig::default())
        .unwrap();

    assert_eq!(result.pages[0].text, "recognized");
    assert_eq!(ocr.calls().len(), 1);
}

#[test]
fn test_ocr_disabled_keeps_short_native_text() {
    let config = ExtractionConfig {
        ocr_enabled: false,
        ..Default::default()
    };
    let extractor = extractor(FakePdf::new(&["tiny", ""]), Arc::new(PanicOcr));

    let result = extractor.extract(&pdf_document(b"%PDF"), &config).unwrap();

    assert_eq!(result.pages[0].text, "tiny");
    assert_eq!(result.pages[0].method, ExtractionMethod::Native);
    assert_eq!(result.pages[1].text, "");
    assert_eq!(result.pages[1].method, ExtractionMethod::Native);
}

#[test]
fn test_image_is_ocred_even_with_ocr_disabled() {
    let config = ExtractionConfig {
        ocr_enabled: false,
        ..Default::default()
    };
    let ocr = Arc::new(ScriptedOcr::new("Hello"));
    let extractor = extractor(FakePdf::default(), ocr.clone());

    let result = extractor.extract(&png_document(16, 8), &config).unwrap();

    assert_eq!(result.page_count, 1);
    assert_eq!(result.concatenated_text, "Hello");
    assert_eq!(result.pages[0].page_number, 1);
    assert_eq!(result.pages[0].character_count, 5);
    assert_eq!(result.pages[0].word_count, 1);
    assert_eq!(result.pages[0].method, ExtractionMethod::Ocr);
    assert_eq!(result.source_metadata, Default::default());
    // Images are recognized at their own resolution.
    assert_eq!(ocr.calls(), vec![(16, 8, "eng+ara".to_string())]);
}

#[test]
fn test_ocr_failure_degrades_one_page() {
    let p1 = long_text("Page one");
    let extractor = extractor(FakePdf::new(&[&p1, "", &p1]), Arc::new(FailingOcr));

    let result = extractor
        .extract(&pdf_document(b"%PDF"), &ExtractionConfig::default())
        .unwrap();

    assert_eq!(result.page_count, 3);
    assert_eq!(result.pages[1].text, "");
    assert_eq!(result.pages[1].character_count, 0);
    assert_eq!(result.pages[1].method, ExtractionMethod::Failed);
    assert_eq!(result.pages[2].method, ExtractionMethod::Native);
    assert!(result
        .concatenated_text
        .contains("\n\n=== Page 2 ===\n\n\n\n=== Page 3 ===\n\n"));
}

#[test]
fn test_unreadable_page_degrades() {
    let p = long_text("Body");
    let mut pdf = FakePdf::new(&[&p, &p]);
    pdf.unreadable = vec![1];
    let extractor = extractor(pdf, Arc::new(PanicOcr));

    let result = extractor
        .extract(&pdf_document(b"%PDF"), &ExtractionConfig::default())
        .unwrap();

    assert_eq!(result.pages[0].method, ExtractionMethod::Failed);
    assert_eq!(result.pages[1].text, p);
}

#[test]
fn test_image_ocr_failure_degrades() {
    let extractor = extractor(FakePdf::default(), Arc::new(FailingOcr));

    let result = extractor
        .extract(&png_document(4, 4), &ExtractionConfig::default())
        .unwrap();

    assert_eq!(result.page_count, 1);
    assert_eq!(result.concatenated_text, "");
    assert_eq!(result.pages[0].method, ExtractionMethod::Failed);
}

#[test]
fn test_unopenable_pdf_is_an_error() {
    let extractor = extractor(FakePdf::new(&["never read"]), Arc::new(PanicOcr));

    let err = extractor
        .extract(&pdf_document(BROKEN), &ExtractionConfig::default())
        .unwrap_err();

    assert!(matches!(err, ExtractionError::DocumentOpen(_)));
    assert!(err.is_document_fatal());
}

#[test]
fn test_corrupt_image_degrades_to_empty_page() {
    let doc = docsift::models::RawDocument::new(
        b"definitely not png data".to_vec(),
        docsift::models::DocumentFormat::Png,
        "cut.png",
    );
    let extractor = extractor(FakePdf::default(), Arc::new(PanicOcr));

    let mut seen = Vec::new();
    let result = extractor
        .extract_with_progress(&doc, &ExtractionConfig::default(), &mut |done: u32, total: u32| {
            seen.push((done, total))
        })
        .unwrap();

    assert_eq!(result.page_count, 1);
    assert_eq!(result.concatenated_text, "");
    assert_eq!(result.pages[0].method, ExtractionMethod::Failed);
    assert!(result.tables.is_empty());
    assert_eq!(seen, vec![(1, 1)]);
}

#[test]
fn test_missing_pdf_tool_fails_the_document() {
    let p = long_text("Body");
    let mut pdf = FakePdf::new(&[&p, &p]);
    pdf.tool_missing = true;
    let extractor = extractor(pdf, Arc::new(PanicOcr));

    let mut seen = Vec::new();
    let err = extractor
        .extract_with_progress(
            &pdf_document(b"%PDF"),
            &ExtractionConfig::default(),
            &mut |done: u32, total: u32| seen.push((done, total)),
        )
        .unwrap_err();

    assert!(matches!(err, ExtractionError::ToolNotFound(_)));
    assert!(err.is_document_fatal());
    assert!(seen.is_empty());
}

#[test]
fn test_progress_is_reported_in_page_order() {
    let p = long_text("Body");
    let extractor = extractor(FakePdf::new(&[&p, &p, &p]), Arc::new(PanicOcr));

    let mut seen = Vec::new();
    extractor
        .extract_with_progress(
            &pdf_document(b"%PDF"),
            &ExtractionConfig::default(),
            &mut |done: u32, total: u32| seen.push((done, total)),
        )
        .unwrap();

    assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
}

#[test]
fn test_tables_are_detected_per_page_and_collected() {
    let page = "Staff list\nName    Age    City\nAlice    30\nBob    25    Paris\nEnd of list";
    let extractor = extractor(FakePdf::new(&[page, page]), Arc::new(PanicOcr));

    let result = extractor
        .extract(&pdf_document(b"%PDF"), &ExtractionConfig::default())
        .unwrap();

    assert_eq!(result.pages[0].tables.len(), 1);
    let table = &result.pages[0].tables[0];
    assert_eq!(table.row_count, 3);
    assert_eq!(table.column_count, 3);
    assert_eq!(table.data[1], vec!["Alice", "30"]);
    assert_eq!(result.tables.len(), 2);
}

#[test]
fn test_tables_disabled() {
    let page = "Staff list\nName    Age    City\nAlice    30\nBob    25    Paris\nEnd of list";
    let config = ExtractionConfig {
        tables_enabled: false,
        ..Default::default()
    };
    let extractor = extractor(FakePdf::new(&[page]), Arc::new(PanicOcr));

    let result = extractor.extract(&pdf_document(b"%PDF"), &config).unwrap();

    assert!(result.pages[0].tables.is_empty());
    assert!(result.tables.is_empty());
}

#[test]
fn test_custom_language_and_scale_reach_the_engine() {
    let config = ExtractionConfig {
        language: "fra".to_string(),
        raster_scale: 3.0,
        ..Default::default()
    };
    let ocr = Arc::new(ScriptedOcr::new("bonjour"));
    let extractor = extractor(FakePdf::new(&[""]), ocr.clone());

    extractor.extract(&pdf_document(b"%PDF"), &config).unwrap();

    assert_eq!(ocr.calls(), vec![(300, 30, "fra".to_string())]);
}
