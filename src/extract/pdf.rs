//! PDF text extraction: per-page content-stream text in ascending page
//! order. Same-page text items are joined with a single space, pages with a
//! newline. Layout is whatever the content stream encodes, not necessarily
//! visual reading order.

use lopdf::Document;
use tracing::info;

use super::ExtractionError;

/// Extracts the text of every page of a PDF held in memory.
///
/// Parsing is CPU-bound, so it runs on the blocking pool. A document that
/// cannot be parsed fails with [`ExtractionError::PdfParse`]; pages simply
/// containing no text contribute empty lines.
pub async fn extract_pdf_text(bytes: Vec<u8>) -> Result<String, ExtractionError> {
    tokio::task::spawn_blocking(move || extract_pdf_text_sync(&bytes))
        .await
        .map_err(|e| ExtractionError::PdfParse(e.to_string()))?
}

fn extract_pdf_text_sync(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc =
        Document::load_mem(bytes).map_err(|e| ExtractionError::PdfParse(e.to_string()))?;

    // get_pages returns a BTreeMap, so iteration is ascending page order.
    let pages = doc.get_pages();
    let page_count = pages.len();
    let mut page_texts = Vec::with_capacity(page_count);

    for (page_num, _page_id) in pages {
        let raw = doc
            .extract_text(&[page_num])
            .map_err(|e| ExtractionError::PdfParse(e.to_string()))?;
        page_texts.push(normalize_page_text(&raw));
    }

    info!("Extracted text from {} PDF pages", page_count);
    Ok(page_texts.join("\n"))
}

/// Collapses a page's text items onto one line with single-space joins.
fn normalize_page_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Document, Object, Stream, dictionary};

    fn single_page_pdf(text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 48.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().unwrap(),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[tokio::test]
    async fn extracts_text_from_generated_pdf() {
        let bytes = single_page_pdf("Hello World");
        let text = extract_pdf_text(bytes).await.unwrap();
        assert!(text.contains("Hello World"), "got: {:?}", text);
    }

    #[tokio::test]
    async fn garbage_bytes_fail_with_parse_error() {
        let err = extract_pdf_text(b"not a pdf at all".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::PdfParse(_)));
        assert!(err.to_string().starts_with("PDF parse failure"));
    }

    #[test]
    fn normalization_joins_items_with_single_spaces() {
        assert_eq!(normalize_page_text("CBC  Report\nWBC   5.4\n"), "CBC Report WBC 5.4");
        assert_eq!(normalize_page_text(""), "");
        assert_eq!(normalize_page_text("   \n  "), "");
    }
}
