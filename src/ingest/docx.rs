//! DOCX 텍스트 추출 모듈
//!
//! docx-rs 크레이트로 Word 문서의 문단 텍스트를 추출합니다. 문단은
//! 줄바꿈으로 이어 청킹 단계에 넘깁니다.

use std::path::Path;

use anyhow::{Context, Result};
use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};

/// DOCX에서 전체 텍스트 추출
///
/// 본문 문단만 읽으며, 빈 문단은 건너뜁니다. 텍스트가 전혀 없는
/// 문서는 빈 문자열을 돌려줍니다.
pub fn extract_text_from_docx(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read DOCX: {:?}", path))?;

    let docx = read_docx(&bytes)
        .with_context(|| format!("Failed to parse DOCX: {:?}", path))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(paragraph) => {
                let text = paragraph_text(paragraph);
                (!text.is_empty()).then_some(text)
            }
            _ => None,
        })
        .collect();

    if paragraphs.is_empty() {
        tracing::warn!("No text extracted from DOCX: {:?}", path);
        return Ok(String::new());
    }

    Ok(paragraphs.join("\n"))
}

/// 문단 내 모든 런의 텍스트를 이어붙임
fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();

    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(text) = run_child {
                    out.push_str(&text.text);
                }
            }
        }
    }

    out.trim().to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Run};

    fn write_docx(path: &Path, paragraphs: &[&str]) {
        let file = std::fs::File::create(path).expect("create");
        let mut docx = Docx::new();
        for text in paragraphs {
            docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*text)));
        }
        docx.build().pack(file).expect("pack");
    }

    #[test]
    fn test_extract_docx_joins_paragraphs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("checklist.docx");
        write_docx(
            &path,
            &[
                "Admission Checklist",
                "Submit transcripts from every school attended.",
            ],
        );

        let text = extract_text_from_docx(&path).expect("extract");
        assert_eq!(
            text,
            "Admission Checklist\nSubmit transcripts from every school attended."
        );
    }

    #[test]
    fn test_extract_docx_skips_empty_paragraphs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sparse.docx");
        write_docx(&path, &["First line.", "", "Second line."]);

        let text = extract_text_from_docx(&path).expect("extract");
        assert_eq!(text, "First line.\nSecond line.");
    }

    #[test]
    fn test_extract_docx_empty_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("blank.docx");
        write_docx(&path, &[]);

        let text = extract_text_from_docx(&path).expect("extract");
        assert!(text.is_empty());
    }
}
