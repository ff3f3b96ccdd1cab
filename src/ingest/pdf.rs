//! PDF 텍스트 추출 모듈
//!
//! pdf-extract 크레이트로 PDF 본문을 추출하고, 페이지 경계를 빈 줄로
//! 바꿔 청킹 단계에 넘깁니다.

use std::path::Path;

use anyhow::{Context, Result};

/// PDF에서 전체 텍스트 추출
///
/// 페이지 경계(폼피드)는 빈 줄로 치환됩니다. 스캔 문서처럼 텍스트가
/// 없는 PDF는 빈 문자열을 돌려줍니다.
pub fn extract_text_from_pdf(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read PDF: {:?}", path))?;

    let text = pdf_extract::extract_text_from_mem(&bytes)
        .with_context(|| format!("Failed to extract text from PDF: {:?}", path))?;

    if text.trim().is_empty() {
        tracing::warn!(
            "No text extracted from PDF: {:?}. It might be a scanned document.",
            path
        );
        return Ok(String::new());
    }

    Ok(join_pages(&text))
}

/// 폼피드로 나뉜 페이지를 빈 줄 경계로 합침
fn join_pages(text: &str) -> String {
    text.split('\x0c')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

// ============================================================================
// Tests
// ============================================================================
