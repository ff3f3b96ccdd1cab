//! 재정 정보 집계 모듈
//!
//! 메인 입학 페이지의 재정 섹션에 링크된 페이지에서 수확한 재정 노트를
//! 합칩니다. 링크 추종 자격 판정은 호출자 몫이고, 집계 자체는 무조건
//! 수행됩니다.

use crate::extract::patterns::{contains_any, FINANCIAL_HARVEST_KEYWORDS, SECTION_SEPARATOR};
use crate::extract::PageExtraction;

/// 링크된 페이지에서 수확하는 최대 줄 수
const MAX_HARVEST_LINES: usize = 20;
/// 수확 대상 줄의 최소 길이
const MIN_HARVEST_LINE_LEN: usize = 10;

// ============================================================================
// Linked Financial Note
// ============================================================================

/// 링크된 페이지에서 가져온 재정 노트
#[derive(Debug, Clone)]
pub struct LinkedFinancialNote {
    pub source_title: String,
    pub source_url: String,
    pub text: String,
}

impl LinkedFinancialNote {
    /// 출처를 밝힌 본문으로 변환
    pub fn render(&self) -> String {
        format!(
            "From {} ({}):\n{}",
            self.source_title, self.source_url, self.text
        )
    }
}

// ============================================================================
// Aggregation
// ============================================================================

/// 링크 추종 대상이 되는 메인 입학 페이지인지 판정
pub fn is_main_admissions_page(title: &str) -> bool {
    let lower = title.to_lowercase();
    lower.contains("main") && lower.contains("admissions")
}

/// 재정 노트를 기본 추출 결과에 합침
///
/// 노트가 없으면 입력을 그대로 돌려줍니다. 다른 필드는 변경되지 않습니다.
pub fn aggregate(mut extraction: PageExtraction, notes: &[LinkedFinancialNote]) -> PageExtraction {
    if notes.is_empty() {
        return extraction;
    }

    let rendered: Vec<String> = notes.iter().map(LinkedFinancialNote::render).collect();
    let combined = rendered.join(SECTION_SEPARATOR);

    extraction.financial_info = match extraction.financial_info.take() {
        Some(existing) => Some(format!("{}{}{}", existing, SECTION_SEPARATOR, combined)),
        None => Some(combined),
    };
    extraction
}

/// 재정 섹션이 없는 링크 페이지의 본문에서 재정 관련 줄을 수확
///
/// 키워드를 포함한 충분히 긴 줄만 모으며, 상한을 넘으면 잘라냅니다.
pub fn harvest_financial_lines(content: &str) -> Option<String> {
    let relevant: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| {
            line.chars().count() > MIN_HARVEST_LINE_LEN
                && contains_any(&line.to_lowercase(), FINANCIAL_HARVEST_KEYWORDS)
        })
        .take(MAX_HARVEST_LINES)
        .collect();

    if relevant.is_empty() {
        None
    } else {
        Some(relevant.join("\n"))
    }
}

// ============================================================================
// Tests
// ============================================================================
