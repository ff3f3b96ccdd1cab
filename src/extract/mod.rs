//! 입학 페이지 구조화 추출 모듈
//!
//! 렌더링된 페이지 텍스트 한 장을 받아 정리(normalize) 후 지원 요건 /
//! 마감일 / 연락처 / 재정 정보를 뽑아 `PageExtraction`으로 돌려줍니다.
//! 잘못된 페이지(오류 페이지, 제목 없음, 본문 부족)는 모든 필드가 빈
//! 결과로 조기 종료하며, 어떤 입력에도 실패하지 않습니다.

pub mod aggregate;
pub mod contact;
pub mod normalize;
pub mod patterns;
pub mod sections;

use serde::Serialize;

use contact::ContactExtractor;
use normalize::Normalizer;
use sections::{SectionClassifier, SectionConfig};

/// 오류 페이지로 판정하는 마커 (소문자 비교)
const ERROR_MARKERS: &[&str] = &[
    "the page you requested does not exist",
    "404",
    "page not found",
];
/// 유효 페이지의 최소 제목 길이
const MIN_TITLE_LEN: usize = 5;
/// 정리 후 본문의 최소 길이
const MIN_CONTENT_LEN: usize = 50;

// ============================================================================
// Page Types
// ============================================================================

/// 렌더링된 원본 페이지
///
/// 외부 수집기가 생성하며, 분류 1회당 한 번 소비됩니다.
/// 내비게이션/스크립트/스타일은 DOM 단계에서 이미 제거된 상태입니다.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub url: String,
    pub title: String,
    pub text: String,
}

/// 페이지 한 장의 구조화 추출 결과
///
/// 페이지가 유효하지 않으면 모든 필드가 `None`입니다 (부분 결과 없음).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageExtraction {
    pub content: Option<String>,
    pub requirements: Option<String>,
    pub deadlines: Option<String>,
    pub contact_info: Option<String>,
    pub financial_info: Option<String>,
}

impl PageExtraction {
    /// 모든 필드가 빈 결과
    pub fn empty() -> Self {
        Self::default()
    }

    /// 본문조차 없는 결과인지
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }
}

// ============================================================================
// Admissions Extractor
// ============================================================================

/// 페이지 단위 추출기 (정리기 + 분류기 + 연락처 추출기)
pub struct AdmissionsExtractor {
    normalizer: Normalizer,
    classifier: SectionClassifier,
    contacts: ContactExtractor,
}

impl AdmissionsExtractor {
    /// 분류기 설정으로 생성
    pub fn new(config: SectionConfig) -> Self {
        Self {
            normalizer: Normalizer::new(),
            classifier: SectionClassifier::new(config),
            contacts: ContactExtractor::new(),
        }
    }

    /// 기본 설정으로 생성
    pub fn with_defaults() -> Self {
        Self::new(SectionConfig::default())
    }

    /// 페이지 한 장을 추출
    pub fn extract_page(&self, page: &RawPage) -> PageExtraction {
        if is_error_page(&page.text) {
            tracing::warn!("Error page detected: {}", page.url);
            return PageExtraction::empty();
        }

        if page.title.trim().chars().count() < MIN_TITLE_LEN {
            tracing::warn!("Page appears invalid (no title): {}", page.url);
            return PageExtraction::empty();
        }

        let cleaned = self.normalizer.normalize(&page.text);
        if cleaned.chars().count() < MIN_CONTENT_LEN {
            tracing::warn!("Skipping page with too little content: {}", page.url);
            return PageExtraction::empty();
        }

        let requirements = self.classifier.extract_requirements(&cleaned);
        let deadlines = self.classifier.extract_deadlines(&cleaned);
        let financial_info = self.classifier.extract_financial(&cleaned);
        let contact_info = self
            .contacts
            .extract(&cleaned, &page.url)
            .and_then(|r| r.render());

        PageExtraction {
            content: Some(cleaned),
            requirements,
            deadlines,
            contact_info,
            financial_info,
        }
    }

    /// 정리만 수행 (분류 없이)
    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }
}

impl Default for AdmissionsExtractor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// 오류 페이지 여부
fn is_error_page(text: &str) -> bool {
    let lower = text.to_lowercase();
    ERROR_MARKERS.iter().any(|m| lower.contains(m))
}

// ============================================================================
// Tests
// ============================================================================
