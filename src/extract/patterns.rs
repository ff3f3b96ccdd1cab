//! 패턴 라이브러리
//!
//! 섹션 분류기와 연락처 추출기가 공유하는 키워드 목록과 정규식 모음입니다.
//! 정규식은 한 번만 컴파일하여 추출기 구조체에 보관합니다.

use regex::Regex;

// ============================================================================
// Keyword Constants
// ============================================================================

/// 섹션 구분자 (분류 결과를 합칠 때 사용)
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// 지원 요건 키워드
pub const REQUIREMENT_KEYWORDS: &[&str] = &[
    "requirement",
    "required",
    "gpa",
    "grade point average",
    "grades",
    "sat",
    "act",
    "gre",
    "gmat",
    "toefl",
    "ielts",
    "english proficiency",
    "transcript",
    "application",
    "prerequisite",
    "minimum",
    "bachelor",
    "degree",
    "coursework",
    "recommendation",
    "letter of recommendation",
    "statement of purpose",
    "resume",
    "cv",
    "portfolio",
    "essay",
];

/// 요건 섹션 헤더로 판단하는 구문
pub const REQUIREMENT_HEADER_PHRASES: &[&str] = &[
    "requirement",
    "admission requirements",
    "application requirements",
    "how to apply",
];

/// 대문자 요건 헤더 키워드
pub const REQUIREMENT_HEADER_WORDS: &[&str] = &["requirement", "admission", "application", "apply"];

/// 마감일 키워드
pub const DEADLINE_KEYWORDS: &[&str] = &[
    "deadline",
    "due date",
    "application deadline",
    "apply by",
    "deadlines & fees",
    "deadlines and fees",
];

/// 학기 키워드
pub const SEMESTER_KEYWORDS: &[&str] = &["fall", "spring", "summer", "winter"];

/// 재정 섹션 헤더 구문
pub const FINANCIAL_HEADERS: &[&str] = &[
    "application fee",
    "application fees",
    "tuition",
    "costs and tuition",
    "financial aid",
    "funding",
    "scholarship",
    "fee waiver",
];

/// 수수료 숫자와 결합되어야 하는 키워드
pub const FEE_KEYWORDS: &[&str] = &["fee", "cost", "tuition", "application", "waiver", "dollar"];

/// 재정 섹션 내부에서 이어붙일 수 있는 단어
pub const FINANCIAL_CONTINUATION_WORDS: &[&str] = &[
    "fee",
    "waiver",
    "cost",
    "tuition",
    "dollar",
    "$",
    "application",
    "financial",
    "aid",
    "scholarship",
    "students attending",
    "alumni",
    "military",
    "participants",
];

/// 수수료 면제 상세 설명 구문
pub const WAIVER_DETAIL_PHRASES: &[&str] = &[
    "automatically waived",
    "eligible for",
    "fee waiver",
    "waiver program",
];

/// 재정 섹션을 조기 종료시키는 비재정 헤더
pub const NON_FINANCIAL_HEADERS: &[&str] = &[
    "application deadline",
    "requirement",
    "contact us",
    "document",
    "office of admission",
];

/// 명백히 재정과 무관한 구문
pub const NON_FINANCIAL_PHRASES: &[&str] = &[
    "graduate degrees offered",
    "visit",
    "campus",
    "tour",
    "location",
];

/// 내비게이션으로 간주하는 짧은 대문자 줄의 어휘
pub const NAV_WORDS: &[&str] = &[
    "apply", "more", "info", "contact", "faq", "visit", "request", "now", "here", "learn",
];

/// 내비게이션 어휘가 있어도 살려야 하는 의미 있는 헤더
pub const MEANINGFUL_HEADERS: &[&str] = &[
    "steps to apply",
    "deadlines",
    "requirements",
    "contact us",
    "frequently asked",
];

/// 연락처 이메일에서 제외하는 자리표시자
pub const EMAIL_PLACEHOLDERS: &[&str] = &["example", "test", "noreply", "donotreply"];

/// 전화번호 인식에 사용하는 지역 번호
pub const LOCAL_AREA_CODES: &[&str] = &["972", "214", "469"];

/// 주소 패턴의 도시/주 토큰
pub const CITY_STATE_TOKENS: &[&str] = &["Richardson", "Texas", "TX", "Dallas"];

/// 재정 관련 링크를 고르는 키워드
pub const FINANCIAL_LINK_KEYWORDS: &[&str] = &[
    "cost",
    "tuition",
    "fee",
    "financial aid",
    "scholarship",
    "funding",
    "deadline",
    "deadlines & fees",
    "deadlines and fees",
    "affordability",
    "price",
    "expense",
];

/// 입학 관련 링크를 골라 수집 대상을 확장하는 키워드
pub const ADMISSIONS_LINK_KEYWORDS: &[&str] = &[
    "undergraduate",
    "graduate",
    "international",
    "transfer",
    "requirements",
    "deadline",
    "application",
    "apply",
    "scholarship",
    "financial",
    "tuition",
    "cost",
];

/// 재정 노트 수확에 사용하는 키워드
pub const FINANCIAL_HARVEST_KEYWORDS: &[&str] = &[
    "cost",
    "tuition",
    "fee",
    "scholarship",
    "financial",
    "funding",
    "price",
    "aid",
];

/// 수수료로 자주 등장하는 리터럴 숫자 (키워드와 결합해야 인정)
pub const FEE_NUMBER_PATTERN: &str = r"\b(?:75|50|100|25|200|500|1000|5000)\b";

// ============================================================================
// Pattern Library
// ============================================================================

/// 컴파일된 정규식 모음
pub struct PatternLibrary {
    /// 내비게이션 줄 패턴 (줄 시작 기준)
    pub navigation: Vec<Regex>,
    /// 목록 항목 마커: `1.` / `-` / `•` / `*` / `a)`
    pub list_item: Regex,
    /// 마감일 스캐너용 목록 마커 (문자 항목 제외)
    pub deadline_list_item: Regex,
    /// 날짜 패턴 (숫자형 + 월 이름형)
    pub date: Regex,
    /// 달러 금액 패턴
    pub dollar: Regex,
    /// 퍼센트 패턴
    pub percent: Regex,
    /// 수수료 리터럴 숫자 패턴
    pub fee_number: Regex,
    /// 키워드 앞 전화번호 패턴
    pub phone_labeled: Regex,
    /// 독립 전화번호 패턴 (지역 번호 우선)
    pub phone_bare: Regex,
    /// 전화번호 구분자 정규화용
    pub phone_separator: Regex,
    /// 팩스 번호 패턴
    pub fax: Regex,
    /// 이메일 패턴
    pub email: Regex,
    /// 주소 패턴 (도로 유형 + 도시/주/우편번호)
    pub address: Regex,
    /// 연도로 시작하는 주소 오탐 검출
    pub year_start: Regex,
    /// 근무 시간 패턴
    pub office_hours: Regex,
    /// 호실 패턴 (라벨 2종)
    pub room: Regex,
}

impl PatternLibrary {
    /// 모든 패턴 컴파일
    pub fn new() -> Self {
        let navigation = vec![
            Regex::new(r"(?i)^(skip to|menu|navigation|home|about|contact|search)")
                .expect("Invalid regex"),
            Regex::new(r"(?i)^(facebook|twitter|linkedin|instagram|youtube)")
                .expect("Invalid regex"),
            Regex::new(r"^©\s*\d{4}").expect("Invalid regex"),
            Regex::new(r"^\s*>\s*$").expect("Invalid regex"),
        ];

        let month_names = "january|february|march|april|may|june|july|august|september|october|november|december";
        let date_pattern = format!(
            r"(?i)\d{{1,2}}[/-]\d{{1,2}}[/-]\d{{2,4}}|\d{{1,2}}\s+(?:{m})\s+\d{{4}}|(?:{m})\s+\d{{1,2}},?\s+\d{{4}}",
            m = month_names
        );

        let phone_bare = format!(
            r"\b(?:{codes})[-.\s]?\d{{3}}[-.\s]?\d{{4}}\b|\b\d{{3}}[-.\s]?\d{{3}}[-.\s]?\d{{4}}\b",
            codes = LOCAL_AREA_CODES.join("|")
        );

        let address = format!(
            r"(?i)\d+\s+[\w\s]+(?:Street|St|Avenue|Ave|Road|Rd|Boulevard|Blvd|Drive|Dr|Lane|Ln|Way|Circle|Cir)[\s\S]{{0,100}}(?:{cities}|\d{{5}})",
            cities = CITY_STATE_TOKENS.join("|")
        );

        Self {
            navigation,
            list_item: Regex::new(r"^(?:\d+\.|[-•*]|[a-z]\))").expect("Invalid regex"),
            deadline_list_item: Regex::new(r"^(?:\d+\.|[-•*])").expect("Invalid regex"),
            date: Regex::new(&date_pattern).expect("Invalid regex"),
            dollar: Regex::new(r"\$[\d,]+(?:\.\d{2})?|\d[\d,]*\s*(?:dollars?|USD)")
                .expect("Invalid regex"),
            percent: Regex::new(r"\d+%").expect("Invalid regex"),
            fee_number: Regex::new(FEE_NUMBER_PATTERN).expect("Invalid regex"),
            phone_labeled: Regex::new(
                r"(?i)(?:phone|call|tel|contact)[\s:]*(\d{3}[-.\s]?\d{3}[-.\s]?\d{4})",
            )
            .expect("Invalid regex"),
            phone_bare: Regex::new(&phone_bare).expect("Invalid regex"),
            phone_separator: Regex::new(r"[-.\s]").expect("Invalid regex"),
            fax: Regex::new(r"(?i)fax[\s:]*(\d{3}[-.\s]?\d{3}[-.\s]?\d{4})")
                .expect("Invalid regex"),
            email: Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
                .expect("Invalid regex"),
            address: Regex::new(&address).expect("Invalid regex"),
            year_start: Regex::new(r"^\d{4}").expect("Invalid regex"),
            office_hours: Regex::new(r"(?i)(?:office hours|hours)[\s:]*([^\n]{10,100})")
                .expect("Invalid regex"),
            room: Regex::new(
                r"(?i)room[\s#:]+number[\s:]*([A-Za-z0-9\s.\-]{3,30})|room[\s#:]+([A-Za-z0-9\s.\-]{2,20})",
            )
            .expect("Invalid regex"),
        }
    }
}

impl Default for PatternLibrary {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 알파벳이 있고 소문자가 전혀 없는 줄인지 확인
pub fn is_all_caps(line: &str) -> bool {
    let mut has_alpha = false;
    for c in line.chars() {
        if c.is_alphabetic() {
            has_alpha = true;
            if c.is_lowercase() {
                return false;
            }
        }
    }
    has_alpha
}

/// 소문자화된 줄에 키워드 목록 중 하나라도 포함되는지 확인
pub fn contains_any(line_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| line_lower.contains(k))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_pattern() {
        let lib = PatternLibrary::new();
        assert!(lib.date.is_match("10/15/2024"));
        assert!(lib.date.is_match("October 1, 2024"));
        assert!(lib.date.is_match("15 march 2025"));
        assert!(!lib.date.is_match("no date here"));
    }

    #[test]
    fn test_dollar_pattern() {
        let lib = PatternLibrary::new();
        assert!(lib.dollar.is_match("$75"));
        assert!(lib.dollar.is_match("$1,250.00"));
        assert!(lib.dollar.is_match("100 dollars"));
        assert!(lib.dollar.is_match("50 USD"));
        assert!(!lib.dollar.is_match("free of charge"));
    }

    #[test]
    fn test_list_item_pattern() {
        let lib = PatternLibrary::new();
        assert!(lib.list_item.is_match("1. Submit transcripts"));
        assert!(lib.list_item.is_match("- GRE scores"));
        assert!(lib.list_item.is_match("• TOEFL"));
        assert!(lib.list_item.is_match("a) Essay"));
        assert!(!lib.list_item.is_match("Plain sentence"));
        // 마감일 마커는 문자 항목을 제외
        assert!(!lib.deadline_list_item.is_match("a) Essay"));
    }

    #[test]
    fn test_phone_patterns() {
        let lib = PatternLibrary::new();
        assert!(lib.phone_labeled.is_match("Phone: 972-883-2270"));
        assert!(lib.phone_labeled.is_match("call 972.883.2270"));
        assert!(lib.phone_bare.is_match("972-883-2270"));
        assert!(lib.phone_bare.is_match("214 883 2270"));
    }

    #[test]
    fn test_is_all_caps() {
        assert!(is_all_caps("APPLY NOW"));
        assert!(is_all_caps("FAQ 2024"));
        assert!(!is_all_caps("Apply Now"));
        assert!(!is_all_caps("12345"));
        assert!(!is_all_caps(""));
    }

    #[test]
    fn test_navigation_patterns() {
        let lib = PatternLibrary::new();
        assert!(lib.navigation.iter().any(|p| p.is_match("Skip to content")));
        assert!(lib.navigation.iter().any(|p| p.is_match("Facebook")));
        assert!(lib.navigation.iter().any(|p| p.is_match("© 2024 The University")));
        assert!(lib.navigation.iter().any(|p| p.is_match(" > ")));
        assert!(!lib.navigation.iter().any(|p| p.is_match("Admission Requirements")));
    }
}
