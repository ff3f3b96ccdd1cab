//! 섹션 분류 모듈
//!
//! 정리된 페이지 텍스트를 한 줄씩 스캔하여 지원 요건 / 마감일 / 재정 정보
//! 섹션을 추려냅니다. 키워드·헤더 형태·목록 마커만으로 구조를 추정하는
//! 휴리스틱이므로 정밀도보다 재현율을 우선합니다.

use serde::Serialize;

use crate::extract::patterns::{
    contains_any, is_all_caps, PatternLibrary, DEADLINE_KEYWORDS, FEE_KEYWORDS,
    FINANCIAL_CONTINUATION_WORDS, FINANCIAL_HEADERS, NON_FINANCIAL_HEADERS, NON_FINANCIAL_PHRASES,
    REQUIREMENT_HEADER_PHRASES, REQUIREMENT_HEADER_WORDS, REQUIREMENT_KEYWORDS, SECTION_SEPARATOR,
    SEMESTER_KEYWORDS, WAIVER_DETAIL_PHRASES,
};

// ============================================================================
// Tuning Constants
// ============================================================================

/// 새 섹션 진입 시 이전 누적분을 보존하는 최소 줄 수 (요건)
const REQUIREMENTS_MIN_LINES: usize = 2;
/// 새 섹션 진입 시 이전 누적분을 보존하는 최소 줄 수 (마감일)
const DEADLINES_MIN_LINES: usize = 1;
/// 새 섹션 진입 시 이전 누적분을 보존하는 최소 줄 수 (재정)
const FINANCIAL_MIN_LINES: usize = 2;
/// 요건 섹션 이어붙임의 최소 줄 길이
const REQUIREMENTS_CONT_LEN: usize = 10;
/// 마감일 섹션 이어붙임의 최소 줄 길이
const DEADLINES_CONT_LEN: usize = 15;
/// 재정 섹션 이어붙임의 최소 줄 길이
const FINANCIAL_CONT_LEN: usize = 15;
/// 비재정 헤더가 조기 종료로 인정되기까지의 최소 진행 줄 수
const FINANCIAL_HEADER_DISTANCE: usize = 5;
/// 길이 기반 이어붙임이 허용되는 섹션 시작으로부터의 거리
const FINANCIAL_SECTION_REACH: usize = 30;
/// 빈 줄에서 재정 섹션을 닫기 위한 최소 누적 줄 수
const FINANCIAL_BLANK_FLUSH_LINES: usize = 5;
/// 조기 종료가 인정되는 최소 누적 줄 수
const FINANCIAL_EARLY_EXIT_LINES: usize = 3;

/// 빈 줄 다음에도 재정 섹션을 유지시키는 어휘
const FINANCIAL_BRIDGE_WORDS: &[&str] = &[
    "fee", "waiver", "cost", "tuition", "dollar", "$", "application", "financial",
];

/// 재정 섹션 사후 필터에서 수수료 숫자와 결합해야 하는 키워드
const FEE_FILTER_KEYWORDS: &[&str] = &["fee", "cost", "tuition", "application"];

// ============================================================================
// Section Types
// ============================================================================

/// 섹션 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Requirements,
    Deadlines,
    Financial,
}

/// 분류된 섹션 (연속된 원본 줄 묶음)
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedSection {
    pub kind: SectionKind,
    pub body: String,
}

/// 분류기 설정
///
/// 임계값은 모두 문자 수 기준입니다. 재정 섹션은 길이 대신
/// 숫자 포함 여부로 걸러냅니다.
#[derive(Debug, Clone)]
pub struct SectionConfig {
    /// 요건 섹션 최소 본문 길이
    pub requirements_min_len: usize,
    /// 마감일 섹션 최소 본문 길이
    pub deadlines_min_len: usize,
    /// 종류별 최대 섹션 수
    pub max_sections_per_kind: usize,
}

impl Default for SectionConfig {
    fn default() -> Self {
        Self {
            requirements_min_len: 30,
            deadlines_min_len: 15,
            max_sections_per_kind: 5,
        }
    }
}

// ============================================================================
// Section Classifier
// ============================================================================

/// 줄 단위 섹션 분류기
pub struct SectionClassifier {
    patterns: PatternLibrary,
    config: SectionConfig,
}

impl SectionClassifier {
    /// 설정으로 생성
    pub fn new(config: SectionConfig) -> Self {
        Self {
            patterns: PatternLibrary::new(),
            config,
        }
    }

    /// 기본 설정으로 생성
    pub fn with_defaults() -> Self {
        Self::new(SectionConfig::default())
    }

    /// 모든 종류의 섹션을 한 번에 분류
    pub fn extract_sections(&self, text: &str) -> Vec<ExtractedSection> {
        let mut out = Vec::new();
        for body in self.requirements_sections(text) {
            out.push(ExtractedSection {
                kind: SectionKind::Requirements,
                body,
            });
        }
        for body in self.deadline_sections(text) {
            out.push(ExtractedSection {
                kind: SectionKind::Deadlines,
                body,
            });
        }
        for body in self.financial_sections(text) {
            out.push(ExtractedSection {
                kind: SectionKind::Financial,
                body,
            });
        }
        out
    }

    /// 지원 요건 추출 (섹션 구분자로 연결)
    pub fn extract_requirements(&self, text: &str) -> Option<String> {
        join_sections(self.requirements_sections(text))
    }

    /// 마감일 추출 (섹션 구분자로 연결)
    pub fn extract_deadlines(&self, text: &str) -> Option<String> {
        join_sections(self.deadline_sections(text))
    }

    /// 재정 정보 추출 (섹션 구분자로 연결)
    pub fn extract_financial(&self, text: &str) -> Option<String> {
        join_sections(self.financial_sections(text))
    }

    // ------------------------------------------------------------------
    // Requirements scanner
    // ------------------------------------------------------------------

    fn requirements_sections(&self, text: &str) -> Vec<String> {
        let mut sections: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut in_section = false;

        for line in text.lines() {
            let line = line.trim();
            let lower = line.to_lowercase();

            let has_keyword = contains_any(&lower, REQUIREMENT_KEYWORDS);
            let is_header = (is_all_caps(line) && contains_any(&lower, REQUIREMENT_HEADER_WORDS))
                || (contains_any(&lower, REQUIREMENT_HEADER_PHRASES)
                    && lower.chars().count() < 100);
            let is_list = self.patterns.list_item.is_match(line);

            if has_keyword || is_header || (is_list && in_section) {
                in_section = true;
                if current.len() > REQUIREMENTS_MIN_LINES {
                    sections.push(current.join("\n"));
                }
                current = vec![line];
            } else if in_section {
                if line.is_empty() {
                    flush(&mut sections, &mut current);
                    in_section = false;
                } else if is_list || line.chars().count() > REQUIREMENTS_CONT_LEN {
                    current.push(line);
                } else {
                    flush(&mut sections, &mut current);
                    in_section = false;
                }
            }
        }
        flush(&mut sections, &mut current);

        self.select(sections, self.config.requirements_min_len)
    }

    // ------------------------------------------------------------------
    // Deadlines scanner
    // ------------------------------------------------------------------

    fn deadline_sections(&self, text: &str) -> Vec<String> {
        let mut sections: Vec<String> = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut in_section = false;

        for line in text.lines() {
            let line = line.trim();
            let lower = line.to_lowercase();

            let has_keyword = contains_any(&lower, DEADLINE_KEYWORDS);
            let has_semester = contains_any(&lower, SEMESTER_KEYWORDS);
            let has_date = self.patterns.date.is_match(line);
            let is_list = self.patterns.deadline_list_item.is_match(line);

            if has_keyword
                || (has_semester && has_date)
                || (is_list && (has_date || has_semester))
            {
                in_section = true;
                if current.len() > DEADLINES_MIN_LINES {
                    sections.push(current.join("\n"));
                }
                current = vec![line];
            } else if in_section {
                if line.is_empty() {
                    flush(&mut sections, &mut current);
                    in_section = false;
                } else if is_list
                    || has_date
                    || has_semester
                    || line.chars().count() > DEADLINES_CONT_LEN
                {
                    current.push(line);
                } else {
                    flush(&mut sections, &mut current);
                    in_section = false;
                }
            }
        }
        flush(&mut sections, &mut current);

        self.select(sections, self.config.deadlines_min_len)
    }

    // ------------------------------------------------------------------
    // Financial scanner
    // ------------------------------------------------------------------

    fn financial_sections(&self, text: &str) -> Vec<String> {
        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        let mut sections: Vec<String> = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut in_section = false;
        let mut start_idx = 0usize;

        for (i, &line) in lines.iter().enumerate() {
            let lower = line.to_lowercase();

            // 헤더 판정: 본문 중간의 긴 문장은 헤더로 보지 않음
            let is_header = contains_any(&lower, FINANCIAL_HEADERS)
                && (is_all_caps(line)
                    || lower.chars().count() < 100
                    || i == 0
                    || lines[i - 1].is_empty());

            let has_dollar = self.patterns.dollar.is_match(line);
            let has_percent = self.patterns.percent.is_match(line);
            let has_fee_number =
                self.patterns.fee_number.is_match(line) && contains_any(&lower, FEE_KEYWORDS);

            if is_header || has_dollar || has_percent || has_fee_number {
                if in_section && is_header && lower.contains("fee") {
                    // "Application Fee Waivers" 같은 하위 헤더는 현재 섹션에 흡수
                    current.push(line.to_string());
                } else if in_section && current.len() > FINANCIAL_MIN_LINES {
                    sections.push(current.join("\n"));
                    start_idx = i;
                    current = vec![line.to_string()];
                } else {
                    in_section = true;
                    start_idx = i;
                    current = vec![line.to_string()];
                }
            } else if in_section {
                let is_new_section = !line.is_empty()
                    && (is_all_caps(line) || lower.chars().count() < 80)
                    && contains_any(&lower, NON_FINANCIAL_HEADERS)
                    && !lower.contains("fee")
                    && !lower.contains("financial")
                    && !lower.contains("waiver")
                    && i > start_idx + FINANCIAL_HEADER_DISTANCE;

                let is_non_financial = !line.is_empty()
                    && contains_any(&lower, NON_FINANCIAL_PHRASES)
                    && !lower.contains("fee")
                    && !lower.contains("cost");

                if (is_new_section || is_non_financial)
                    && current.len() > FINANCIAL_EARLY_EXIT_LINES
                {
                    sections.push(current.join("\n"));
                    current.clear();
                    in_section = false;
                } else if !line.is_empty() {
                    let has_financial_word = contains_any(&lower, FINANCIAL_CONTINUATION_WORDS);
                    let is_list = self.patterns.list_item.is_match(line);
                    let is_waiver_detail = contains_any(&lower, WAIVER_DETAIL_PHRASES);

                    if has_financial_word
                        || is_list
                        || is_waiver_detail
                        || (line.chars().count() > FINANCIAL_CONT_LEN
                            && i < start_idx + FINANCIAL_SECTION_REACH)
                    {
                        current.push(line.to_string());
                    } else {
                        if !current.is_empty() {
                            sections.push(current.join("\n"));
                        }
                        current.clear();
                        in_section = false;
                    }
                } else {
                    // 빈 줄: 다음 줄이 재정 어휘를 이어가면 문단 구분으로 유지
                    let next_lower = lines
                        .get(i + 1)
                        .map(|l| l.to_lowercase())
                        .unwrap_or_default();
                    if next_lower.is_empty() || contains_any(&next_lower, FINANCIAL_BRIDGE_WORDS) {
                        current.push(String::new());
                    } else if current.len() > FINANCIAL_BLANK_FLUSH_LINES {
                        sections.push(current.join("\n"));
                        current.clear();
                        in_section = false;
                    }
                }
            }
        }
        if current.len() > FINANCIAL_MIN_LINES {
            sections.push(current.join("\n"));
        }

        // 사후 필터: 실제 금액/퍼센트/수수료 숫자를 포함해야 인정.
        // 스캐너가 조립한 섹션보다 엄격하다.
        let filtered: Vec<String> = sections
            .into_iter()
            .filter(|s| {
                self.patterns.dollar.is_match(s)
                    || self.patterns.percent.is_match(s)
                    || (self.patterns.fee_number.is_match(s)
                        && contains_any(&s.to_lowercase(), FEE_FILTER_KEYWORDS))
            })
            .collect();

        filtered
            .into_iter()
            .take(self.config.max_sections_per_kind)
            .collect()
    }

    // ------------------------------------------------------------------
    // Shared selection
    // ------------------------------------------------------------------

    /// 길이 필터 후 원문 순서대로 상한까지 선택
    fn select(&self, sections: Vec<String>, min_len: usize) -> Vec<String> {
        sections
            .into_iter()
            .filter(|s| s.chars().count() > min_len)
            .take(self.config.max_sections_per_kind)
            .collect()
    }
}

impl Default for SectionClassifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 누적 줄을 섹션으로 내보내고 비움 (길이 필터는 select에서 적용)
fn flush(sections: &mut Vec<String>, current: &mut Vec<&str>) {
    if !current.is_empty() {
        sections.push(current.join("\n"));
        current.clear();
    }
}

/// 섹션 목록을 구분자로 연결, 비어 있으면 None
fn join_sections(sections: Vec<String>) -> Option<String> {
    if sections.is_empty() {
        None
    } else {
        Some(sections.join(SECTION_SEPARATOR))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SectionClassifier {
        SectionClassifier::with_defaults()
    }

    #[test]
    fn test_requirements_basic() {
        let text = "Admission Requirements\n\
                    Submit copies of records from every school attended.\n\
                    Scores arrive directly from the testing service.";
        let result = classifier().extract_requirements(text).expect("section");
        assert!(result.contains("Admission Requirements"));
        assert!(result.contains("every school attended"));
        assert!(result.contains("testing service"));
    }

    #[test]
    fn test_requirements_none_on_plain_text() {
        let text = "The weather in Dallas stays warm through October.\n\
                    Our mascot performs at home games.";
        assert!(classifier().extract_requirements(text).is_none());
    }

    #[test]
    fn test_deadline_single_line_with_blank() {
        // 한 줄짜리 마감일도 빈 줄에서 플러시되어 살아남아야 함
        let text = "Application Deadline: Fall 2025 - October 1, 2024\n\
                    \n\
                    The curriculum spans core systems and elective tracks.";
        let result = classifier().extract_deadlines(text).expect("section");
        assert!(result.contains("Application Deadline: Fall 2025 - October 1, 2024"));
        assert!(!result.contains("curriculum"));
    }

    #[test]
    fn test_deadline_semester_date_entry() {
        let text = "Fall 2025 semester starts August 18, 2025 for new students.";
        let result = classifier().extract_deadlines(text).expect("section");
        assert!(result.contains("August 18, 2025"));
    }

    #[test]
    fn test_section_cap() {
        // 7개 후보 중 최대 5개만 선택
        let mut text = String::new();
        for i in 0..7 {
            text.push_str(&format!(
                "Requirements overview number {i}\n\
                 Students gather their paperwork early on.\n\
                 Mailed copies take several weeks to arrive.\n\n"
            ));
        }
        let result = classifier().extract_requirements(&text).expect("sections");
        let count = result.split(SECTION_SEPARATOR).count();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_financial_dollar_section() {
        let text = "Application Fee\n\
                    The application fee is $50 for each program.\n\
                    Fee waivers are available to qualifying veterans.";
        let result = classifier().extract_financial(text).expect("section");
        assert!(result.contains("$50"));
        assert!(result.contains("waivers"));
    }

    #[test]
    fn test_financial_strictness() {
        // 숫자 100 + "students"만으로는 재정 섹션이 아님
        let text = "Over 100 students were admitted last year.\n\
                    They came from 40 different countries.";
        assert!(classifier().extract_financial(text).is_none());
    }

    #[test]
    fn test_financial_subheader_absorbed() {
        let text = "Application Fee\n\
                    The fee is $75 for domestic applicants per term.\n\
                    Graduate applicants pay the same fee amount.\n\
                    Application Fee Waivers\n\
                    McNair Scholars program participants are eligible for a fee waiver.";
        let result = classifier().extract_financial(text).expect("section");
        // 하위 헤더가 새 섹션이 아니라 같은 섹션에 흡수됨
        assert_eq!(result.split(SECTION_SEPARATOR).count(), 1);
        assert!(result.contains("Application Fee Waivers"));
        assert!(result.contains("McNair"));
    }

    #[test]
    fn test_financial_early_termination() {
        let text = "Tuition and Fees\n\
                    Base tuition is $14,000 per academic year.\n\
                    Additional fees apply for laboratory courses.\n\
                    Fee amounts vary by school and program.\n\
                    Summer session fee rates differ slightly.\n\
                    Evening courses carry the same fee structure.\n\
                    Rates shown include the library fee as well.\n\
                    Office of Admission Processing\n\
                    Mail documents to the central office.";
        let result = classifier().extract_financial(text).expect("section");
        assert!(result.contains("$14,000"));
        assert!(!result.contains("Mail documents"));
        assert!(!result.contains("Office of Admission"));
    }

    #[test]
    fn test_extract_sections_kinds() {
        let text = "Admission Requirements\n\
                    Submit official copies of all transcripts.\n\
                    A minimum GPA of 3.0 on the last 60 hours.\n\
                    \n\
                    Application Deadline: Fall 2025 - October 1, 2024\n\
                    \n\
                    Application Fee\n\
                    The application fee is $50 for each program.\n\
                    Fee waivers are available to qualifying veterans.";
        let sections = classifier().extract_sections(text);
        assert!(sections
            .iter()
            .any(|s| s.kind == SectionKind::Requirements));
        assert!(sections.iter().any(|s| s.kind == SectionKind::Deadlines));
        assert!(sections.iter().any(|s| s.kind == SectionKind::Financial));
    }
}
