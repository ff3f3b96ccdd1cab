//! 페이지 텍스트 정리 모듈
//!
//! 렌더링된 페이지 텍스트에서 내비게이션/보일러플레이트 줄을 제거합니다.
//! 분류기 입력 전 단계로, 결정적이며 실패하지 않습니다 (빈 입력 → 빈 출력).

use regex::Regex;

use crate::extract::patterns::{
    contains_any, is_all_caps, PatternLibrary, MEANINGFUL_HEADERS, NAV_WORDS,
};

/// 텍스트 정리기
pub struct Normalizer {
    patterns: PatternLibrary,
    blank_run: Regex,
}

impl Normalizer {
    /// 새 정리기 생성
    pub fn new() -> Self {
        Self {
            patterns: PatternLibrary::new(),
            blank_run: Regex::new(r"\n{3,}").expect("Invalid regex"),
        }
    }

    /// 내비게이션/잡음 줄을 제거한 텍스트 반환
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut cleaned_lines: Vec<&str> = Vec::new();

        for line in text.lines() {
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            // 3자 미만은 내비게이션 버튼일 가능성이 높음
            if line.chars().count() < 3 {
                continue;
            }

            if self.is_navigation_line(line) {
                continue;
            }

            // 짧은 전체 대문자 줄: 내비게이션 어휘가 있으면 제거,
            // 단 의미 있는 헤더는 유지
            if is_all_caps(line) && line.chars().count() < 50 {
                let line_lower = line.to_lowercase();
                if contains_any(&line_lower, NAV_WORDS)
                    && line.split_whitespace().count() <= 4
                    && !contains_any(&line_lower, MEANINGFUL_HEADERS)
                {
                    continue;
                }
            }

            cleaned_lines.push(line);
        }

        let joined = cleaned_lines.join("\n");
        self.blank_run.replace_all(&joined, "\n\n").trim().to_string()
    }

    /// 줄이 내비게이션 패턴에 해당하는지 확인
    fn is_navigation_line(&self, line: &str) -> bool {
        self.patterns.navigation.iter().any(|p| p.is_match(line))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_empty() {
        let n = Normalizer::new();
        assert_eq!(n.normalize(""), "");
        assert_eq!(n.normalize("\n\n\n"), "");
    }

    #[test]
    fn test_normalize_drops_navigation() {
        let n = Normalizer::new();
        let text = "Skip to main content\nMenu\nAdmission Requirements\nFacebook\nA minimum GPA of 3.0 is required.";
        let cleaned = n.normalize(text);
        assert!(!cleaned.contains("Skip to"));
        assert!(!cleaned.contains("Menu"));
        assert!(!cleaned.contains("Facebook"));
        assert!(cleaned.contains("Admission Requirements"));
        assert!(cleaned.contains("minimum GPA"));
    }

    #[test]
    fn test_normalize_drops_copyright_and_arrows() {
        let n = Normalizer::new();
        let text = "© 2024 The University\n > \nDeadlines for Fall 2025";
        let cleaned = n.normalize(text);
        assert_eq!(cleaned, "Deadlines for Fall 2025");
    }

    #[test]
    fn test_normalize_drops_short_caps_nav() {
        let n = Normalizer::new();
        let text = "APPLY NOW\nLEARN MORE\nGraduate programs accept applications year round.";
        let cleaned = n.normalize(text);
        assert!(!cleaned.contains("APPLY NOW"));
        assert!(!cleaned.contains("LEARN MORE"));
        assert!(cleaned.contains("Graduate programs"));
    }

    #[test]
    fn test_normalize_keeps_meaningful_caps_header() {
        let n = Normalizer::new();
        // "STEPS TO APPLY"는 내비게이션 어휘(apply)를 포함하지만 의미 있는 헤더
        let text = "STEPS TO APPLY\n1. Submit your application online.";
        let cleaned = n.normalize(text);
        assert!(cleaned.contains("STEPS TO APPLY"));
    }

    #[test]
    fn test_normalize_collapses_blank_runs() {
        let n = Normalizer::new();
        // 빈 줄은 모두 제거되므로 결과에는 연속 개행이 없어야 함
        let text = "First line of content here.\n\n\n\nSecond line of content here.";
        let cleaned = n.normalize(text);
        assert!(!cleaned.contains("\n\n\n"));
    }

    #[test]
    fn test_normalize_idempotent() {
        let n = Normalizer::new();
        let text = "APPLY NOW\nSkip to content\nAdmission Requirements\nA minimum GPA of 3.0 is required.\n\n\nDeadlines are firm.";
        let once = n.normalize(text);
        let twice = n.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_drops_tiny_lines() {
        let n = Normalizer::new();
        let text = "ok\nA line long enough to keep around.";
        let cleaned = n.normalize(text);
        assert!(!cleaned.contains("ok"));
        assert!(cleaned.contains("long enough"));
    }
}
