//! 연락처 추출 모듈
//!
//! 정리된 페이지 텍스트를 한 번 훑어 전화번호 / 팩스 / 이메일 / 주소 /
//! 호실 / 근무 시간을 패턴으로 뽑아냅니다. 섹션 분류기와는 독립적으로
//! 동작하며, 패턴이 안 맞는 필드는 조용히 비워둡니다.

use serde::Serialize;
use url::Url;

use crate::extract::patterns::{PatternLibrary, EMAIL_PLACEHOLDERS};

/// 목록 필드(전화/이메일)당 최대 보존 개수
const MAX_LIST_ENTRIES: usize = 3;
/// 독립 전화번호 앞에서 "fax"를 찾는 범위 (문자 수)
const FAX_LOOKBEHIND: usize = 20;
/// 호실 값의 최대 길이
const MAX_ROOM_LEN: usize = 50;

// ============================================================================
// Contact Record
// ============================================================================

/// 추출된 연락처 정보
///
/// 전화/이메일은 최초 등장 순서를 유지하며 중복이 제거됩니다.
#[derive(Debug, Clone, Serialize)]
pub struct ContactRecord {
    pub phones: Vec<String>,
    pub fax: Option<String>,
    pub emails: Vec<String>,
    pub address: Option<String>,
    pub room: Option<String>,
    pub office_hours: Option<String>,
    pub source_url: String,
}

impl ContactRecord {
    /// 모든 필드가 비어 있는지 (URL 제외)
    pub fn is_empty(&self) -> bool {
        self.phones.is_empty()
            && self.fax.is_none()
            && self.emails.is_empty()
            && self.address.is_none()
            && self.room.is_none()
            && self.office_hours.is_none()
    }

    /// 사람이 읽을 수 있는 여러 줄 문자열로 변환
    ///
    /// 필드 순서는 고정: Phone, Fax, Email, Address, Room, Office Hours, URL
    pub fn render(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }

        let mut parts = Vec::new();
        if !self.phones.is_empty() {
            parts.push(format!("Phone: {}", self.phones.join(", ")));
        }
        if let Some(ref fax) = self.fax {
            parts.push(format!("Fax: {}", fax));
        }
        if !self.emails.is_empty() {
            parts.push(format!("Email: {}", self.emails.join(", ")));
        }
        if let Some(ref address) = self.address {
            parts.push(format!("Address: {}", address));
        }
        if let Some(ref room) = self.room {
            parts.push(format!("Room: {}", room));
        }
        if let Some(ref hours) = self.office_hours {
            parts.push(format!("Office Hours: {}", hours));
        }
        if !self.source_url.is_empty() {
            parts.push(format!("URL: {}", self.source_url));
        }

        Some(parts.join("\n"))
    }
}

// ============================================================================
// Contact Extractor
// ============================================================================

/// 패턴 기반 연락처 추출기
pub struct ContactExtractor {
    patterns: PatternLibrary,
}

impl ContactExtractor {
    /// 새 추출기 생성
    pub fn new() -> Self {
        Self {
            patterns: PatternLibrary::new(),
        }
    }

    /// 텍스트에서 연락처 추출, 아무것도 없으면 None
    pub fn extract(&self, text: &str, page_url: &str) -> Option<ContactRecord> {
        if text.is_empty() {
            return None;
        }

        let record = ContactRecord {
            phones: self.extract_phones(text),
            fax: self.extract_fax(text),
            emails: self.extract_emails(text, page_url),
            address: self.extract_address(text),
            room: self.extract_room(text),
            office_hours: self.extract_office_hours(text),
            source_url: page_url.to_string(),
        };

        if record.is_empty() {
            None
        } else {
            Some(record)
        }
    }

    /// 전화번호 추출 (라벨형 + 독립형, ddd-ddd-dddd로 정규화)
    fn extract_phones(&self, text: &str) -> Vec<String> {
        let mut phones: Vec<String> = Vec::new();

        // 패턴 1: "Phone:" 등 키워드 뒤에 오는 번호
        for caps in self.patterns.phone_labeled.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                push_unique(&mut phones, self.normalize_phone(m.as_str()));
            }
        }

        // 패턴 2: 독립적으로 등장하는 번호. 바로 앞 문맥에 "fax"가 있으면
        // 팩스 번호이므로 제외
        for m in self.patterns.phone_bare.find_iter(text) {
            let normalized = self.normalize_phone(m.as_str());
            if phones.contains(&normalized) {
                continue;
            }
            let context_start = floor_char_boundary(text, m.start().saturating_sub(FAX_LOOKBEHIND));
            let context = &text[context_start..m.start()];
            if context.to_lowercase().contains("fax") {
                continue;
            }
            phones.push(normalized);
        }

        phones.truncate(MAX_LIST_ENTRIES);
        phones
    }

    /// 구분자를 하이픈으로 통일
    fn normalize_phone(&self, raw: &str) -> String {
        self.patterns.phone_separator.replace_all(raw, "-").to_string()
    }

    /// 팩스 번호 추출 (첫 매치)
    fn extract_fax(&self, text: &str) -> Option<String> {
        self.patterns
            .fax
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// 이메일 추출
    ///
    /// 자리표시자 주소를 거르고, 기관 도메인 주소가 하나라도 있으면
    /// 기관 도메인 주소만 남깁니다.
    fn extract_emails(&self, text: &str, page_url: &str) -> Vec<String> {
        let mut emails: Vec<String> = Vec::new();

        for m in self.patterns.email.find_iter(text) {
            let email = m.as_str().to_string();
            let lower = email.to_lowercase();
            if EMAIL_PLACEHOLDERS.iter().any(|p| lower.contains(p)) {
                continue;
            }
            push_unique(&mut emails, email);
        }

        // 기관 도메인 우선 (필터가 아니라 축소: 기관 주소가 없으면 전체 유지)
        if let Some(domain) = institution_domain(page_url) {
            let own: Vec<String> = emails
                .iter()
                .filter(|e| e.to_lowercase().ends_with(&domain))
                .cloned()
                .collect();
            if !own.is_empty() {
                emails = own;
            }
        }

        emails.truncate(MAX_LIST_ENTRIES);
        emails
    }

    /// 주소 추출 (첫 매치, 오탐 제거)
    fn extract_address(&self, text: &str) -> Option<String> {
        for m in self.patterns.address.find_iter(text) {
            let candidate = m.as_str().trim();
            // 연도로 시작하거나 거리 표현("mile")이면 주소가 아님
            if self.patterns.year_start.is_match(candidate)
                || candidate.to_lowercase().contains("mile")
            {
                continue;
            }
            return Some(candidate.to_string());
        }
        None
    }

    /// 호실 추출 (라벨 2종, "hours" 포함/과대 길이 제거)
    fn extract_room(&self, text: &str) -> Option<String> {
        let caps = self.patterns.room.captures(text)?;
        let value = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();

        if value.is_empty()
            || value.to_lowercase().contains("hours")
            || value.chars().count() >= MAX_ROOM_LEN
        {
            return None;
        }
        Some(value.to_string())
    }

    /// 근무 시간 추출 (첫 매치)
    fn extract_office_hours(&self, text: &str) -> Option<String> {
        self.patterns
            .office_hours
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
    }
}

impl Default for ContactExtractor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 페이지 URL에서 기관 도메인(마지막 두 레이블) 추출
pub(crate) fn institution_domain(page_url: &str) -> Option<String> {
    let url = Url::parse(page_url).ok()?;
    let host = url.host_str()?;
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() < 2 {
        return None;
    }
    Some(labels[labels.len() - 2..].join(".").to_lowercase())
}

/// 순서를 유지하며 중복 없이 추가
fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// UTF-8 경계 조정 (인덱스 이하로)
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i > 0 && !s.is_char_boundary(i) {
            i -= 1;
        }
        i
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ContactExtractor {
        ContactExtractor::new()
    }

    #[test]
    fn test_extract_basic_contact() {
        let text = "Phone: 972-883-2270\nFax: 972-883-2399\nEmail: admissions@utdallas.edu";
        let record = extractor()
            .extract(text, "https://www.utdallas.edu/admissions")
            .expect("record");
        assert_eq!(record.phones, vec!["972-883-2270"]);
        assert_eq!(record.fax.as_deref(), Some("972-883-2399"));
        assert_eq!(record.emails, vec!["admissions@utdallas.edu"]);
    }

    #[test]
    fn test_phone_dedup_across_formats() {
        // 표기가 달라도 정규화 후 하나로 합쳐져야 함
        let text = "Call 972.883.2270 today.\nPhone: 972-883-2270\nOr dial 972 883 2270.";
        let record = extractor().extract(text, "https://example.edu").expect("record");
        assert_eq!(record.phones, vec!["972-883-2270"]);
    }

    #[test]
    fn test_phone_limit() {
        let text = "Phone: 972-883-1111\nPhone: 972-883-2222\nPhone: 972-883-3333\nPhone: 972-883-4444";
        let record = extractor().extract(text, "https://example.edu").expect("record");
        assert_eq!(record.phones.len(), 3);
    }

    #[test]
    fn test_bare_phone_near_fax_excluded() {
        let text = "Fax: 972-883-2399";
        let record = extractor().extract(text, "https://example.edu").expect("record");
        assert!(record.phones.is_empty());
        assert_eq!(record.fax.as_deref(), Some("972-883-2399"));
    }

    #[test]
    fn test_email_placeholder_filtered() {
        let text = "Write to info@school.edu or noreply@school.edu for help.";
        let record = extractor().extract(text, "https://other.org").expect("record");
        assert_eq!(record.emails, vec!["info@school.edu"]);
    }

    #[test]
    fn test_email_institution_narrowing() {
        let text = "Contact admissions@utdallas.edu or vendor@mailchimp.com.";
        let record = extractor()
            .extract(text, "https://graduate-admissions.utdallas.edu/contact-us")
            .expect("record");
        assert_eq!(record.emails, vec!["admissions@utdallas.edu"]);
    }

    #[test]
    fn test_email_no_narrowing_without_institution_match() {
        let text = "Contact someone@gmail.com for details.";
        let record = extractor().extract(text, "https://www.utdallas.edu").expect("record");
        assert_eq!(record.emails, vec!["someone@gmail.com"]);
    }

    #[test]
    fn test_address_extraction() {
        let text = "Visit us at 800 West Campbell Road, Richardson, TX 75080 for a tour.";
        let record = extractor().extract(text, "https://example.edu").expect("record");
        let address = record.address.expect("address");
        assert!(address.contains("800 West Campbell Road"));
    }

    #[test]
    fn test_office_hours() {
        let text = "Office Hours: Monday through Friday, 8am to 5pm";
        let record = extractor().extract(text, "https://example.edu").expect("record");
        let hours = record.office_hours.expect("hours");
        assert!(hours.contains("Monday"));
    }

    #[test]
    fn test_room_rejects_hours() {
        let text = "Room hours vary by semester for everyone";
        let record = extractor().extract(text, "https://example.edu");
        // "hours"가 들어간 호실 값은 버려지고 다른 필드도 없으므로 None
        assert!(record.is_none() || record.unwrap().room.is_none());
    }

    #[test]
    fn test_render_order() {
        let text = "Phone: 972-883-2270\nEmail: admissions@utdallas.edu";
        let record = extractor()
            .extract(text, "https://www.utdallas.edu/admissions")
            .expect("record");
        let rendered = record.render().expect("rendered");
        let phone_pos = rendered.find("Phone:").expect("phone");
        let email_pos = rendered.find("Email:").expect("email");
        let url_pos = rendered.find("URL:").expect("url");
        assert!(phone_pos < email_pos && email_pos < url_pos);
    }

    #[test]
    fn test_empty_text() {
        assert!(extractor().extract("", "https://example.edu").is_none());
    }
}
