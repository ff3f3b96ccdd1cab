//! 페이지 수집 모듈 - URL에서 줄 단위 텍스트와 링크 추출
//!
//! HTML을 받아 제목 / 줄 단위 본문 / 페이지 내 링크를 뽑습니다.
//! 분류기가 줄 단위로 동작하므로 텍스트 노드를 한 줄씩 유지합니다.

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::extract::RawPage;

/// 텍스트 수집에서 건너뛰는 태그
const SKIP_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "noscript"];

/// 본문 루트 후보 (우선순위순)
const CONTENT_SELECTORS: &[&str] = &["main", "article", "[role=main]", ".content", "#content", "body"];

/// 본문 루트로 인정하는 최소 텍스트 길이
const MIN_ROOT_TEXT_LEN: usize = 100;

// ============================================================================
// Fetched Page
// ============================================================================

/// 페이지 내 링크 (절대 URL + 앵커 텍스트)
#[derive(Debug, Clone)]
pub struct PageLink {
    pub url: String,
    pub text: String,
}

/// 수집된 페이지 한 장
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub page: RawPage,
    pub links: Vec<PageLink>,
}

// ============================================================================
// Page Fetcher
// ============================================================================

/// 페이지 수집 트레이트
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// URL에서 페이지 한 장 수집
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

/// HTTP 기반 페이지 수집기
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// 새 수집기 생성
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("admit-extract/0.1")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("HTTP 클라이언트 생성 실패")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        tracing::info!("Fetching: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("HTTP 요청 실패")?;

        let html = response.text().await.context("응답 본문 읽기 실패")?;

        Ok(parse_page(&html, url))
    }
}

// ============================================================================
// HTML Parsing
// ============================================================================

/// HTML 문서를 FetchedPage로 변환
pub fn parse_page(html: &str, url: &str) -> FetchedPage {
    let document = Html::parse_document(html);

    let title = extract_title(&document).unwrap_or_default();
    let text = extract_text(&document);
    let links = extract_links(&document, url);

    FetchedPage {
        page: RawPage {
            url: url.to_string(),
            title,
            text,
        },
        links,
    }
}

/// 제목 추출 (<title> 우선, 없으면 <h1>)
fn extract_title(document: &Html) -> Option<String> {
    for selector_str in ["title", "h1"] {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let title = element.text().collect::<String>().trim().to_string();
                if !title.is_empty() {
                    return Some(title);
                }
            }
        }
    }
    None
}

/// 본문 텍스트 추출 (텍스트 노드 한 개 = 한 줄)
fn extract_text(document: &Html) -> String {
    for selector_str in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(element) = document.select(&selector).next() {
                let mut lines = Vec::new();
                collect_lines(element, &mut lines);
                let text = lines.join("\n");
                if text.chars().count() > MIN_ROOT_TEXT_LEN {
                    return text;
                }
            }
        }
    }

    // 폴백: 전체 body 텍스트 (길이 무관)
    if let Ok(selector) = Selector::parse("body") {
        if let Some(element) = document.select(&selector).next() {
            let mut lines = Vec::new();
            collect_lines(element, &mut lines);
            return lines.join("\n");
        }
    }

    String::new()
}

/// 텍스트 노드를 줄 단위로 수집 (스크립트/내비게이션 서브트리 제외)
fn collect_lines(element: ElementRef<'_>, lines: &mut Vec<String>) {
    if SKIP_TAGS.contains(&element.value().name()) {
        return;
    }

    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                lines.push(trimmed.to_string());
            }
        } else if let Some(child_element) = ElementRef::wrap(child) {
            collect_lines(child_element, lines);
        }
    }
}

/// 페이지 내 링크 추출 (절대화 + 프래그먼트 제거)
fn extract_links(document: &Html, page_url: &str) -> Vec<PageLink> {
    let base = match Url::parse(page_url) {
        Ok(base) => base,
        Err(_) => return Vec::new(),
    };

    let selector = match Selector::parse("a[href]") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if href.starts_with("mailto:") || href.starts_with("tel:") || href.starts_with("javascript:") {
            continue;
        }

        let Ok(mut resolved) = base.join(href) else {
            continue;
        };
        if resolved.scheme() != "http" && resolved.scheme() != "https" {
            continue;
        }
        resolved.set_fragment(None);

        let url = resolved.as_str().trim_end_matches('/').to_string();
        let text = element.text().collect::<String>().trim().to_string();
        links.push(PageLink { url, text });
    }
    links
}

// ============================================================================
// Tests
// ============================================================================
