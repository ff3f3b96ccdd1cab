//! 스크랩 파이프라인 모듈
//!
//! 대상 페이지 목록을 속도 제한 + 제한된 병렬로 수집하고, 페이지별
//! 구조화 추출 결과를 JSON으로 저장합니다. 메인 입학 페이지에서는
//! 재정 관련 링크를 추적해 재정 정보를 집계합니다.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use regex::Regex;
use serde::Serialize;
use tokio::sync::{Mutex, Semaphore};
use tokio::time::Instant;

use crate::extract::aggregate::{
    aggregate, harvest_financial_lines, is_main_admissions_page, LinkedFinancialNote,
};
use crate::extract::contact::institution_domain;
use crate::extract::patterns::{ADMISSIONS_LINK_KEYWORDS, FINANCIAL_LINK_KEYWORDS};
use crate::extract::{AdmissionsExtractor, PageExtraction};
use crate::fetcher::{FetchedPage, PageFetcher, PageLink};

// ============================================================================
// Rate Limiter
// ============================================================================

/// 요청 간 최소 간격을 보장하는 속도 제한기
///
/// 마지막 요청 시각을 공유하며, `acquire`는 간격이 찰 때까지 대기합니다.
/// 잠금을 쥔 채 대기하므로 동시 호출자도 순서대로 간격을 지킵니다.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// 최소 간격으로 생성
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// 다음 요청 허가를 기다림
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }

        *last = Some(Instant::now());
    }
}

// ============================================================================
// Scrape Configuration
// ============================================================================

/// 파이프라인 설정
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// 한 번의 실행에서 처리할 최대 대상 수
    pub max_pages: usize,
    /// 요청 간 최소 간격
    pub rate_limit: Duration,
    /// 동시 수집 페이지 수
    pub max_parallel: usize,
    /// 메인 페이지에서 추적할 재정 링크 상한
    pub follow_links: usize,
    /// 결과 JSON 출력 디렉토리
    pub output_dir: PathBuf,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_pages: 50,
            rate_limit: Duration::from_secs(1),
            max_parallel: 3,
            follow_links: 5,
            output_dir: PathBuf::from("scraped"),
        }
    }
}

/// 수집 대상 (저장 파일명에 쓰이는 이름 + URL)
#[derive(Debug, Clone)]
pub struct ScrapeTarget {
    pub name: String,
    pub url: String,
}

// ============================================================================
// Output Records
// ============================================================================

/// 페이지별 저장 레코드
#[derive(Debug, Serialize)]
pub struct PageRecord {
    pub url: String,
    pub title: String,
    pub scraped_at: DateTime<Utc>,
    #[serde(flatten)]
    pub extraction: PageExtraction,
}

/// 실행 인덱스의 페이지 항목
#[derive(Debug, Serialize)]
struct IndexEntry {
    name: String,
    url: String,
    title: String,
    file: String,
}

/// 실행 인덱스 (index.json)
#[derive(Debug, Serialize)]
struct RunIndex {
    generated_at: DateTime<Utc>,
    pages: Vec<IndexEntry>,
}

// ============================================================================
// Admissions Pipeline
// ============================================================================

/// 입학 페이지 스크랩 파이프라인
pub struct AdmissionsPipeline {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<AdmissionsExtractor>,
    limiter: Arc<RateLimiter>,
    config: ScrapeConfig,
}

impl AdmissionsPipeline {
    /// 수집기와 설정으로 생성
    pub fn new(fetcher: Arc<dyn PageFetcher>, config: ScrapeConfig) -> Self {
        Self {
            fetcher,
            extractor: Arc::new(AdmissionsExtractor::with_defaults()),
            limiter: Arc::new(RateLimiter::new(config.rate_limit)),
            config,
        }
    }

    /// 대상 목록을 수집하고 결과를 저장
    ///
    /// 개별 페이지 실패는 빈 추출 결과로 기록되며 실행을 멈추지 않습니다.
    pub async fn run(&self, targets: &[ScrapeTarget]) -> Result<Vec<PageRecord>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallel.max(1)));
        let mut tasks = Vec::new();

        for target in targets.iter().take(self.config.max_pages).cloned() {
            let semaphore = semaphore.clone();
            let fetcher = self.fetcher.clone();
            let extractor = self.extractor.clone();
            let limiter = self.limiter.clone();
            let follow_links = self.config.follow_links;

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                Some(process_target(target, fetcher, extractor, limiter, follow_links).await)
            }));
        }

        let mut records = Vec::new();
        for result in join_all(tasks).await {
            match result {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => tracing::warn!("Scrape task panicked: {}", e),
            }
        }

        self.save_records(targets, &records).await?;

        Ok(records)
    }

    /// 진입 페이지의 링크에서 추가 수집 대상 발견
    ///
    /// 입학 관련 키워드를 가진 같은 기관 도메인의 링크만 대상으로 삼습니다.
    pub async fn discover_targets(&self, entry_url: &str) -> Result<Vec<ScrapeTarget>> {
        self.limiter.acquire().await;
        let fetched = self.fetcher.fetch(entry_url).await?;

        let domain = institution_domain(entry_url);
        let mut seen: HashSet<String> = HashSet::new();
        seen.insert(fetched.page.url.trim_end_matches('/').to_string());

        let targets: Vec<ScrapeTarget> = fetched
            .links
            .iter()
            .filter(|link| is_admissions_link(link))
            .filter(|link| match (&domain, institution_domain(&link.url)) {
                (Some(entry), Some(linked)) => *entry == linked,
                _ => false,
            })
            .filter(|link| seen.insert(link.url.clone()))
            .take(self.config.max_pages)
            .map(|link| ScrapeTarget {
                name: if link.text.is_empty() {
                    link.url.clone()
                } else {
                    link.text.clone()
                },
                url: link.url.clone(),
            })
            .collect();

        tracing::info!("Discovered {} admissions links on {}", targets.len(), entry_url);
        Ok(targets)
    }

    /// 페이지별 JSON과 index.json 저장
    async fn save_records(&self, targets: &[ScrapeTarget], records: &[PageRecord]) -> Result<()> {
        tokio::fs::create_dir_all(&self.config.output_dir)
            .await
            .with_context(|| format!("출력 디렉토리 생성 실패: {:?}", self.config.output_dir))?;

        let mut entries = Vec::new();

        for record in records {
            // 콘텐츠 없는 페이지는 보고만 하고 저장하지 않음
            if record.extraction.is_empty() {
                tracing::warn!("Skipping empty extraction: {}", record.url);
                continue;
            }
            let name = targets
                .iter()
                .find(|t| t.url == record.url)
                .map(|t| t.name.clone())
                .unwrap_or_else(|| record.url.clone());
            let file = format!("{}.json", sanitize_filename(&name));
            let path = self.config.output_dir.join(&file);

            let json = serde_json::to_string_pretty(record).context("레코드 직렬화 실패")?;
            tokio::fs::write(&path, json)
                .await
                .with_context(|| format!("레코드 저장 실패: {:?}", path))?;

            entries.push(IndexEntry {
                name,
                url: record.url.clone(),
                title: record.title.clone(),
                file,
            });
        }

        let index = RunIndex {
            generated_at: Utc::now(),
            pages: entries,
        };
        let index_path = self.config.output_dir.join("index.json");
        let json = serde_json::to_string_pretty(&index).context("인덱스 직렬화 실패")?;
        tokio::fs::write(&index_path, json)
            .await
            .with_context(|| format!("인덱스 저장 실패: {:?}", index_path))?;

        tracing::info!("Saved {} page records to {:?}", records.len(), self.config.output_dir);
        Ok(())
    }
}

/// 대상 한 개 처리: 수집 → 추출 → (메인 페이지면) 재정 링크 추적
async fn process_target(
    target: ScrapeTarget,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<AdmissionsExtractor>,
    limiter: Arc<RateLimiter>,
    follow_links: usize,
) -> PageRecord {
    limiter.acquire().await;

    let fetched = match fetcher.fetch(&target.url).await {
        Ok(fetched) => fetched,
        Err(e) => {
            tracing::warn!("Failed to fetch {}: {}", target.url, e);
            return PageRecord {
                url: target.url,
                title: target.name,
                scraped_at: Utc::now(),
                extraction: PageExtraction::empty(),
            };
        }
    };

    let mut extraction = extractor.extract_page(&fetched.page);

    if is_main_admissions_page(&target.name) && !extraction.is_empty() {
        let notes =
            follow_financial_links(&fetched, fetcher, extractor.clone(), limiter, follow_links)
                .await;
        extraction = aggregate(extraction, &notes);
    }

    PageRecord {
        url: fetched.page.url,
        title: fetched.page.title,
        scraped_at: Utc::now(),
        extraction,
    }
}

/// 메인 페이지의 재정 관련 링크를 추적해 재정 노트 수집
async fn follow_financial_links(
    fetched: &FetchedPage,
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<AdmissionsExtractor>,
    limiter: Arc<RateLimiter>,
    follow_links: usize,
) -> Vec<LinkedFinancialNote> {
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(fetched.page.url.clone());

    let candidates: Vec<&PageLink> = fetched
        .links
        .iter()
        .filter(|link| is_financial_link(link))
        .filter(|link| visited.insert(link.url.clone()))
        .take(follow_links)
        .collect();

    let mut notes = Vec::new();
    for link in candidates {
        limiter.acquire().await;

        let linked = match fetcher.fetch(&link.url).await {
            Ok(linked) => linked,
            Err(e) => {
                tracing::warn!("Failed to follow financial link {}: {}", link.url, e);
                continue;
            }
        };

        let linked_extraction = extractor.extract_page(&linked.page);
        let text = linked_extraction
            .financial_info
            .or_else(|| linked_extraction.content.as_deref().and_then(harvest_financial_lines));

        if let Some(text) = text {
            notes.push(LinkedFinancialNote {
                source_title: linked.page.title,
                source_url: linked.page.url,
                text,
            });
        }
    }

    notes
}

/// 링크가 재정 관련인지 (앵커 텍스트 또는 URL 기준)
fn is_financial_link(link: &PageLink) -> bool {
    let text = link.text.to_lowercase();
    let url = link.url.to_lowercase();
    FINANCIAL_LINK_KEYWORDS
        .iter()
        .any(|kw| text.contains(kw) || url.contains(kw))
}

/// 링크가 입학 관련인지 (앵커 텍스트 또는 URL 기준)
fn is_admissions_link(link: &PageLink) -> bool {
    let text = link.text.to_lowercase();
    let url = link.url.to_lowercase();
    ADMISSIONS_LINK_KEYWORDS
        .iter()
        .any(|kw| text.contains(kw) || url.contains(kw))
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 대상 이름을 안전한 파일명으로 변환
pub fn sanitize_filename(name: &str) -> String {
    let strip = Regex::new(r"[^\w\s-]").expect("Invalid regex");
    let collapse = Regex::new(r"[-\s]+").expect("Invalid regex");

    let stripped = strip.replace_all(name, "");
    collapse.replace_all(&stripped, "_").to_lowercase()
}

// ============================================================================
// Tests
// ============================================================================
