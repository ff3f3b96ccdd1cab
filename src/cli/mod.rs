//! CLI 모듈
//!
//! admit-extract CLI 명령어 정의 및 구현

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use crate::chunker::{ChunkConfig, SentenceChunker};
use crate::collector::{CollectionStats, CollectorConfig, FileCollector};
use crate::extract::{AdmissionsExtractor, RawPage};
use crate::fetcher::{HttpFetcher, PageFetcher};
use crate::ingest::Ingestor;
use crate::pipeline::{AdmissionsPipeline, ScrapeConfig, ScrapeTarget};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "admit-extract")]
#[command(version, about = "입학처 페이지 구조화 추출 + 청킹 파이프라인", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 입학처 페이지를 수집하고 구조화 추출 결과를 저장
    Scrape {
        /// 수집할 URL (생략하면 기본 UTD 입학처 페이지 목록)
        urls: Vec<String>,

        /// 결과 저장 디렉토리
        #[arg(short, long, default_value = "scraped")]
        output: PathBuf,

        /// 최대 페이지 수
        #[arg(long, default_value = "50")]
        max_pages: usize,

        /// 요청 간 최소 간격 (밀리초)
        #[arg(long, default_value = "1000")]
        rate_limit_ms: u64,

        /// 동시 수집 페이지 수
        #[arg(long, default_value = "3")]
        parallel: usize,

        /// 메인 페이지에서 추적할 재정 링크 수
        #[arg(long, default_value = "5")]
        follow_links: usize,

        /// 진입 페이지의 입학 관련 링크로 대상을 확장
        #[arg(long)]
        discover: Option<String>,
    },

    /// 텍스트 파일 또는 URL에서 섹션/연락처 추출
    Extract {
        /// 추출할 텍스트 파일 경로 또는 http(s) URL
        source: String,

        /// 페이지 출처 URL (연락처 이메일 필터링에 사용, 파일 입력 시)
        #[arg(short, long)]
        url: Option<String>,

        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 텍스트 파일을 문장 경계 청크로 분할
    Chunk {
        /// 분할할 텍스트 파일
        file: PathBuf,

        /// 최대 청크 크기 (문자 수)
        #[arg(long, default_value = "1000")]
        max_chars: usize,

        /// 오버랩 크기 (문자 수)
        #[arg(long, default_value = "200")]
        overlap: usize,

        /// 청크 ID의 밑 문자열 (생략하면 파일 스템)
        #[arg(long)]
        base_id: Option<String>,

        /// JSON으로 출력
        #[arg(long)]
        json: bool,
    },

    /// 로컬 문서(텍스트/HTML/PDF/DOCX)를 청크로 변환
    Ingest {
        /// 수집할 파일 경로
        #[arg(long)]
        file: Option<PathBuf>,

        /// 수집할 폴더 경로 (재귀)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// 직접 입력할 텍스트
        #[arg(short, long)]
        text: Option<String>,

        /// PDF 파일 건너뛰기
        #[arg(long)]
        skip_pdfs: bool,

        /// 청크 JSON 저장 경로 (생략하면 stdout 요약만)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Scrape {
            urls,
            output,
            max_pages,
            rate_limit_ms,
            parallel,
            follow_links,
            discover,
        } => {
            cmd_scrape(
                urls,
                output,
                max_pages,
                rate_limit_ms,
                parallel,
                follow_links,
                discover,
            )
            .await
        }
        Commands::Extract { source, url, json } => cmd_extract(source, url, json).await,
        Commands::Chunk {
            file,
            max_chars,
            overlap,
            base_id,
            json,
        } => cmd_chunk(file, max_chars, overlap, base_id, json).await,
        Commands::Ingest {
            file,
            dir,
            text,
            skip_pdfs,
            output,
        } => cmd_ingest(file, dir, text, skip_pdfs, output).await,
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

/// 기본 수집 대상 (UTD 입학처 페이지)
fn default_targets() -> Vec<ScrapeTarget> {
    [
        ("Main Admissions", "https://www.utdallas.edu/admissions/"),
        ("Undergraduate Admissions", "https://www.utdallas.edu/admissions/undergraduate/"),
        ("Graduate Admissions", "https://www.utdallas.edu/admissions/graduate/"),
        ("International Admissions", "https://www.utdallas.edu/admissions/international/"),
        ("Graduate Admissions Main", "https://graduate-admissions.utdallas.edu/"),
        ("Graduate Contact", "https://graduate-admissions.utdallas.edu/contact-us/"),
        (
            "Graduate Deadlines and Fees",
            "https://graduate-admissions.utdallas.edu/apply-to-ut-dallas/deadlines-and-fees/",
        ),
        (
            "Graduate Steps to Apply",
            "https://graduate-admissions.utdallas.edu/apply-to-ut-dallas/apply/",
        ),
        (
            "Graduate Funding and Financial Aid",
            "https://graduate-admissions.utdallas.edu/apply-to-ut-dallas/funding-and-financial-aid/",
        ),
    ]
    .into_iter()
    .map(|(name, url)| ScrapeTarget {
        name: name.to_string(),
        url: url.to_string(),
    })
    .collect()
}

/// URL에서 대상 이름 유도 (마지막 경로 조각 또는 호스트)
fn target_name_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| {
            let segment = u
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(|s| s.replace(['-', '_'], " "));
            segment.or_else(|| u.host_str().map(|h| h.to_string()))
        })
        .unwrap_or_else(|| url.to_string())
}

/// 스크랩 명령어 (scrape)
async fn cmd_scrape(
    urls: Vec<String>,
    output: PathBuf,
    max_pages: usize,
    rate_limit_ms: u64,
    parallel: usize,
    follow_links: usize,
    discover: Option<String>,
) -> Result<()> {
    let mut targets = if urls.is_empty() && discover.is_none() {
        println!("[*] 기본 UTD 입학처 페이지 목록 사용");
        default_targets()
    } else {
        urls.iter()
            .map(|url| ScrapeTarget {
                name: target_name_from_url(url),
                url: url.clone(),
            })
            .collect()
    };

    let config = ScrapeConfig {
        max_pages,
        rate_limit: Duration::from_millis(rate_limit_ms),
        max_parallel: parallel,
        follow_links,
        output_dir: output.clone(),
    };

    let fetcher = Arc::new(HttpFetcher::new().context("HTTP 수집기 생성 실패")?);
    let pipeline = AdmissionsPipeline::new(fetcher, config);

    if let Some(ref entry_url) = discover {
        println!("[*] 링크 탐색 중: {}", entry_url);
        let discovered = pipeline
            .discover_targets(entry_url)
            .await
            .context("링크 탐색 실패")?;
        println!("[*] 발견된 입학 관련 링크: {} 개", discovered.len());
        for target in discovered {
            if !targets.iter().any(|t| t.url == target.url) {
                targets.push(target);
            }
        }
    }

    println!("[*] 수집 대상: {} 페이지", targets.len().min(max_pages));

    let records = pipeline.run(&targets).await.context("스크랩 실행 실패")?;

    let extracted = records.iter().filter(|r| !r.extraction.is_empty()).count();
    println!();
    println!("[OK] 완료: {} 페이지 수집, {} 페이지 추출 성공", records.len(), extracted);
    println!("     결과: {}", output.display());

    Ok(())
}

/// 추출 명령어 (extract)
async fn cmd_extract(source: String, url: Option<String>, json: bool) -> Result<()> {
    let page = if source.starts_with("http://") || source.starts_with("https://") {
        let fetcher = HttpFetcher::new().context("HTTP 수집기 생성 실패")?;
        fetcher.fetch(&source).await.context("페이지 수집 실패")?.page
    } else {
        let file = PathBuf::from(&source);
        let text = tokio::fs::read_to_string(&file)
            .await
            .with_context(|| format!("파일 읽기 실패: {:?}", file))?;
        RawPage {
            url: url.unwrap_or_else(|| format!("file://{}", file.display())),
            title: file.display().to_string(),
            text,
        }
    };

    let extraction = AdmissionsExtractor::with_defaults().extract_page(&page);

    if json {
        println!("{}", serde_json::to_string_pretty(&extraction)?);
        return Ok(());
    }

    if extraction.is_empty() {
        println!("[!] 유효한 콘텐츠가 없습니다: {}", page.url);
        return Ok(());
    }

    for (label, section) in [
        ("지원 요건", &extraction.requirements),
        ("마감일", &extraction.deadlines),
        ("연락처", &extraction.contact_info),
        ("재정 정보", &extraction.financial_info),
    ] {
        match section {
            Some(body) => {
                println!("[OK] {}:", label);
                println!("{}", body);
                println!();
            }
            None => println!("[!] {}: 없음\n", label),
        }
    }

    Ok(())
}

/// 청킹 명령어 (chunk)
async fn cmd_chunk(
    file: PathBuf,
    max_chars: usize,
    overlap: usize,
    base_id: Option<String>,
    json: bool,
) -> Result<()> {
    let text = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("파일 읽기 실패: {:?}", file))?;

    let config = ChunkConfig {
        max_characters: max_chars,
        overlap_characters: overlap,
    };
    let chunker = SentenceChunker::new(config).context("청킹 설정이 잘못되었습니다")?;

    let base_id = base_id.unwrap_or_else(|| {
        file.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string()
    });
    let source = format!("file://{}", file.display());
    let chunks = chunker.chunk_page(&text, &base_id, &source);

    if json {
        println!("{}", serde_json::to_string_pretty(&chunks)?);
        return Ok(());
    }

    println!("[OK] {} 청크 생성:\n", chunks.len());
    for chunk in &chunks {
        println!("  [{}] {} chars", chunk.id, chunk.text.chars().count());
        println!("      {}", truncate_text(&chunk.text, 100));
    }

    Ok(())
}

/// 인제스트 명령어 (ingest)
async fn cmd_ingest(
    file: Option<PathBuf>,
    dir: Option<PathBuf>,
    text: Option<String>,
    skip_pdfs: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let ingestor = Ingestor::with_defaults();

    let chunks = if let Some(ref text) = text {
        ingestor.ingest_text(text)
    } else if let Some(path) = file.or(dir) {
        let config = CollectorConfig {
            skip_pdfs,
            ..Default::default()
        };
        let collector = FileCollector::new(config);

        // 폴더 수집이면 통계 먼저 표시
        if path.is_dir() {
            let files = collector.collect_directory(&path)?;
            let stats = CollectionStats::from_files(&files);
            println!("[*] 수집 대상: {} 파일", stats.total_files);
            println!(
                "    텍스트: {}, HTML: {}, PDF: {}, DOCX: {}",
                stats.text_files, stats.html_files, stats.pdf_files, stats.docx_files
            );
            println!("    총 크기: {}", format_bytes(stats.total_size as usize));
            println!();
        }

        ingestor.ingest_path(&path, &collector).await?
    } else {
        bail!("--file, --dir, --text 중 하나를 지정해야 합니다");
    };

    if chunks.is_empty() {
        println!("[!] 생성된 청크가 없습니다.");
        return Ok(());
    }

    println!("[OK] {} 청크 생성", chunks.len());

    if let Some(output) = output {
        let json = serde_json::to_string_pretty(&chunks)?;
        tokio::fs::write(&output, json)
            .await
            .with_context(|| format!("청크 저장 실패: {:?}", output))?;
        println!("     저장: {}", output.display());
    } else {
        for chunk in chunks.iter().take(5) {
            println!("  [{}] {}", chunk.id, truncate_text(&chunk.text, 80));
        }
        if chunks.len() > 5 {
            println!("  ... 외 {} 청크", chunks.len() - 5);
        }
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// 바이트 크기 포맷팅
fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("hello\nworld", 20), "hello world");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
    }

    #[test]
    fn test_target_name_from_url() {
        assert_eq!(
            target_name_from_url("https://graduate-admissions.utdallas.edu/contact-us/"),
            "contact us"
        );
        assert_eq!(
            target_name_from_url("https://www.utdallas.edu"),
            "www.utdallas.edu"
        );
    }

    #[test]
    fn test_default_targets_include_main_page() {
        let targets = default_targets();
        assert!(targets.iter().any(|t| t.name == "Main Admissions"));
        assert!(targets.iter().all(|t| t.url.starts_with("https://")));
    }
}
