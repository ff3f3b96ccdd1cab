//! admit-extract - 입학처 페이지 구조화 추출 파이프라인
//!
//! 입학처 웹페이지(또는 로컬 문서)에서 지원 요건 / 마감일 / 연락처 /
//! 재정 정보를 추출하고, 문장 경계를 존중하는 오버랩 청크로 분할합니다.

pub mod chunker;
pub mod cli;
pub mod collector;
pub mod extract;
pub mod fetcher;
pub mod ingest;
pub mod pipeline;

// Re-exports
pub use chunker::{Chunk, ChunkConfig, ChunkConfigError, Chunker, SentenceChunker};
pub use collector::{CollectedFile, CollectionStats, CollectorConfig, FileCollector, FileType};
pub use extract::{AdmissionsExtractor, PageExtraction, RawPage};
pub use fetcher::{FetchedPage, HttpFetcher, PageFetcher, PageLink};
pub use ingest::Ingestor;
pub use pipeline::{AdmissionsPipeline, PageRecord, RateLimiter, ScrapeConfig, ScrapeTarget};
