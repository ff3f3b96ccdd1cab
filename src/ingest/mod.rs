//! 로컬 문서 인제스트 모듈
//!
//! 수집된 파일(텍스트/HTML/PDF/DOCX)이나 직접 전달된 텍스트를 읽어
//! 청크로 변환합니다. 청크 ID는 문서 타입 접두어 + 파일 스템으로
//! 만들어지며, 출처는 `file://` 또는 `text://` URL로 기록됩니다.

pub mod docx;
pub mod pdf;

use std::path::Path;

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::chunker::{Chunk, SentenceChunker};
use crate::collector::{CollectedFile, FileCollector, FileType};
use crate::fetcher;

// ============================================================================
// Ingestor
// ============================================================================

/// 문서 인제스터
pub struct Ingestor {
    chunker: SentenceChunker,
}

impl Ingestor {
    /// 청커로 생성
    pub fn new(chunker: SentenceChunker) -> Self {
        Self { chunker }
    }

    /// 기본 청킹 설정으로 생성
    pub fn with_defaults() -> Self {
        Self::new(SentenceChunker::with_defaults())
    }

    /// 수집된 파일 하나를 청크로 변환
    pub async fn ingest_file(&self, file: &CollectedFile) -> Result<Vec<Chunk>> {
        let source = format!("file://{}", file.path.display());
        let text = self.read_text(file, &source).await?;

        if text.trim().is_empty() {
            tracing::warn!("No text content in {:?}", file.path);
            return Ok(Vec::new());
        }

        let base_id = format!("{}_{}", file.file_type.id_prefix(), file.stem());
        Ok(self.chunker.chunk_page(&text, &base_id, &source))
    }

    /// 직접 전달된 텍스트를 청크로 변환
    pub fn ingest_text(&self, text: &str) -> Vec<Chunk> {
        let id = Uuid::new_v4();
        let base_id = format!("text_{}", id);
        let source = format!("text://{}", id);
        self.chunker.chunk_page(text, &base_id, &source)
    }

    /// 경로(파일 또는 디렉토리)를 수집해 모두 청크로 변환
    pub async fn ingest_path(
        &self,
        path: &Path,
        collector: &FileCollector,
    ) -> Result<Vec<Chunk>> {
        let files = if path.is_dir() {
            collector.collect_directory(path)?
        } else {
            collector.collect_file(path)?.into_iter().collect()
        };

        let mut chunks = Vec::new();
        for file in &files {
            match self.ingest_file(file).await {
                Ok(file_chunks) => chunks.extend(file_chunks),
                Err(e) => tracing::warn!("Failed to ingest {:?}: {}", file.path, e),
            }
        }

        tracing::info!("Ingested {} chunks from {} files", chunks.len(), files.len());
        Ok(chunks)
    }

    /// 문서 타입별 텍스트 읽기
    async fn read_text(&self, file: &CollectedFile, source: &str) -> Result<String> {
        match file.file_type {
            FileType::Text => tokio::fs::read_to_string(&file.path)
                .await
                .with_context(|| format!("Failed to read text file: {:?}", file.path)),

            FileType::Html => {
                let html = tokio::fs::read_to_string(&file.path)
                    .await
                    .with_context(|| format!("Failed to read HTML file: {:?}", file.path))?;
                Ok(fetcher::parse_page(&html, source).page.text)
            }

            FileType::Pdf => {
                // PDF 추출은 CPU 바운드이므로 spawn_blocking 사용
                let path = file.path.clone();
                tokio::task::spawn_blocking(move || pdf::extract_text_from_pdf(&path))
                    .await
                    .context("PDF extraction task failed")?
            }

            FileType::Docx => {
                let path = file.path.clone();
                tokio::task::spawn_blocking(move || docx::extract_text_from_docx(&path))
                    .await
                    .context("DOCX extraction task failed")?
            }
        }
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ============================================================================
// Tests
// ============================================================================
