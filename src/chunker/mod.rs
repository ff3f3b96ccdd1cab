//! 문장 경계 청킹 모듈
//!
//! 추출된 페이지 텍스트를 오버랩이 있는 고정 크기 창으로 분할합니다.
//! 창 끝이 문장 중간이면 창 후반부의 마지막 문장 경계로 당겨 자릅니다.

use serde::Serialize;
use thiserror::Error;

/// 창 안에서 찾는 문장 경계 마커
const SENTENCE_MARKERS: &[&str] = &[". ", ".\n", "! ", "!\n", "? ", "?\n"];

// ============================================================================
// Chunk Configuration
// ============================================================================

/// 청킹 설정
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// 최대 청크 크기 (문자 수)
    pub max_characters: usize,
    /// 오버랩 크기 (문자 수)
    pub overlap_characters: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_characters: 1000,
            overlap_characters: 200,
        }
    }
}

impl ChunkConfig {
    /// 설정 검증
    pub fn validate(&self) -> Result<(), ChunkConfigError> {
        if self.max_characters == 0 {
            return Err(ChunkConfigError::ZeroMax);
        }
        if self.overlap_characters >= self.max_characters {
            return Err(ChunkConfigError::OverlapTooLarge {
                overlap: self.overlap_characters,
                max: self.max_characters,
            });
        }
        Ok(())
    }
}

/// 잘못된 청킹 설정
#[derive(Debug, Error)]
pub enum ChunkConfigError {
    #[error("max_characters must be greater than zero")]
    ZeroMax,
    #[error("overlap_characters ({overlap}) must be smaller than max_characters ({max})")]
    OverlapTooLarge { overlap: usize, max: usize },
}

// ============================================================================
// Chunk
// ============================================================================

/// 다운스트림 인덱싱용 청크 한 개
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    pub id: String,
    pub text: String,
    pub source_url: String,
}

// ============================================================================
// Chunker Trait
// ============================================================================

/// 텍스트 청킹 전략 트레이트
pub trait Chunker: Send + Sync {
    /// 텍스트를 청크 본문으로 분할
    fn split(&self, text: &str) -> Vec<String>;

    /// 청커 이름
    fn name(&self) -> &'static str;
}

// ============================================================================
// SentenceChunker
// ============================================================================

/// 문장 경계 인식 청커
///
/// 창 크기 `max_characters`로 전진하되, 창 끝이 본문 중간이면 창 후반부
/// (max/2 초과 지점)의 마지막 문장 경계에서 자릅니다. 다음 창은
/// `overlap_characters`만큼 되돌아간 지점에서 시작합니다.
pub struct SentenceChunker {
    config: ChunkConfig,
}

impl SentenceChunker {
    /// 설정으로 생성 (설정 검증 포함)
    pub fn new(config: ChunkConfig) -> Result<Self, ChunkConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 기본 설정으로 생성
    pub fn with_defaults() -> Self {
        Self {
            config: ChunkConfig::default(),
        }
    }

    /// 페이지 텍스트를 ID가 붙은 청크로 변환
    ///
    /// 청크가 하나뿐이면 ID는 `base_id` 그대로, 여럿이면 `base_id_1`부터
    /// 순번이 붙습니다.
    pub fn chunk_page(&self, text: &str, base_id: &str, source_url: &str) -> Vec<Chunk> {
        let pieces = self.split(text);
        let multiple = pieces.len() > 1;

        pieces
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                id: if multiple {
                    format!("{}_{}", base_id, i + 1)
                } else {
                    base_id.to_string()
                },
                text,
                source_url: source_url.to_string(),
            })
            .collect()
    }

    /// 창 안의 마지막 문장 경계 위치 (마커 시작 바이트)
    fn last_sentence_break(window: &str) -> Option<usize> {
        SENTENCE_MARKERS
            .iter()
            .filter_map(|marker| window.rfind(marker))
            .max()
    }
}

impl Chunker for SentenceChunker {
    fn split(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if text.len() <= self.config.max_characters {
            return vec![text.to_string()];
        }

        let mut pieces = Vec::new();
        let mut start = 0usize;

        while start < text.len() {
            let mut end = floor_char_boundary(text, start + self.config.max_characters);

            // 다중 바이트 문자로 창이 0이 되면 한 문자만큼 강제 전진
            if end <= start {
                end = next_char_boundary(text, start + 1);
            }

            // 창 끝이 본문 중간이면 후반부의 마지막 문장 경계로 당김
            if end < text.len() {
                if let Some(pos) = Self::last_sentence_break(&text[start..end]) {
                    if pos > self.config.max_characters / 2 {
                        end = start + pos + 1;
                    }
                }
            }

            let piece = text[start..end].trim();
            if !piece.is_empty() {
                pieces.push(piece.to_string());
            }

            if end >= text.len() {
                break;
            }

            // 오버랩만큼 되돌아가되, 항상 전진은 보장
            let next = floor_char_boundary(text, end.saturating_sub(self.config.overlap_characters));
            start = if next > start { next } else { end };
        }

        pieces
    }

    fn name(&self) -> &'static str {
        "SentenceChunker"
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// UTF-8 경계 조정 (인덱스 이하로)
#[inline]
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

/// UTF-8 경계 조정 (인덱스 이상으로)
#[inline]
fn next_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        s.len()
    } else {
        let mut i = index;
        while i < s.len() && !s.is_char_boundary(i) {
            i += 1;
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

    #[test]
    fn test_split_empty() {
        let chunker = SentenceChunker::with_defaults();
        assert!(chunker.split("").is_empty());
        assert!(chunker.split("   \n  ").is_empty());
    }

    #[test]
    fn test_split_short_text_single_piece() {
        let chunker = SentenceChunker::with_defaults();
        let pieces = chunker.split("A short admissions summary fits in one chunk.");
        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0], "A short admissions summary fits in one chunk.");
    }

    #[test]
    fn test_split_2500_without_breaks_gives_three() {
        // 문장 경계가 없으면 창은 그대로 max 크기로 전진 (보폭 800)
        let chunker = SentenceChunker::with_defaults();
        let text = "a".repeat(2500);
        let pieces = chunker.split(&text);
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].len(), 1000);
        assert_eq!(pieces[1].len(), 1000);
        assert_eq!(pieces[2].len(), 900);
    }

    #[test]
    fn test_split_snaps_to_sentence_boundary() {
        let chunker = SentenceChunker::with_defaults();
        let sentence = "All application materials must arrive before the deadline. ";
        let text = sentence.repeat(43);
        let pieces = chunker.split(&text);
        assert!(pieces.len() >= 3);
        for piece in &pieces[..pieces.len() - 1] {
            // 마지막이 아닌 조각은 문장 끝에서 잘리고 크기 범위를 지킴
            assert!(piece.ends_with('.'));
            assert!(piece.len() <= 1000);
            assert!(piece.len() > 500);
        }
    }

    #[test]
    fn test_split_overlap_carries_tail() {
        let chunker = SentenceChunker::with_defaults();
        let sentence = "All application materials must arrive before the deadline. ";
        let text = sentence.repeat(43);
        let pieces = chunker.split(&text);
        assert!(pieces.len() >= 2);
        // 두 번째 조각은 첫 조각의 꼬리(오버랩 200바이트)로 시작
        assert!(pieces[0].ends_with(&pieces[1][..200]));
    }

    #[test]
    fn test_split_pieces_reconstruct_source() {
        // 조각의 원문 내 위치를 찾아 이어붙이면 (오버랩 제외) 원문 전체가 복원됨
        let chunker = SentenceChunker::with_defaults();
        let text: String = (0..60)
            .map(|i| format!("Application file number {} cleared the review stage. ", i))
            .collect();
        let text = text.trim_end().to_string();
        let pieces = chunker.split(&text);
        assert!(pieces.len() >= 3);

        let mut rebuilt = String::new();
        let mut prev_end = 0usize;
        for piece in &pieces {
            let start = text.find(piece.as_str()).expect("piece not found in source");
            assert!(start <= prev_end, "gap between consecutive pieces");
            rebuilt.push_str(&piece[prev_end - start..]);
            prev_end = start + piece.len();
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_chunk_page_single_keeps_base_id() {
        let chunker = SentenceChunker::with_defaults();
        let chunks = chunker.chunk_page("Short page body.", "page", "https://example.edu/a");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].id, "page");
        assert_eq!(chunks[0].source_url, "https://example.edu/a");
    }

    #[test]
    fn test_chunk_page_multiple_numbered_ids() {
        let chunker = SentenceChunker::with_defaults();
        let text = "b".repeat(2500);
        let chunks = chunker.chunk_page(&text, "page", "https://example.edu/a");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].id, "page_1");
        assert_eq!(chunks[1].id, "page_2");
        assert_eq!(chunks[2].id, "page_3");
    }

    #[test]
    fn test_config_rejects_overlap_not_smaller_than_max() {
        let config = ChunkConfig {
            max_characters: 200,
            overlap_characters: 200,
        };
        assert!(SentenceChunker::new(config).is_err());
    }

    #[test]
    fn test_config_rejects_zero_max() {
        let config = ChunkConfig {
            max_characters: 0,
            overlap_characters: 0,
        };
        assert!(matches!(
            SentenceChunker::new(config),
            Err(ChunkConfigError::ZeroMax)
        ));
    }

    #[test]
    fn test_split_utf8_safe() {
        let config = ChunkConfig {
            max_characters: 50,
            overlap_characters: 10,
        };
        let chunker = SentenceChunker::new(config).expect("valid config");
        let text = "대학원 입학 요건은 다음과 같습니다. ".repeat(20);
        let pieces = chunker.split(&text);
        assert!(!pieces.is_empty());
        for piece in &pieces {
            assert!(!piece.is_empty());
        }
    }
}
