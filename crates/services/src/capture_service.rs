use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use kanji_core::capture::{ExtractedKanji, extract_kanji_from_text};
use kanji_core::catalog::KanjiCatalog;
use kanji_core::snapshot::StudyState;

use crate::error::CaptureError;

/// Default time budget for one recognition attempt.
pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(30);
/// Extra attempts after the first one times out.
pub const DEFAULT_OCR_RETRIES: u32 = 1;

/// Errors reported by a text recognition engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum OcrError {
    #[error("image could not be decoded: {0}")]
    InvalidImage(String),
    #[error("text recognition failed: {0}")]
    Recognition(String),
}

/// Turns a photographed worksheet into text.
///
/// `progress` receives values in 0..=100 while recognition runs.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize_text(
        &self,
        image: &[u8],
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<String, OcrError>;
}

/// Engine for already-transcribed input: the "image" is UTF-8 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextPassthroughEngine;

#[async_trait]
impl OcrEngine for TextPassthroughEngine {
    async fn recognize_text(
        &self,
        image: &[u8],
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<String, OcrError> {
        progress(0);
        let text = std::str::from_utf8(image)
            .map_err(|err| OcrError::InvalidImage(err.to_string()))?
            .to_owned();
        progress(100);
        Ok(text)
    }
}

/// Kanji found in one capture, with the ones picked for study.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureResult {
    pub found: Vec<ExtractedKanji>,
    pub selected: Vec<String>,
}

impl CaptureResult {
    /// Add or remove `character` from the selection. Only found characters
    /// can be selected.
    pub fn toggle_selection(&mut self, character: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|c| c == character) {
            self.selected.remove(pos);
            return false;
        }
        if self.found.iter().any(|k| k.character == character) {
            self.selected.push(character.to_owned());
            return true;
        }
        false
    }
}

/// Runs OCR and turns the result into a drill source.
#[derive(Clone)]
pub struct CaptureService {
    engine: Arc<dyn OcrEngine>,
    catalog: Arc<dyn KanjiCatalog>,
    timeout: Duration,
    retries: u32,
}

impl CaptureService {
    #[must_use]
    pub fn new(engine: Arc<dyn OcrEngine>, catalog: Arc<dyn KanjiCatalog>) -> Self {
        Self {
            engine,
            catalog,
            timeout: DEFAULT_OCR_TIMEOUT,
            retries: DEFAULT_OCR_RETRIES,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration, retries: u32) -> Self {
        self.timeout = timeout;
        self.retries = retries;
        self
    }

    /// Recognize `image` and pre-select the marked kanji the catalog knows.
    ///
    /// # Errors
    ///
    /// Returns `CaptureError::Timeout` when every attempt ran out of time,
    /// or `CaptureError::Ocr` when the engine rejects the image.
    pub async fn capture(
        &self,
        image: &[u8],
        progress: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<CaptureResult, CaptureError> {
        let attempts = self.retries.saturating_add(1);
        let mut text = None;
        for attempt in 1..=attempts {
            match tokio::time::timeout(self.timeout, self.engine.recognize_text(image, progress))
                .await
            {
                Ok(result) => {
                    text = Some(result?);
                    break;
                }
                Err(_) if attempt < attempts => {
                    log::warn!("text recognition timed out (attempt {attempt}/{attempts}), retrying");
                }
                Err(_) => {}
            }
        }
        let Some(text) = text else {
            return Err(CaptureError::Timeout {
                attempts,
                timeout: self.timeout,
            });
        };

        let found = extract_kanji_from_text(&text, self.catalog.as_ref());
        let selected: Vec<String> = found
            .iter()
            .filter(|k| k.is_study_target && k.item.is_some())
            .map(|k| k.character.clone())
            .collect();
        log::info!(
            "captured {} kanji, {} marked for study",
            found.len(),
            selected.len()
        );
        Ok(CaptureResult { found, selected })
    }

    /// Store the selection as the extracted-kanji drill source.
    pub fn apply_selection(&self, state: &mut StudyState, result: &CaptureResult) {
        state.extracted_kanji.clone_from(&result.selected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanji_core::catalog::StaticCatalog;
    use kanji_core::model::{Grade, KanjiItem};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn catalog() -> Arc<dyn KanjiCatalog> {
        let items = ["山", "川", "花"]
            .into_iter()
            .map(|c| KanjiItem::placeholder(c, Grade::new(1).ok()));
        Arc::new(StaticCatalog::from_items(items).unwrap())
    }

    struct SlowEngine {
        calls: AtomicU32,
        fast_from_call: u32,
    }

    #[async_trait]
    impl OcrEngine for SlowEngine {
        async fn recognize_text(
            &self,
            _image: &[u8],
            _progress: &(dyn Fn(u8) + Send + Sync),
        ) -> Result<String, OcrError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call < self.fast_from_call {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok("山~".to_owned())
        }
    }

    #[tokio::test]
    async fn passthrough_extracts_and_selects_targets() {
        let svc = CaptureService::new(Arc::new(TextPassthroughEngine), catalog());
        let seen = Mutex::new(Vec::new());
        let progress = |p: u8| seen.lock().unwrap().push(p);

        let result = svc
            .capture("山～ 川 鬱_".as_bytes(), &progress)
            .await
            .unwrap();
        let found: Vec<_> = result.found.iter().map(|k| k.character.as_str()).collect();
        assert_eq!(found, vec!["山", "川", "鬱"]);
        assert_eq!(result.selected, vec!["山".to_owned()]);
        assert_eq!(*seen.lock().unwrap(), vec![0, 100]);

        let mut state = StudyState::new();
        svc.apply_selection(&mut state, &result);
        assert_eq!(state.extracted_kanji, vec!["山".to_owned()]);
    }

    #[tokio::test]
    async fn invalid_bytes_surface_as_ocr_error() {
        let svc = CaptureService::new(Arc::new(TextPassthroughEngine), catalog());
        let err = svc.capture(&[0xff, 0xfe], &|_: u8| {}).await.unwrap_err();
        assert!(matches!(err, CaptureError::Ocr(OcrError::InvalidImage(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn one_timeout_is_retried() {
        let engine = Arc::new(SlowEngine {
            calls: AtomicU32::new(0),
            fast_from_call: 2,
        });
        let svc = CaptureService::new(engine.clone(), catalog());
        let result = svc.capture(b"", &|_: u8| {}).await.unwrap();
        assert_eq!(result.selected, vec!["山".to_owned()]);
        assert_eq!(engine.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_timeouts_give_up() {
        let engine = Arc::new(SlowEngine {
            calls: AtomicU32::new(0),
            fast_from_call: u32::MAX,
        });
        let svc = CaptureService::new(engine, catalog());
        let err = svc.capture(b"", &|_: u8| {}).await.unwrap_err();
        assert!(matches!(err, CaptureError::Timeout { attempts: 2, .. }));
    }

    #[test]
    fn toggling_only_accepts_found_characters() {
        let mut result = CaptureResult {
            found: extract_kanji_from_text("山 川", catalog().as_ref()),
            selected: Vec::new(),
        };
        assert!(result.toggle_selection("川"));
        assert!(!result.toggle_selection("海"));
        assert!(!result.toggle_selection("川"));
        assert!(result.selected.is_empty());
    }
}
