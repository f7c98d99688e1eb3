/// How far a drill has got, for rendering a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    pub total: usize,
    pub answered: usize,
    pub remaining: usize,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Answered share of the drill, 0..=100.
    #[must_use]
    pub fn percent(&self) -> u8 {
        kanji_core::scheduler::rounded_percentage(self.answered as u64, self.total as u64)
    }
}
