//! Comment sources
//!
//! A source delivers top-level comments for one video, in the order the
//! platform returned them.

pub mod youtube;

use cs_core::error::Result;
use cs_core::types::CommentRecord;

/// Trait for comment sources
pub trait CommentSource: Send + Sync {
    /// Short name for log and error messages
    fn name(&self) -> &str;

    /// Fetch up to `max_comments` comments, reporting the running count
    fn fetch_with_progress(
        &self,
        video_id: &str,
        max_comments: usize,
        progress: &mut dyn FnMut(usize),
    ) -> Result<Vec<CommentRecord>>;

    /// Fetch up to `max_comments` comments
    fn fetch(&self, video_id: &str, max_comments: usize) -> Result<Vec<CommentRecord>> {
        self.fetch_with_progress(video_id, max_comments, &mut |_| {})
    }
}
