use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::extensions::AnnotationMark;
use crate::render::Renderer;

use super::ChartEngine;

impl<R: Renderer> ChartEngine<R> {
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationMark] {
        &self.annotations
    }

    /// Replaces all annotation marks.
    ///
    /// Marks are checked when a frame is built; malformed ones are skipped
    /// there with a warning instead of failing this call.
    pub fn set_annotations(&mut self, marks: Vec<AnnotationMark>) {
        debug!(count = marks.len(), "set annotations");
        self.annotations = marks;
    }

    pub fn set_annotations_json(&mut self, input: &str) -> ChartResult<()> {
        let marks: Vec<AnnotationMark> = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidData(format!("failed to parse annotations: {e}")))?;
        self.set_annotations(marks);
        Ok(())
    }

    pub fn clear_annotations(&mut self) {
        self.annotations.clear();
    }
}
