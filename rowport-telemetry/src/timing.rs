use std::collections::HashMap;
use std::rc::Rc;

use crate::{Clock, PlatformError};

/// A named-mark timing facility (mark a point in time, measure between two marks).
pub trait MarkTimer {
    /// Checks that the facility works on this host. Called once when the timer is installed.
    fn probe(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    fn mark(&mut self, name: &str) -> Result<(), PlatformError>;

    /// Milliseconds from `start_mark` to `end_mark`.
    fn measure(&mut self, start_mark: &str, end_mark: &str) -> Result<f64, PlatformError>;

    fn clear(&mut self, name: &str);
}

/// In-process marks timestamped by a [`Clock`].
pub struct MarkTable {
    clock: Rc<dyn Clock>,
    marks: HashMap<String, f64>,
}

impl MarkTable {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            marks: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

impl MarkTimer for MarkTable {
    fn probe(&self) -> Result<(), PlatformError> {
        let now = self.clock.now_ms();
        if now.is_finite() {
            Ok(())
        } else {
            Err(PlatformError::InvalidReading(format!("clock returned {now}")))
        }
    }

    fn mark(&mut self, name: &str) -> Result<(), PlatformError> {
        let now = self.clock.now_ms();
        if !now.is_finite() {
            return Err(PlatformError::InvalidReading(format!("clock returned {now}")));
        }
        self.marks.insert(name.to_string(), now);
        Ok(())
    }

    fn measure(&mut self, start_mark: &str, end_mark: &str) -> Result<f64, PlatformError> {
        let start = *self
            .marks
            .get(start_mark)
            .ok_or_else(|| PlatformError::MissingMark(start_mark.to_string()))?;
        let end = *self
            .marks
            .get(end_mark)
            .ok_or_else(|| PlatformError::MissingMark(end_mark.to_string()))?;
        let duration = end - start;
        if duration < 0.0 {
            return Err(PlatformError::InvalidReading(format!(
                "`{end_mark}` precedes `{start_mark}`"
            )));
        }
        Ok(duration)
    }

    fn clear(&mut self, name: &str) {
        self.marks.remove(name);
    }
}

impl std::fmt::Debug for MarkTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkTable")
            .field("marks", &self.marks)
            .finish_non_exhaustive()
    }
}

/// A timer for hosts without a fine-grained timing facility.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMarkTimer;

impl MarkTimer for NoMarkTimer {
    fn probe(&self) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }

    fn mark(&mut self, _name: &str) -> Result<(), PlatformError> {
        Err(PlatformError::Unsupported)
    }

    fn measure(&mut self, _start_mark: &str, _end_mark: &str) -> Result<f64, PlatformError> {
        Err(PlatformError::Unsupported)
    }

    fn clear(&mut self, _name: &str) {}
}
