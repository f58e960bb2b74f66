//! Built-in display-only components.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use super::component::{AttachmentPoint, AttachmentRoot, ComponentKind, Teardown, TeardownError};
use crate::api::{ApiError, ApiResult};

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Options for [`LabelContent`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelOptions {
    pub caption: String,
}

/// Static caption text.
#[derive(Debug)]
pub struct LabelContent {
    root: AttachmentRoot,
    caption: Mutex<String>,
    destroyed: AtomicBool,
}

impl LabelContent {
    pub fn new(options: LabelOptions) -> Self {
        Self {
            root: AttachmentRoot::new(ComponentKind::Label),
            caption: Mutex::new(options.caption),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn caption(&self) -> String {
        lock(&self.caption).clone()
    }

    pub fn set_caption(&self, caption: impl Into<String>) -> ApiResult<()> {
        if self.is_destroyed() {
            return Err(ApiError::component_destroyed());
        }
        *lock(&self.caption) = caption.into();
        Ok(())
    }
}

impl AttachmentPoint for LabelContent {
    fn root(&self) -> &AttachmentRoot {
        &self.root
    }
}

impl Teardown for LabelContent {
    fn destroy(&self) -> Result<(), TeardownError> {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            self.root.release();
        }
        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}

/// Options for [`GridContent`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOptions {
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

/// Read-only table of rows.
#[derive(Debug)]
pub struct GridContent {
    root: AttachmentRoot,
    headers: Vec<String>,
    rows: Mutex<Vec<Vec<String>>>,
    destroyed: AtomicBool,
}

impl GridContent {
    pub fn new(options: GridOptions) -> Self {
        Self {
            root: AttachmentRoot::new(ComponentKind::Grid),
            headers: options.headers,
            rows: Mutex::new(options.rows),
            destroyed: AtomicBool::new(false),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        lock(&self.rows).len()
    }

    pub fn rows(&self) -> Vec<Vec<String>> {
        lock(&self.rows).clone()
    }

    /// Replace all rows. Rows are padded or truncated to the header width.
    pub fn set_rows(&self, rows: Vec<Vec<String>>) -> ApiResult<()> {
        if self.is_destroyed() {
            return Err(ApiError::component_destroyed());
        }
        let width = self.headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        *lock(&self.rows) = rows;
        Ok(())
    }
}

impl AttachmentPoint for GridContent {
    fn root(&self) -> &AttachmentRoot {
        &self.root
    }
}

impl Teardown for GridContent {
    fn destroy(&self) -> Result<(), TeardownError> {
        if !self.destroyed.swap(true, Ordering::AcqRel) {
            self.root.release();
            lock(&self.rows).clear();
        }
        Ok(())
    }

    fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErrorCode;

    #[test]
    fn test_label_after_destroy() {
        let label = LabelContent::new(LabelOptions {
            caption: "Depth".into(),
        });
        label.set_caption("Trades").unwrap();
        assert_eq!(label.caption(), "Trades");

        label.destroy().unwrap();
        label.destroy().unwrap();
        let err = label.set_caption("x").unwrap_err();
        assert_eq!(err.code, ErrorCode::ComponentDestroyed);
    }

    #[test]
    fn test_grid_rows_fit_headers() {
        let grid = GridContent::new(GridOptions {
            headers: vec!["Code".into(), "Last".into()],
            rows: Vec::new(),
        });
        grid.set_rows(vec![vec!["BHP".into()], vec!["CBA".into(), "101".into(), "x".into()]])
            .unwrap();

        assert_eq!(grid.rows(), vec![vec!["BHP".to_string(), String::new()], vec![
            "CBA".to_string(),
            "101".to_string()
        ]]);

        grid.destroy().unwrap();
        assert_eq!(grid.row_count(), 0);
    }
}
