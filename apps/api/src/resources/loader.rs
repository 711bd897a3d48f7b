#![allow(dead_code)]

//! Stateful matrix view with last-request-wins loading.
//!
//! Every `load` takes a ticket from a monotonically increasing counter. When
//! a build completes it is applied only if its ticket is still the newest one
//! issued, so a slow response for an older `(year, group)` can never overwrite
//! the view of a newer request. Applying a matrix resets expansion to all roots.
//!
//! The HTTP handlers are stateless and never hold a `MatrixLoader`. It is the
//! view-model a client embeds around `load_matrix`: one per open matrix screen,
//! owning that screen's `(year, group)` selection and expansion set.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::resources::matrix::load_matrix;
use crate::resources::rows::{GroupBy, HierarchyDefect, MatrixError, MatrixResponse, ResourceRow};
use crate::resources::visibility::{
    collapse_all, compute_visible_rows, default_expansion, expand_all, toggle_expansion,
    ExpansionSet,
};
use crate::store::PlanningStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixQuery {
    pub year: i32,
    pub group: GroupBy,
}

/// The matrix currently on screen and its expansion state.
#[derive(Debug, Clone)]
pub struct MatrixView {
    pub query: MatrixQuery,
    pub matrix: MatrixResponse,
    pub expanded: ExpansionSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { ticket: u64 },
    /// A newer request was issued while this one was in flight; its result was dropped.
    Superseded { ticket: u64, latest: u64 },
}

pub struct MatrixLoader {
    store: Arc<dyn PlanningStore>,
    latest: AtomicU64,
    view: Mutex<Option<MatrixView>>,
}

impl MatrixLoader {
    pub fn new(store: Arc<dyn PlanningStore>) -> Self {
        Self {
            store,
            latest: AtomicU64::new(0),
            view: Mutex::new(None),
        }
    }

    /// Builds the matrix for `query` and applies it if no newer load was started meanwhile.
    ///
    /// A failed build of a superseded request is reported as `Superseded`, not as an error.
    pub async fn load(&self, query: MatrixQuery) -> Result<LoadOutcome, MatrixError> {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Matrix load #{ticket} for {:?} {}", query.group, query.year);

        let result = load_matrix(self.store.as_ref(), query.year, query.group).await;

        let mut view = self.lock_view();
        let latest = self.latest.load(Ordering::SeqCst);
        if ticket != latest {
            info!("Discarding matrix load #{ticket}; #{latest} is newer");
            return Ok(LoadOutcome::Superseded { ticket, latest });
        }

        let matrix = result?;
        let expanded = default_expansion(&matrix.rows);
        *view = Some(MatrixView {
            query,
            matrix,
            expanded,
        });
        Ok(LoadOutcome::Applied { ticket })
    }

    pub fn view(&self) -> Option<MatrixView> {
        self.lock_view().clone()
    }

    /// Flips one row's expansion. Returns the new set, or `None` before the first load.
    pub fn toggle(&self, row_id: &str) -> Option<ExpansionSet> {
        self.replace_expansion(|view| toggle_expansion(&view.expanded, row_id))
    }

    pub fn expand_all(&self) -> Option<ExpansionSet> {
        self.replace_expansion(|view| expand_all(&view.matrix.rows))
    }

    pub fn collapse_all(&self) -> Option<ExpansionSet> {
        self.replace_expansion(|_| collapse_all())
    }

    /// Rows of the current view to render, cloned out of the lock.
    pub fn visible_rows(&self) -> Result<Vec<ResourceRow>, HierarchyDefect> {
        let view = self.lock_view();
        let Some(view) = view.as_ref() else {
            return Ok(Vec::new());
        };
        let visible = compute_visible_rows(&view.matrix.rows, &view.expanded)?;
        Ok(visible.into_iter().cloned().collect())
    }

    fn replace_expansion(
        &self,
        next: impl FnOnce(&MatrixView) -> ExpansionSet,
    ) -> Option<ExpansionSet> {
        let mut guard = self.lock_view();
        let view = guard.as_mut()?;
        view.expanded = next(view);
        Some(view.expanded.clone())
    }

    fn lock_view(&self) -> MutexGuard<'_, Option<MatrixView>> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
