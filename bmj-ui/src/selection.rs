//! Multi-select state for batch photo deletion

use std::collections::BTreeSet;
use tracing::debug;

use bmj_common::{Error, MediaRef, Result};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SelectionState {
    #[default]
    Browsing,
    Selecting(BTreeSet<MediaRef>),
}

/// Rendering of the select-all control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// Selection over the gallery's photo references
///
/// Holds identifiers only; the gallery stays the owner of the photo list.
#[derive(Debug, Clone, Default)]
pub struct MediaSelectionController {
    state: SelectionState,
}

impl MediaSelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.state, SelectionState::Selecting(_))
    }

    pub fn enter(&mut self) {
        if !self.is_selecting() {
            self.state = SelectionState::Selecting(BTreeSet::new());
        }
    }

    /// Back to browsing, discarding the set
    pub fn exit(&mut self) {
        self.state = SelectionState::Browsing;
    }

    /// Add or remove `photo`; returns whether it is now selected
    pub fn toggle(&mut self, photo: &MediaRef) -> Result<bool> {
        let selected = self.selected_mut()?;
        if selected.remove(photo) {
            Ok(false)
        } else {
            selected.insert(photo.clone());
            Ok(true)
        }
    }

    /// Select everything, or nothing if everything was already selected
    pub fn select_all(&mut self, gallery: &[MediaRef]) -> Result<()> {
        let full = self.check_state(gallery) == CheckState::Checked;
        let selected = self.selected_mut()?;
        if full {
            selected.clear();
        } else {
            *selected = gallery.iter().cloned().collect();
        }
        Ok(())
    }

    pub fn check_state(&self, gallery: &[MediaRef]) -> CheckState {
        let count = self.selected_in(gallery).count();
        if count == 0 {
            CheckState::Unchecked
        } else if count == gallery.len() {
            CheckState::Checked
        } else {
            CheckState::Indeterminate
        }
    }

    pub fn is_selected(&self, photo: &MediaRef) -> bool {
        match &self.state {
            SelectionState::Selecting(set) => set.contains(photo),
            SelectionState::Browsing => false,
        }
    }

    pub fn count(&self) -> usize {
        match &self.state {
            SelectionState::Selecting(set) => set.len(),
            SelectionState::Browsing => 0,
        }
    }

    /// Selected references, in a stable order
    pub fn selected(&self) -> Vec<MediaRef> {
        match &self.state {
            SelectionState::Selecting(set) => set.iter().cloned().collect(),
            SelectionState::Browsing => Vec::new(),
        }
    }

    /// Drop selected references that are no longer in the gallery
    pub fn retain_existing(&mut self, gallery: &[MediaRef]) {
        if let SelectionState::Selecting(set) = &mut self.state {
            let before = set.len();
            set.retain(|p| gallery.contains(p));
            if set.len() != before {
                debug!(dropped = before - set.len(), "Selection pruned after refresh");
            }
        }
    }

    fn selected_in<'a>(&'a self, gallery: &'a [MediaRef]) -> impl Iterator<Item = &'a MediaRef> {
        gallery.iter().filter(move |p| self.is_selected(p))
    }

    fn selected_mut(&mut self) -> Result<&mut BTreeSet<MediaRef>> {
        match &mut self.state {
            SelectionState::Selecting(set) => Ok(set),
            SelectionState::Browsing => Err(Error::InvalidState(
                "not in selection mode".to_string(),
            )),
        }
    }
}
