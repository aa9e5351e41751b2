// IP Info Bar - Cycle Selector
// Copyright (C) 2026 Christos A. Daggas
// SPDX-License-Identifier: MIT

//! Which of the available labels the panel is currently showing.

/// Bounded index over the current label list.
///
/// Invariant: `index < max(1, labels.len())`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSelector {
    labels: Vec<String>,
    index: usize,
}

impl CycleSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Step to the next label, wrapping around. No-op on an empty list.
    pub fn advance(&mut self) {
        if self.labels.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.labels.len();
    }

    /// Install a freshly built label list.
    ///
    /// The index survives unless it falls outside the new list.
    pub fn replace(&mut self, labels: Vec<String>) {
        let len = labels.len();
        self.labels = labels;
        self.on_list_replaced(len);
    }

    /// Drop all labels (error or teardown).
    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    fn on_list_replaced(&mut self, new_len: usize) {
        if self.index >= new_len {
            self.index = 0;
        }
    }

    /// The label at the current index, or `None` when there is nothing to show.
    pub fn current(&self) -> Option<&str> {
        self.labels.get(self.index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
