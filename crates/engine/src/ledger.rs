//! Selection ledger: selected and explicitly deselected identifiers,
//! accumulated across page visits.
//!
//! Only one page is resident at a time, so every user action is reconciled
//! against that page alone. Selections that belong to other pages are never
//! touched by a page-local change.

use std::collections::HashSet;

use crate::item::Item;

#[derive(Debug, Clone)]
pub struct SelectionLedger<Id> {
    selected: HashSet<Id>,
    deselected: HashSet<Id>,
}

impl<Id> Default for SelectionLedger<Id> {
    fn default() -> Self {
        Self {
            selected: HashSet::new(),
            deselected: HashSet::new(),
        }
    }
}

impl<Id: Clone + Eq + std::hash::Hash> SelectionLedger<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &HashSet<Id> {
        &self.selected
    }

    pub fn deselected(&self) -> &HashSet<Id> {
        &self.deselected
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn is_selected(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    pub fn is_deselected(&self, id: &Id) -> bool {
        self.deselected.contains(id)
    }

    /// Resident items whose identifiers are selected, in page order.
    pub fn visible_selection<'a, I>(&self, resident: &'a [I]) -> Vec<&'a I>
    where
        I: Item<Id = Id>,
    {
        resident
            .iter()
            .filter(|item| self.selected.contains(&item.id()))
            .collect()
    }

    /// Reconcile the checkbox state the user now has on the resident page.
    ///
    /// Ids of the page that were selected but are no longer checked are
    /// recorded as deselected. The page's contribution to the selected set
    /// is then replaced wholesale by `checked`.
    pub fn apply_user_selection_change<I>(&mut self, resident: &[I], checked: &[I])
    where
        I: Item<Id = Id>,
    {
        let page_ids: HashSet<Id> = resident.iter().map(Item::id).collect();
        let checked_ids: HashSet<Id> = checked.iter().map(Item::id).collect();

        let newly_deselected: Vec<Id> = page_ids
            .iter()
            .filter(|id| self.selected.contains(*id) && !checked_ids.contains(*id))
            .cloned()
            .collect();
        self.deselected.extend(newly_deselected);

        self.selected.retain(|id| !page_ids.contains(id));
        self.selected.extend(checked_ids);
    }

    /// Flip one resident row. Ids not on the resident page are ignored.
    pub fn toggle<I>(&mut self, resident: &[I], id: &Id)
    where
        I: Item<Id = Id>,
    {
        if !resident.iter().any(|item| &item.id() == id) {
            return;
        }
        let checked: Vec<I> = resident
            .iter()
            .filter(|item| {
                let item_id = item.id();
                let was_checked = self.selected.contains(&item_id);
                if &item_id == id {
                    !was_checked
                } else {
                    was_checked
                }
            })
            .cloned()
            .collect();
        self.apply_user_selection_change(resident, &checked);
    }

    /// Header checkbox: check or uncheck every resident row.
    pub fn set_page_checked<I>(&mut self, resident: &[I], checked: bool)
    where
        I: Item<Id = Id>,
    {
        if checked {
            self.apply_user_selection_change(resident, resident);
        } else {
            self.apply_user_selection_change::<I>(resident, &[]);
        }
    }

    pub fn is_page_fully_selected<I>(&self, resident: &[I]) -> bool
    where
        I: Item<Id = Id>,
    {
        !resident.is_empty() && resident.iter().all(|item| self.selected.contains(&item.id()))
    }

    /// Add ids without recording anything as deselected (auto-select path).
    pub fn extend(&mut self, ids: impl IntoIterator<Item = Id>) {
        self.selected.extend(ids);
    }

    /// Forget both sets. Only a new auto-select request does this.
    pub fn clear(&mut self) {
        self.selected.clear();
        self.deselected.clear();
    }
}
