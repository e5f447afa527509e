//! Sibling list reconciliation.
//!
//! Working state is a pair of slot vectors: `old` holds instances not yet
//! consumed, `out` holds instances placed at their new position. An instance
//! lives in exactly one of them, so on error the caller can rebuild a child
//! list that still covers everything mounted.

use crate::collections::KeyIndex;
use crate::diagnostics::PATCH;
use crate::error::ReconcileError;
use crate::host::{HandleId, Host};
use crate::node::Node;

use super::{ChildDiffStrategy, ChildList, InstanceId, Reconciler};

type Slots = [Option<InstanceId>];

impl<H: Host> Reconciler<'_, H> {
    /// Patches `children` (mounted under `parent`) into `new`. `end` is the
    /// handle that follows the list, if any.
    pub(crate) fn patch_children(
        &mut self,
        parent: HandleId,
        children: &mut ChildList,
        new: &[Node],
        end: Option<HandleId>,
    ) -> Result<(), ReconcileError> {
        let mut old: Vec<Option<InstanceId>> = children.drain(..).map(Some).collect();
        let mut out: Vec<Option<InstanceId>> = vec![None; new.len()];
        let result = match self.strategy {
            ChildDiffStrategy::Keyed => self.diff_keyed(parent, &mut old, &mut out, new, end),
            ChildDiffStrategy::Indexed => self.diff_indexed(parent, &mut old, &mut out, new, end),
        };
        children.extend(out.into_iter().flatten());
        children.extend(old.into_iter().flatten());
        result
    }

    fn patch_into(
        &mut self,
        parent: HandleId,
        old: Option<InstanceId>,
        node: &Node,
        anchor: Option<HandleId>,
        slot: &mut Option<InstanceId>,
    ) -> Result<(), ReconcileError> {
        match self.patch(parent, old, Some(node), anchor) {
            Ok(id) => {
                *slot = id;
                Ok(())
            }
            Err(err) => {
                *slot = old;
                Err(err)
            }
        }
    }

    fn first_handle_of(&self, slots: &Slots, end: Option<HandleId>) -> Option<HandleId> {
        self.tree
            .first_handle_in(slots.iter().flatten().copied())
            .or(end)
    }

    fn unmount_all(&mut self, parent: HandleId, old: &mut Slots) -> Result<(), ReconcileError> {
        for slot in old.iter_mut() {
            if let Some(id) = *slot {
                self.unmount(parent, id)?;
                *slot = None;
            }
        }
        Ok(())
    }

    /// Position by position. Never moves a handle: a type change at a
    /// position replaces in place.
    fn diff_indexed(
        &mut self,
        parent: HandleId,
        old: &mut Slots,
        out: &mut Slots,
        new: &[Node],
        end: Option<HandleId>,
    ) -> Result<(), ReconcileError> {
        let shared = old.len().min(new.len());
        for i in 0..shared {
            let anchor = self.first_handle_of(&old[i + 1..], end);
            let id = old[i].take();
            self.patch_into(parent, id, &new[i], anchor, &mut out[i])?;
        }
        for i in shared..new.len() {
            self.patch_into(parent, None, &new[i], end, &mut out[i])?;
        }
        self.unmount_all(parent, &mut old[shared..])
    }

    fn diff_keyed(
        &mut self,
        parent: HandleId,
        old: &mut Slots,
        out: &mut Slots,
        new: &[Node],
        end: Option<HandleId>,
    ) -> Result<(), ReconcileError> {
        let mut start = 0;
        let mut old_end = old.len();
        let mut new_end = new.len();

        while start < old_end && start < new_end {
            let Some(id) = old[start].filter(|&id| self.tree.matches(id, &new[start])) else {
                break;
            };
            let anchor = self.first_handle_of(&old[start + 1..], end);
            old[start] = None;
            self.patch_into(parent, Some(id), &new[start], anchor, &mut out[start])?;
            start += 1;
        }

        while start < old_end && start < new_end {
            let Some(id) = old[old_end - 1].filter(|&id| self.tree.matches(id, &new[new_end - 1]))
            else {
                break;
            };
            let anchor = self.first_handle_of(&out[new_end..], end);
            old[old_end - 1] = None;
            self.patch_into(parent, Some(id), &new[new_end - 1], anchor, &mut out[new_end - 1])?;
            old_end -= 1;
            new_end -= 1;
        }

        let window_end = self.first_handle_of(&out[new_end..], end);
        if start == old_end {
            for i in start..new_end {
                self.patch_into(parent, None, &new[i], window_end, &mut out[i])?;
            }
            return Ok(());
        }
        if start == new_end {
            return self.unmount_all(parent, &mut old[start..old_end]);
        }

        let old_keyed = old[start..old_end]
            .iter()
            .flatten()
            .any(|&id| self.tree.key(id).is_some());
        let new_keyed = new[start..new_end].iter().any(|node| node.key().is_some());
        if !old_keyed || !new_keyed {
            return self.diff_indexed(
                parent,
                &mut old[start..old_end],
                &mut out[start..new_end],
                &new[start..new_end],
                window_end,
            );
        }
        self.diff_window(
            parent,
            &mut old[start..old_end],
            &mut out[start..new_end],
            &new[start..new_end],
            window_end,
        )
    }

    /// Keyed middle section: match by key, unmount the unmatched, patch the
    /// matched in place, then move everything outside the longest increasing
    /// run of old positions and mount the new, right to left.
    fn diff_window(
        &mut self,
        parent: HandleId,
        old: &mut Slots,
        out: &mut Slots,
        new: &[Node],
        end: Option<HandleId>,
    ) -> Result<(), ReconcileError> {
        let mut key_index = KeyIndex::default();
        for (j, slot) in old.iter().enumerate() {
            if let Some(key) = slot.and_then(|id| self.tree.key(id)) {
                key_index.entry(key).or_insert(j);
            }
        }

        // old position + 1 per new position; 0 marks a mount.
        let mut new_to_old = vec![0usize; new.len()];
        let mut claimed = vec![false; old.len()];
        for (i, node) in new.iter().enumerate() {
            let Some(&j) = node.key().and_then(|key| key_index.get(&key)) else {
                continue;
            };
            let Some(id) = old[j] else {
                continue;
            };
            if claimed[j] {
                log::warn!(target: PATCH, "duplicate sibling key; mounting a new instance");
                continue;
            }
            if self.tree.matches(id, node) {
                claimed[j] = true;
                new_to_old[i] = j + 1;
            }
        }

        for (j, slot) in old.iter_mut().enumerate() {
            if claimed[j] {
                continue;
            }
            if let Some(id) = *slot {
                self.unmount(parent, id)?;
                *slot = None;
            }
        }

        // Physical order of the survivors until the move pass.
        let survivors = old.to_vec();
        for (i, node) in new.iter().enumerate() {
            let Some(j) = new_to_old[i].checked_sub(1) else {
                continue;
            };
            let anchor = self.first_handle_of(&survivors[j + 1..], end);
            let id = old[j].take();
            self.patch_into(parent, id, node, anchor, &mut out[i])?;
        }

        let stable = longest_increasing(&new_to_old);
        for i in (0..new.len()).rev() {
            let anchor = self.first_handle_of(&out[i + 1..], end);
            if new_to_old[i] == 0 {
                self.patch_into(parent, None, &new[i], anchor, &mut out[i])?;
            } else if !stable[i] {
                if let Some(id) = out[i] {
                    self.move_before(parent, id, anchor)?;
                }
            }
        }
        Ok(())
    }
}

/// Marks one longest strictly increasing subsequence of `sequence`, skipping
/// zeros. When several have the same length, which one is marked follows from
/// the scan order alone; the number of moves is not minimised over ties.
pub(crate) fn longest_increasing(sequence: &[usize]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; sequence.len()];
    for (i, &value) in sequence.iter().enumerate() {
        if value == 0 {
            continue;
        }
        let position = tails.partition_point(|&tail| sequence[tail] < value);
        if position > 0 {
            previous[i] = Some(tails[position - 1]);
        }
        if position == tails.len() {
            tails.push(i);
        } else {
            tails[position] = i;
        }
    }
    let mut stable = vec![false; sequence.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        stable[i] = true;
        cursor = previous[i];
    }
    stable
}
