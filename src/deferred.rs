// Copyright (C) 2026 The librewinds developers
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

/// A single-slot update that is applied on the next idle tick.
///
/// Scheduling again before the tick replaces the pending value, so a burst of
/// controller events results in one refresh carrying the latest value.
#[derive(Debug)]
pub struct DeferredUpdate<T> {
    pending: Option<T>,
    coalesced: u64,
}

impl<T> DeferredUpdate<T> {
    pub fn new() -> DeferredUpdate<T> {
        DeferredUpdate {
            pending: None,
            coalesced: 0,
        }
    }

    /// Schedules a value, replacing any value not yet taken.
    pub fn schedule(&mut self, value: T) {
        if self.pending.replace(value).is_some() {
            self.coalesced += 1;
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Takes the pending value, leaving the slot empty.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Drops the pending value without applying it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// How many scheduled values were replaced before being taken.
    pub fn coalesced(&self) -> u64 {
        self.coalesced
    }
}

impl<T> Default for DeferredUpdate<T> {
    fn default() -> Self {
        DeferredUpdate::new()
    }
}
