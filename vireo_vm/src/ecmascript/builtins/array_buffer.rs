// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal array-buffer collaborator: just enough state for the iterator
//! and enumeration layers to observe detachment and byte bounds. Byte
//! storage itself lives outside this core.

use std::ops::{Index, IndexMut};

use crate::{
    ecmascript::execution::Agent,
    heap::{indexes::ArrayBufferIndex, CreateHeapData},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArrayBuffer(pub(crate) ArrayBufferIndex);

#[derive(Debug, Clone, Copy)]
pub struct ArrayBufferHeapData {
    pub(crate) byte_length: usize,
    pub(crate) detached: bool,
}

impl ArrayBuffer {
    pub fn new(agent: &mut Agent, byte_length: usize) -> Self {
        agent.heap.create(ArrayBufferHeapData {
            byte_length,
            detached: false,
        })
    }

    pub fn byte_length(self, agent: &Agent) -> usize {
        agent[self].byte_length
    }

    pub fn is_detached(self, agent: &Agent) -> bool {
        agent[self].detached
    }

    pub fn detach(self, agent: &mut Agent) {
        let data = &mut agent[self];
        data.detached = true;
        data.byte_length = 0;
    }

    /// Resizes the buffer, possibly leaving views over it out of bounds.
    pub fn resize(self, agent: &mut Agent, new_byte_length: usize) {
        agent[self].byte_length = new_byte_length;
    }
}

impl Index<ArrayBuffer> for Agent {
    type Output = ArrayBufferHeapData;

    fn index(&self, index: ArrayBuffer) -> &Self::Output {
        self.heap
            .array_buffers
            .get(index.0.into_index())
            .expect("ArrayBuffer out of bounds")
            .as_ref()
            .expect("ArrayBuffer slot empty")
    }
}

impl IndexMut<ArrayBuffer> for Agent {
    fn index_mut(&mut self, index: ArrayBuffer) -> &mut Self::Output {
        self.heap
            .array_buffers
            .get_mut(index.0.into_index())
            .expect("ArrayBuffer out of bounds")
            .as_mut()
            .expect("ArrayBuffer slot empty")
    }
}
