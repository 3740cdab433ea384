// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::{
    ecmascript::{execution::Agent, types::HeapString},
    heap::{indexes::SymbolIndex, CreateHeapData},
};

/// Handle to a symbol. Symbols have identity: two symbols with the same
/// description are still distinct keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(pub(crate) SymbolIndex);

impl Symbol {
    pub fn new(agent: &mut Agent, description: Option<HeapString>) -> Self {
        agent.heap.create(SymbolHeapData { description })
    }

    pub fn description(self, agent: &Agent) -> Option<HeapString> {
        agent[self].description
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SymbolHeapData {
    pub(crate) description: Option<HeapString>,
}
