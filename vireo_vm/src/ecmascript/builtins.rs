// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

pub mod array;
pub mod array_buffer;
pub mod array_iterator;
pub mod error;
pub(crate) mod ordinary;
pub mod typed_array;

pub use array::{array_create, create_array_from_list, Array, ArrayHeapData, SortComparator};
pub use array_buffer::ArrayBuffer;
pub use array_iterator::{ArrayIterator, CollectionIteratorKind};
pub use error::Error;
pub use typed_array::TypedArray;
