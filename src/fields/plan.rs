use smallvec::SmallVec;

use crate::error::{Error, Result};
use crate::fields::FieldAccessor;

#[derive(Debug, Clone, Copy)]
struct CopyItem {
    from: FieldAccessor,
    to: FieldAccessor,
}

/// An ordered list of field transfers between two buffer layouts, validated
/// once and applied per record.
///
/// Each pair must connect fields of equal byte size; the numeric kinds may
/// differ, in which case `apply` converts through [`FieldAccessor::write`].
/// Plans are built per pipeline run (per selection group on the retrieve
/// side, since row offsets depend on the group's column set).
#[derive(Debug, Clone, Default)]
pub struct CopyPlan {
    items: SmallVec<[CopyItem; 16]>,
}

impl CopyPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn append(&mut self, from: FieldAccessor, to: FieldAccessor) -> Result<()> {
        if from.size() != to.size() {
            return Err(Error::SizeMismatch {
                from: from.size(),
                to: to.size(),
            });
        }
        self.items.push(CopyItem { from, to });
        Ok(())
    }

    /// Transfer every planned field from `src` into `dst`. The buffers are
    /// distinct; fields within one plan do not alias.
    pub fn apply(&self, src: &[u8], dst: &mut [u8]) {
        for item in &self.items {
            item.to.write(dst, item.from.read(src));
        }
    }
}
