use couture_core::image::ImageRef;

/// One optimistic edit of the in-memory favorites list.
///
/// Every change knows its inverse, which is what a failed persistence
/// write applies to roll back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteChange {
    Add { reference: ImageRef },
    Remove { reference: ImageRef, position: usize },
}

impl FavoriteChange {
    pub fn reference(&self) -> &ImageRef {
        match self {
            FavoriteChange::Add { reference } | FavoriteChange::Remove { reference, .. } => {
                reference
            }
        }
    }

    /// Applies the change. Returns whether the list changed.
    pub fn apply(&self, items: &mut Vec<ImageRef>) -> bool {
        match self {
            FavoriteChange::Add { reference } => {
                if items.contains(reference) {
                    return false;
                }
                items.push(reference.clone());
                true
            }
            FavoriteChange::Remove { reference, .. } => {
                let before = items.len();
                items.retain(|item| item != reference);
                items.len() != before
            }
        }
    }

    /// Undoes the change on a list it was applied to.
    ///
    /// A removed reference goes back to its old position, clamped to the
    /// current length.
    pub fn revert(&self, items: &mut Vec<ImageRef>) {
        match self {
            FavoriteChange::Add { reference } => {
                items.retain(|item| item != reference);
            }
            FavoriteChange::Remove {
                reference,
                position,
            } => {
                if !items.contains(reference) {
                    let at = (*position).min(items.len());
                    items.insert(at, reference.clone());
                }
            }
        }
    }
}
