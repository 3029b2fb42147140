use couture_core::image::ImageRef;
use couture_core::workflow::VariationView;

/// Render state of one variation index.
///
/// `Ready` holds a non-empty list; an empty result is never stored, so
/// "not generated" and "failed" stay distinguishable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum VariationSlot {
    #[default]
    Idle,
    Loading,
    Ready(Vec<ImageRef>),
    Failed(String),
}

impl VariationSlot {
    pub fn view(&self) -> VariationView {
        match self {
            VariationSlot::Idle => VariationView::NotGenerated,
            VariationSlot::Loading => VariationView::Loading,
            VariationSlot::Failed(message) => VariationView::Failed(message.clone()),
            VariationSlot::Ready(images) => VariationView::Ready(images.clone()),
        }
    }
}
