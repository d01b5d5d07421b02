// Sell page: context line and the description counter.

use crate::context::ListingSeed;
use crate::listing::{DescriptionCounter, ListingLimits};
use crate::view::{CounterView, Field, Section, UiUpdate, View};

pub fn render<V: View + ?Sized>(seed: &ListingSeed, limits: &ListingLimits, view: &mut V) {
    match seed.context_label() {
        Some(label) => {
            view.apply(UiUpdate::Field(Field::ContextInfo, label));
            view.apply(UiUpdate::SectionVisible(Section::ContextInfo, true));
        }
        None => view.apply(UiUpdate::SectionVisible(Section::ContextInfo, false)),
    }
    view.apply(counter_update("", limits));
}

/// Counter state for the current description text.
pub fn counter_update(description: &str, limits: &ListingLimits) -> UiUpdate {
    let counter = DescriptionCounter::measure(description, limits.max_description_len);
    UiUpdate::Counter(CounterView {
        text: counter.text(),
        warning: counter.is_over_limit(),
    })
}
