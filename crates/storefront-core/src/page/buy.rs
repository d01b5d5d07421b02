// Buy page: item card rendering and the optional item fetch.

use tracing::debug;

use crate::api::{ApiError, MarketApi};
use crate::context::ItemContext;
use crate::view::{Field, Section, UiUpdate, View};

/// Fill the item card.
pub fn render<V: View + ?Sized>(item: &ItemContext, view: &mut V) {
    view.apply(UiUpdate::Field(Field::ItemName, item.name.clone()));
    view.apply(UiUpdate::Field(
        Field::ItemDescription,
        item.description.clone(),
    ));
    view.apply(UiUpdate::Field(Field::ItemPrice, item.formatted_price()));
    view.apply(UiUpdate::Field(Field::Seller, item.seller_display()));

    match &item.server {
        Some(server) => {
            view.apply(UiUpdate::Field(Field::ItemServer, server.clone()));
            view.apply(UiUpdate::SectionVisible(Section::ServerDetails, true));
        }
        None => view.apply(UiUpdate::SectionVisible(Section::ServerDetails, false)),
    }

    if let Some(image) = &item.image {
        view.apply(UiUpdate::Field(Field::ItemImage, image.clone()));
    }
}

/// Overlay the backend's record for `item.id` onto the query-derived context.
pub async fn enrich(item: ItemContext, api: &dyn MarketApi) -> Result<ItemContext, ApiError> {
    let record = api.fetch_item(&item.id).await?;
    debug!(item_id = %item.id, "item record fetched");
    Ok(item.merge_record(record))
}
