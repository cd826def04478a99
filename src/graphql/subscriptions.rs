//! GraphQL subscriptions for real-time updates
//!
//! Each subscription gets its own receiver on the catalog event bus; closing
//! the WebSocket drops the stream and with it the receiver.

use async_graphql::{Context, Subscription};
use futures::Stream;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use crate::services::{CatalogEvent, CatalogEvents};

use super::types::{Author, Book};

/// Stream every catalog event published from now on. A subscriber that falls
/// behind the channel capacity skips the lost events.
fn catalog_stream(events: &CatalogEvents) -> impl Stream<Item = CatalogEvent> + use<> {
    BroadcastStream::new(events.subscribe()).filter_map(|result| match result {
        Ok(event) => Some(event),
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!(skipped, "Subscriber lagged behind, catalog events dropped");
            None
        }
    })
}

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Authors created explicitly or by adding a book
    async fn author_added<'ctx>(&self, ctx: &Context<'ctx>) -> impl Stream<Item = Author> + 'ctx {
        let events = ctx.data_unchecked::<CatalogEvents>();
        catalog_stream(events).filter_map(|event| match event {
            CatalogEvent::AuthorAdded(author) => Some(Author::from(author)),
            _ => None,
        })
    }

    /// Authors whose birth year was set
    async fn author_edited<'ctx>(&self, ctx: &Context<'ctx>) -> impl Stream<Item = Author> + 'ctx {
        let events = ctx.data_unchecked::<CatalogEvents>();
        catalog_stream(events).filter_map(|event| match event {
            CatalogEvent::AuthorEdited(author) => Some(Author::from(author)),
            _ => None,
        })
    }

    async fn book_added<'ctx>(&self, ctx: &Context<'ctx>) -> impl Stream<Item = Book> + 'ctx {
        let events = ctx.data_unchecked::<CatalogEvents>();
        catalog_stream(events).filter_map(|event| match event {
            CatalogEvent::BookAdded(book) => Some(Book::from(book)),
            _ => None,
        })
    }
}
