//! GraphQL schema definition with queries, mutations, and subscriptions

use async_graphql::extensions::Tracing;
use async_graphql::{MergedObject, Schema};

use crate::services::{AuthService, CatalogEvents, MutationService, QueryService};

use super::mutations::{AuthMutations, CatalogMutations};
use super::queries::{AuthorQueries, BookQueries, UserQueries};
use super::subscriptions::SubscriptionRoot;

#[derive(MergedObject, Default)]
pub struct QueryRoot(BookQueries, AuthorQueries, UserQueries);

#[derive(MergedObject, Default)]
pub struct MutationRoot(CatalogMutations, AuthMutations);

/// The GraphQL schema type
pub type CatalogSchema = Schema<QueryRoot, MutationRoot, SubscriptionRoot>;

/// Build the GraphQL schema with all resolvers
pub fn build_schema(
    query: QueryService,
    mutations: MutationService,
    auth: AuthService,
    events: CatalogEvents,
) -> CatalogSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), SubscriptionRoot)
        .data(query)
        .data(mutations)
        .data(auth)
        .data(events)
        .extension(Tracing)
        .finish()
}
