pub mod auth;
pub mod catalog;

pub use auth::AuthMutations;
pub use catalog::CatalogMutations;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::graphql::auth::AuthExt;
    pub(crate) use crate::graphql::helpers::ServiceResultExt;
    pub(crate) use crate::graphql::types::*;
    pub(crate) use crate::services::MutationService;
}
