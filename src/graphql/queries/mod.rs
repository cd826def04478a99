pub mod authors;
pub mod books;
pub mod users;

pub use authors::AuthorQueries;
pub use books::BookQueries;
pub use users::UserQueries;

pub(crate) mod prelude {
    pub(crate) use async_graphql::{Context, Object, Result};

    pub(crate) use crate::graphql::auth::AuthExt;
    pub(crate) use crate::graphql::helpers::ServiceResultExt;
    pub(crate) use crate::graphql::types::*;
    pub(crate) use crate::services::{AuthorFilter, BookFilter, QueryService, UserFilter};
}
