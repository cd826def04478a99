// Helpers shared across GraphQL query/mutation modules.

use async_graphql::ErrorExtensions;

use crate::services::ServiceResult;

/// Convert service results into GraphQL results, keeping the error code and
/// invalid arguments as extensions.
pub(crate) trait ServiceResultExt<T> {
    fn extend_err(self) -> async_graphql::Result<T>;
}

impl<T> ServiceResultExt<T> for ServiceResult<T> {
    fn extend_err(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.extend())
    }
}
