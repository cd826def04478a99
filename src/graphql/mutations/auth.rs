//! GraphQL authentication mutations
//!
//! Registration and login do not require an authenticated caller.

use super::prelude::*;
use crate::services::Registration;

#[derive(Default)]
pub struct AuthMutations;

#[Object]
impl AuthMutations {
    /// Register a new user
    async fn create_user(
        &self,
        ctx: &Context<'_>,
        username: String,
        #[graphql(secret)] password: String,
        #[graphql(secret)] verify_password: String,
        favorite_genre: String,
    ) -> Result<Option<User>> {
        let user = ctx
            .data::<MutationService>()?
            .register_user(Registration {
                username,
                password,
                verify_password,
                favorite_genre,
            })
            .await
            .extend_err()?;
        Ok(Some(user.into()))
    }

    /// Exchange credentials for a session token
    async fn login(
        &self,
        ctx: &Context<'_>,
        username: String,
        #[graphql(secret)] password: String,
    ) -> Result<Token> {
        let value = ctx
            .data::<MutationService>()?
            .login(&username, &password)
            .await
            .extend_err()?;
        Ok(Token { value })
    }
}
