use super::prelude::*;

#[derive(Default)]
pub struct UserQueries;

#[Object]
impl UserQueries {
    /// The user the request is authenticated as, if any
    async fn me(&self, ctx: &Context<'_>) -> Option<User> {
        ctx.try_auth_user().cloned().map(User::from)
    }

    async fn user_count(&self, ctx: &Context<'_>) -> Result<i64> {
        ctx.data::<QueryService>()?.count_users().await.extend_err()
    }

    async fn all_users(
        &self,
        ctx: &Context<'_>,
        username: Option<String>,
        favorite_genre: Option<String>,
    ) -> Result<Vec<User>> {
        let filter = UserFilter {
            username,
            favorite_genre,
        };
        let users = ctx
            .data::<QueryService>()?
            .list_users(&filter)
            .await
            .extend_err()?;
        Ok(users.into_iter().map(User::from).collect())
    }
}
