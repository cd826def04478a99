use super::prelude::*;

#[derive(Default)]
pub struct AuthorQueries;

#[Object]
impl AuthorQueries {
    async fn author_count(&self, ctx: &Context<'_>) -> Result<i64> {
        ctx.data::<QueryService>()?.count_authors().await.extend_err()
    }

    /// All authors. `title` picks the author of that book, `born` matches the
    /// birth year exactly and `author` matches a substring of the name; the
    /// first one given is applied.
    async fn all_authors(
        &self,
        ctx: &Context<'_>,
        author: Option<String>,
        born: Option<i32>,
        title: Option<String>,
    ) -> Result<Vec<Author>> {
        let filter = AuthorFilter {
            name_contains: author,
            born,
            book_title: title,
        };
        let authors = ctx
            .data::<QueryService>()?
            .list_authors(&filter)
            .await
            .extend_err()?;
        Ok(authors.into_iter().map(Author::from).collect())
    }
}
