//! Catalog mutations. All of them require an authenticated caller.

use super::prelude::*;
use crate::services::NewBook;

#[derive(Default)]
pub struct CatalogMutations;

#[Object]
impl CatalogMutations {
    /// Add a book. The author is created if no author has that exact name.
    async fn add_book(
        &self,
        ctx: &Context<'_>,
        title: String,
        published: i32,
        author: String,
        genres: Vec<String>,
    ) -> Result<Option<Book>> {
        let book = ctx
            .data::<MutationService>()?
            .add_book(
                ctx.try_auth_user(),
                NewBook {
                    title,
                    published,
                    author_name: author,
                    genres,
                },
            )
            .await
            .extend_err()?;
        Ok(Some(book.into()))
    }

    /// Set an author's birth year, creating the author if needed
    async fn edit_author(
        &self,
        ctx: &Context<'_>,
        name: String,
        set_born_to: i32,
    ) -> Result<Option<Author>> {
        let author = ctx
            .data::<MutationService>()?
            .edit_author_birth_year(ctx.try_auth_user(), &name, set_born_to)
            .await
            .extend_err()?;
        Ok(Some(author.into()))
    }

    async fn add_author(
        &self,
        ctx: &Context<'_>,
        name: String,
        born: Option<i32>,
    ) -> Result<Option<Author>> {
        let author = ctx
            .data::<MutationService>()?
            .add_author(ctx.try_auth_user(), &name, born)
            .await
            .extend_err()?;
        Ok(Some(author.into()))
    }
}
