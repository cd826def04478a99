use super::prelude::*;

#[derive(Default)]
pub struct BookQueries;

#[Object]
impl BookQueries {
    /// Total number of books
    async fn book_count(&self, ctx: &Context<'_>) -> Result<i64> {
        ctx.data::<QueryService>()?.count_books().await.extend_err()
    }

    /// All books, optionally filtered by exact author name or by genre.
    /// When both are given the author filter wins.
    async fn all_books(
        &self,
        ctx: &Context<'_>,
        author: Option<String>,
        genre: Option<String>,
    ) -> Result<Vec<Book>> {
        let filter = BookFilter {
            author_name: author,
            genre,
        };
        let books = ctx
            .data::<QueryService>()?
            .list_books(&filter)
            .await
            .extend_err()?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn genre_books(&self, ctx: &Context<'_>, genre: String) -> Result<Vec<Book>> {
        let books = ctx
            .data::<QueryService>()?
            .books_for_genre(&genre)
            .await
            .extend_err()?;
        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn genre_book_count(&self, ctx: &Context<'_>, genre: String) -> Result<i64> {
        ctx.data::<QueryService>()?
            .genre_book_count(&genre)
            .await
            .extend_err()
    }

    /// Every genre in use, sorted
    async fn genres(&self, ctx: &Context<'_>) -> Result<Vec<String>> {
        ctx.data::<QueryService>()?.distinct_genres().await.extend_err()
    }
}
