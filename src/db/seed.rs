//! Sample catalog for a fresh database.
//!
//! Loaded with `--seed`. Existing authors and books are left as they are, so
//! re-runs are idempotent. Seeding writes directly to the store and does not
//! publish change notifications.

use tracing::{debug, info};

use super::{CreateBook, Database};

struct SeedAuthor {
    name: &'static str,
    born: Option<i32>,
}

struct SeedBook {
    title: &'static str,
    published: i32,
    author: &'static str,
    genres: &'static [&'static str],
}

const AUTHORS: &[SeedAuthor] = &[
    SeedAuthor { name: "Robert Martin", born: Some(1952) },
    SeedAuthor { name: "Martin Fowler", born: Some(1963) },
    SeedAuthor { name: "Fyodor Dostoevsky", born: Some(1821) },
    SeedAuthor { name: "Joshua Kerievsky", born: None },
    SeedAuthor { name: "Sandi Metz", born: None },
];

const BOOKS: &[SeedBook] = &[
    SeedBook {
        title: "Clean Code",
        published: 2008,
        author: "Robert Martin",
        genres: &["refactoring"],
    },
    SeedBook {
        title: "Agile software development",
        published: 2002,
        author: "Robert Martin",
        genres: &["agile", "patterns", "design"],
    },
    SeedBook {
        title: "Refactoring, edition 2",
        published: 2018,
        author: "Martin Fowler",
        genres: &["refactoring"],
    },
    SeedBook {
        title: "Refactoring to patterns",
        published: 2008,
        author: "Joshua Kerievsky",
        genres: &["refactoring", "patterns"],
    },
    SeedBook {
        title: "Practical Object-Oriented Design, An Agile Primer Using Ruby",
        published: 2012,
        author: "Sandi Metz",
        genres: &["refactoring", "design"],
    },
    SeedBook {
        title: "Crime and punishment",
        published: 1866,
        author: "Fyodor Dostoevsky",
        genres: &["classic", "crime"],
    },
    SeedBook {
        title: "The Demon",
        published: 1872,
        author: "Fyodor Dostoevsky",
        genres: &["classic", "revolution"],
    },
];

/// Result of running seed operations.
#[derive(Debug, Default)]
pub struct SeedResult {
    pub authors_created: usize,
    pub books_created: usize,
}

/// Insert the sample authors and books that are not present yet.
pub async fn run_seeds(db: &Database) -> Result<SeedResult, sqlx::Error> {
    let mut result = SeedResult::default();
    let authors = db.authors();
    let books = db.books();

    for seed in AUTHORS {
        if authors.get_by_name(seed.name).await?.is_some() {
            debug!(author = seed.name, "Seed author already present");
            continue;
        }
        authors.create(seed.name, seed.born).await?;
        result.authors_created += 1;
    }

    for seed in BOOKS {
        if books.get_by_title(seed.title).await?.is_some() {
            debug!(title = seed.title, "Seed book already present");
            continue;
        }
        let (_, upsert) = books
            .create_with_author(CreateBook {
                title: seed.title.to_string(),
                published: seed.published,
                author_name: seed.author.to_string(),
                genres: seed.genres.iter().map(|g| g.to_string()).collect(),
            })
            .await?;
        if upsert.created {
            result.authors_created += 1;
        }
        result.books_created += 1;
    }

    info!(
        authors_created = result.authors_created,
        books_created = result.books_created,
        "Sample catalog seeded"
    );
    Ok(result)
}
