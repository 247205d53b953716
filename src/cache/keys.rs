//! Cache key and tag definitions.
//!
//! Defines `QueryKey` for cached reads, `Tag` for coarse invalidation domains,
//! and `MutationKind` with the tags each write invalidates.

use std::collections::HashSet;
use std::fmt;

/// Coarse invalidation domain.
///
/// A query declares the tags it provides; a mutation declares the tags it
/// invalidates. Any overlap triggers a refetch of the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// Any list or detail query over books.
    Book,
    /// Borrow summaries.
    Borrow,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tag::Book => f.write_str("Book"),
            Tag::Borrow => f.write_str("Borrow"),
        }
    }
}

pub type TagSet = HashSet<Tag>;

/// Build a [`TagSet`] from a list of tags.
pub fn tags<const N: usize>(list: [Tag; N]) -> TagSet {
    list.into_iter().collect()
}

/// Identifies one cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// `GET books`
    AllBooks,
    /// `GET books/{id}`
    BookById(String),
    /// `GET borrow`
    BorrowSummaries,
}

impl QueryKey {
    /// Tags this query provides.
    pub fn provides_tags(&self) -> TagSet {
        match self {
            QueryKey::AllBooks | QueryKey::BookById(_) => tags([Tag::Book]),
            QueryKey::BorrowSummaries => tags([Tag::Borrow]),
        }
    }

    /// Low-cardinality label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryKey::AllBooks => "all_books",
            QueryKey::BookById(_) => "book_by_id",
            QueryKey::BorrowSummaries => "borrow_summaries",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::AllBooks => f.write_str("books"),
            QueryKey::BookById(id) => write!(f, "books/{id}"),
            QueryKey::BorrowSummaries => f.write_str("borrow"),
        }
    }
}

/// Every write the client can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    CreateBook,
    UpdateBook,
    DeleteBook,
    BorrowBook,
}

impl MutationKind {
    /// Tags invalidated when this mutation succeeds.
    ///
    /// Must cover every tag whose data the write can affect; borrowing
    /// changes both the book's copy count and the aggregate summary.
    pub fn invalidates_tags(self) -> TagSet {
        match self {
            MutationKind::CreateBook | MutationKind::UpdateBook | MutationKind::DeleteBook => {
                tags([Tag::Book])
            }
            MutationKind::BorrowBook => tags([Tag::Book, Tag::Borrow]),
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MutationKind::CreateBook => "create_book",
            MutationKind::UpdateBook => "update_book",
            MutationKind::DeleteBook => "delete_book",
            MutationKind::BorrowBook => "borrow_book",
        };
        f.write_str(name)
    }
}
