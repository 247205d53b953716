//! Client-side form validation.
//!
//! Runs before any request is made; a rejected form never reaches the
//! network.

use libris_api_types::{Book, BorrowRequest, Genre, NewBook};
use thiserror::Error;
use time::Date;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all fields with valid values!")]
    IncompleteBook,
    #[error("Please provide a valid quantity and due date")]
    IncompleteBorrow,
    #[error("Quantity cannot exceed available copies ({copies})")]
    QuantityExceedsCopies { copies: u32 },
    #[error("Due date must be today or in the future")]
    DueDateInPast,
    #[error("\"{title}\" is not available for borrowing")]
    Unavailable { title: String },
}

/// Fields of the create and edit forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub genre: Option<Genre>,
    pub isbn: String,
    pub description: String,
    pub copies: u32,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            genre: None,
            isbn: String::new(),
            description: String::new(),
            copies: 1,
        }
    }
}

impl BookForm {
    /// Prefill from an existing record, as the edit form does.
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            genre: Some(book.genre),
            isbn: book.isbn.clone(),
            description: book.description.clone(),
            copies: book.copies,
        }
    }

    /// Every text field non-blank, a genre chosen, at least one copy.
    ///
    /// `available` is derived from the copy count.
    pub fn validate(&self) -> Result<NewBook, ValidationError> {
        let fields = [&self.title, &self.author, &self.isbn, &self.description];
        if fields.iter().any(|field| field.trim().is_empty()) || self.copies < 1 {
            return Err(ValidationError::IncompleteBook);
        }
        let Some(genre) = self.genre else {
            return Err(ValidationError::IncompleteBook);
        };

        Ok(NewBook {
            title: self.title.trim().to_string(),
            author: self.author.trim().to_string(),
            genre,
            isbn: self.isbn.trim().to_string(),
            description: self.description.trim().to_string(),
            copies: self.copies,
            available: self.copies > 0,
        })
    }

    /// Validate as a full replacement of the book with `id`.
    pub fn validate_update(&self, id: &str) -> Result<Book, ValidationError> {
        self.validate().map(|book| Book::from_new(id, book))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowForm {
    pub quantity: u32,
    pub due_date: Option<Date>,
}

impl Default for BorrowForm {
    fn default() -> Self {
        Self {
            quantity: 1,
            due_date: None,
        }
    }
}

impl BorrowForm {
    /// Validate against the loaded book. `today` is the current UTC day.
    pub fn validate(&self, book: &Book, today: Date) -> Result<BorrowRequest, ValidationError> {
        let Some(due_date) = self.due_date.filter(|_| self.quantity >= 1) else {
            return Err(ValidationError::IncompleteBorrow);
        };
        if self.quantity > book.copies {
            return Err(ValidationError::QuantityExceedsCopies {
                copies: book.copies,
            });
        }
        if due_date < today {
            return Err(ValidationError::DueDateInPast);
        }
        if !book.available {
            return Err(ValidationError::Unavailable {
                title: book.title.clone(),
            });
        }

        Ok(BorrowRequest {
            book: book.id.clone(),
            quantity: self.quantity,
            due_date: due_date.midnight().assume_utc(),
        })
    }
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;

    fn book(copies: u32) -> Book {
        Book {
            id: "1".into(),
            title: "Dune".into(),
            author: "Frank Herbert".into(),
            genre: Genre::Fiction,
            isbn: "9780441013593".into(),
            description: "Spice".into(),
            copies,
            available: copies > 0,
        }
    }

    fn filled() -> BookForm {
        BookForm {
            title: " Emma ".into(),
            author: "Jane Austen".into(),
            genre: Some(Genre::Fiction),
            isbn: "9780141439587".into(),
            description: "Matchmaking".into(),
            copies: 3,
        }
    }

    #[test]
    fn complete_book_form_is_trimmed_and_available() {
        let book = filled().validate().expect("valid");
        assert_eq!(book.title, "Emma");
        assert!(book.available);
    }

    #[test]
    fn blank_field_rejects_book_form() {
        let mut form = filled();
        form.description = "   ".into();
        assert_eq!(form.validate(), Err(ValidationError::IncompleteBook));
    }

    #[test]
    fn missing_genre_or_copies_rejects_book_form() {
        let mut form = filled();
        form.genre = None;
        assert_eq!(form.validate(), Err(ValidationError::IncompleteBook));

        let mut form = filled();
        form.copies = 0;
        assert_eq!(form.validate(), Err(ValidationError::IncompleteBook));
    }

    #[test]
    fn update_keeps_identity() {
        let updated = filled().validate_update("9").expect("valid");
        assert_eq!(updated.id, "9");
        assert_eq!(updated.copies, 3);
    }

    #[test]
    fn edit_form_prefills_from_book() {
        let form = BookForm::from_book(&book(2));
        assert_eq!(form.validate_update("1"), Ok(book(2)));
    }

    #[test]
    fn borrow_more_than_copies_is_rejected() {
        let form = BorrowForm {
            quantity: 3,
            due_date: Some(date!(2030 - 01 - 01)),
        };
        assert_eq!(
            form.validate(&book(2), date!(2026 - 01 - 01)),
            Err(ValidationError::QuantityExceedsCopies { copies: 2 })
        );
        assert_eq!(
            ValidationError::QuantityExceedsCopies { copies: 2 }.to_string(),
            "Quantity cannot exceed available copies (2)"
        );
    }

    #[test]
    fn borrow_requires_quantity_and_date() {
        let today = date!(2026 - 01 - 01);
        let no_date = BorrowForm {
            quantity: 1,
            due_date: None,
        };
        assert_eq!(no_date.validate(&book(5), today), Err(ValidationError::IncompleteBorrow));

        let zero = BorrowForm {
            quantity: 0,
            due_date: Some(today),
        };
        assert_eq!(zero.validate(&book(5), today), Err(ValidationError::IncompleteBorrow));
    }

    #[test]
    fn due_date_today_is_allowed_yesterday_is_not() {
        let today = date!(2026 - 03 - 10);
        let form = |due| BorrowForm {
            quantity: 1,
            due_date: Some(due),
        };

        let request = form(today).validate(&book(5), today).expect("today ok");
        assert_eq!(request.due_date, datetime!(2026-03-10 0:00 UTC));
        assert_eq!(request.book, "1");

        assert_eq!(
            form(date!(2026 - 03 - 09)).validate(&book(5), today),
            Err(ValidationError::DueDateInPast)
        );
    }

    #[test]
    fn unavailable_book_cannot_be_borrowed() {
        let mut unavailable = book(5);
        unavailable.available = false;
        let form = BorrowForm {
            quantity: 1,
            due_date: Some(date!(2030 - 01 - 01)),
        };
        assert!(matches!(
            form.validate(&unavailable, date!(2026 - 01 - 01)),
            Err(ValidationError::Unavailable { .. })
        ));
    }
}
