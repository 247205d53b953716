#![deny(clippy::all, clippy::pedantic)]

use libris::application::{ActionOutcome, AppError, BookForm};
use serde_json::json;

use super::{finish, mount_book, settled_data};
use crate::args::{BookFields, BookPatch, BooksCmd};
use crate::context::Ctx;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, action: BooksCmd) -> Result<(), AppError> {
    match action {
        BooksCmd::List => list(ctx).await,
        BooksCmd::Show { id } => show(ctx, &id).await,
        BooksCmd::Create(fields) => create(ctx, fields).await,
        BooksCmd::Edit { id, fields } => edit(ctx, &id, fields).await,
        BooksCmd::Delete { id } => delete(ctx, &id).await,
    }
}

async fn list(ctx: &Ctx) -> Result<(), AppError> {
    let mut query = ctx.client().books();
    let books = settled_data(query.settled().await)?;
    print_json(books.as_slice())
}

async fn show(ctx: &Ctx, id: &str) -> Result<(), AppError> {
    let book = mount_book(ctx, &format!("/books/{id}")).await?;
    print_json(book.as_ref())
}

async fn create(ctx: &Ctx, fields: BookFields) -> Result<(), AppError> {
    let form = BookForm {
        title: fields.title,
        author: fields.author,
        genre: Some(fields.genre),
        isbn: fields.isbn,
        description: fields.description,
        copies: fields.copies,
    };
    finish(ctx.actions.create_book(&form).await?)
}

async fn edit(ctx: &Ctx, id: &str, patch: BookPatch) -> Result<(), AppError> {
    let book = mount_book(ctx, &format!("/edit-book/{id}")).await?;

    let mut form = BookForm::from_book(&book);
    apply_patch(&mut form, patch);

    finish(ctx.actions.update_book(&book.id, &form).await?)
}

async fn delete(ctx: &Ctx, id: &str) -> Result<(), AppError> {
    let book = ctx.client().resolve_book(id).await?;
    match ctx.actions.delete_book(&book.id, &book.title).await? {
        ActionOutcome::Completed(()) => print_json(&json!({ "deleted": book.id })),
        ActionOutcome::Cancelled => finish(ActionOutcome::<()>::Cancelled),
    }
}

pub fn apply_patch(form: &mut BookForm, patch: BookPatch) {
    if let Some(title) = patch.title {
        form.title = title;
    }
    if let Some(author) = patch.author {
        form.author = author;
    }
    if let Some(genre) = patch.genre {
        form.genre = Some(genre);
    }
    if let Some(isbn) = patch.isbn {
        form.isbn = isbn;
    }
    if let Some(description) = patch.description {
        form.description = description;
    }
    if let Some(copies) = patch.copies {
        form.copies = copies;
    }
}
