#![deny(clippy::all, clippy::pedantic)]

use libris::application::{AppError, BorrowForm};
use time::OffsetDateTime;

use super::{finish, mount_book};
use crate::args::BorrowArgs;
use crate::context::Ctx;

pub async fn handle(ctx: &Ctx, args: &BorrowArgs) -> Result<(), AppError> {
    let book = mount_book(ctx, &format!("/borrow/{}", args.id)).await?;
    let form = BorrowForm {
        quantity: args.quantity,
        due_date: args.due_date,
    };
    let today = OffsetDateTime::now_utc().date();

    finish(ctx.actions.borrow_book(&book, &form, today).await?)
}
