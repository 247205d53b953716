#![deny(clippy::all, clippy::pedantic)]

use libris::application::AppError;

use super::settled_data;
use crate::context::Ctx;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx) -> Result<(), AppError> {
    let mut query = ctx.client().borrow_summaries();
    let summaries = settled_data(query.settled().await)?;
    print_json(summaries.as_slice())
}
