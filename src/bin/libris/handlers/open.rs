#![deny(clippy::all, clippy::pedantic)]

use libris::application::AppError;
use libris::routes::Navigation;
use serde_json::json;

use crate::context::Ctx;
use crate::print::print_json;

pub async fn handle(ctx: &Ctx, path: &str) -> Result<(), AppError> {
    match ctx.router.navigate(path).await {
        Navigation::Mounted {
            route,
            params,
            data,
        } => print_json(&json!({
            "route": route.to_string(),
            "pattern": route.pattern(),
            "id": params.id(),
            "book": data.book().map(|book| &**book),
        })),
        Navigation::Boundary(err) => Err(err.into()),
    }
}
