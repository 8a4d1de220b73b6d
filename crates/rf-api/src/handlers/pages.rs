use actix_web::web::Data;
use rf_core::AppError;
use rf_ui::IndexTemplate;

use super::{render, AppState};
use crate::error::ApiResult;
use crate::extract::PageContext;
use crate::views::section_view;

/// Renders the section list.
pub async fn index(data: Data<AppState>, ctx: PageContext) -> ApiResult {
    let sections = data.repo.list_sections().await?;
    render(IndexTemplate {
        layout: ctx.layout("Sections"),
        sections: sections.iter().map(section_view).collect(),
    })
}

/// Fallback for unmatched paths.
pub async fn not_found() -> ApiResult {
    Err(AppError::NotFound("Page".into(), String::new()).into())
}
