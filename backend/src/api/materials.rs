//! Material API endpoints.

use axum::extract::{Path, Query, State};
use axum::Json;

use super::{created, success, ApiResult, CreatedResult, MessageResponse};
use crate::errors::AppError;
use crate::facets::{self, FacetSummary};
use crate::models::{
    CreateMaterialRequest, LenientInt, Material, MaterialFilter, MaterialQueryParams,
    MaterialType, NewMaterial,
};
use crate::AppState;

/// Decoded query pairs. Repeated keys are kept so that none is rejected.
type QueryPairs = Query<Vec<(String, String)>>;

/// GET /api/materials - Exact-match filtered list with universities expanded.
pub async fn list_materials(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> ApiResult<Vec<Material>> {
    let filter = MaterialQueryParams::from_pairs(pairs).into_filter();
    success(state.repo.list_materials(&filter).await?)
}

/// GET /api/materials/facets - Facet sets for one drill-down position.
pub async fn material_facets(
    State(state): State<AppState>,
    Query(pairs): QueryPairs,
) -> ApiResult<FacetSummary> {
    let query = MaterialQueryParams::from_pairs(pairs);
    let university_id = query
        .university_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("universityId is required".to_string()))?;

    let filter = MaterialFilter {
        university_id: Some(university_id),
        ..Default::default()
    };
    let materials = state.repo.list_materials(&filter).await?;

    let course = query.course.as_deref().filter(|c| !c.is_empty());
    let subject = query.subject.as_deref().filter(|s| !s.is_empty());
    success(facets::summarize(&materials, course, subject))
}

/// POST /api/materials - Upload material metadata.
pub async fn create_material(
    State(state): State<AppState>,
    Json(request): Json<CreateMaterialRequest>,
) -> CreatedResult<Material> {
    let new_material = validate_material(request)?;
    let material = state.repo.create_material(&new_material).await?;
    tracing::info!(
        id = %material.id,
        kind = %material.kind,
        course = %material.course,
        subject = %material.subject,
        "Material created"
    );
    created(material)
}

/// DELETE /api/materials/:id - Delete one material.
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    state.repo.delete_material(&id).await?;
    tracing::info!(%id, "Material deleted");
    success(MessageResponse::new("Material deleted successfully"))
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

fn validate_material(request: CreateMaterialRequest) -> Result<NewMaterial, AppError> {
    // The link is checked first; it is the field most often left out.
    let link = request
        .link
        .filter(|l| !l.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Resource link is required".to_string()))?;

    let title = required(request.title, "Title")?;
    let kind_text = required(request.kind, "Type")?;
    let kind = MaterialType::parse(&kind_text)
        .ok_or_else(|| AppError::Validation(format!("Unknown material type '{}'", kind_text)))?;
    let university_id = required(request.university, "University")?;
    let course = required(request.course, "Course")?;
    let subject = required(request.subject, "Subject")?;

    let year = match request.year {
        Some(LenientInt::Value(year)) => year,
        Some(LenientInt::Invalid(raw)) => {
            return Err(AppError::Validation(format!("Year '{}' is not a number", raw)))
        }
        None => return Err(AppError::Validation("Year is required".to_string())),
    };
    let semester = match request.semester {
        Some(LenientInt::Value(semester)) => Some(semester),
        Some(LenientInt::Invalid(raw)) => {
            return Err(AppError::Validation(format!(
                "Semester '{}' is not a number",
                raw
            )))
        }
        None => None,
    };

    Ok(NewMaterial {
        title,
        kind,
        link,
        university_id,
        course,
        year,
        semester,
        subject,
    })
}
