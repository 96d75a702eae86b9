use crate::error::AppError;
use crate::models::{Material, MaterialGroup, Subject};

pub const MAX_MATERIAL_BYTES: u64 = 2 * 1024 * 1024;

pub fn size_label(size_bytes: u64) -> Result<String, AppError> {
    if size_bytes > MAX_MATERIAL_BYTES {
        return Err(AppError::BadRequest(format!(
            "file is too large ({} bytes, max {})",
            size_bytes, MAX_MATERIAL_BYTES
        )));
    }
    Ok(format!("{:.1} KB", size_bytes as f64 / 1024.0))
}

/// Title shown for an upload: the given one, or the file name minus its extension.
pub fn resolve_title(title: Option<&str>, file_name: &str) -> String {
    match title.map(str::trim).filter(|t| !t.is_empty()) {
        Some(t) => t.to_string(),
        None => match file_name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => file_name.to_string(),
        },
    }
}

/// Groups materials under their subjects, in subject order, dropping empty groups.
///
/// With a query, a group survives when the subject name or any of its
/// material titles contains it, case-insensitively.
pub fn group_by_subject(
    subjects: &[Subject],
    materials: &[Material],
    query: Option<&str>,
) -> Vec<MaterialGroup> {
    let query = query
        .map(|q| q.trim().to_lowercase())
        .filter(|q| !q.is_empty());

    subjects
        .iter()
        .filter_map(|subject| {
            let filed: Vec<Material> = materials
                .iter()
                .filter(|m| m.subject_id == subject.id)
                .cloned()
                .collect();
            if filed.is_empty() {
                return None;
            }
            if let Some(q) = &query {
                let name_match = subject.name.to_lowercase().contains(q.as_str());
                let title_match = filed.iter().any(|m| m.title.to_lowercase().contains(q.as_str()));
                if !name_match && !title_match {
                    return None;
                }
            }
            Some(MaterialGroup {
                subject_id: subject.id.clone(),
                subject_name: subject.name.clone(),
                materials: filed,
            })
        })
        .collect()
}
