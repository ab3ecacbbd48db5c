use crate::artwork::ArtworkRecord;
use crate::curate::dimensions::parse_dimensions;
use crate::utils::config::FilterConfig;

/// Outcome of a suitability check, with a human-readable reason either way.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub accepted: bool,
    pub reason: String,
}

impl Verdict {
    pub fn accept(reason: impl Into<String>) -> Self {
        Self { accepted: true, reason: reason.into() }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self { accepted: false, reason: reason.into() }
    }
}

/// Decides whether an artwork belongs in a wallpaper collection.
///
/// Pure: looks only at the record's metadata and the given settings.
pub fn is_acceptable(record: &ArtworkRecord, config: &FilterConfig) -> Verdict {
    if record.text("image_id").map_or(true, |id| id.trim().is_empty()) {
        return Verdict::reject("No image available");
    }

    if config.require_public_domain && record.flag("is_public_domain") != Some(true) {
        return Verdict::reject("Not public domain");
    }

    if !config.preferred_departments.is_empty() {
        let department = record.text("department_title").unwrap_or("");
        if !config
            .preferred_departments
            .iter()
            .any(|d| d.eq_ignore_ascii_case(department))
        {
            return Verdict::reject(format!("Outside preferred departments: {:?}", department));
        }
    }

    let title = record.text("title").unwrap_or("").to_lowercase();
    if let Some(keyword) = config
        .exclude_keywords
        .iter()
        .find(|k| title.contains(&k.to_lowercase()))
    {
        return Verdict::reject(format!("Excluded keyword {:?} in title", keyword));
    }

    let medium = record.text("medium_display").unwrap_or("Unknown medium");
    if !config.medium_keywords.is_empty() {
        let lowered = medium.to_lowercase();
        if !config
            .medium_keywords
            .iter()
            .any(|k| lowered.contains(&k.to_lowercase()))
        {
            return Verdict::reject(format!("Not a painting: {}", medium));
        }
    }

    match aspect_ratio(record) {
        Some(ratio) if !ratio_suitable(ratio, config) => {
            Verdict::reject(format!("Aspect ratio not suitable: {:.2}", ratio))
        }
        Some(ratio) => Verdict::accept(format!("Suitable: {}, ratio {:.2}", medium, ratio)),
        None => Verdict::accept(format!("Suitable: {} (dimensions unknown)", medium)),
    }
}

/// Width over height, from the thumbnail when present, else the dimension text.
pub fn aspect_ratio(record: &ArtworkRecord) -> Option<f64> {
    if let (Some(w), Some(h)) = (
        record.integer("thumbnail_width"),
        record.integer("thumbnail_height"),
    ) {
        if w > 0 && h > 0 {
            return Some(w as f64 / h as f64);
        }
    }

    record
        .text("dimensions")
        .and_then(parse_dimensions)
        .filter(|&(h, w)| h > 0.0 && w > 0.0)
        .map(|(h, w)| w / h)
}

pub fn ratio_suitable(ratio: f64, config: &FilterConfig) -> bool {
    config
        .preferred_aspect_ratios
        .iter()
        .any(|&(w, h)| (ratio - w as f64 / h as f64).abs() <= config.aspect_ratio_tolerance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artwork::FieldValue;

    fn painting() -> ArtworkRecord {
        ArtworkRecord::new()
            .with("id", FieldValue::Integer(16568))
            .with("title", FieldValue::Text("Water Lilies".into()))
            .with("image_id", FieldValue::Text("3c27b499".into()))
            .with("is_public_domain", FieldValue::Bool(true))
            .with("department_title", FieldValue::Text("Painting and Sculpture of Europe".into()))
            .with("medium_display", FieldValue::Text("Oil on canvas".into()))
            .with("thumbnail_width", FieldValue::Integer(1600))
            .with("thumbnail_height", FieldValue::Integer(1000))
    }

    #[test]
    fn test_accepts_landscape_painting() {
        let verdict = is_acceptable(&painting(), &FilterConfig::default());
        assert!(verdict.accepted, "{}", verdict.reason);
        assert!(verdict.reason.contains("1.60"));
    }

    #[test]
    fn test_rejections_in_order() {
        let config = FilterConfig::default();

        let no_image = painting().with("image_id", FieldValue::Text(" ".into()));
        assert_eq!(is_acceptable(&no_image, &config).reason, "No image available");

        let restricted = painting().with("is_public_domain", FieldValue::Bool(false));
        assert_eq!(is_acceptable(&restricted, &config).reason, "Not public domain");

        let study = painting().with("title", FieldValue::Text("Study for Water Lilies".into()));
        let verdict = is_acceptable(&study, &config);
        assert!(!verdict.accepted);
        assert!(verdict.reason.contains("study for"));

        let print = painting().with("medium_display", FieldValue::Text("Etching on paper".into()));
        assert_eq!(is_acceptable(&print, &config).reason, "Not a painting: Etching on paper");

        let portrait = painting()
            .with("thumbnail_width", FieldValue::Integer(750))
            .with("thumbnail_height", FieldValue::Integer(1000));
        assert_eq!(is_acceptable(&portrait, &config).reason, "Aspect ratio not suitable: 0.75");
    }

    #[test]
    fn test_department_preference() {
        let config = FilterConfig {
            preferred_departments: vec!["Arts of Asia".into()],
            ..FilterConfig::default()
        };
        assert!(!is_acceptable(&painting(), &config).accepted);

        let config = FilterConfig {
            preferred_departments: vec!["painting and sculpture of europe".into()],
            ..FilterConfig::default()
        };
        assert!(is_acceptable(&painting(), &config).accepted);
    }

    #[test]
    fn test_ratio_from_dimension_text() {
        let mut record = painting().with("dimensions", FieldValue::Text("73.7 × 92.1 cm (29 × 36 1/4 in.)".into()));
        record.set("thumbnail_width", FieldValue::Integer(0));
        let ratio = aspect_ratio(&record).unwrap();
        assert!((ratio - 92.1 / 73.7).abs() < 1e-9);
        assert!(is_acceptable(&record, &FilterConfig::default()).accepted);
    }

    #[test]
    fn test_unknown_dimensions_are_accepted() {
        let record = ArtworkRecord::new()
            .with("image_id", FieldValue::Text("x".into()))
            .with("is_public_domain", FieldValue::Bool(true))
            .with("medium_display", FieldValue::Text("Tempera on panel".into()));
        let verdict = is_acceptable(&record, &FilterConfig::default());
        assert!(verdict.accepted);
        assert!(verdict.reason.contains("dimensions unknown"));
    }
}
