/// Storage type of a column. `Json` columns hold serialized multi-valued data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Integer,
    Real,
    Text,
    Boolean,
    Json,
}

impl Kind {
    pub fn sql_type(self) -> &'static str {
        match self {
            Kind::Integer => "INTEGER",
            Kind::Real => "REAL",
            Kind::Text | Kind::Json => "TEXT",
            Kind::Boolean => "BOOLEAN",
        }
    }
}

/// Where in the source document a column's value lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Top(&'static str),
    Thumbnail(&'static str),
    Color(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub source: Source,
    pub kind: Kind,
}

const fn top(name: &'static str, kind: Kind) -> Column {
    Column { name, source: Source::Top(name), kind }
}

const fn thumbnail(name: &'static str, key: &'static str, kind: Kind) -> Column {
    Column { name, source: Source::Thumbnail(key), kind }
}

const fn color(name: &'static str, key: &'static str, kind: Kind) -> Column {
    Column { name, source: Source::Color(key), kind }
}

use Kind::{Boolean as B, Integer as I, Json as J, Real as R, Text as T};

pub const ID: &str = "id";

/// Every column of the `artworks` table, in storage order. The schema, the
/// insert statement and row projection are all derived from this table.
pub const COLUMNS: &[Column] = &[
    top("id", I),
    top("api_model", T),
    top("api_link", T),
    top("main_reference_number", T),
    top("title", T),
    top("alt_titles", J),
    top("is_boosted", B),
    top("has_not_been_viewed_much", B),
    top("boost_rank", I),
    top("date_start", I),
    top("date_end", I),
    top("date_display", T),
    top("date_qualifier_title", T),
    top("date_qualifier_id", I),
    top("artist_display", T),
    top("artist_id", I),
    top("artist_title", T),
    top("alt_artist_ids", J),
    top("artist_ids", J),
    top("artist_titles", J),
    top("place_of_origin", T),
    top("latitude", R),
    top("longitude", R),
    top("latlon", T),
    top("description", T),
    top("short_description", T),
    top("dimensions", T),
    top("dimensions_detail", J),
    top("medium_display", T),
    top("inscriptions", T),
    top("credit_line", T),
    top("catalogue_display", T),
    top("publication_history", T),
    top("exhibition_history", T),
    top("provenance_text", T),
    top("edition", T),
    top("publishing_verification_level", T),
    top("internal_department_id", I),
    top("fiscal_year", I),
    top("fiscal_year_deaccession", I),
    top("is_public_domain", B),
    top("is_zoomable", B),
    top("max_zoom_window_size", I),
    top("copyright_notice", T),
    top("has_multimedia_resources", B),
    top("has_educational_resources", B),
    top("has_advanced_imaging", B),
    top("colorfulness", R),
    color("color_h", "h", I),
    color("color_l", "l", I),
    color("color_s", "s", I),
    color("color_percentage", "percentage", R),
    color("color_population", "population", I),
    top("is_on_view", B),
    top("on_loan_display", T),
    top("gallery_title", T),
    top("gallery_id", I),
    top("nomisma_id", T),
    top("artwork_type_title", T),
    top("artwork_type_id", I),
    top("department_title", T),
    top("department_id", T),
    top("category_ids", J),
    top("category_titles", J),
    top("term_titles", J),
    top("style_id", I),
    top("style_title", T),
    top("alt_style_ids", J),
    top("style_ids", J),
    top("style_titles", J),
    top("classification_id", T),
    top("classification_title", T),
    top("alt_classification_ids", J),
    top("classification_ids", J),
    top("classification_titles", J),
    top("subject_id", I),
    top("alt_subject_ids", J),
    top("subject_ids", J),
    top("subject_titles", J),
    top("material_id", T),
    top("alt_material_ids", J),
    top("material_ids", J),
    top("material_titles", J),
    top("technique_id", I),
    top("alt_technique_ids", J),
    top("technique_ids", J),
    top("technique_titles", J),
    top("theme_titles", J),
    top("image_id", T),
    top("alt_image_ids", J),
    thumbnail("thumbnail_lqip", "lqip", T),
    thumbnail("thumbnail_width", "width", I),
    thumbnail("thumbnail_height", "height", I),
    thumbnail("thumbnail_alt_text", "alt_text", T),
    top("document_ids", J),
    top("sound_ids", J),
    top("video_ids", J),
    top("text_ids", J),
    top("section_ids", J),
    top("section_titles", J),
    top("site_ids", J),
    top("suggest_autocomplete_all", J),
    top("source_updated_at", T),
    top("updated_at", T),
    top("timestamp", T),
];

pub fn column(name: &str) -> Option<&'static Column> {
    COLUMNS.iter().find(|c| c.name == name)
}

pub fn column_index(name: &str) -> Option<usize> {
    COLUMNS.iter().position(|c| c.name == name)
}
