use crate::artwork::fields::{COLUMNS, ID};

pub const TABLE: &str = "artworks";

/// Lookup acceleration for the fields collection building filters and sorts on.
pub const INDEXES: &str = "
    CREATE INDEX IF NOT EXISTS idx_department_title ON artworks(department_title);
    CREATE INDEX IF NOT EXISTS idx_is_public_domain ON artworks(is_public_domain);
    CREATE INDEX IF NOT EXISTS idx_image_id ON artworks(image_id);
    CREATE INDEX IF NOT EXISTS idx_classification_title ON artworks(classification_title);
    CREATE INDEX IF NOT EXISTS idx_artwork_type_title ON artworks(artwork_type_title);
    CREATE INDEX IF NOT EXISTS idx_artist_title ON artworks(artist_title);
    CREATE INDEX IF NOT EXISTS idx_date_start ON artworks(date_start);
    CREATE INDEX IF NOT EXISTS idx_date_end ON artworks(date_end);
    CREATE INDEX IF NOT EXISTS idx_place_of_origin ON artworks(place_of_origin);
    CREATE INDEX IF NOT EXISTS idx_is_on_view ON artworks(is_on_view);
    CREATE INDEX IF NOT EXISTS idx_colorfulness ON artworks(colorfulness);
";

pub fn create_table_sql() -> String {
    let columns: Vec<String> = COLUMNS
        .iter()
        .map(|c| {
            if c.name == ID {
                format!("{} INTEGER PRIMARY KEY", c.name)
            } else {
                format!("{} {}", c.name, c.kind.sql_type())
            }
        })
        .collect();
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
        TABLE,
        columns.join(",\n    ")
    )
}

pub fn column_list() -> String {
    COLUMNS.iter().map(|c| c.name).collect::<Vec<_>>().join(", ")
}

pub fn upsert_sql() -> String {
    let placeholders: Vec<String> = (1..=COLUMNS.len()).map(|i| format!("?{}", i)).collect();
    format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        TABLE,
        column_list(),
        placeholders.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_sql() {
        let create = create_table_sql();
        assert!(create.contains("id INTEGER PRIMARY KEY"));
        assert!(create.contains("is_public_domain BOOLEAN"));
        assert!(create.contains("category_ids TEXT"));
        assert!(create.contains("color_percentage REAL"));

        let upsert = upsert_sql();
        assert!(upsert.starts_with("INSERT OR REPLACE INTO artworks (id, api_model"));
        assert!(upsert.ends_with("?105)"));
    }
}
