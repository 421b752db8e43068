use super::Mutation;
use crate::db::postgres;
use crate::db::schema::SET_MISSING_IMAGE;
use crate::error::MenuDbError;
use serde::Deserialize;
use sqlx::PgConnection;
use std::collections::BTreeMap;
use std::{fs, path::Path};
use tracing::{info, warn};
use url::Url;

/// Fill `menu_items.image_url` for items whose name matches `name_pattern` (ILIKE)
/// and whose image is NULL or empty. Items that already have an image are untouched.
///
/// A name containing `%` is used as a pattern. Any other name is matched literally,
/// case-insensitively: its `_` and `\` are escaped.
#[derive(Debug, Clone)]
pub struct SetImageUrl {
    name_pattern: String,
    url: Url,
}

impl SetImageUrl {
    pub fn new(name_pattern: impl Into<String>, url: &str) -> Result<Self, MenuDbError> {
        let name_pattern = name_pattern.into();
        if name_pattern.trim().is_empty() {
            return Err(MenuDbError::MissingConfig("menu item name"));
        }
        let parsed = Url::parse(url).map_err(|e| MenuDbError::InvalidImageUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MenuDbError::InvalidImageUrl {
                url: url.to_string(),
                reason: "only http and https URLs are accepted".to_string(),
            });
        }
        Ok(Self {
            name_pattern: like_pattern(name_pattern),
            url: parsed,
        })
    }

    pub fn name_pattern(&self) -> &str {
        &self.name_pattern
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn like_pattern(name: String) -> String {
    if name.contains('%') {
        return name;
    }
    let mut pattern = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern
}

impl Mutation<PgConnection> for SetImageUrl {
    fn describe(&self) -> String {
        format!("set image for menu items matching {:?}", self.name_pattern)
    }

    async fn is_satisfied(&self, conn: &mut PgConnection) -> Result<bool, MenuDbError> {
        let coverage = postgres::image_coverage(&mut *conn, &self.name_pattern).await?;
        if coverage.matching == 0 {
            warn!(pattern = %self.name_pattern, "no menu items match this name");
        }
        Ok(coverage.missing == 0)
    }

    async fn apply(&self, conn: &mut PgConnection) -> Result<u64, MenuDbError> {
        let done = sqlx::query(SET_MISSING_IMAGE)
            .bind(self.url.as_str())
            .bind(&self.name_pattern)
            .execute(&mut *conn)
            .await?;
        Ok(done.rows_affected())
    }

    async fn observe(&self, conn: &mut PgConnection) -> Result<String, MenuDbError> {
        let coverage = postgres::image_coverage(&mut *conn, &self.name_pattern).await?;
        Ok(format!(
            "{} matching item(s), {} without image",
            coverage.matching, coverage.missing
        ))
    }
}

/// Accepted layouts of an image patch file.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PatchFile {
    List(Vec<PatchEntry>),
    Map(BTreeMap<String, String>),
}

#[derive(Debug, Deserialize)]
struct PatchEntry {
    name: String,
    url: String,
}

/// Parse a JSON image patch: either `[{"name": .., "url": ..}]` or `{"name": "url"}`.
pub fn parse_image_patches(contents: &str) -> Result<Vec<SetImageUrl>, MenuDbError> {
    let entries: Vec<(String, String)> = match serde_json::from_str(contents)? {
        PatchFile::List(list) => list.into_iter().map(|e| (e.name, e.url)).collect(),
        PatchFile::Map(map) => map.into_iter().collect(),
    };
    entries
        .into_iter()
        .map(|(name, url)| SetImageUrl::new(name, &url))
        .collect()
}

pub fn load_image_patches(path: &Path) -> Result<Vec<SetImageUrl>, MenuDbError> {
    let contents = fs::read_to_string(path)?;
    let patches = parse_image_patches(&contents)?;
    info!(path = %path.display(), count = patches.len(), "loaded image patches");
    Ok(patches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_web_urls_are_accepted() {
        assert!(SetImageUrl::new("Margherita", "https://cdn.example.com/m.jpg").is_ok());
        assert!(matches!(
            SetImageUrl::new("Margherita", "file:///etc/passwd"),
            Err(MenuDbError::InvalidImageUrl { .. })
        ));
        assert!(SetImageUrl::new("Margherita", "not a url").is_err());
        assert!(SetImageUrl::new("  ", "https://cdn.example.com/m.jpg").is_err());
    }

    #[test]
    fn patch_files_accept_list_and_map() {
        let list = r#"[
            {"name": "Caesar Salad", "url": "https://img.example.com/caesar.png"},
            {"name": "%burger%", "url": "https://img.example.com/burger.png"}
        ]"#;
        let patches = parse_image_patches(list).unwrap();
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[1].name_pattern(), "%burger%");

        let map = r#"{"Tiramisu": "https://img.example.com/tiramisu.jpg"}"#;
        let patches = parse_image_patches(map).unwrap();
        assert_eq!(patches[0].name_pattern(), "Tiramisu");
        assert_eq!(
            patches[0].url().as_str(),
            "https://img.example.com/tiramisu.jpg"
        );
    }

    #[test]
    fn plain_names_match_literally() {
        let m = SetImageUrl::new("Chef_Special", "https://img.example.com/c.png").unwrap();
        assert_eq!(m.name_pattern(), r"Chef\_Special");

        let m = SetImageUrl::new(r"A\B", "https://img.example.com/c.png").unwrap();
        assert_eq!(m.name_pattern(), r"A\\B");

        let m = SetImageUrl::new("%chef_%", "https://img.example.com/c.png").unwrap();
        assert_eq!(m.name_pattern(), "%chef_%");
    }

    #[test]
    fn one_bad_entry_rejects_the_file() {
        let bad = r#"{"Soup": "https://img.example.com/soup.jpg", "Bread": "ftp://x/y"}"#;
        assert!(parse_image_patches(bad).is_err());
    }
}
