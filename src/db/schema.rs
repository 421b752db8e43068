//! SQL text for catalog lookups and the restaurant tables the mutations touch.
//! Catalog columns are cast to `text` since `information_schema` uses domain types.

pub const ADMIN_ROLE: &str = "admin";

pub const LIST_TABLES: &str = r#"
SELECT table_name::text
FROM information_schema.tables
WHERE table_schema = current_schema()
  AND table_type = 'BASE TABLE'
ORDER BY table_name
"#;

pub const LIST_COLUMNS: &str = r#"
SELECT column_name::text AS column_name,
       data_type::text AS data_type,
       (is_nullable = 'YES') AS is_nullable,
       column_default::text AS column_default
FROM information_schema.columns
WHERE table_schema = current_schema()
  AND table_name::text = $1
ORDER BY ordinal_position
"#;

pub const COLUMN_EXISTS: &str = r#"
SELECT EXISTS (
    SELECT 1
    FROM information_schema.columns
    WHERE table_schema = current_schema()
      AND table_name::text = $1
      AND column_name::text = $2
)
"#;

pub const ADMIN_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM users WHERE role = $1)";

pub const COUNT_ADMINS: &str = "SELECT COUNT(*) FROM users WHERE role = $1";

pub const LIST_ADMINS: &str = r#"
SELECT id::bigint AS id, name::text AS name, email::text AS email
FROM users
WHERE role = $1
ORDER BY id
"#;

pub const INSERT_ADMIN: &str =
    "INSERT INTO users (name, email, password, role) VALUES ($1, $2, $3, $4)";

pub const IMAGE_COVERAGE: &str = r#"
SELECT COUNT(*) AS matching,
       COUNT(*) FILTER (WHERE image_url IS NULL OR image_url = '') AS missing
FROM menu_items
WHERE name ILIKE $1
"#;

pub const SET_MISSING_IMAGE: &str = r#"
UPDATE menu_items
SET image_url = $1
WHERE name ILIKE $2
  AND (image_url IS NULL OR image_url = '')
"#;

pub const LIST_CATEGORIES: &str = "SELECT row_to_json(c) AS row FROM categories c ORDER BY c.id";

pub const PING: &str = "SELECT 1";
