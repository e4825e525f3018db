use anyhow::Result;
use std::path::PathBuf;

const DEFAULT_CONFIG: &str = r#"[server]
host = "127.0.0.1"
port = 1337
api_prefix = "/api"

[database]
path = "./data/content.db"

[slugs]
enabled = true
source_field = "title"
fallback_field = "name"
skip_generation_field = "skipSlugGeneration"
add_suffix_for_unique = true
update_existing_slugs = false
default_populate_depth = 5

[slugs.slugify_options]
lower = true
strict = true
locale = "lt"

# [slugs.content_types."api::page.page"]
# enabled = false

# [slugs.populate_depth]
# "api::article.article" = 3

# [slugs.populate_patterns."api::article.article"]
# populate = { cover = true }
# fields = ["title", "slug"]

[schema.content_types."api::article.article"]
kind = "collectionType"
display_name = "Article"
singular_name = "article"
plural_name = "articles"

[schema.content_types."api::article.article".attributes]
title = { type = "string" }
slug = { type = "uid" }
skipSlugGeneration = { type = "boolean", private = true }
cover = { type = "media" }
seo = { type = "component", component = "shared.seo" }
blocks = { type = "dynamiczone", components = ["shared.rich-text", "shared.quote"] }

[schema.components."shared.seo".attributes]
metaTitle = { type = "string" }
metaDescription = { type = "text" }

[schema.components."shared.rich-text".attributes]
body = { type = "richtext" }

[schema.components."shared.quote".attributes]
title = { type = "string" }
body = { type = "text" }
"#;

pub async fn run(path: PathBuf) -> Result<()> {
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(path.join("data"))?;

    let config_path = path.join("pebble-slug.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }
    std::fs::write(&config_path, DEFAULT_CONFIG)?;

    tracing::info!("Created {:?}", config_path);
    tracing::info!("Run 'pebble-slug migrate' to set up the database");
    tracing::info!("Run 'pebble-slug serve' to start the server");

    Ok(())
}
