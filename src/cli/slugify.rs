use crate::services::entries::Documents;
use crate::services::slug::{slugify, SlugResolver};
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path, text: &str, content_type: Option<String>) -> Result<()> {
    let config = Config::load(config_path)?;
    let options = &config.slugs.slugify_options;

    let Some(uid) = content_type else {
        println!("{}", slugify(text, options));
        return Ok(());
    };

    if config.schema.content_type(&uid).is_none() {
        anyhow::bail!("Unknown content type {}", uid);
    }

    let db = Database::open(&config.database.path, config.database.pool_size)?;
    db.migrate()?;
    let documents = Documents::new(&db, &config.schema);
    let resolver = SlugResolver::new(&config.slugs, &documents);
    let slug = resolver.resolve_unique_slug(text, &uid, None, options)?;
    println!("{}", slug);

    Ok(())
}
