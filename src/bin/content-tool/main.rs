use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use serde_json::Value;

use outlier_content::admin::ContentManager;
use outlier_content::config::{open_config, Config, CFG_FILE_NAME};
use outlier_content::content::{ContentStatus, ContentType, NewContent};
use outlier_content::logger::configure_logger;
use outlier_content::store::{open_stores, ContentFilter, ContentOrder};
use outlier_content::sync::{ContentSync, SyncResponse};
use outlier_content::util::os_helper::current_author;

use crate::config_data::write_sample_cfg;

mod config_data;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
enum Args {
    /// Runs one WordPress sync against the configured store
    Sync(ConfigArgs),
    /// Lists stored content
    List(ListArgs),
    /// Creates a content item
    Create(CreateArgs),
    /// Writes a sample configuration file
    Config(SampleArgs),
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Config path
    #[arg(short, long)]
    config_path: Option<String>,
}

#[derive(Parser, Debug)]
struct ListArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Only items of this type (blog_post, book, podcast, video, ai_prompt)
    #[arg(short = 't', long)]
    content_type: Option<ContentType>,

    /// Only items in this status (draft, published, archived)
    #[arg(short, long)]
    status: Option<ContentStatus>,
}

#[derive(Parser, Debug)]
struct CreateArgs {
    #[command(flatten)]
    config: ConfigArgs,

    #[arg(long)]
    title: String,

    #[arg(short = 't', long, default_value = "blog_post")]
    content_type: ContentType,

    #[arg(short, long, default_value = "")]
    description: String,

    #[arg(short, long)]
    url: Option<String>,

    #[arg(long)]
    category: Option<String>,

    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    name: Option<String>,

    /// Publish right away instead of creating a draft
    #[arg(short, long)]
    publish: bool,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    /// Blog the sample should sync from
    #[arg(short, long)]
    site: String,

    /// Where to write the file
    #[arg(short, long, default_value = CFG_FILE_NAME)]
    out: String,
}

fn load_config(args: &ConfigArgs) -> Result<Config> {
    let config = open_config(args.config_path.as_ref().map(PathBuf::from))
        .map_err(|e| anyhow!(e))?;
    if let Err(err) = configure_logger(&config) {
        eprintln!("Error creating logger sinks. Using console instead. Desc={}", err);
    }
    if config.store.data_file.is_none() {
        eprintln!("No data file configured. Changes will be lost when the tool exits");
    }
    Ok(config)
}

async fn sync_cmd(args: ConfigArgs) -> Result<()> {
    let config = load_config(&args)?;
    let stores = open_stores(&config.store)?;
    let sync = ContentSync::from_config(&config.source, stores.content)?;

    let response = SyncResponse::from(sync.run().await);
    println!("{}", serde_json::to_string_pretty(&response)?);
    if !response.success {
        return Err(anyhow!("sync failed"));
    }
    Ok(())
}

async fn list_cmd(args: ListArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let stores = open_stores(&config.store)?;

    let filter = ContentFilter {
        status: args.status,
        content_type: args.content_type,
        category: None,
        order: ContentOrder::CreatedDesc,
    };
    for item in stores.content.list(&filter).await? {
        println!("{}  {:<9}  {:<9}  {}  {}",
            item.id,
            item.status.as_str(),
            item.content_type.as_str(),
            item.category.as_deref().unwrap_or("-"),
            item.title);
    }
    Ok(())
}

async fn create_cmd(args: CreateArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let stores = open_stores(&config.store)?;
    let manager = ContentManager::new(Arc::clone(&stores.content));

    let status = if args.publish { ContentStatus::Published } else { ContentStatus::Draft };
    let new = NewContent {
        title: args.title,
        description: args.description,
        content_type: args.content_type,
        content_html: None,
        external_url: args.url,
        thumbnail_url: None,
        category: args.category,
        tags: vec![],
        status,
        published_at: None,
        author_id: Some(args.name.unwrap_or_else(current_author)),
        metadata: Value::Object(Default::default()),
    };

    let item = manager.create(new).await?;
    println!("{}", serde_json::to_string_pretty(&item)?);
    Ok(())
}

fn config_cmd(args: SampleArgs) -> Result<()> {
    let out = PathBuf::from(&args.out);
    write_sample_cfg(&out, &args.site)?;
    println!("Sample configuration written to {}", out.display());
    Ok(())
}

#[ntex::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    match args {
        Args::Sync(args) => sync_cmd(args).await,
        Args::List(args) => list_cmd(args).await,
        Args::Create(args) => create_cmd(args).await,
        Args::Config(args) => config_cmd(args),
    }
}
