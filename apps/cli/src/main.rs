use std::{path::PathBuf, sync::Arc};

use anyhow::{anyhow, Context, Result};
use catalog_client::{
    collection::CollectionSnapshot,
    config::{load_settings_from, ClientSettings, DEFAULT_CONFIG_FILE},
    overview::OverviewSnapshot,
    presentation::{copyright_notice, SystemClock},
    ActionOutcome, ArtistOverviewSource, CatalogApi, CollectionEditor, FeedbackChannel,
    HttpCatalogApi, LabelOverviewSource, OverviewLoader, OverviewQuery, RelationshipStore,
    StaticSession, ViewScope, ViewerSession,
};
use catalog_shared::{
    domain::{ArtistId, EntityId, EntityKind, EntityRef, LabelId, ReleaseId, SortField, SortOrder},
    protocol::{ArtistOverview, LabelOverview, ReleasePage},
};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "crate-cli", about = "Browse the vinyl catalog and manage your collection")]
struct Args {
    /// Settings file; environment variables still override it.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[arg(long)]
    api_url: Option<String>,
    /// Bearer token; falls back to `CATALOG_TOKEN` or the settings file.
    #[arg(long)]
    token: Option<String>,
    /// Print raw overview payloads as JSON.
    #[arg(long)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EntityArg {
    Artist,
    Label,
}

impl From<EntityArg> for EntityKind {
    fn from(value: EntityArg) -> Self {
        match value {
            EntityArg::Artist => EntityKind::Artist,
            EntityArg::Label => EntityKind::Label,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    Asc,
    Desc,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show follow status and follower count.
    Status { kind: EntityArg, id: i64 },
    Follow {
        kind: EntityArg,
        id: i64,
        #[arg(long)]
        name: Option<String>,
    },
    Unfollow {
        kind: EntityArg,
        id: i64,
        #[arg(long)]
        name: Option<String>,
    },
    /// Show a release and your collection entry for it.
    Release { id: i64 },
    /// Add or update a release in your collection or wantlist.
    Collect {
        id: i64,
        #[arg(long)]
        wantlist: bool,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        price: Option<String>,
        #[arg(long)]
        rating: Option<u8>,
        #[arg(long, conflicts_with = "rating")]
        clear_rating: bool,
    },
    Uncollect { id: i64 },
    Artist {
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        sort: Option<SortField>,
        #[arg(long, value_enum)]
        order: Option<OrderArg>,
    },
    Label {
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
}

struct AppContext {
    settings: ClientSettings,
    api: Arc<dyn CatalogApi>,
    session: Arc<dyn ViewerSession>,
    feedback: FeedbackChannel,
    scope: ViewScope,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings_from(&args.config);
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(token) = args.token {
        settings.api_token = Some(token);
    }
    info!(api_url = %settings.api_url, authenticated = settings.api_token.is_some(), "cli: starting");

    let session: Arc<dyn ViewerSession> = match &settings.api_token {
        Some(token) => Arc::new(StaticSession::with_token(token.clone())),
        None => Arc::new(StaticSession::anonymous()),
    };
    let api: Arc<dyn CatalogApi> = Arc::new(
        HttpCatalogApi::new(&settings.api_url, Arc::clone(&session))
            .with_context(|| format!("invalid api url '{}'", settings.api_url))?,
    );
    let ctx = AppContext {
        settings,
        api,
        session,
        feedback: FeedbackChannel::new(),
        scope: ViewScope::new(),
        json: args.json,
    };

    let outcome = run(&ctx, args.command).await?;
    if let Some(feedback) = ctx.feedback.current() {
        println!("{feedback}");
    }
    println!("{}", copyright_notice(&SystemClock, "crate"));

    match outcome {
        Some(ActionOutcome::Failed) => Err(anyhow!("request failed")),
        Some(ActionOutcome::Denied) => Err(anyhow!("sign in required (pass --token)")),
        Some(ActionOutcome::Invalid) => Err(anyhow!("invalid input")),
        _ => Ok(()),
    }
}

fn entity(kind: EntityArg, id: i64) -> EntityRef {
    EntityRef {
        kind: kind.into(),
        id: EntityId(id),
    }
}

fn relationship(ctx: &AppContext, entity: EntityRef, name: Option<String>) -> RelationshipStore {
    RelationshipStore::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.session),
        ctx.feedback.clone(),
        ctx.scope.clone(),
        entity,
        name.unwrap_or_else(|| entity.to_string()),
    )
}

fn collection(ctx: &AppContext, id: i64) -> CollectionEditor {
    CollectionEditor::new(
        Arc::clone(&ctx.api),
        Arc::clone(&ctx.session),
        ctx.feedback.clone(),
        ctx.scope.clone(),
        ReleaseId(id),
        ctx.settings.release_overview_params(),
        None,
    )
}

async fn run(ctx: &AppContext, command: Command) -> Result<Option<ActionOutcome>> {
    match command {
        Command::Status { kind, id } => {
            let store = relationship(ctx, entity(kind, id), None);
            let state = store.load_status().await;
            println!(
                "{}: following={} followers={}",
                state.entity, state.is_following, state.follower_count
            );
            Ok(None)
        }
        Command::Follow { kind, id, name } => {
            let store = relationship(ctx, entity(kind, id), name);
            store.load_status().await;
            let outcome = store.follow().await;
            print_follow(&store).await;
            Ok(Some(outcome))
        }
        Command::Unfollow { kind, id, name } => {
            let store = relationship(ctx, entity(kind, id), name);
            store.load_status().await;
            let outcome = store.unfollow().await;
            print_follow(&store).await;
            Ok(Some(outcome))
        }
        Command::Release { id } => {
            let editor = collection(ctx, id);
            let outcome = editor.load().await;
            let snapshot = editor.snapshot().await;
            if ctx.json {
                if let Some(overview) = &snapshot.overview {
                    println!("{}", serde_json::to_string_pretty(overview)?);
                }
            }
            print_release(&snapshot);
            Ok(Some(outcome))
        }
        Command::Collect {
            id,
            wantlist,
            notes,
            price,
            rating,
            clear_rating,
        } => {
            let editor = collection(ctx, id);
            let loaded = editor.load().await;
            if loaded != ActionOutcome::Completed {
                print_release(&editor.snapshot().await);
                return Ok(Some(loaded));
            }
            editor.set_membership(wantlist).await;
            if let Some(notes) = notes {
                editor.set_notes(notes).await;
            }
            if let Some(price) = price {
                editor.set_price_threshold(price).await;
            }
            if rating.is_some() || clear_rating {
                let staged = editor.set_rating(rating).await;
                if staged != ActionOutcome::Completed {
                    return Ok(Some(staged));
                }
            }
            let outcome = editor.save().await;
            print_release(&editor.snapshot().await);
            Ok(Some(outcome))
        }
        Command::Uncollect { id } => {
            let editor = collection(ctx, id);
            editor.load().await;
            let outcome = editor.remove().await;
            print_release(&editor.snapshot().await);
            Ok(Some(outcome))
        }
        Command::Artist {
            id,
            page,
            sort,
            order,
        } => {
            let mut query = OverviewQuery {
                page,
                ..OverviewQuery::new(ctx.settings.artist_per_page)
            };
            if let Some(sort) = sort {
                query.sort_field = sort;
            }
            if let Some(order) = order {
                query.sort_order = match order {
                    OrderArg::Asc => SortOrder::Asc,
                    OrderArg::Desc => SortOrder::Desc,
                };
            }
            let loader = OverviewLoader::new(
                ArtistOverviewSource::new(Arc::clone(&ctx.api), ArtistId(id)),
                ctx.feedback.clone(),
                ctx.scope.clone(),
                query,
            );
            let outcome = loader.load().await;
            let snapshot = loader.snapshot().await;
            print_artist(ctx, &snapshot)?;
            print_page_links(&loader.page_links(ctx.settings.page_window).await, page);
            Ok(Some(outcome))
        }
        Command::Label { id, page } => {
            let query = OverviewQuery {
                page,
                ..OverviewQuery::new(ctx.settings.label_per_page)
            };
            let loader = OverviewLoader::new(
                LabelOverviewSource::new(Arc::clone(&ctx.api), LabelId(id)),
                ctx.feedback.clone(),
                ctx.scope.clone(),
                query,
            );
            let outcome = loader.load().await;
            let snapshot = loader.snapshot().await;
            print_label(ctx, &snapshot)?;
            print_page_links(&loader.page_links(ctx.settings.page_window).await, page);
            Ok(Some(outcome))
        }
    }
}

async fn print_follow(store: &RelationshipStore) {
    match store.snapshot().await.follow_state {
        Some(state) => println!(
            "{}: following={} followers={}",
            state.entity, state.is_following, state.follower_count
        ),
        None => println!("{}: status unknown", store.entity()),
    }
}

fn print_release(snapshot: &CollectionSnapshot) {
    if snapshot.not_found {
        println!("Release {} was not found.", snapshot.release_id);
        return;
    }
    let Some(overview) = &snapshot.overview else {
        return;
    };
    let release = &overview.release;
    let year = release.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
    println!("{} ({year}) {}", release.title, release.artists.join(", "));
    if let Some(rating) = snapshot.community_rating {
        println!("community rating: {:.2} ({} votes)", rating.average, rating.count);
    }
    match &snapshot.entry {
        Some(entry) => {
            let list = if entry.wishlist { "wantlist" } else { "collection" };
            let rating = entry
                .rating
                .map(|r| r.get().to_string())
                .unwrap_or_else(|| "-".into());
            let price = entry
                .price_threshold
                .map(|p| format!("{p:.2}"))
                .unwrap_or_else(|| "-".into());
            println!("in your {list}: rating={rating} price_target={price} notes={:?}", entry.notes);
        }
        None => println!("not in your collection"),
    }
}

fn print_listing(page: &ReleasePage) {
    for release in &page.releases {
        let year = release.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into());
        let format = release.format.as_deref().unwrap_or("-");
        println!("  [{}] {} ({year}, {format})", release.id, release.title);
    }
    let meta = page.pagination;
    println!("page {}/{} ({} releases)", meta.page, meta.pages, meta.total);
}

fn print_artist(ctx: &AppContext, snapshot: &OverviewSnapshot<ArtistOverview>) -> Result<()> {
    if snapshot.not_found {
        println!("Artist not found.");
        return Ok(());
    }
    let Some(overview) = &snapshot.data else {
        return Ok(());
    };
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(overview)?);
        return Ok(());
    }
    println!(
        "{} sorted by {} {}",
        overview.artist.name,
        snapshot.query.sort_field.as_str(),
        snapshot.query.sort_order.as_str()
    );
    print_listing(&overview.releases);
    Ok(())
}

fn print_label(ctx: &AppContext, snapshot: &OverviewSnapshot<LabelOverview>) -> Result<()> {
    if snapshot.not_found {
        println!("Label not found.");
        return Ok(());
    }
    let Some(overview) = &snapshot.data else {
        return Ok(());
    };
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(overview)?);
        return Ok(());
    }
    println!("{}", overview.label.name);
    print_listing(&overview.releases);
    Ok(())
}

fn print_page_links(links: &[u32], current: u32) {
    if links.is_empty() {
        return;
    }
    let rendered: Vec<String> = links
        .iter()
        .map(|page| {
            if *page == current {
                format!("[{page}]")
            } else {
                page.to_string()
            }
        })
        .collect();
    println!("pages: {}", rendered.join(" "));
}
