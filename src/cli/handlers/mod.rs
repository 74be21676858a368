mod account;

use std::error::Error;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use chrono::NaiveDate;

use crate::api::HttpApi;
use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::lock::FileLock;
use crate::io::{cache_io, config_io, paths, session_io};
use crate::model::config::Config;
use crate::model::project::{Project, ProjectDraft, ProjectStatus, parse_date};
use crate::ops::stats::compute_stats;
use crate::ops::view::{SortKey, filter_and_sort};
use crate::report::{self, ReportFormat};
use crate::store::{ProjectStore, RemoteSync, SyncError, SyncStatus};

type CmdResult = Result<(), Box<dyn Error>>;

/// Settings shared by every handler for one invocation
pub struct Context {
    pub home: PathBuf,
    pub json: bool,
    pub offline: bool,
    pub config: Config,
}

impl Context {
    fn from_cli(cli: &Cli) -> Result<Self, Box<dyn Error>> {
        let home = cli.home.clone().unwrap_or_else(paths::devsync_home);
        let config = config_io::read_config(&home)?;
        Ok(Context {
            home,
            json: cli.json,
            offline: cli.offline,
            config,
        })
    }

    fn api(&self) -> HttpApi {
        HttpApi::new(config_io::resolve_api_url(&self.config))
    }

    /// The bearer token for remote calls. `None` in offline mode; an error
    /// when online without a stored session.
    fn remote_token(&self) -> Result<Option<String>, SyncError> {
        if self.offline {
            return Ok(None);
        }
        session_io::read_session(&self.home)
            .map(|s| Some(s.token))
            .ok_or(SyncError::MissingCredential)
    }

    fn require_online(&self, command: &str) -> CmdResult {
        if self.offline {
            return Err(format!("`{}` needs the server; drop --offline", command).into());
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub async fn dispatch(cli: Cli) -> CmdResult {
    let ctx = Context::from_cli(&cli)?;

    match cli.command {
        // Account
        Commands::Login(args) => account::cmd_login(&ctx, args).await,
        Commands::Signup(args) => account::cmd_signup(&ctx, args).await,
        Commands::Logout => account::cmd_logout(&ctx),
        Commands::Whoami => account::cmd_whoami(&ctx),

        // Read commands
        Commands::List(args) => cmd_list(&ctx, args),
        Commands::Show(args) => cmd_show(&ctx, args),
        Commands::Stats => cmd_stats(&ctx),
        Commands::Export(args) => cmd_export(&ctx, args),

        // Write commands
        Commands::Pull => cmd_pull(&ctx).await,
        Commands::Add(args) => cmd_add(&ctx, args).await,
        Commands::Edit(args) => cmd_edit(&ctx, args).await,
        Commands::Delete(args) => cmd_delete(&ctx, args).await,

        Commands::Config(cmd) => cmd_config(&ctx, cmd),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn into_store(shared: Mutex<ProjectStore>) -> ProjectStore {
    shared.into_inner().unwrap_or_else(PoisonError::into_inner)
}

/// Resolve a user-typed id: exact match first, then a unique prefix.
fn resolve_id(store: &ProjectStore, input: &str) -> Result<String, String> {
    if store.contains(input) {
        return Ok(input.to_string());
    }
    if input.is_empty() {
        return Err("project id must not be empty".to_string());
    }
    let matches: Vec<&str> = store
        .projects()
        .map(|p| p.id.as_str())
        .filter(|id| id.starts_with(input))
        .collect();
    match matches.as_slice() {
        [one] => Ok(one.to_string()),
        [] => Err(format!("project not found: {}", input)),
        many => Err(format!(
            "ambiguous id '{}' matches {} projects",
            input,
            many.len()
        )),
    }
}

/// An empty string means "no date"
fn parse_date_arg(s: &str) -> Result<Option<NaiveDate>, String> {
    if s.trim().is_empty() {
        return Ok(None);
    }
    parse_date(s)
        .map(Some)
        .ok_or_else(|| format!("invalid date '{}' (expected YYYY-MM-DD)", s))
}

fn optional_text(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

fn sort_key(ctx: &Context, arg: Option<&str>) -> Result<SortKey, String> {
    if let Some(s) = arg {
        return s.parse();
    }
    Ok(ctx
        .config
        .list
        .default_sort
        .parse()
        .unwrap_or_else(|e: String| {
            tracing::warn!(error = %e, "ignoring list.default_sort");
            SortKey::default()
        }))
}

fn sync_of(store: &ProjectStore, id: &str) -> SyncStatus {
    store.sync_status(id).unwrap_or_default()
}

/// Sync status to report after a mutation
fn mutation_status(remote: bool, error: &Option<String>) -> SyncStatus {
    match (remote, error) {
        (_, Some(_)) => SyncStatus::Failed,
        (true, None) => SyncStatus::Confirmed,
        (false, None) => SyncStatus::Pending,
    }
}

fn print_mutation(
    ctx: &Context,
    action: &'static str,
    id: &str,
    name: &str,
    sync: SyncStatus,
    error: Option<String>,
) -> CmdResult {
    if ctx.json {
        let out = MutationJson {
            action,
            id,
            sync,
            error,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    let suffix = match sync {
        SyncStatus::Confirmed => "",
        SyncStatus::Pending => " (local only)",
        SyncStatus::Failed => " (not synced)",
    };
    println!("{} {} {}{}", action, short_id(id), name, suffix);
    Ok(())
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_list(ctx: &Context, args: ViewArgs) -> CmdResult {
    let store = cache_io::load_store(&ctx.home)?;
    let key = sort_key(ctx, args.sort.as_deref())?;
    let visible = filter_and_sort(store.projects(), args.search.as_deref().unwrap_or(""), key);

    if ctx.json {
        let out: Vec<ProjectJson> = visible
            .iter()
            .map(|&p| ProjectJson {
                project: p,
                sync: sync_of(&store, &p.id),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if visible.is_empty() {
        println!("no projects");
    } else {
        for p in visible {
            println!("{}", format_project_row(p, sync_of(&store, &p.id)));
        }
    }
    Ok(())
}

fn cmd_show(ctx: &Context, args: IdArgs) -> CmdResult {
    let store = cache_io::load_store(&ctx.home)?;
    let id = resolve_id(&store, &args.id)?;
    let project = store
        .get(&id)
        .ok_or_else(|| format!("project not found: {}", args.id))?;
    let sync = sync_of(&store, &id);

    if ctx.json {
        let out = ProjectJson { project, sync };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_project_detail(project, sync) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_stats(ctx: &Context) -> CmdResult {
    let store = cache_io::load_store(&ctx.home)?;
    let stats = compute_stats(store.projects());
    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&StatsJson::from(&stats))?);
    } else {
        for line in format_stats(&stats) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_export(ctx: &Context, args: ExportArgs) -> CmdResult {
    let store = cache_io::load_store(&ctx.home)?;
    let key = sort_key(ctx, args.view.sort.as_deref())?;
    let visible = filter_and_sort(
        store.projects(),
        args.view.search.as_deref().unwrap_or(""),
        key,
    );

    let format = match &args.format {
        Some(f) => f.parse::<ReportFormat>()?,
        None => args
            .output
            .as_deref()
            .and_then(ReportFormat::from_path)
            .unwrap_or_default(),
    };
    let output = match args.output {
        Some(path) => path,
        None => {
            let name = PathBuf::from(&ctx.config.report.file_name);
            match format {
                ReportFormat::Pdf => name,
                ReportFormat::Text => name.with_extension("txt"),
            }
        }
    };

    let pages = report::export(&visible, &ctx.config.report.title, format, &output)?;
    let path = output.display().to_string();
    if ctx.json {
        let out = ExportJson {
            path: &path,
            format: format.as_str(),
            projects: visible.len(),
            pages,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "wrote {} project(s) to {} ({} page{})",
            visible.len(),
            path,
            pages,
            if pages == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

async fn cmd_pull(ctx: &Context) -> CmdResult {
    ctx.require_online("pull")?;
    let token = ctx.remote_token()?.ok_or(SyncError::MissingCredential)?;
    let _lock = FileLock::acquire_default(&ctx.home)?;

    let shared = Mutex::new(cache_io::load_store(&ctx.home)?);
    // A failed fetch leaves the cache file untouched
    let count = RemoteSync::new(ctx.api()).fetch_all(&shared, &token).await?;
    cache_io::save_store(&ctx.home, &into_store(shared))?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&PullJson { count })?);
    } else {
        println!("pulled {} project(s)", count);
    }
    Ok(())
}

fn build_draft(args: AddArgs) -> Result<ProjectDraft, Box<dyn Error>> {
    let draft = ProjectDraft {
        name: args.name.trim().to_string(),
        tech: args.tech,
        status: Some(ProjectStatus::parse(&args.status)?),
        description: args.description,
        url: args.url.and_then(optional_text),
        start_date: parse_date_arg(args.start.as_deref().unwrap_or(""))?,
        end_date: parse_date_arg(args.end.as_deref().unwrap_or(""))?,
    };
    draft.validate()?;
    Ok(draft)
}

async fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let draft = build_draft(args)?;
    let token = ctx.remote_token()?;
    let _lock = FileLock::acquire_default(&ctx.home)?;

    let mut store = cache_io::load_store(&ctx.home)?;
    let temp_id = store.add_optimistic(draft);
    cache_io::save_store(&ctx.home, &store)?;
    let project = store
        .get(&temp_id)
        .cloned()
        .ok_or_else(|| format!("project not found: {}", temp_id))?;

    let remote = token.is_some();
    let (id, error) = match token {
        Some(token) => {
            let shared = Mutex::new(store);
            let result = RemoteSync::new(ctx.api())
                .create_remote(&shared, &project, &token)
                .await;
            store = into_store(shared);
            cache_io::save_store(&ctx.home, &store)?;
            match result {
                Ok(server_id) => (server_id, None),
                Err(e) => (temp_id, Some(e.to_string())),
            }
        }
        None => (temp_id, None),
    };

    let sync = mutation_status(remote, &error);
    print_mutation(ctx, "added", &id, &project.name, sync, error)
}

fn apply_edits(project: &mut Project, args: EditArgs) -> Result<(), Box<dyn Error>> {
    if let Some(name) = args.name {
        project.name = name.trim().to_string();
    }
    if let Some(tech) = args.tech {
        project.tech = tech;
    }
    if let Some(status) = args.status {
        project.status = Some(ProjectStatus::parse(&status)?);
    }
    if let Some(description) = args.description {
        project.description = description;
    }
    if let Some(url) = args.url {
        project.url = optional_text(url);
    }
    if let Some(start) = args.start {
        project.start_date = parse_date_arg(&start)?;
    }
    if let Some(end) = args.end {
        project.end_date = parse_date_arg(&end)?;
    }
    project.validate()?;
    Ok(())
}

async fn cmd_edit(ctx: &Context, args: EditArgs) -> CmdResult {
    let token = ctx.remote_token()?;
    let _lock = FileLock::acquire_default(&ctx.home)?;

    let mut store = cache_io::load_store(&ctx.home)?;
    let id = resolve_id(&store, &args.id)?;
    let mut project = store
        .get(&id)
        .cloned()
        .ok_or_else(|| format!("project not found: {}", args.id))?;
    apply_edits(&mut project, args)?;
    store.update(project.clone());
    cache_io::save_store(&ctx.home, &store)?;

    let remote = token.is_some();
    let (id, error) = match token {
        Some(token) => {
            let shared = Mutex::new(store);
            let sync = RemoteSync::new(ctx.api());
            // Never reached the server: create it now instead of updating
            let result = if ProjectStore::is_local_id(&id) {
                sync.create_remote(&shared, &project, &token).await
            } else {
                sync.update_remote(&shared, &project, &token)
                    .await
                    .map(|()| id.clone())
            };
            store = into_store(shared);
            cache_io::save_store(&ctx.home, &store)?;
            match result {
                Ok(final_id) => (final_id, None),
                Err(e) => (id, Some(e.to_string())),
            }
        }
        None => (id, None),
    };

    let sync = mutation_status(remote, &error);
    print_mutation(ctx, "updated", &id, &project.name, sync, error)
}

async fn cmd_delete(ctx: &Context, args: IdArgs) -> CmdResult {
    let token = ctx.remote_token()?;
    let _lock = FileLock::acquire_default(&ctx.home)?;

    let mut store = cache_io::load_store(&ctx.home)?;
    let id = resolve_id(&store, &args.id)?;
    let name = store.get(&id).map(|p| p.name.clone()).unwrap_or_default();
    store.delete(&id);
    cache_io::save_store(&ctx.home, &store)?;

    // Local-only entries have nothing to delete on the server
    let remote = token.is_some() && !ProjectStore::is_local_id(&id);
    let mut error = None;
    if let Some(token) = token
        && remote
    {
        let shared = Mutex::new(store);
        let result = RemoteSync::new(ctx.api())
            .delete_remote(&shared, &id, &token)
            .await;
        cache_io::save_store(&ctx.home, &into_store(shared))?;
        error = result.err().map(|e| e.to_string());
    }

    let sync = mutation_status(remote, &error);
    print_mutation(ctx, "deleted", &id, &name, sync, error)
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn cmd_config(ctx: &Context, cmd: ConfigCmd) -> CmdResult {
    match cmd.action {
        ConfigAction::Show => {
            if ctx.json {
                println!("{}", serde_json::to_string_pretty(&ctx.config)?);
            } else {
                print!("{}", toml::to_string_pretty(&ctx.config)?);
                let effective = config_io::resolve_api_url(&ctx.config);
                if effective != ctx.config.api.base_url {
                    println!(
                        "\n# {} overrides api.base_url: {}",
                        config_io::API_URL_ENV,
                        effective
                    );
                }
            }
            Ok(())
        }
        ConfigAction::Set { key, value } => {
            let _lock = FileLock::acquire_default(&ctx.home)?;
            config_io::set_value(&ctx.home, &key, &value)?;
            if !ctx.json {
                println!("{} = {:?}", key, value);
            }
            Ok(())
        }
    }
}
