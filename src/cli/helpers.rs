use crate::cli::args::{EditArgs, ExportArgs, ImportArgs, ProfileArgs};
use crate::compiler::compile_rules;
use crate::config::helper::parse_header_spec;
use crate::config::Config;
use crate::engine::FileRuleEngine;
use crate::profile::{
    parse_import, HeaderAction, HeaderRule, Profile, ProfileDraft, ProfileRepository,
};
use crate::storage::JsonFileStore;
use crate::sync::{RuleSynchronizer, SyncTrigger, Triggers};
use crate::web_server::WebServer;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::signal;

/// Store, repository and synchronizer wired from configuration
pub struct Services {
    pub config: Config,
    pub store: Arc<JsonFileStore>,
    pub repository: ProfileRepository,
    pub synchronizer: RuleSynchronizer,
}

impl Services {
    pub async fn open(config: Config) -> Result<Self> {
        let store = Arc::new(
            JsonFileStore::open(&config.storage.path, &config.storage.namespace)
                .await
                .with_context(|| {
                    format!("Failed to open store: {}", config.storage.path.display())
                })?,
        );
        let repository = ProfileRepository::new(store.clone());
        let engine = Arc::new(FileRuleEngine::new(&config.engine.path));
        let synchronizer = RuleSynchronizer::new(repository.clone(), engine);

        Ok(Self {
            config,
            store,
            repository,
            synchronizer,
        })
    }

    /// Apply a profile-list change to the installed rules right away
    async fn after_change(&self) {
        let _ = self.synchronizer.run(SyncTrigger::StorageChange).await;
    }
}

/// Keep rules synchronized until Ctrl+C
pub async fn run_service(services: Services) -> Result<()> {
    let triggers = Triggers::new(services.synchronizer.clone());

    if services.config.storage.watch {
        let debounce = services.config.storage.debounce_duration()?;
        services
            .store
            .watch(debounce)
            .await
            .context("Failed to watch store file")?;
    }
    let listener_handle = triggers.start().await;

    let mut server_handle = None;
    let server_config = &services.config.server;
    if server_config.enabled {
        let web_server = WebServer::new(
            server_config.port,
            server_config.host.clone(),
            services.synchronizer.clone(),
        );
        server_handle = Some(tokio::spawn(async move {
            if let Err(e) = web_server.start().await {
                tracing::error!("Message endpoint failed: {}", e);
            }
        }));
    }

    println!("🎯 modify-headers started");
    println!("📂 Store file: {}", services.store.file_path().display());
    println!("📜 Rules file: {}", services.config.engine.path.display());
    if server_config.enabled {
        println!(
            "🌐 Refresh endpoint: http://{}:{}/api/message",
            server_config.host, server_config.port
        );
    }
    println!("🛑 Press Ctrl+C to stop");

    signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c")?;
    println!("\n🛑 Received Ctrl+C, shutting down...");

    listener_handle.abort();
    if let Some(handle) = server_handle {
        handle.abort();
    }
    Ok(())
}

pub async fn handle_sync(services: &Services) -> Result<()> {
    let report = services
        .synchronizer
        .run(SyncTrigger::OnDemand)
        .await
        .context("Failed to update rules")?;
    if let Some(report) = report {
        println!(
            "✅ Updated rules: {} added, {} removed",
            report.added, report.removed
        );
    }
    Ok(())
}

pub async fn handle_rules(services: &Services) -> Result<()> {
    let rules = services
        .synchronizer
        .engine()
        .get_dynamic_rules()
        .await
        .context("Failed to read installed rules")?;
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}

pub async fn handle_compile(services: &Services) -> Result<()> {
    let profiles = services.repository.load().await?;
    let rules = compile_rules(&profiles);
    println!("{}", serde_json::to_string_pretty(&rules)?);
    Ok(())
}

pub async fn handle_list(services: &Services) -> Result<()> {
    let profiles = services.repository.list().await?;
    if profiles.is_empty() {
        println!("No profiles yet. Create one to get started!");
        return Ok(());
    }

    for profile in &profiles {
        println!("{}", format_profile(profile));
    }
    Ok(())
}

pub async fn handle_add(services: &Services, args: &ProfileArgs) -> Result<()> {
    let draft = ProfileDraft::new(&args.name, &args.url, parse_headers(&args.headers)?);
    let profile = services.repository.create(&draft).await?;
    println!("✅ Created profile '{}' ({})", profile.name, profile.id);
    services.after_change().await;
    Ok(())
}

pub async fn handle_edit(services: &Services, args: &EditArgs) -> Result<()> {
    let current = services.repository.get(&args.id).await?;
    let headers = if args.headers.is_empty() {
        current.headers
    } else {
        parse_headers(&args.headers)?
    };
    let draft = ProfileDraft::new(
        args.name.as_deref().unwrap_or(&current.name),
        args.url.as_deref().unwrap_or(&current.url_pattern),
        headers,
    );

    let profile = services.repository.update(&args.id, &draft).await?;
    println!("✅ Updated profile '{}' ({})", profile.name, profile.id);
    services.after_change().await;
    Ok(())
}

pub async fn handle_clone(services: &Services, id: &str) -> Result<()> {
    let copy = services.repository.clone_profile(id).await?;
    println!("✅ Created '{}' ({}), disabled", copy.name, copy.id);
    services.after_change().await;
    Ok(())
}

pub async fn handle_delete(services: &Services, id: &str) -> Result<()> {
    let removed = services.repository.delete(id).await?;
    println!("🗑️ Deleted profile '{}'", removed.name);
    services.after_change().await;
    Ok(())
}

pub async fn handle_set_enabled(services: &Services, id: &str, enabled: bool) -> Result<()> {
    let profile = services.repository.set_enabled(id, enabled).await?;
    println!(
        "✅ Profile '{}' {}",
        profile.name,
        if enabled { "enabled" } else { "disabled" }
    );
    services.after_change().await;
    Ok(())
}

pub async fn handle_export(services: &Services, args: &ExportArgs) -> Result<()> {
    let ids = if args.ids.is_empty() {
        services
            .repository
            .load()
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect()
    } else {
        args.ids.clone()
    };

    let document = services.repository.export(&ids).await?;
    tokio::fs::write(&args.output, document.to_json()?)
        .await
        .with_context(|| format!("Failed to write export file: {}", args.output.display()))?;
    println!(
        "📦 {} profile(s) exported to {}",
        document.profiles.len(),
        args.output.display()
    );
    Ok(())
}

pub async fn handle_import(services: &Services, args: &ImportArgs) -> Result<()> {
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read import file: {}", args.file.display()))?;
    let entries = parse_import(&text)
        .with_context(|| format!("Failed to read import file: {}", args.file.display()))?;

    let selected: Vec<usize> = if args.select.is_empty() {
        (0..entries.len()).collect()
    } else {
        args.select.clone()
    };

    let imported = services.repository.import(&entries, &selected).await?;
    println!("✅ Successfully imported {} profile(s)!", imported.len());
    services.after_change().await;
    Ok(())
}

fn parse_headers(specs: &[String]) -> Result<Vec<HeaderRule>> {
    specs.iter().map(|spec| parse_header_spec(spec)).collect()
}

/// One profile as printed by `list`
pub fn format_profile(profile: &Profile) -> String {
    let mut out = format!(
        "{} {} [{}]\n    {}",
        if profile.enabled { "●" } else { "○" },
        profile.name,
        profile.id,
        profile.url_pattern
    );
    for header in &profile.headers {
        let line = match header.action {
            HeaderAction::Delete => format!("\n    DELETE {}", header.name),
            action => format!(
                "\n    {} {}: {}",
                action.as_str().to_uppercase(),
                header.name,
                header.value
            ),
        };
        out.push_str(&line);
    }
    out
}
