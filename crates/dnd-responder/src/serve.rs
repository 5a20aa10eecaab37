//! Wires the watcher and the webhook server together.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use responder_api::{ApiConfig, AppState};
use responder_core::{
    config, CalendarLookup, CalendarWindow, ClaudeConfig, ClaudeGenerator, GoogleCalendar,
    LocalZone, MessagesNotifier, Persona, ResponseComposer,
};
use responder_persistence::{MarkerStore, WhitelistStore};
use responder_runtime::{
    CallHistorySource, Dispatcher, DndSwitch, MessageHistorySource, Runtime, Watcher,
    WatcherConfig,
};

use crate::cli::ServeArgs;

/// Expands a leading `~` and environment variables in a path argument.
pub fn expand_path(raw: &str) -> PathBuf {
    match shellexpand::full(raw) {
        Ok(expanded) => PathBuf::from(expanded.into_owned()),
        Err(_) => PathBuf::from(shellexpand::tilde(raw).into_owned()),
    }
}

/// Builds the reply zone from the offset/abbreviation flags.
///
/// Without an offset the host zone is used, resolved per formatted time.
pub fn local_zone(
    utc_offset: Option<&str>,
    abbreviation: Option<&str>,
) -> Result<LocalZone, String> {
    let zone = match utc_offset {
        Some(raw) => LocalZone::fixed(
            LocalZone::parse_offset(raw).ok_or_else(|| format!("invalid UTC offset: {:?}", raw))?,
        ),
        None => LocalZone::system(),
    };

    Ok(match abbreviation.map(str::trim).filter(|a| !a.is_empty()) {
        Some(abbreviation) => zone.with_abbreviation(abbreviation),
        None => zone,
    })
}

fn composer(args: &ServeArgs, persona: &Persona, timeout: Duration) -> ResponseComposer {
    let composer = ResponseComposer::new(persona.clone());

    let Some(api_key) = args.anthropic_api_key.as_deref().filter(|k| !k.trim().is_empty()) else {
        info!("no Anthropic API key, replies will use templates");
        return composer;
    };

    let mut claude = ClaudeConfig::new(api_key).with_timeout(timeout);
    if let Some(model) = &args.anthropic_model {
        claude = claude.with_model(model);
    }
    if let Some(base_url) = &args.anthropic_base_url {
        claude = claude.with_base_url(base_url);
    }

    match ClaudeGenerator::new(claude, persona.clone()) {
        Ok(generator) => composer.with_generator(Arc::new(generator)),
        Err(e) => {
            warn!(error = %e, "failed to set up Claude, replies will use templates");
            composer
        }
    }
}

fn calendar(args: &ServeArgs, timeout: Duration) -> Result<GoogleCalendar, Box<dyn std::error::Error>> {
    let token_file = args
        .google_token_file
        .clone()
        .unwrap_or_else(config::google_token_file);
    if !token_file.exists() {
        warn!(
            path = %token_file.display(),
            "Google token file not found, replies will not mention calendar events"
        );
    }

    let mut calendar = GoogleCalendar::new(token_file, timeout)?.with_calendar_id(&args.calendar_id);
    if let Some(base_url) = &args.google_base_url {
        calendar = calendar.with_base_url(base_url);
    }
    Ok(calendar)
}

fn load_markers(path: PathBuf) -> MarkerStore {
    match MarkerStore::load(&path) {
        Ok(markers) => markers,
        Err(e) => {
            // Re-baselined from current history on first poll.
            warn!(path = %path.display(), error = %e, "unreadable marker file, starting fresh");
            MarkerStore::empty(path)
        }
    }
}

/// Runs the server and watcher until Ctrl+C.
pub async fn run(args: ServeArgs, whitelist_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let whitelist = match WhitelistStore::load(whitelist_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(
                path = %whitelist_path.display(),
                error = %e,
                "failed to load whitelist (create one with `dnd-responder whitelist init`)"
            );
            return Err(e.into());
        }
    };
    info!(count = whitelist.len(), path = %whitelist_path.display(), "whitelist loaded");

    let timeout = Duration::from_secs(args.request_timeout);
    let zone = local_zone(args.utc_offset.as_deref(), args.zone_abbreviation.as_deref())?;
    let persona = Persona::new(&args.owner_name, &args.signature, zone);

    let calendar: Arc<dyn CalendarLookup> = Arc::new(calendar(&args, timeout)?);
    let window = CalendarWindow::default();
    let dnd = DndSwitch::default();

    let dispatcher = Dispatcher::new(
        Arc::clone(&calendar),
        Arc::new(composer(&args, &persona, timeout)),
        Arc::new(MessagesNotifier::new().with_timeout(timeout)),
    )
    .with_window(window);

    let call_db = expand_path(&args.call_db);
    let message_db = expand_path(&args.message_db);
    info!(calls = %call_db.display(), messages = %message_db.display(), "watching history");

    let watcher = Watcher::new(
        dispatcher,
        dnd.clone(),
        Arc::clone(&whitelist),
        load_markers(config::markers_file()),
    )
    .with_source(Arc::new(CallHistorySource::new(call_db)))
    .with_source(Arc::new(MessageHistorySource::new(message_db)))
    .with_config(
        WatcherConfig::new()
            .with_poll_interval(Duration::from_secs(args.poll_interval.max(1)))
            .with_max_event_age(Duration::from_secs(args.max_event_age)),
    );

    let mut runtime = Runtime::new(watcher);
    runtime.start()?;

    let api_config = ApiConfig::new(&args.host, args.port);
    let state = AppState::new(api_config.clone(), dnd, whitelist, calendar).with_calendar_window(window);

    println!("\n[dnd] DND Responder ({})", persona.owner_name);
    println!("   Webhook: http://{}/webhook/dnd", api_config.bind_address());
    println!("   Status:  http://{}/api/status", api_config.bind_address());
    println!("   Press Ctrl+C to stop\n");

    let served = responder_api::serve(api_config, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
        }
        info!("shutdown requested");
    })
    .await;

    runtime.shutdown().await?;
    served?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/Library/Messages/chat.db");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("Library/Messages/chat.db"));

        assert_eq!(expand_path("/var/db/chat.db"), PathBuf::from("/var/db/chat.db"));
    }

    #[test]
    fn test_local_zone_from_flags() {
        let end = Utc.with_ymd_and_hms(2024, 1, 15, 22, 30, 0).unwrap();

        let zone = local_zone(Some("-05:00"), Some("EST")).unwrap();
        assert_eq!(zone.offset_at(end).local_minus_utc(), -5 * 3600);
        assert_eq!(zone.format_time(end), "05:30PM EST");

        let zone = local_zone(Some("+0530"), None).unwrap();
        assert_eq!(zone.abbreviation_at(end), "UTC+05:30");

        let zone = local_zone(Some("utc"), None).unwrap();
        assert_eq!(zone.abbreviation_at(end), "UTC");

        assert!(local_zone(Some("eastern"), None).is_err());
    }

    #[test]
    fn test_local_zone_defaults_to_host_zone() {
        let zone = local_zone(None, Some("  ")).unwrap();
        assert_eq!(zone, LocalZone::system());

        let zone = local_zone(None, Some("ET")).unwrap();
        assert_eq!(zone, LocalZone::system().with_abbreviation("ET"));
    }
}
