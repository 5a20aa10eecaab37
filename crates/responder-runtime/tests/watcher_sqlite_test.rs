//! End-to-end watcher runs against SQLite history fixtures.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use rusqlite::{params, Connection};
use tempfile::TempDir;

use responder_core::{
    CalendarError, CalendarLookup, ComposeError, LocalZone, Notifier, NotifyError, Persona,
    ReplyRequest, ReplySource, ResponseComposer, ResponseGenerator,
};
use responder_models::{CalendarEvent, SourceKind};
use responder_persistence::{MarkerStore, WhitelistStore};
use responder_runtime::{
    CallHistorySource, DispatchOutcome, Dispatcher, DndSwitch, MessageHistorySource, Watcher,
    APPLE_EPOCH_OFFSET,
};

const MOM: &str = "+15551234567";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 21, 45, 0).unwrap()
}

fn est() -> LocalZone {
    LocalZone::new(FixedOffset::west_opt(5 * 3600).unwrap(), "EST")
}

fn persona() -> Persona {
    Persona::new("Tomas", "TomasBot", est())
}

fn apple_seconds(at: DateTime<Utc>) -> f64 {
    (at.timestamp() - APPLE_EPOCH_OFFSET) as f64
}

fn create_call_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE ZCALLRECORD (
            Z_PK INTEGER PRIMARY KEY,
            ZADDRESS VARCHAR,
            ZDATE TIMESTAMP,
            ZNAME VARCHAR,
            ZANSWERED INTEGER,
            ZORIGINATED INTEGER
        );",
    )
    .unwrap();
}

fn insert_missed_call(path: &Path, key: i64, address: &str, at: DateTime<Utc>) {
    let conn = Connection::open(path).unwrap();
    conn.execute(
        "INSERT INTO ZCALLRECORD (Z_PK, ZADDRESS, ZDATE, ZNAME, ZANSWERED, ZORIGINATED)
         VALUES (?1, ?2, ?3, NULL, 0, 0)",
        params![key, address, apple_seconds(at)],
    )
    .unwrap();
}

fn create_message_db(path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        "CREATE TABLE handle (ROWID INTEGER PRIMARY KEY, id TEXT);
        CREATE TABLE chat (ROWID INTEGER PRIMARY KEY, display_name TEXT);
        CREATE TABLE chat_message_join (chat_id INTEGER, message_id INTEGER);
        CREATE TABLE message (
            ROWID INTEGER PRIMARY KEY,
            text TEXT,
            date INTEGER,
            handle_id INTEGER,
            is_from_me INTEGER,
            is_read INTEGER
        );
        INSERT INTO handle VALUES (1, '+15551234567');",
    )
    .unwrap();
}

fn insert_unread_text(path: &Path, key: i64, text: &str, at: DateTime<Utc>) {
    let conn = Connection::open(path).unwrap();
    let nanos = (at.timestamp() - APPLE_EPOCH_OFFSET) * 1_000_000_000;
    conn.execute(
        "INSERT INTO message (ROWID, text, date, handle_id, is_from_me, is_read)
         VALUES (?1, ?2, ?3, 1, 0, 0)",
        params![key, text, nanos],
    )
    .unwrap();
}

struct FixedCalendar(Vec<CalendarEvent>);

#[async_trait]
impl CalendarLookup for FixedCalendar {
    async fn events_between(
        &self,
        _start: DateTime<Utc>,
        _end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>, CalendarError> {
        Ok(self.0.clone())
    }
}

struct FailingGenerator;

#[async_trait]
impl ResponseGenerator for FailingGenerator {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn generate(&self, _request: &ReplyRequest<'_>) -> Result<String, ComposeError> {
        Err(ComposeError::RequestFailed("connection refused".into()))
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, contact: &str, text: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((contact.to_string(), text.to_string()));
        Ok(())
    }
}

struct Harness {
    dir: TempDir,
    calls: PathBuf,
    messages: PathBuf,
    whitelist: Arc<WhitelistStore>,
    dnd: DndSwitch,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let calls = dir.path().join("CallHistory.storedata");
        let messages = dir.path().join("chat.db");
        create_call_db(&calls);
        create_message_db(&messages);

        let whitelist = WhitelistStore::init(dir.path().join("whitelist.json")).unwrap();
        whitelist.add(MOM, None).unwrap();

        Self {
            dir,
            calls,
            messages,
            whitelist: Arc::new(whitelist),
            dnd: DndSwitch::new(true),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    fn markers_path(&self) -> PathBuf {
        self.dir.path().join("markers.json")
    }

    fn watcher(&self, events: Vec<CalendarEvent>, composer: ResponseComposer) -> Watcher {
        let dispatcher = Dispatcher::new(
            Arc::new(FixedCalendar(events)),
            Arc::new(composer),
            self.notifier.clone(),
        );
        Watcher::new(
            dispatcher,
            self.dnd.clone(),
            Arc::clone(&self.whitelist),
            MarkerStore::load(self.markers_path()).unwrap(),
        )
        .with_source(Arc::new(CallHistorySource::new(&self.calls)))
        .with_source(Arc::new(MessageHistorySource::new(&self.messages)))
    }
}

fn dinner() -> CalendarEvent {
    // 16:00-17:30 EST
    CalendarEvent::new(
        "Dinner",
        Utc.with_ymd_and_hms(2024, 3, 1, 21, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 3, 1, 22, 30, 0).unwrap(),
    )
}

#[tokio::test]
async fn test_missed_call_during_event_mentions_end_time() {
    let h = Harness::new();
    let mut watcher = h.watcher(vec![dinner()], ResponseComposer::new(persona()));
    watcher.poll_at(now()).await;

    insert_missed_call(&h.calls, 1, "+1 (555) 123-4567", now() - chrono::Duration::seconds(20));
    let processed = watcher.poll_at(now()).await;

    assert_eq!(processed.len(), 1);
    assert!(processed[0].outcome.is_sent());

    let sent = h.notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "+1 (555) 123-4567");
    assert!(sent[0].1.contains("05:30PM EST"), "reply was: {}", sent[0].1);
    assert!(sent[0].1.ends_with("- TomasBot"));
}

#[tokio::test]
async fn test_missed_call_without_event_gets_exact_template() {
    let h = Harness::new();
    let mut watcher = h.watcher(Vec::new(), ResponseComposer::new(persona()));
    watcher.poll_at(now()).await;

    insert_missed_call(&h.calls, 1, MOM, now() - chrono::Duration::seconds(20));
    watcher.poll_at(now()).await;

    assert_eq!(
        h.notifier.sent(),
        vec![(
            MOM.to_string(),
            "Tomas is currently unavailable and will get back to you soon! - TomasBot".to_string()
        )]
    );
}

#[tokio::test]
async fn test_generation_failure_falls_back_to_template() {
    let h = Harness::new();
    let composer = ResponseComposer::new(persona()).with_generator(Arc::new(FailingGenerator));
    let mut watcher = h.watcher(vec![dinner()], composer);
    watcher.poll_at(now()).await;

    insert_unread_text(&h.messages, 7, "call me", now() - chrono::Duration::seconds(5));
    let processed = watcher.poll_at(now()).await;

    assert_eq!(processed[0].event.source, SourceKind::Text);
    assert_eq!(
        processed[0].outcome,
        DispatchOutcome::Sent {
            source: ReplySource::Fallback
        }
    );
    assert_eq!(
        h.notifier.sent()[0].1,
        "Tomas is currently at Dinner until 05:30PM EST... try calling them then! - TomasBot"
    );
}

#[tokio::test]
async fn test_history_before_startup_is_ignored() {
    let h = Harness::new();
    insert_missed_call(&h.calls, 1, MOM, now() - chrono::Duration::seconds(20));
    insert_unread_text(&h.messages, 3, "old", now() - chrono::Duration::seconds(20));

    let mut watcher = h.watcher(Vec::new(), ResponseComposer::new(persona()));
    assert!(watcher.poll_at(now()).await.is_empty());
    assert!(watcher.poll_at(now()).await.is_empty());

    assert_eq!(watcher.markers().get(SourceKind::Call), Some(1));
    assert_eq!(watcher.markers().get(SourceKind::Text), Some(3));
    assert!(h.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_persisted_marker_survives_restart() {
    let h = Harness::new();
    {
        let mut watcher = h.watcher(Vec::new(), ResponseComposer::new(persona()));
        watcher.poll_at(now()).await;
        insert_missed_call(&h.calls, 1, MOM, now() - chrono::Duration::seconds(20));
        assert_eq!(watcher.poll_at(now()).await.len(), 1);
    }

    let mut restarted = h.watcher(Vec::new(), ResponseComposer::new(persona()));
    assert!(restarted.poll_at(now()).await.is_empty());
    assert_eq!(h.notifier.sent().len(), 1);

    insert_missed_call(&h.calls, 2, MOM, now() - chrono::Duration::seconds(10));
    assert_eq!(restarted.poll_at(now()).await.len(), 1);
    assert_eq!(h.notifier.sent().len(), 2);
}

#[tokio::test]
async fn test_gates_on_dnd_and_whitelist() {
    let h = Harness::new();
    let mut watcher = h.watcher(Vec::new(), ResponseComposer::new(persona()));
    watcher.poll_at(now()).await;

    h.dnd.set(false);
    insert_missed_call(&h.calls, 1, MOM, now() - chrono::Duration::seconds(20));
    let processed = watcher.poll_at(now()).await;
    assert_eq!(processed[0].outcome, DispatchOutcome::SkippedDndOff);

    h.dnd.set(true);
    insert_missed_call(&h.calls, 2, "+15550001111", now() - chrono::Duration::seconds(20));
    let processed = watcher.poll_at(now()).await;
    assert_eq!(processed[0].outcome, DispatchOutcome::SkippedNotWhitelisted);

    h.whitelist.add("+1 555 000 1111", Some("Sam")).unwrap();
    insert_missed_call(&h.calls, 3, "+15550001111", now() - chrono::Duration::seconds(10));
    let processed = watcher.poll_at(now()).await;
    assert!(processed[0].outcome.is_sent());

    assert_eq!(h.notifier.sent().len(), 1);
}
