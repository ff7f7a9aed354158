//! End-to-end request and batch delivery against a scripted transport.

use std::collections::HashSet;
use std::sync::{Arc, Once};

use anyhow::Result;
use futures_util::future::join_all;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

use jsonrpc_batch_client::{
    BatchOutcome, ClassifiedError, Client, Delivery, Error, ErrorCode, Request, RequestId,
    ScriptedTransport, SequenceIdGenerator, TransportResponse,
};

// ============================================================================
// Helpers
// ============================================================================

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Success(Value),
    Exception(ClassifiedError),
    Complete,
}

type Events = Arc<Mutex<Vec<Event>>>;

fn client(transport: &Arc<ScriptedTransport>, start: u64) -> Client {
    init_tracing();
    Client::builder()
        .transport(Arc::<ScriptedTransport>::clone(transport))
        .id_generator(Arc::new(SequenceIdGenerator::starting_at(start)))
        .build()
        .expect("client")
}

fn record(request: Request) -> (Request, Events) {
    let events: Events = Arc::default();
    let (a, b, c) = (Arc::clone(&events), Arc::clone(&events), Arc::clone(&events));
    let request = request
        .on_success(move |result| a.lock().push(Event::Success(result)))
        .on_exception(move |error| b.lock().push(Event::Exception(error)))
        .on_complete(move || c.lock().push(Event::Complete));
    (request, events)
}

fn events(events: &Events) -> Vec<Event> {
    events.lock().clone()
}

// ============================================================================
// Single Requests
// ============================================================================

#[tokio::test]
async fn single_success_delivers_result_then_complete() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::replying(TransportResponse::json(
        json!({"jsonrpc": "2.0", "result": 42, "id": 7}),
    )));
    let client = client(&transport, 7);
    let (request, log) = record(client.request("answer", None)?);

    let delivery = client.execute(request).await?;

    assert_eq!(delivery, Delivery::Success);
    assert_eq!(events(&log), vec![Event::Success(json!(42)), Event::Complete]);
    Ok(())
}

#[tokio::test]
async fn single_http_404_delivers_exception_then_complete() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::replying(TransportResponse::failure(
        404,
        "Not Found",
    )));
    let client = client(&transport, 1);
    let (request, log) = record(client.request("answer", None)?);

    client.execute(request).await?;

    assert_eq!(
        events(&log),
        vec![
            Event::Exception(ClassifiedError::new(404, "Not Found")),
            Event::Complete
        ]
    );
    Ok(())
}

#[tokio::test]
async fn notification_never_fires_callbacks_even_on_failure() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::replying(TransportResponse::failure(
        500,
        "Internal Server Error",
    )));
    let client = client(&transport, 1);
    let (request, log) = record(client.notify("log.write", Some(json!(["hello"])))?);

    client.execute(request).await?;

    assert!(events(&log).is_empty());
    Ok(())
}

#[tokio::test]
async fn single_malformed_reply_is_an_error() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::replying(TransportResponse::json(
        json!({"jsonrpc": "2.0", "id": 1}),
    )));
    let client = client(&transport, 1);
    let (request, log) = record(client.request("answer", None)?);

    let result = client.execute(request).await;

    assert!(matches!(result, Err(Error::MalformedResponse { .. })));
    assert!(events(&log).is_empty());
    Ok(())
}

// ============================================================================
// Batches
// ============================================================================

#[tokio::test]
async fn batch_with_notification_delivers_each_call() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::replying(TransportResponse::json(json!([
        {"jsonrpc": "2.0", "error": {"code": -32601, "message": "Method not found"}, "id": 2},
        {"jsonrpc": "2.0", "result": 3, "id": 1}
    ]))));
    let client = client(&transport, 1);

    let (add, add_log) = record(client.request("math.add", Some(json!([1, 2])))?);
    let (note, note_log) = record(client.notify("log.write", Some(json!(["x"])))?);
    let (nope, nope_log) = record(client.request("nope", None)?);

    let gate_codes = Arc::new(Mutex::new(Vec::new()));
    let gate_log = Arc::clone(&gate_codes);

    let mut batch = client.batch();
    batch.add_all([add, note, nope])?.on_exception(move |error| {
        gate_log.lock().push(error.code);
        true
    });

    let outcome = client.execute_batch(batch).await?;

    assert_eq!(
        outcome,
        BatchOutcome::Delivered {
            code: Some(ErrorCode::ItemError),
            count: 2
        }
    );
    assert_eq!(*gate_codes.lock(), vec![-32002]);
    assert_eq!(events(&add_log), vec![Event::Success(json!(3)), Event::Complete]);
    assert!(events(&note_log).is_empty());

    let nope_events = events(&nope_log);
    assert!(matches!(&nope_events[0], Event::Exception(error) if error.code == -32601));
    assert_eq!(nope_events[1], Event::Complete);

    let sent = transport.sent_json();
    assert_eq!(sent[0].as_array().map(Vec::len), Some(3));
    assert!(sent[0][1].get("id").is_none());
    Ok(())
}

#[tokio::test]
async fn batch_missing_reply_is_synthesized() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::replying(TransportResponse::json(json!([
        {"jsonrpc": "2.0", "result": "b", "id": 11},
        {"jsonrpc": "2.0", "result": "a", "id": 10}
    ]))));
    let client = client(&transport, 10);

    let (a, a_log) = record(client.request("a", None)?);
    let (b, b_log) = record(client.request("b", None)?);
    let (c, c_log) = record(client.request("c", None)?);

    let mut batch = client.batch();
    batch.add_all([a, b, c])?.on_exception(|error| {
        assert_eq!(error.kind(), ErrorCode::MissingResponse);
        true
    });

    let outcome = client.execute_batch(batch).await?;

    assert_eq!(outcome.error_code(), Some(ErrorCode::MissingResponse));
    assert_eq!(events(&a_log), vec![Event::Success(json!("a")), Event::Complete]);
    assert_eq!(events(&b_log), vec![Event::Success(json!("b")), Event::Complete]);

    let c_events = events(&c_log);
    let Event::Exception(error) = &c_events[0] else {
        panic!("expected synthesized exception, got {c_events:?}");
    };
    assert_eq!(error.code, -32001);
    assert_eq!(error.message_str(), Some("This request didn't get a response."));
    assert_eq!(c_events[1], Event::Complete);
    Ok(())
}

#[tokio::test]
async fn batch_gate_veto_suppresses_all_callbacks() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::replying(TransportResponse::json(json!([
        {"jsonrpc": "2.0", "result": 1, "id": 1}
    ]))));
    let client = client(&transport, 1);

    let (a, a_log) = record(client.request("a", None)?);
    let (b, b_log) = record(client.request("b", None)?);

    let mut batch = client.batch();
    batch.add_all([a, b])?.on_exception(|_| false);

    let outcome = client.execute_batch(batch).await?;

    assert_eq!(outcome, BatchOutcome::Vetoed(ErrorCode::MissingResponse));
    assert!(events(&a_log).is_empty());
    assert!(events(&b_log).is_empty());
    Ok(())
}

#[tokio::test]
async fn batch_parse_error_reaches_every_call() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::replying(TransportResponse::json(json!({
        "jsonrpc": "2.0",
        "error": {"code": -32700, "message": "Parse error"},
        "id": null
    }))));
    let client = client(&transport, 1);

    let (a, a_log) = record(client.request("a", None)?);
    let (b, b_log) = record(client.request("b", None)?);

    let mut batch = client.batch();
    batch.add_all([a, b])?.on_exception(|_| true);

    let outcome = client.execute_batch(batch).await?;
    assert_eq!(outcome.error_code(), Some(ErrorCode::Parse));

    for log in [a_log, b_log] {
        let log = events(&log);
        let Event::Exception(error) = &log[0] else {
            panic!("expected parse error, got {log:?}");
        };
        assert_eq!(error.kind(), ErrorCode::Parse);
        assert_eq!(error.message_str(), Some("Parse error occurred."));
        assert_eq!(log[1], Event::Complete);
    }
    Ok(())
}

#[tokio::test]
async fn batch_transport_failure_delivers_status() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::replying(TransportResponse::failure(
        502,
        "Bad Gateway",
    )));
    let client = client(&transport, 1);
    let (a, a_log) = record(client.request("a", None)?);

    let mut batch = client.batch();
    batch.add(a)?.on_exception(|_| true);

    client.execute_batch(batch).await?;

    let log = events(&a_log);
    let Event::Exception(error) = &log[0] else {
        panic!("expected exception, got {log:?}");
    };
    assert_eq!(error.code, 502);
    assert_eq!(error.message, json!({"id": 1, "message": "Http error occured."}));
    Ok(())
}

#[tokio::test]
async fn batch_of_notifications_with_empty_reply_is_silent() -> Result<()> {
    let transport = Arc::new(ScriptedTransport::replying(TransportResponse::empty()));
    let client = client(&transport, 1);

    let mut batch = client.batch();
    batch
        .add(client.notify("log.write", Some(json!(["a"])))?)?
        .add(client.notify("log.write", Some(json!(["b"])))?)?;

    let outcome = client.execute_batch(batch).await?;
    assert_eq!(outcome, BatchOutcome::Silent);
    Ok(())
}

// ============================================================================
// Ids
// ============================================================================

#[tokio::test]
async fn global_ids_unique_across_concurrent_tasks() -> Result<()> {
    let tasks = (0..16).map(|_| {
        tokio::spawn(async {
            (0..50)
                .map(|_| Request::call("ping", None).map(|request| request.id()))
                .collect::<Result<Vec<_>, _>>()
        })
    });

    let mut seen: HashSet<RequestId> = HashSet::new();
    for ids in join_all(tasks).await {
        for id in ids?? {
            let id = id.expect("calls carry ids");
            assert!(seen.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(seen.len(), 800);
    Ok(())
}
