mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{fresh_db, read, seed_repository, start, USER};
use infratree_core::db::share;
use infratree_core::handler::{bucket_handler, node_handler, repository_handler};
use infratree_core::model::entity::CheckConfig;
use infratree_core::{
    Action, CheckConfigExporter, DispatchError, ExportError, Handler, HandlerError, Loggers,
    ReadService, RegistryError, Request, ResultStatus, Section, ServiceError,
};
use rusqlite::{Connection, Transaction};

struct FailingExporter;

impl CheckConfigExporter for FailingExporter {
    fn export(
        &self,
        _tx: &Transaction<'_>,
        object_id: &str,
    ) -> Result<Vec<CheckConfig>, ExportError> {
        Err(ExportError::InvalidData(format!("cannot export {object_id}")))
    }
}

#[test]
fn run_fails_naming_statement_when_schema_is_missing() {
    let conn = Connection::open_in_memory().unwrap();
    let mut handler = repository_handler(4);
    handler.register(share(conn), Loggers::default());

    let err = handler.run().unwrap_err();

    match err {
        HandlerError::PrepareStatement { statement, .. } => {
            assert_eq!(statement, "repository_list");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn run_before_register_is_rejected() {
    let handler = node_handler(4);
    let err = handler.run().unwrap_err();
    assert!(matches!(err, HandlerError::NotRegistered(name) if name == "node_r"));
}

#[test]
fn exporter_failure_turns_show_into_server_error() {
    let conn = fresh_db();
    seed_repository(&conn, "r1", "core");
    let handler = repository_handler(4).with_exporter(Arc::new(FailingExporter));
    let handlers: Vec<Box<dyn Handler>> = vec![Box::new(handler)];
    let service = ReadService::start_with(handlers, share(conn), Loggers::default()).unwrap();

    let result = read(&service, Section::Repository, Action::Show, Some("r1"));

    assert_eq!(result.status, ResultStatus::ServerError);
    assert_eq!(result.code, 500);
    assert!(result.repositories.is_none());
    assert!(result.error.unwrap().contains("cannot export r1"));

    // The list path never exports and keeps working.
    let listed = read(&service, Section::Repository, Action::List, None);
    assert_eq!(listed.status, ResultStatus::Ok);
}

#[test]
fn every_request_gets_exactly_one_reply() {
    let conn = fresh_db();
    seed_repository(&conn, "r1", "core");
    let service = start(conn);

    let mut receivers = Vec::new();
    for index in 0..24 {
        let (request, receiver) = match index % 3 {
            0 => Request::new(Section::Repository, Action::List, USER),
            1 => {
                let (request, receiver) = Request::new(Section::Repository, Action::Show, USER);
                (request.with_object_id("r1"), receiver)
            }
            _ => {
                let (request, receiver) = Request::new(Section::Repository, Action::Show, USER);
                (request.with_object_id("missing"), receiver)
            }
        };
        service.dispatcher().dispatch(request).unwrap();
        receivers.push((index, receiver));
    }

    for (index, receiver) in receivers {
        let result = receiver.recv_timeout(Duration::from_secs(10)).unwrap();
        let expected = if index % 3 == 2 {
            ResultStatus::NotFound
        } else {
            ResultStatus::Ok
        };
        assert_eq!(result.status, expected);
        // The worker dropped the request; no second result can follow.
        assert!(receiver.recv_timeout(Duration::from_secs(10)).is_err());
    }
}

#[test]
fn unrouted_write_action_is_answered_as_unknown_request() {
    let service = start(fresh_db());
    let (request, receiver) = Request::new(Section::Bucket, Action::Add, USER);

    let err = service.dispatcher().dispatch(request).unwrap_err();
    assert!(matches!(err, DispatchError::Unrouted { .. }));

    let result = receiver.recv().unwrap();
    assert_eq!(result.status, ResultStatus::UnknownRequest);
    assert_eq!(result.code, 400);
    assert_eq!(
        result.error.as_deref(),
        Some("unknown requested action: bucket/add")
    );
}

#[test]
fn handler_answers_unserviced_action_as_unknown_request() {
    let handler = repository_handler(4);
    let intake = handler.intake();
    let handlers: Vec<Box<dyn Handler>> = vec![Box::new(handler)];
    let service = ReadService::start_with(handlers, share(fresh_db()), Loggers::default()).unwrap();

    let (request, receiver) = Request::new(Section::Repository, Action::MemberList, USER);
    intake.send(request.with_object_id("r1")).unwrap();
    let result = receiver.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(result.status, ResultStatus::UnknownRequest);
    assert!(result.repositories.is_none());

    let (request, receiver) = Request::new(Section::Bucket, Action::List, USER);
    intake.send(request).unwrap();
    let result = receiver.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(result.status, ResultStatus::UnknownRequest);
    assert_eq!(result.section, Section::Bucket);

    service.shutdown().unwrap();
}

#[test]
fn duplicate_route_aborts_startup() {
    let handlers: Vec<Box<dyn Handler>> = vec![
        Box::new(bucket_handler(4)),
        Box::new(bucket_handler(4)),
    ];

    let err = match ReadService::start_with(handlers, share(fresh_db()), Loggers::default()) {
        Ok(_) => panic!("duplicate routes must be rejected"),
        Err(err) => err,
    };

    match err {
        ServiceError::Registry(RegistryError::Duplicate {
            section, existing, ..
        }) => {
            assert_eq!(section, Section::Bucket);
            assert_eq!(existing, "bucket_r");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn service_registers_all_read_routes() {
    let service = start(fresh_db());
    let map = service.dispatcher().handler_map();

    assert_eq!(map.get(Section::Repository, Action::Search), Some("repository_r"));
    assert_eq!(map.get(Section::Group, Action::MemberList), Some("group_r"));
    assert_eq!(map.get(Section::Node, Action::MemberList), None);
    assert!(map.get(Section::Cluster, Action::List).unwrap().ends_with("_r"));
    // 3 + 3 + 4 + 4 + 3 actions across the five handlers.
    assert_eq!(map.len(), 17);
    assert_eq!(service.handler_names().len(), 5);
}

#[test]
fn shutdown_stops_intake() {
    let service = start(fresh_db());
    let dispatcher = service.dispatcher().clone();

    service.shutdown().unwrap();

    let (request, receiver) = Request::new(Section::Repository, Action::List, USER);
    let err = dispatcher.dispatch(request).unwrap_err();
    assert!(matches!(err, DispatchError::HandlerStopped(name) if name == "repository_r"));
    let result = receiver.recv().unwrap();
    assert_eq!(result.status, ResultStatus::ServerError);
}
