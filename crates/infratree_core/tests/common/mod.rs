#![allow(dead_code)]

use infratree_core::db::{open_db_in_memory, share, SharedConnection};
use infratree_core::{
    Action, ReadResult, ReadService, ReplyReceiver, Request, Section, ServiceConfig,
};
use rusqlite::{params, Connection};

pub const TEAM: &str = "team-ops";
pub const USER: &str = "alice";

/// Fresh in-memory database with one team.
pub fn fresh_db() -> Connection {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO teams (team_id, team_name) VALUES (?1, ?2);",
        params![TEAM, "Operations"],
    )
    .unwrap();
    conn
}

pub fn seed_repository(conn: &Connection, id: &str, name: &str) {
    conn.execute(
        "INSERT INTO repositories (repository_id, repository_name, team_id)
         VALUES (?1, ?2, ?3);",
        params![id, name, TEAM],
    )
    .unwrap();
}

pub fn seed_bucket(conn: &Connection, id: &str, name: &str, repository_id: &str) {
    conn.execute(
        "INSERT INTO buckets (bucket_id, bucket_name, repository_id, environment, team_id)
         VALUES (?1, ?2, ?3, 'production', ?4);",
        params![id, name, repository_id, TEAM],
    )
    .unwrap();
}

pub fn seed_group(conn: &Connection, id: &str, name: &str, bucket_id: &str) {
    conn.execute(
        "INSERT INTO object_groups (group_id, bucket_id, group_name, team_id)
         VALUES (?1, ?2, ?3, ?4);",
        params![id, bucket_id, name, TEAM],
    )
    .unwrap();
}

pub fn seed_cluster(conn: &Connection, id: &str, name: &str, bucket_id: &str) {
    conn.execute(
        "INSERT INTO clusters (cluster_id, cluster_name, bucket_id, team_id)
         VALUES (?1, ?2, ?3, ?4);",
        params![id, name, bucket_id, TEAM],
    )
    .unwrap();
}

pub fn seed_node(conn: &Connection, id: &str, asset_id: i64, name: &str) {
    conn.execute(
        "INSERT INTO nodes (node_id, node_asset_id, node_name, team_id, server_id)
         VALUES (?1, ?2, ?3, ?4, 'srv-1');",
        params![id, asset_id, name, TEAM],
    )
    .unwrap();
}

pub fn assign_node(conn: &Connection, node_id: &str, bucket_id: &str) {
    conn.execute(
        "INSERT INTO node_bucket_assignment (node_id, bucket_id, team_id)
         VALUES (?1, ?2, ?3);",
        params![node_id, bucket_id, TEAM],
    )
    .unwrap();
}

pub fn add_cluster_member(conn: &Connection, cluster_id: &str, node_id: &str, bucket_id: &str) {
    conn.execute(
        "INSERT INTO cluster_membership (cluster_id, node_id, bucket_id)
         VALUES (?1, ?2, ?3);",
        params![cluster_id, node_id, bucket_id],
    )
    .unwrap();
}

pub fn grant(conn: &Connection, id: &str, section: &str, action: &str, bucket_id: Option<&str>) {
    conn.execute(
        "INSERT INTO grants (grant_id, user_name, section, action, bucket_id)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![id, USER, section, action, bucket_id],
    )
    .unwrap();
}

pub fn seed_check_config(conn: &Connection, id: &str, repository_id: &str, object_id: &str) {
    conn.execute(
        "INSERT INTO check_configurations (
             configuration_id, configuration_name, check_interval, repository_id,
             capability_id, configuration_object, configuration_object_type
         ) VALUES (?1, ?2, 60, ?3, 'cap-ping', ?4, 'repository');",
        params![id, format!("check-{id}"), repository_id, object_id],
    )
    .unwrap();
}

pub fn start(conn: Connection) -> ReadService {
    start_shared(share(conn))
}

pub fn start_shared(conn: SharedConnection) -> ReadService {
    let config = ServiceConfig {
        inbox_depth: 8,
        ..ServiceConfig::default()
    };
    ReadService::start(&config, conn).unwrap()
}

pub fn call(service: &ReadService, request: Request, receiver: &ReplyReceiver) -> ReadResult {
    service.dispatcher().call(request, receiver).unwrap()
}

/// Sends a bare request for `section`/`action`, optionally addressing one object.
pub fn read(
    service: &ReadService,
    section: Section,
    action: Action,
    id: Option<&str>,
) -> ReadResult {
    let (request, receiver) = Request::new(section, action, USER);
    let request = match id {
        Some(id) => request.with_object_id(id),
        None => request,
    };
    call(service, request, &receiver)
}
