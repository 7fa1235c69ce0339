#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use course_sync::error::SyncError;
use course_sync::loader::{CourseTree, SchemaRegistry, load_course_tree};
use course_sync::sync::SyncCoordinator;
use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;

/// In-memory database with the schema applied. One connection, so every
/// query sees the same database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

pub fn coordinator(pool: &SqlitePool) -> SyncCoordinator {
    let registry = SchemaRegistry::new().expect("Failed to compile schemas");
    SyncCoordinator::new(pool.clone(), Arc::new(registry))
}

/// Deterministic v4-shaped UUID.
pub fn uuid(n: u32) -> String {
    format!("{n:08x}-0000-4000-8000-{n:012x}")
}

pub async fn count(pool: &SqlitePool, sql: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(sql)
        .fetch_one(pool)
        .await
        .expect("Failed to count rows")
}

/// A course directory on disk.
pub struct CourseFixture {
    dir: TempDir,
}

impl CourseFixture {
    /// Course with topics "Algebra" and "Geometry" and the tag "hard".
    pub fn new() -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        };
        fixture.write_course(json!({
            "uuid": uuid(1),
            "name": "TEST 101",
            "title": "Test Course",
            "timezone": "America/Chicago",
            "topics": [
                { "name": "Algebra", "color": "blue1" },
                { "name": "Geometry", "color": "green1" }
            ],
            "tags": [{ "name": "hard", "color": "red1" }]
        }));
        fixture
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_course(&self, info: Value) {
        write_json(&self.path().join("infoCourse.json"), &info);
    }

    pub fn question(&self, qid: &str, uuid: &str, extra: Value) {
        let mut info = json!({
            "uuid": uuid,
            "type": "v3",
            "title": format!("Question {qid}"),
            "topic": "Algebra"
        });
        merge(&mut info, extra);
        write_json(&self.path().join("questions").join(qid).join("info.json"), &info);
    }

    pub fn course_instance(&self, ciid: &str, info: Value) {
        write_json(
            &self.instance_dir(ciid).join("infoCourseInstance.json"),
            &info,
        );
    }

    pub fn assessment(&self, ciid: &str, tid: &str, info: Value) {
        write_json(
            &self
                .instance_dir(ciid)
                .join("assessments")
                .join(tid)
                .join("infoAssessment.json"),
            &info,
        );
    }

    pub fn remove(&self, relative: &str) {
        fs::remove_dir_all(self.path().join(relative)).expect("Failed to remove directory");
    }

    pub fn rename(&self, from: &str, to: &str) {
        fs::rename(self.path().join(from), self.path().join(to))
            .expect("Failed to rename directory");
    }

    pub fn load(&self) -> Result<CourseTree, SyncError> {
        let registry = SchemaRegistry::new().expect("Failed to compile schemas");
        load_course_tree(self.path(), &registry)
    }

    fn instance_dir(&self, ciid: &str) -> PathBuf {
        self.path().join("courseInstances").join(ciid)
    }
}

pub fn homework(uuid: &str, number: &str, zones: Value) -> Value {
    json!({
        "uuid": uuid,
        "type": "Homework",
        "title": format!("Homework {number}"),
        "set": "Homework",
        "number": number,
        "zones": zones
    })
}

pub fn exam(uuid: &str, number: &str, zones: Value) -> Value {
    json!({
        "uuid": uuid,
        "type": "Exam",
        "title": format!("Exam {number}"),
        "set": "Exam",
        "number": number,
        "zones": zones
    })
}

fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create directory");
    }
    fs::write(path, serde_json::to_string_pretty(value).expect("Failed to serialize"))
        .expect("Failed to write file");
}

fn merge(target: &mut Value, extra: Value) {
    if let (Value::Object(target), Value::Object(extra)) = (target, extra) {
        for (key, value) in extra {
            target.insert(key, value);
        }
    }
}
