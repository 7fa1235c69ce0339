mod common;

use common::{CourseFixture, count, coordinator, exam, homework, test_pool, uuid};
use course_sync::error::SyncError;
use serde_json::json;
use sqlx::SqlitePool;

fn course_with_questions() -> CourseFixture {
    let course = CourseFixture::new();
    for (i, qid) in ["q1", "q2", "q3", "q4"].iter().enumerate() {
        course.question(qid, &uuid(100 + i as u32), json!({}));
    }
    course.course_instance("Sp20", json!({ "uuid": uuid(200), "longName": "Spring 2020" }));
    course
}

async fn assessment_question(
    pool: &SqlitePool,
    tid: &str,
    qid: &str,
) -> (f64, Option<String>, Option<f64>, i64, i64) {
    sqlx::query_as(
        r#"
        SELECT aq.max_points, aq.points_list, aq.init_points, aq.number, aq.number_in_alternative_group
        FROM assessment_questions aq
        JOIN assessments a ON a.id = aq.assessment_id
        JOIN questions q ON q.id = aq.question_id
        WHERE a.tid = ? AND q.qid = ?
        "#,
    )
    .bind(tid)
    .bind(qid)
    .fetch_one(pool)
    .await
    .expect("Failed to fetch assessment question")
}

#[tokio::test]
async fn test_exam_points_list() {
    let pool = test_pool().await;
    let course = course_with_questions();
    course.assessment(
        "Sp20",
        "exam1",
        exam(&uuid(300), "1", json!([{ "questions": [
            { "id": "q1", "points": [10, 5, 1] },
            { "id": "q2", "points": 4 }
        ]}])),
    );

    coordinator(&pool).sync_course(course.path()).await.expect("Sync failed");

    let (max_points, points_list, init_points, number, _) =
        assessment_question(&pool, "exam1", "q1").await;
    assert_eq!(max_points, 10.0);
    let points: Vec<f64> =
        serde_json::from_str(&points_list.expect("Exam rows carry a points list")).unwrap();
    assert_eq!(points, vec![10.0, 5.0, 1.0]);
    assert_eq!(init_points, None);
    assert_eq!(number, 1);

    let (max_points, points_list, _, number, _) = assessment_question(&pool, "exam1", "q2").await;
    assert_eq!(max_points, 4.0);
    assert_eq!(
        serde_json::from_str::<Vec<f64>>(&points_list.unwrap()).unwrap(),
        vec![4.0]
    );
    assert_eq!(number, 2);
}

#[tokio::test]
async fn test_exam_rejects_max_points() {
    let pool = test_pool().await;
    let course = course_with_questions();
    course.assessment(
        "Sp20",
        "exam1",
        exam(&uuid(300), "1", json!([{ "questions": [
            { "id": "q1", "points": [10, 5, 1], "maxPoints": 10 }
        ]}])),
    );

    let err = coordinator(&pool).sync_course(course.path()).await.unwrap_err();
    assert!(matches!(err, SyncError::Structural { .. }));
    assert!(err.to_string().contains("maxPoints"));
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM assessments").await, 0);
}

#[tokio::test]
async fn test_homework_points() {
    let pool = test_pool().await;
    let course = course_with_questions();
    course.assessment(
        "Sp20",
        "hw1",
        homework(&uuid(300), "1", json!([{ "questions": [
            { "id": "q1", "points": 5 },
            { "id": "q2", "points": 1, "maxPoints": 3 }
        ]}])),
    );

    coordinator(&pool).sync_course(course.path()).await.expect("Sync failed");

    let (max_points, points_list, init_points, _, _) = assessment_question(&pool, "hw1", "q1").await;
    assert_eq!(max_points, 5.0);
    assert_eq!(init_points, Some(5.0));
    assert_eq!(points_list, None);

    let (max_points, _, init_points, _, _) = assessment_question(&pool, "hw1", "q2").await;
    assert_eq!(max_points, 3.0);
    assert_eq!(init_points, Some(1.0));
}

#[tokio::test]
async fn test_homework_rejects_points_list() {
    let pool = test_pool().await;
    let course = course_with_questions();
    course.assessment(
        "Sp20",
        "hw1",
        homework(&uuid(300), "1", json!([{ "questions": [{ "id": "q1", "points": [5, 3] }] }])),
    );

    let err = coordinator(&pool).sync_course(course.path()).await.unwrap_err();
    assert!(err.to_string().contains("as a list"));
}

#[tokio::test]
async fn test_id_and_alternatives_rejected_before_writes() {
    let pool = test_pool().await;
    let course = course_with_questions();
    course.assessment(
        "Sp20",
        "hw1",
        homework(&uuid(300), "1", json!([{ "questions": [
            { "id": "q1", "points": 1, "alternatives": [{ "id": "q2" }] }
        ]}])),
    );

    let err = coordinator(&pool).sync_course(course.path()).await.unwrap_err();
    assert!(matches!(err, SyncError::Structural { .. }));
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM assessments").await, 0);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM assessment_questions").await, 0);
}

#[tokio::test]
async fn test_alternative_groups_are_numbered_and_pruned() {
    let pool = test_pool().await;
    let course = course_with_questions();
    course.assessment(
        "Sp20",
        "hw1",
        homework(&uuid(300), "1", json!([
            { "title": "Warm-up", "questions": [{ "id": "q1", "points": 1 }] },
            { "title": "Main", "questions": [
                { "numberChoose": 1, "points": 2, "alternatives": [{ "id": "q2" }, { "id": "q3" }] },
                { "id": "q4", "points": 3 }
            ]}
        ])),
    );
    let sync = coordinator(&pool);
    sync.sync_course(course.path()).await.expect("Sync failed");

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM zones").await, 2);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM alternative_groups").await, 3);
    let (_, _, _, number, in_group) = assessment_question(&pool, "hw1", "q3").await;
    assert_eq!((number, in_group), (3, 2));
    let (_, _, _, number, in_group) = assessment_question(&pool, "hw1", "q4").await;
    assert_eq!((number, in_group), (4, 1));

    course.assessment(
        "Sp20",
        "hw1",
        homework(&uuid(300), "1", json!([
            { "title": "Warm-up", "questions": [{ "id": "q1", "points": 1 }] }
        ])),
    );
    sync.sync_course(course.path()).await.expect("Sync failed");

    assert_eq!(count(&pool, "SELECT COUNT(*) FROM zones").await, 1);
    assert_eq!(count(&pool, "SELECT COUNT(*) FROM alternative_groups").await, 1);
    assert_eq!(
        count(&pool, "SELECT COUNT(*) FROM assessment_questions WHERE deleted_at IS NOT NULL").await,
        3
    );
}

#[tokio::test]
async fn test_removed_access_rule_is_hard_deleted() {
    let pool = test_pool().await;
    let course = course_with_questions();
    let rules = json!([
        { "mode": "Public", "credit": 100, "startDate": "2020-01-01T00:00:01", "endDate": "2020-01-31T23:59:59" },
        { "mode": "Public", "credit": 50, "startDate": "2020-02-01", "endDate": "2020-02-28" },
        { "mode": "Public", "credit": 0 }
    ]);
    let mut info = homework(&uuid(300), "1", json!([{ "questions": [{ "id": "q1", "points": 1 }] }]));
    info["allowAccess"] = rules.clone();
    course.assessment("Sp20", "hw1", info.clone());

    let sync = coordinator(&pool);
    sync.sync_course(course.path()).await.expect("Sync failed");
    let before: Vec<(i64, i64)> =
        sqlx::query_as("SELECT id, number FROM assessment_access_rules ORDER BY number")
            .fetch_all(&pool)
            .await
            .expect("Failed to fetch rules");
    assert_eq!(before.len(), 3);

    let start: Option<String> =
        sqlx::query_scalar("SELECT start_date FROM assessment_access_rules WHERE number = 2")
            .fetch_one(&pool)
            .await
            .expect("Failed to fetch rule");
    assert_eq!(start.as_deref(), Some("2020-02-01T00:00:00"));

    info["allowAccess"] = json!([rules[0], rules[1]]);
    course.assessment("Sp20", "hw1", info);
    sync.sync_course(course.path()).await.expect("Sync failed");

    let after: Vec<(i64, i64)> =
        sqlx::query_as("SELECT id, number FROM assessment_access_rules ORDER BY number")
            .fetch_all(&pool)
            .await
            .expect("Failed to fetch rules");
    assert_eq!(after, before[..2].to_vec());
}

#[tokio::test]
async fn test_removed_assessment_is_soft_deleted() {
    let pool = test_pool().await;
    let course = course_with_questions();
    course.assessment(
        "Sp20",
        "hw1",
        homework(&uuid(300), "1", json!([{ "questions": [{ "id": "q1", "points": 1 }] }])),
    );
    course.assessment(
        "Sp20",
        "hw2",
        homework(&uuid(301), "2", json!([{ "questions": [{ "id": "q2", "points": 1 }] }])),
    );
    let sync = coordinator(&pool);
    sync.sync_course(course.path()).await.expect("Sync failed");

    course.remove("courseInstances/Sp20/assessments/hw2");
    let report = sync.sync_course(course.path()).await.expect("Sync failed");
    assert_eq!(report.assessments, 1);

    let rows: Vec<(String, Option<String>)> =
        sqlx::query_as("SELECT tid, deleted_at FROM assessments ORDER BY tid")
            .fetch_all(&pool)
            .await
            .expect("Failed to fetch assessments");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, "hw1");
    assert!(rows[0].1.is_none());
    assert_eq!(rows[1].0, "hw2");
    assert!(rows[1].1.is_some());

    assert_eq!(
        count(
            &pool,
            r#"
            SELECT COUNT(*) FROM assessment_questions aq
            JOIN assessments a ON a.id = aq.assessment_id
            WHERE a.tid = 'hw2' AND aq.deleted_at IS NOT NULL
            "#
        )
        .await,
        1
    );
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM zones z JOIN assessments a ON a.id = z.assessment_id WHERE a.tid = 'hw2'"
        )
        .await,
        0
    );
    assert_eq!(
        count(
            &pool,
            "SELECT COUNT(*) FROM assessment_questions aq JOIN assessments a ON a.id = aq.assessment_id WHERE a.tid = 'hw1' AND aq.deleted_at IS NULL"
        )
        .await,
        1
    );
}

#[tokio::test]
async fn test_assessments_are_ordered_by_number() {
    let pool = test_pool().await;
    let course = course_with_questions();
    for (tid, number, n) in [("final", "10", 300), ("hw2", "2", 301), ("hw1", "01", 302)] {
        course.assessment(
            "Sp20",
            tid,
            homework(&uuid(n), number, json!([{ "questions": [{ "id": "q1", "points": 1 }] }])),
        );
    }
    coordinator(&pool).sync_course(course.path()).await.expect("Sync failed");

    let order: Vec<String> = sqlx::query_scalar("SELECT tid FROM assessments ORDER BY order_by")
        .fetch_all(&pool)
        .await
        .expect("Failed to fetch assessments");
    assert_eq!(order, vec!["hw1", "hw2", "final"]);
}
