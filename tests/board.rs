use chrono::{TimeZone, Utc};
use family_tasks::api::create_router;
use family_tasks::client::{Board, BoardSource, ClientError, RpcClient, TaskFilter};
use family_tasks_core::models::*;
use family_tasks_core::Database;

// Nothing listens on the discard port.
const UNREACHABLE: &str = "http://127.0.0.1:9";

async fn offline_board() -> Board {
    let client = RpcClient::new(UNREACHABLE).expect("Failed to build client");
    Board::load(client).await
}

fn setup_db() -> Database {
    let db = Database::open_memory().expect("Failed to create test database");
    db.migrate().expect("Failed to migrate test database");
    db
}

async fn spawn_server() -> RpcClient {
    spawn_server_on(setup_db()).await
}

async fn spawn_server_on(db: Database) -> RpcClient {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_router(db)).await.unwrap();
    });

    RpcClient::new(format!("http://{}", addr)).expect("Failed to build client")
}

#[tokio::test]
async fn unreachable_server_falls_back_to_demo_data() {
    let board = offline_board().await;

    assert_eq!(board.source(), BoardSource::Demo);
    assert_eq!(board.members().len(), 4);
    assert_eq!(board.categories().len(), 4);
    assert_eq!(board.tasks().len(), 5);
    assert_eq!(board.members()[3].name, "Bob");
    assert_eq!(board.members()[3].email, None);
}

#[tokio::test]
async fn demo_stats_count_overdue_open_tasks() {
    let board = offline_board().await;
    let now = Utc.with_ymd_and_hms(2024, 12, 23, 12, 0, 0).unwrap();

    let stats = board.stats(now);
    assert_eq!(stats.total, 5);
    assert_eq!(stats.completed, 1);
    // homework (due 12-22) and vacuuming (due 12-21)
    assert_eq!(stats.overdue, 2);

    let summary = board.summary(now);
    assert!(summary.starts_with("Family tasks (demo)"));
    assert!(summary.contains("[x] #2 Buy groceries (Dad, Shopping) due 2024-12-24"));
    assert!(summary.contains("5 tasks, 1 completed, 2 overdue"));
}

#[tokio::test]
async fn filters_combine() {
    let board = offline_board().await;

    let moms = board.filter_tasks(&TaskFilter {
        assignee: Some(1),
        ..Default::default()
    });
    let titles: Vec<_> = moms.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Clean the kitchen", "Vacuum living room"]);

    let done = board.filter_tasks(&TaskFilter {
        status: Some(TaskState::Completed),
        ..Default::default()
    });
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].title, "Buy groceries");

    let none = board.filter_tasks(&TaskFilter {
        status: Some(TaskState::Completed),
        assignee: Some(1),
        category: None,
    });
    assert!(none.is_empty());

    let school = board.filter_tasks(&TaskFilter {
        category: Some(3),
        ..Default::default()
    });
    assert_eq!(school.len(), 1);
}

#[tokio::test]
async fn names_fall_back_for_missing_references() {
    let board = offline_board().await;

    assert_eq!(board.member_name(Some(1)), "Mom");
    assert_eq!(board.member_name(None), "Unassigned");
    assert_eq!(board.member_name(Some(99)), "Unknown");
    assert_eq!(board.category_name(Some(2)), "Shopping");
    assert_eq!(board.category_name(None), "No Category");
    assert_eq!(board.category_name(Some(99)), "Unknown");
    assert_eq!(board.category_color(Some(1)), "#10b981");
    assert_eq!(board.category_color(None), "#64748b");
}

#[tokio::test]
async fn offline_mutations_apply_locally() {
    let mut board = offline_board().await;

    let task = board
        .create_task(CreateTaskInput {
            assigned_to: Some(4),
            ..CreateTaskInput::titled("Feed the cat")
        })
        .await
        .unwrap();
    assert_eq!(task.id, 6);
    assert!(!task.is_completed);
    assert_eq!(board.tasks().len(), 6);

    let toggled = board.toggle_task(task.id, true).await.unwrap();
    assert!(toggled.is_completed);
    assert!(toggled.updated_at >= task.updated_at);

    let mut patch = UpdateTaskInput::new(task.id);
    patch.title = Patch::Value("Feed the cats".into());
    let updated = board.update_task(patch).await.unwrap();
    assert_eq!(updated.title, "Feed the cats");
    assert_eq!(updated.assigned_to, Some(4));

    board.delete_family_member(4).await.unwrap();
    assert_eq!(board.members().len(), 3);
    assert!(board.tasks().iter().all(|t| t.assigned_to != Some(4)));

    board.delete_category(1).await.unwrap();
    assert!(board.tasks().iter().all(|t| t.category_id != Some(1)));

    let result = board.delete_task(task.id).await.unwrap();
    assert!(result.success);
    assert_eq!(board.tasks().len(), 5);
}

#[tokio::test]
async fn offline_mutations_still_validate() {
    let mut board = offline_board().await;

    let err = board
        .create_task(CreateTaskInput::titled(""))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Local(_)));

    let err = board.toggle_task(999, true).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
    assert_eq!(board.tasks().len(), 5);
}

#[tokio::test]
async fn remote_board_round_trips_through_the_server() {
    let client = spawn_server().await;
    assert_eq!(client.healthcheck().await.unwrap().status, "ok");

    let mut board = Board::load(client.clone()).await;
    assert_eq!(board.source(), BoardSource::Remote);
    assert!(board.tasks().is_empty());

    let mom = board
        .create_family_member(CreateFamilyMemberInput {
            name: "Mom".into(),
            email: Some("mom@family.com".into()),
            avatar_url: None,
        })
        .await
        .unwrap();
    let task = board
        .create_task(CreateTaskInput {
            assigned_to: Some(mom.id),
            ..CreateTaskInput::titled("Clean the kitchen")
        })
        .await
        .unwrap();
    board.toggle_task(task.id, true).await.unwrap();

    let stored = client.get_tasks().await.unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].is_completed);
    assert_eq!(stored[0].assigned_to, Some(mom.id));
    assert_eq!(board.tasks(), stored.as_slice());

    board.delete_family_member(mom.id).await.unwrap();
    assert_eq!(client.get_tasks().await.unwrap()[0].assigned_to, None);
    assert_eq!(board.tasks()[0].assigned_to, None);
    assert_eq!(board.source(), BoardSource::Remote);
}

#[tokio::test]
async fn server_rejections_fall_through_to_local_checks() {
    let client = spawn_server().await;
    let mut board = Board::load(client).await;

    let err = board
        .update_task(UpdateTaskInput::new(999))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Local(_)));
    assert_eq!(err.to_string(), "task with id 999 not found");

    let err = board
        .create_task(CreateTaskInput {
            assigned_to: Some(42),
            ..CreateTaskInput::titled("Walk the dog")
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Local(_)));

    // the server answered, so the board keeps talking to it
    assert_eq!(board.source(), BoardSource::Remote);
    assert!(board.tasks().is_empty());
}

fn run_sql(db: &Database, sql: &str) {
    db.with_connection(|conn| Ok(conn.execute_batch(sql)?))
        .expect("Failed to run SQL");
}

#[tokio::test]
async fn store_failure_applied_locally_stops_using_the_server() {
    let db = setup_db();
    let mut board = Board::load(spawn_server_on(db.clone()).await).await;
    assert_eq!(board.source(), BoardSource::Remote);

    run_sql(&db, "ALTER TABLE tasks RENAME TO tasks_away;");
    let local = board
        .create_task(CreateTaskInput::titled("Clean the kitchen"))
        .await
        .unwrap();
    assert_eq!(local.id, 1);
    assert_eq!(board.source(), BoardSource::Demo);

    run_sql(&db, "ALTER TABLE tasks_away RENAME TO tasks;");
    let next = board
        .create_task(CreateTaskInput::titled("Buy groceries"))
        .await
        .unwrap();

    let mut ids: Vec<i64> = board.tasks().iter().map(|t| t.id).collect();
    ids.dedup();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(next.id, 2);
    assert!(db.get_tasks().unwrap().is_empty());
}
