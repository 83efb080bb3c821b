use futures::StreamExt;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tasklist_core::{
    AddTask, DeleteTask, GetTasks, SqliteTaskStore, StoreError, Task, TaskRepository,
    TaskStream, TaskUseCases, UpdateTask,
};

const WAIT: Duration = Duration::from_secs(5);

fn repository() -> TaskRepository<SqliteTaskStore> {
    TaskRepository::new(Arc::new(SqliteTaskStore::open_in_memory().unwrap()))
}

async fn next_tasks(stream: &mut TaskStream) -> Vec<Task> {
    tokio::time::timeout(WAIT, stream.next())
        .await
        .expect("snapshot should arrive in time")
        .expect("stream should not end")
        .expect("snapshot should load")
}

#[tokio::test]
async fn records_map_to_domain_tasks() {
    let repo = repository();
    let mut task = Task::new("Buy milk");
    repo.add(&task).await.unwrap();
    task = task.toggled();
    repo.update(&task).await.unwrap();

    let mut stream = repo.tasks();
    let tasks = next_tasks(&mut stream).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task.id);
    assert_eq!(tasks[0].text, "Buy milk");
    assert!(tasks[0].completed);
}

#[tokio::test]
async fn store_errors_pass_through_unchanged() {
    let repo = repository();
    let task = Task::new("only once");
    repo.add(&task).await.unwrap();

    let conflict = repo.add(&task).await.unwrap_err();
    assert!(matches!(conflict, StoreError::Conflict(id) if id == task.id));

    let missing = Task::new("never added");
    let not_found = repo.update(&missing).await.unwrap_err();
    assert!(matches!(not_found, StoreError::NotFound(id) if id == missing.id));

    repo.delete(&missing).await.unwrap();
}

#[tokio::test]
async fn settled_list_matches_applied_operations() {
    let repo = repository();
    let use_cases = TaskUseCases::from_repository(&repo);
    let mut expected: BTreeMap<i64, Task> = BTreeMap::new();

    let tasks: Vec<Task> = (0..6).map(|n| Task::new(format!("task {n}"))).collect();
    for task in &tasks {
        use_cases.add_task.add_task(task.clone()).await.unwrap();
        expected.insert(task.id, task.clone());
    }
    for task in tasks.iter().step_by(2) {
        let toggled = task.toggled();
        use_cases.update_task.update_task(toggled.clone()).await.unwrap();
        expected.insert(toggled.id, toggled);
    }
    let toggled_again = expected[&tasks[2].id].toggled();
    use_cases
        .update_task
        .update_task(toggled_again.clone())
        .await
        .unwrap();
    expected.insert(toggled_again.id, toggled_again);
    for task in [&tasks[1], &tasks[4]] {
        use_cases.delete_task.delete_task(task.clone()).await.unwrap();
        expected.remove(&task.id);
    }

    let mut stream = use_cases.get_tasks.get_tasks();
    let settled = next_tasks(&mut stream).await;
    assert_eq!(settled, expected.into_values().collect::<Vec<_>>());
}

#[tokio::test]
async fn double_toggle_restores_completion() {
    let repo = repository();
    let task = Task::new("stretch");
    repo.add(&task).await.unwrap();

    let once = task.toggled();
    repo.update(&once).await.unwrap();
    let twice = once.toggled();
    repo.update(&twice).await.unwrap();

    let mut stream = repo.tasks();
    assert_eq!(next_tasks(&mut stream).await, vec![task]);
}
