use std::collections::HashSet;

use super::models::{
    Task,
    TaskId,
};

/// Client-side task list, ascending by notification time with unique ids.
///
/// All mutation goes through `replace_all`, `apply_create` and
/// `apply_delete`, so the ordering and uniqueness hold after any sequence
/// of refreshes and pushed events.
#[derive(Debug, Default, Clone)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    /// Swaps in a freshly fetched list. Duplicate ids keep the first copy.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        let mut seen = HashSet::with_capacity(tasks.len());
        let mut fresh: Vec<Task> =
            tasks.into_iter().filter(|task| seen.insert(task.id.clone())).collect();

        // stable, so equal times keep server order
        fresh.sort_by_key(|task| task.notification_time);
        self.tasks = fresh;
    }

    /// Inserts a task unless its id is already present. Returns `true` on insert.
    pub fn apply_create(&mut self, task: Task) -> bool {
        if self.contains(&task.id) {
            return false;
        }

        let index =
            self.tasks.partition_point(|existing| existing.notification_time <= task.notification_time);
        self.tasks.insert(index, task);
        true
    }

    /// Removes the task with `id`. Returns `true` if something was removed.
    pub fn apply_delete(&mut self, id: &TaskId) -> bool {
        match self.tasks.iter().position(|task| &task.id == id) {
            Some(index) => {
                self.tasks.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &TaskId) -> bool {
        self.tasks.iter().any(|task| &task.id == id)
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| &task.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn ids(&self) -> impl Iterator<Item = &TaskId> {
        self.tasks.iter().map(|task| &task.id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{
        Duration,
        Utc,
    };

    use super::*;

    fn task(id: i64, minutes_from_now: i64) -> Task {
        Task {
            id: TaskId::from(id),
            title: format!("task {}", id),
            task_type: "Work".to_string(),
            notification_time: Utc::now() + Duration::minutes(minutes_from_now),
            reminder_text: "ping".to_string(),
            created_at: None,
        }
    }

    fn ids(store: &TaskStore) -> Vec<String> {
        store.ids().map(|id| id.to_string()).collect()
    }

    fn assert_sorted(store: &TaskStore) {
        assert!(store
            .tasks()
            .windows(2)
            .all(|pair| pair[0].notification_time <= pair[1].notification_time));
    }

    #[test]
    fn test_earlier_task_goes_first() {
        let mut store = TaskStore::new();
        assert!(store.apply_create(task(1, 60)));
        assert!(store.apply_create(task(2, 30)));
        assert_eq!(ids(&store), ["2", "1"]);
    }

    #[test]
    fn test_apply_create_is_idempotent() {
        let mut once = TaskStore::new();
        once.apply_create(task(1, 10));
        once.apply_create(task(2, 20));

        let mut twice = once.clone();
        let again = once.get(&TaskId::from(2)).cloned().unwrap();
        assert!(!twice.apply_create(again));
        assert_eq!(twice.tasks(), once.tasks());
    }

    #[test]
    fn test_duplicate_id_keeps_original_record() {
        let mut store = TaskStore::new();
        store.apply_create(task(1, 10));

        let mut changed = task(1, -10);
        changed.title = "changed".to_string();
        assert!(!store.apply_create(changed));
        assert_eq!(store.get(&TaskId::from(1)).unwrap().title, "task 1");
    }

    #[test]
    fn test_delete_missing_id_is_noop() {
        let mut store = TaskStore::new();
        store.apply_create(task(1, 10));
        let before = store.clone();

        assert!(!store.apply_delete(&TaskId::from(5)));
        assert_eq!(store.tasks(), before.tasks());

        assert!(store.apply_delete(&TaskId::from(1)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_mixed_sequence_stays_sorted() {
        let mut store = TaskStore::new();
        let offsets = [40, -5, 15, 15, 90, 0, -30, 15, 60, 5];
        for (index, offset) in offsets.iter().enumerate() {
            store.apply_create(task(index as i64, *offset));
            assert_sorted(&store);
            if index % 3 == 2 {
                store.apply_delete(&TaskId::from(index as i64 - 1));
                assert_sorted(&store);
            }
        }
        // re-applying everything must not grow the list
        let len = store.len();
        for (index, offset) in offsets.iter().enumerate() {
            if store.contains(&TaskId::from(index as i64)) {
                store.apply_create(task(index as i64, *offset));
            }
        }
        assert_eq!(store.len(), len);
        assert_sorted(&store);
    }

    #[test]
    fn test_replace_all_sorts_and_dedups() {
        let mut store = TaskStore::new();
        store.apply_create(task(99, 1));

        let mut duplicate = task(1, 5);
        duplicate.title = "second copy".to_string();
        store.replace_all(vec![task(1, 50), task(2, 10), duplicate, task(3, 20)]);

        assert_eq!(ids(&store), ["2", "3", "1"]);
        assert_eq!(store.get(&TaskId::from(1)).unwrap().title, "task 1");
        assert!(!store.contains(&TaskId::from(99)));
    }
}
