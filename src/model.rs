// In-memory task list mirrored to a PersistenceStore

use crate::filter::Filter;
use crate::storage::Storage;
use crate::store::PersistenceStore;
use crate::task::{Task, now_ms};
use eyre::Result;
use tracing::debug;

/// Ordered collection of tasks, the authoritative cache of the stored slot.
///
/// Every mutating operation writes the whole collection back before it
/// returns, so the stored state always equals the in-memory state. Insertion
/// order is display order.
pub struct TaskList<S: Storage> {
    tasks: Vec<Task>,
    store: PersistenceStore<S>,
}

impl<S: Storage> TaskList<S> {
    /// Build the list from whatever the store currently holds
    pub fn new(store: PersistenceStore<S>) -> Self {
        let tasks = store.load();
        Self { tasks, store }
    }

    /// Append a new incomplete task and commit.
    ///
    /// The title and deadline input are taken as given; an unparseable
    /// deadline is stored as `None`.
    pub fn add(&mut self, title: impl Into<String>, deadline_input: &str) -> Result<&Task> {
        let task = Task::new(title, deadline_input);
        debug!(id = %task.id, deadline = ?task.deadline, "add: appending task");
        self.tasks.push(task);
        self.commit()?;

        let index = self.tasks.len() - 1;
        Ok(&self.tasks[index])
    }

    /// Flip completion of the task with `id`. Unknown ids are ignored.
    pub fn toggle(&mut self, id: &str) -> Result<()> {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            debug!(id, "toggle: no such task");
            return Ok(());
        };

        task.completed = !task.completed;
        task.completed_at = if task.completed { Some(now_ms()) } else { None };
        debug!(id, completed = task.completed, "toggle: flipped task");

        self.commit()
    }

    /// Remove every task with `id`, then commit even if nothing matched
    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        debug!(id, removed = before - self.tasks.len(), "delete: rebuilt list");

        self.commit()
    }

    /// Tasks selected by `filter`, in insertion order
    pub fn get_filtered(&self, filter: impl Into<Filter>) -> Vec<&Task> {
        let filter = filter.into();
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn store(&self) -> &PersistenceStore<S> {
        &self.store
    }

    fn commit(&mut self) -> Result<()> {
        self.store.save(&self.tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use crate::store::STORAGE_KEY;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn empty_list() -> TaskList<MemoryStorage> {
        TaskList::new(PersistenceStore::new(MemoryStorage::new()))
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    fn assert_mirrored<S: Storage>(list: &TaskList<S>) {
        assert_eq!(list.store().load(), list.tasks());
    }

    #[test]
    fn test_new_loads_existing_tasks() {
        let mut store = PersistenceStore::new(MemoryStorage::new());
        let task = Task::new("Existing", "2099-01-01");
        store.save(std::slice::from_ref(&task)).unwrap();

        let list = TaskList::new(store);
        assert_eq!(list.tasks(), &[task]);
    }

    #[test]
    fn test_new_with_corrupt_store_starts_empty() {
        let mut storage = MemoryStorage::new();
        storage.set_item(STORAGE_KEY, "not json").unwrap();

        let list = TaskList::new(PersistenceStore::new(storage));
        assert!(list.is_empty());
    }

    #[test]
    fn test_add_appends_incomplete_task() {
        let mut list = empty_list();
        let id = list.add("Buy milk", "2099-01-01T00:00").unwrap().id.clone();

        let all = list.get_filtered("all");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, id);
        assert_eq!(all[0].title, "Buy milk");
        assert!(!all[0].completed);
        assert!(all[0].completed_at.is_none());
        assert_mirrored(&list);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut list = empty_list();
        let a = list.add("a", "2099-01-01").unwrap().id.clone();
        let b = list.add("b", "2099-01-01").unwrap().id.clone();
        let c = list.add("c", "2099-01-01").unwrap().id.clone();

        assert_eq!(ids(&list.get_filtered(Filter::All)), vec![a, b, c]);
    }

    #[test]
    fn test_add_does_not_validate() {
        let mut list = empty_list();
        let task = list.add("", "not a date").unwrap();
        assert_eq!(task.title, "");
        assert!(task.deadline.is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_toggle_sets_and_clears_completed_at() {
        let mut list = empty_list();
        let id = list.add("Toggle me", "2099-01-01").unwrap().id.clone();

        list.toggle(&id).unwrap();
        let task = list.get(&id).unwrap();
        assert!(task.completed);
        let completed_at = task.completed_at.unwrap();
        assert!(completed_at >= task.created_at);
        assert_mirrored(&list);

        list.toggle(&id).unwrap();
        let task = list.get(&id).unwrap();
        assert!(!task.completed);
        assert!(task.completed_at.is_none());
        assert_mirrored(&list);
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let mut list = empty_list();
        list.add("Keep", "2099-01-01").unwrap();
        let before = list.tasks().to_vec();

        list.toggle("missing").unwrap();
        assert_eq!(list.tasks(), before.as_slice());
        assert_mirrored(&list);
    }

    #[test]
    fn test_delete_removes_only_matching_and_keeps_order() {
        let mut list = empty_list();
        let a = list.add("a", "2099-01-01").unwrap().id.clone();
        let b = list.add("b", "2099-01-01").unwrap().id.clone();
        let c = list.add("c", "2099-01-01").unwrap().id.clone();

        list.delete(&b).unwrap();
        assert_eq!(ids(&list.get_filtered("all")), vec![a, c]);
        assert_mirrored(&list);
    }

    #[test]
    fn test_delete_unknown_id_still_commits() {
        let mut list = empty_list();
        list.add("a", "2099-01-01").unwrap();

        // Clobber the slot behind the list's back; delete must rewrite it
        let mut storage = MemoryStorage::new();
        storage.set_item(STORAGE_KEY, "[]").unwrap();
        let mut stale = TaskList {
            tasks: list.tasks().to_vec(),
            store: PersistenceStore::new(storage),
        };
        assert!(stale.store().load().is_empty());

        stale.delete("missing").unwrap();
        assert_eq!(stale.len(), 1);
        assert_mirrored(&stale);
    }

    #[test]
    fn test_get_filtered_partitions_all() {
        let mut list = empty_list();
        for title in ["a", "b", "c", "d", "e"] {
            list.add(title, "2099-01-01").unwrap();
        }
        let b = list.tasks()[1].id.clone();
        let d = list.tasks()[3].id.clone();
        list.toggle(&b).unwrap();
        list.toggle(&d).unwrap();

        let all: HashSet<String> = ids(&list.get_filtered("all")).into_iter().collect();
        let active: HashSet<String> = ids(&list.get_filtered("active")).into_iter().collect();
        let completed: HashSet<String> = ids(&list.get_filtered("completed")).into_iter().collect();

        assert!(active.is_disjoint(&completed));
        assert_eq!(active.union(&completed).cloned().collect::<HashSet<_>>(), all);
        assert_eq!(completed, HashSet::from([b, d]));
    }

    #[test]
    fn test_get_filtered_preserves_order_within_filter() {
        let mut list = empty_list();
        let a = list.add("a", "2099-01-01").unwrap().id.clone();
        let b = list.add("b", "2099-01-01").unwrap().id.clone();
        let c = list.add("c", "2099-01-01").unwrap().id.clone();
        list.toggle(&b).unwrap();

        assert_eq!(ids(&list.get_filtered("active")), vec![a, c]);
        assert_eq!(ids(&list.get_filtered("completed")), vec![b]);
    }

    #[test]
    fn test_get_filtered_unknown_filter_is_all() {
        let mut list = empty_list();
        list.add("a", "2099-01-01").unwrap();
        let id = list.add("b", "2099-01-01").unwrap().id.clone();
        list.toggle(&id).unwrap();

        assert_eq!(list.get_filtered("bogus"), list.get_filtered("all"));
        assert_eq!(list.get_filtered("bogus").len(), 2);
    }

    #[test]
    fn test_get_filtered_is_idempotent() {
        let mut list = empty_list();
        list.add("a", "2099-01-01").unwrap();
        let id = list.add("b", "2099-01-01").unwrap().id.clone();
        list.toggle(&id).unwrap();

        for filter in ["all", "active", "completed"] {
            assert_eq!(list.get_filtered(filter), list.get_filtered(filter));
        }
    }

    #[test]
    fn test_buy_milk_scenario() {
        let mut list = empty_list();

        let id = list.add("Buy milk", "2099-01-01T00:00").unwrap().id.clone();
        let all = list.get_filtered("all");
        assert_eq!(all.len(), 1);
        assert!(!all[0].completed);

        list.toggle(&id).unwrap();
        let task = list.get(&id).unwrap();
        assert!(task.completed);
        assert!(task.completed_at.is_some());

        list.delete(&id).unwrap();
        assert!(list.get_filtered("all").is_empty());
        assert_mirrored(&list);
    }

    #[test]
    fn test_expired_scenario() {
        let mut list = empty_list();
        let id = list.add("Expired", "2000-01-01T00:00").unwrap().id.clone();
        assert!(list.get(&id).unwrap().is_overdue());

        list.toggle(&id).unwrap();
        assert!(!list.get(&id).unwrap().is_overdue());

        list.toggle(&id).unwrap();
        assert!(list.get(&id).unwrap().is_overdue());
    }

    #[test]
    fn test_mixed_operations_keep_store_mirrored() {
        let mut list = empty_list();
        let a = list.add("a", "2099-01-01").unwrap().id.clone();
        assert_mirrored(&list);
        let b = list.add("b", "2000-01-01").unwrap().id.clone();
        assert_mirrored(&list);
        list.toggle(&a).unwrap();
        assert_mirrored(&list);
        list.delete(&b).unwrap();
        assert_mirrored(&list);
        list.toggle(&a).unwrap();
        assert_mirrored(&list);
        list.delete(&a).unwrap();
        assert_mirrored(&list);
        assert!(list.is_empty());
    }

    #[test]
    fn test_reopen_from_file_storage() {
        let temp = TempDir::new().unwrap();
        let id = {
            let mut list = TaskList::new(PersistenceStore::new(FileStorage::open(temp.path()).unwrap()));
            let id = list.add("Survives restart", "2099-01-01").unwrap().id.clone();
            list.toggle(&id).unwrap();
            id
        };

        let list = TaskList::new(PersistenceStore::new(FileStorage::open(temp.path()).unwrap()));
        let task = list.get(&id).unwrap();
        assert_eq!(task.title, "Survives restart");
        assert!(task.completed);
    }
}
