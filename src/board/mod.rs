//! # Task Board
//!
//! A [`Board`] owns one project's snapshot of groups and tasks together with
//! the local UI state layered over it: expand/collapse flags, the single
//! pending add and its draft, the row selection and the notices raised by
//! actions.
//!
//! Every mutating action goes through the [`Repository`] first and only
//! touches local state once the store confirms. Failures become error
//! notices and leave local state as it was, except for group deletion,
//! where local state drops exactly what the store confirmed removed.

mod delete;
mod draft;
mod notice;
mod selection;

#[cfg(test)]
pub(crate) mod testing;

pub use delete::{DeleteFailure, DeleteReport, DeleteTarget};
pub use draft::Draft;
pub use notice::{Notice, NoticeLevel};
pub use selection::Selection;

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    build_rows, validate_name, ExpandState, GroupForest, GroupId, HierarchyError, PendingAdd,
    ProjectId, Row, RowKey, Task, TaskGroup, TaskId, TaskPatch, ValidationError,
};
use crate::storage::{Repository, StoreError};

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Group not found: {0}")]
    GroupNotFound(GroupId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Nothing is being added")]
    NoPendingAdd,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Record created by [`Board::submit`]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Created {
    Group(TaskGroup),
    Task(Task),
}

impl Created {
    pub fn name(&self) -> &str {
        match self {
            Created::Group(group) => &group.name,
            Created::Task(task) => &task.name,
        }
    }
}

/// One project's board
pub struct Board<R> {
    repo: R,
    project: ProjectId,
    groups: Vec<TaskGroup>,
    tasks: Vec<Task>,
    expanded: ExpandState,

    /// Whether groups seen for the first time start expanded
    expand_new: bool,

    pending: Option<PendingAdd>,
    draft: Draft,
    selection: Selection,
    notices: Vec<Notice>,
}

impl<R: Repository> Board<R> {
    /// Loads a project's groups and tasks
    pub fn load(repo: R, project: ProjectId, expand_on_load: bool) -> Result<Self, BoardError> {
        let groups = repo.list_groups(project)?;
        let tasks = repo.list_tasks(project)?;

        let mut expanded = ExpandState::new();
        if expand_on_load {
            expanded.seed(groups.iter().map(|g| g.id));
        }

        Ok(Self {
            repo,
            project,
            groups,
            tasks,
            expanded,
            expand_new: expand_on_load,
            pending: None,
            draft: Draft::default(),
            selection: Selection::default(),
            notices: Vec::new(),
        })
    }

    /// Re-reads the project, keeping expand flags for groups that survive
    pub fn reload(&mut self) -> Result<(), BoardError> {
        let loaded = self
            .repo
            .list_groups(self.project)
            .and_then(|groups| Ok((groups, self.repo.list_tasks(self.project)?)));

        let (groups, tasks) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => return self.fail("Failed to load board", e),
        };

        if self.expand_new {
            let known: HashSet<GroupId> = self.groups.iter().map(|g| g.id).collect();
            self.expanded
                .seed(groups.iter().map(|g| g.id).filter(|id| !known.contains(id)));
        }

        self.groups = groups;
        self.tasks = tasks;
        self.prune();

        Ok(())
    }

    /// Display rows for the current state
    pub fn rows(&self) -> Vec<Row<'_>> {
        build_rows(&self.groups, &self.tasks, &self.expanded, self.pending.as_ref())
    }

    /// Position of a row in [`Board::rows`]
    pub fn row_index(&self, key: RowKey) -> Option<usize> {
        self.rows().iter().position(|row| row.key() == key)
    }

    pub fn project(&self) -> ProjectId {
        self.project
    }

    pub fn groups(&self) -> &[TaskGroup] {
        &self.groups
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn group(&self, id: GroupId) -> Option<&TaskGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    // Expand/collapse

    pub fn expanded(&self) -> &ExpandState {
        &self.expanded
    }

    /// Flips a group's expand flag, returning the new value
    pub fn toggle(&mut self, id: GroupId) -> bool {
        self.expanded.toggle(id)
    }

    pub fn set_expanded(&mut self, id: GroupId, expanded: bool) {
        self.expanded.set(id, expanded);
    }

    pub fn expand_all(&mut self) {
        self.expanded.seed(self.groups.iter().map(|g| g.id));
    }

    pub fn collapse_all(&mut self) {
        self.expand_all();
        self.expanded.collapse_all();
    }

    // Pending add

    pub fn pending(&self) -> Option<&PendingAdd> {
        self.pending.as_ref()
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    /// Starts adding a group under `parent`, or at the root
    pub fn begin_add_group(&mut self, parent: Option<GroupId>) -> Result<(), BoardError> {
        if let Some(parent) = parent {
            self.require_group(parent)?;
        }

        self.pending = Some(PendingAdd::Group { parent });
        self.draft.clear();
        Ok(())
    }

    /// Starts adding a task to `group`, expanding it so the add row shows
    pub fn begin_add_task(&mut self, group: GroupId) -> Result<(), BoardError> {
        self.require_group(group)?;

        self.expanded.set(group, true);
        self.pending = Some(PendingAdd::Task { group });
        self.draft.clear();
        Ok(())
    }

    pub fn cancel_add(&mut self) {
        self.pending = None;
        self.draft.clear();
    }

    /// Returns true if the pending add has a usable name
    pub fn can_save(&self) -> bool {
        self.pending.is_some() && self.draft.can_save()
    }

    /// Creates the pending item from the draft
    ///
    /// An invalid draft is refused before the store is called and stays in
    /// place for editing. Once the store has been called the slot is cleared
    /// whether or not the create succeeded.
    pub fn submit(&mut self) -> Result<Created, BoardError> {
        let Some(pending) = self.pending else {
            return self.fail("Cannot save", BoardError::NoPendingAdd);
        };
        let noun = pending.noun();

        let result = match pending {
            PendingAdd::Group { parent } => match self.draft.to_new_group(self.project, parent) {
                Ok(request) => self.repo.create_group(&request).map(Created::Group),
                Err(e) => return self.fail(&format!("Cannot create {}", noun), e),
            },
            PendingAdd::Task { group } => match self.draft.to_new_task(self.project, group) {
                Ok(request) => self.repo.create_task(&request).map(Created::Task),
                Err(e) => return self.fail(&format!("Cannot create {}", noun), e),
            },
        };

        self.cancel_add();

        match result {
            Ok(created) => {
                match &created {
                    Created::Group(group) => {
                        self.expanded.set(group.id, true);
                        self.groups.push(group.clone());
                    }
                    Created::Task(task) => self.tasks.push(task.clone()),
                }
                self.notices.push(Notice::success(format!(
                    "Created {} '{}'",
                    noun,
                    created.name()
                )));
                Ok(created)
            }
            Err(e) => self.fail(&format!("Failed to create {}", noun), e),
        }
    }

    // Edits

    pub fn rename_group(&mut self, id: GroupId, name: &str) -> Result<(), BoardError> {
        if let Err(e) = self.require_group(id) {
            return self.fail("Cannot rename group", e);
        }
        let name = match validate_name("Group", name) {
            Ok(name) => name,
            Err(e) => return self.fail("Cannot rename group", e),
        };

        match self.repo.rename_group(id, &name) {
            Ok(group) => {
                self.notices
                    .push(Notice::success(format!("Renamed group to '{}'", group.name)));
                self.replace_group(group);
                Ok(())
            }
            Err(e) => self.fail("Failed to rename group", e),
        }
    }

    pub fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> Result<(), BoardError> {
        let checked = match self.task(id) {
            Some(task) => patch.applied_to(task).map_err(BoardError::from),
            None => Err(BoardError::TaskNotFound(id)),
        };
        if let Err(e) = checked {
            return self.fail("Cannot update task", e);
        }

        match self.repo.update_task(id, patch) {
            Ok(task) => {
                self.notices
                    .push(Notice::success(format!("Updated task '{}'", task.name)));
                self.replace_task(task);
                Ok(())
            }
            Err(e) => self.fail("Failed to update task", e),
        }
    }

    /// Re-parents a group; `None` makes it a root
    pub fn move_group(&mut self, id: GroupId, parent: Option<GroupId>) -> Result<(), BoardError> {
        let checked = GroupForest::new(&self.groups, &self.tasks).check_move(id, parent);
        if let Err(e) = checked {
            return self.fail("Cannot move group", e);
        }

        match self.repo.move_group(id, parent) {
            Ok(group) => {
                if let Some(parent) = parent {
                    self.expanded.set(parent, true);
                }
                self.notices
                    .push(Notice::success(format!("Moved group '{}'", group.name)));
                self.replace_group(group);
                Ok(())
            }
            Err(e) => self.fail("Failed to move group", e),
        }
    }

    /// Moves a task into another group
    pub fn move_task(&mut self, id: TaskId, group: GroupId) -> Result<(), BoardError> {
        let checked = if self.task(id).is_none() {
            Err(BoardError::TaskNotFound(id))
        } else {
            self.require_group(group).map(|_| ())
        };
        if let Err(e) = checked {
            return self.fail("Cannot move task", e);
        }

        match self.repo.move_task(id, Some(group)) {
            Ok(task) => {
                self.expanded.set(group, true);
                self.notices
                    .push(Notice::success(format!("Moved task '{}'", task.name)));
                self.replace_task(task);
                Ok(())
            }
            Err(e) => self.fail("Failed to move task", e),
        }
    }

    // Deletion

    /// Deletes a group with every group and task below it
    ///
    /// Always returns the report once the plan has run; check
    /// [`DeleteReport::is_complete`] for partial failures.
    pub fn delete_group(&mut self, id: GroupId) -> Result<DeleteReport, BoardError> {
        let planned = GroupForest::new(&self.groups, &self.tasks).deletion_plan(id);
        let plan = match planned {
            Ok(plan) => plan,
            Err(e) => return self.fail("Failed to delete group", e),
        };
        let name = self.group(id).map(|g| g.name.clone()).unwrap_or_default();

        let report = delete::execute(&mut self.repo, &plan);
        self.apply_report(&report);

        if report.is_complete() {
            self.notices.push(Notice::success(format!(
                "Deleted group '{}' ({} groups, {} tasks)",
                name,
                report.deleted_groups.len(),
                report.deleted_tasks.len()
            )));
        } else {
            self.notices.push(Notice::error(format!(
                "Group '{}' was only partly deleted: {} of {} records removed{}",
                name,
                report.deleted_count(),
                plan.len(),
                first_failure(&report)
            )));
        }

        Ok(report)
    }

    pub fn delete_task(&mut self, id: TaskId) -> Result<(), BoardError> {
        let Some(name) = self.task(id).map(|t| t.name.clone()) else {
            return self.fail("Failed to delete task", BoardError::TaskNotFound(id));
        };

        match self.repo.delete_task(id) {
            Err(e) if !e.is_not_found() => {
                self.fail(&format!("Failed to delete task '{}'", name), e)
            }
            _ => {
                self.tasks.retain(|t| t.id != id);
                self.prune();
                self.notices
                    .push(Notice::success(format!("Deleted task '{}'", name)));
                Ok(())
            }
        }
    }

    // Selection

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn toggle_selection(&mut self, key: RowKey) -> bool {
        self.selection.toggle(key)
    }

    /// Selects every group and every task shown under a group
    pub fn select_all(&mut self) {
        let groups: HashSet<GroupId> = self.groups.iter().map(|g| g.id).collect();

        for &id in &groups {
            self.selection.insert_group(id);
        }
        for task in &self.tasks {
            if task.group_id.is_some_and(|g| groups.contains(&g)) {
                self.selection.insert_task(task.id);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Deletes every selected group (recursively) and task
    ///
    /// Items already removed along with a selected ancestor are skipped.
    /// Whatever could not be deleted stays selected.
    pub fn delete_selected(&mut self) -> Result<DeleteReport, BoardError> {
        let mut report = DeleteReport::default();
        if self.selection.is_empty() {
            return Ok(report);
        }

        let group_ids: Vec<GroupId> = self
            .groups
            .iter()
            .map(|g| g.id)
            .filter(|id| self.selection.groups().contains(id))
            .collect();

        // Records an earlier plan in this run already tried, deleted or not
        let mut covered_groups: HashSet<GroupId> = HashSet::new();
        let mut covered_tasks: HashSet<TaskId> = HashSet::new();

        for id in group_ids {
            if covered_groups.contains(&id) {
                continue;
            }
            let planned = GroupForest::new(&self.groups, &self.tasks).deletion_plan(id);
            // Gone with an ancestor deleted earlier in this loop
            let Ok(plan) = planned else {
                continue;
            };
            covered_groups.extend(plan.group_ids());
            covered_tasks.extend(plan.task_ids());

            let part = delete::execute(&mut self.repo, &plan);
            self.apply_report(&part);
            report.merge(part);
        }

        let task_ids: Vec<TaskId> = self
            .tasks
            .iter()
            .map(|t| t.id)
            .filter(|id| self.selection.tasks().contains(id) && !covered_tasks.contains(id))
            .collect();

        for id in task_ids {
            let result = self.repo.delete_task(id);
            if report.record_task(id, result) {
                self.tasks.retain(|t| t.id != id);
            }
        }
        self.prune();

        if report.is_complete() {
            self.notices.push(Notice::success(format!(
                "Deleted {} items",
                report.deleted_count()
            )));
        } else {
            self.notices.push(Notice::error(format!(
                "Deleted {} items; {} failed, {} blocked{}",
                report.deleted_count(),
                report.failures.len(),
                report.blocked.len(),
                first_failure(&report)
            )));
        }

        Ok(report)
    }

    // Notices

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Removes and returns all notices raised so far
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn fail<T>(&mut self, context: &str, err: impl Into<BoardError>) -> Result<T, BoardError> {
        let err = err.into();
        self.notices
            .push(Notice::error(format!("{}: {}", context, err)));
        Err(err)
    }

    fn require_group(&self, id: GroupId) -> Result<&TaskGroup, BoardError> {
        self.group(id).ok_or(BoardError::GroupNotFound(id))
    }

    fn replace_group(&mut self, group: TaskGroup) {
        if let Some(slot) = self.groups.iter_mut().find(|g| g.id == group.id) {
            *slot = group;
        }
    }

    fn replace_task(&mut self, task: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == task.id) {
            *slot = task;
        }
    }

    fn apply_report(&mut self, report: &DeleteReport) {
        let groups: HashSet<GroupId> = report.deleted_groups.iter().copied().collect();
        let tasks: HashSet<TaskId> = report.deleted_tasks.iter().copied().collect();

        self.groups.retain(|g| !groups.contains(&g.id));
        self.tasks.retain(|t| !tasks.contains(&t.id));
        self.prune();
    }

    /// Drops UI state that refers to groups or tasks no longer loaded
    fn prune(&mut self) {
        let groups: HashSet<GroupId> = self.groups.iter().map(|g| g.id).collect();
        let tasks: HashSet<TaskId> = self.tasks.iter().map(|t| t.id).collect();

        self.expanded.retain(|id| groups.contains(&id));
        self.selection
            .retain(|id| groups.contains(&id), |id| tasks.contains(&id));

        let target = match self.pending {
            Some(PendingAdd::Group { parent }) => parent,
            Some(PendingAdd::Task { group }) => Some(group),
            None => None,
        };
        if target.is_some_and(|id| !groups.contains(&id)) {
            self.cancel_add();
        }
    }
}

fn first_failure(report: &DeleteReport) -> String {
    report
        .failures
        .first()
        .map(|f| format!(" ({}: {})", f.target, f.error))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::testing::MemoryRepository;
    use super::*;
    use crate::domain::fixtures::{group, task};
    use crate::domain::RowKind;

    fn g(id: i64) -> GroupId {
        GroupId::new(id)
    }

    fn t(id: i64) -> TaskId {
        TaskId::new(id)
    }

    fn board(repo: MemoryRepository) -> Board<MemoryRepository> {
        Board::load(repo, ProjectId::new(1), true).unwrap()
    }

    /// A(1) with children B(2) and C(3); t1 in B, t2 in C, t3 in A
    fn scenario() -> Board<MemoryRepository> {
        board(MemoryRepository::with(
            vec![group(1, None), group(2, Some(1)), group(3, Some(1))],
            vec![task(1, Some(2)), task(2, Some(3)), task(3, Some(1))],
        ))
    }

    fn layout(board: &Board<MemoryRepository>) -> Vec<String> {
        board
            .rows()
            .iter()
            .map(|row| match row.kind {
                RowKind::Group { group, .. } => format!("g{}@{}", group.id, row.level),
                RowKind::Task { task } => format!("t{}@{}", task.id, row.level),
                RowKind::AddGroup { .. } => format!("+g@{}", row.level),
                RowKind::AddTask { .. } => format!("+t@{}", row.level),
            })
            .collect()
    }

    /// Local ids must match the store's after any action
    fn assert_in_sync(board: &Board<MemoryRepository>) {
        let local: Vec<_> = board.groups().iter().map(|g| g.id).collect();
        let stored: Vec<_> = board.repo().groups.iter().map(|g| g.id).collect();
        assert_eq!(local, stored);

        let local: Vec<_> = board.tasks().iter().map(|t| t.id).collect();
        let stored: Vec<_> = board.repo().tasks.iter().map(|t| t.id).collect();
        assert_eq!(local, stored);
    }

    #[test]
    fn load_expands_every_group() {
        let board = scenario();
        assert_eq!(
            layout(&board),
            vec!["g1@0", "g2@1", "t1@2", "g3@1", "t2@2", "t3@1"]
        );
    }

    #[test]
    fn load_collapsed() {
        let repo = MemoryRepository::with(vec![group(1, None)], vec![task(10, Some(1))]);
        let board = Board::load(repo, ProjectId::new(1), false).unwrap();
        assert_eq!(layout(&board), vec!["g1@0"]);
    }

    #[test]
    fn load_failure_is_an_error() {
        let mut repo = MemoryRepository::default();
        repo.fail_lists();
        assert!(matches!(
            Board::load(repo, ProjectId::new(1), true),
            Err(BoardError::Store(_))
        ));
    }

    #[test]
    fn toggle_hides_and_shows_subtree() {
        let mut board = scenario();

        assert!(!board.toggle(g(1)));
        assert_eq!(layout(&board), vec!["g1@0"]);
        assert!(board.toggle(g(1)));
        assert_eq!(layout(&board).len(), 6);
    }

    #[test]
    fn collapse_and_expand_all() {
        let mut board = scenario();
        board.collapse_all();
        assert_eq!(layout(&board), vec!["g1@0"]);

        board.set_expanded(g(1), true);
        assert_eq!(layout(&board), vec!["g1@0", "g2@1", "g3@1", "t3@1"]);

        board.expand_all();
        assert_eq!(layout(&board).len(), 6);
    }

    #[test]
    fn submit_group_appends_and_expands() {
        let mut board = scenario();
        board.begin_add_group(Some(g(2))).unwrap();
        assert_eq!(
            layout(&board),
            vec!["g1@0", "g2@1", "t1@2", "+g@2", "g3@1", "t2@2", "t3@1"]
        );

        board.draft_mut().name = "Research".to_string();
        assert!(board.can_save());
        let created = board.submit().unwrap();

        let Created::Group(created) = created else {
            panic!("expected a group");
        };
        assert_eq!(created.parent_id, Some(g(2)));
        assert!(board.expanded().is_expanded(created.id));
        assert!(board.pending().is_none());
        assert_eq!(board.draft(), &Draft::default());
        assert_eq!(
            board.notices().last().unwrap(),
            &Notice::success("Created group 'Research'")
        );
        assert_in_sync(&board);
    }

    #[test]
    fn submit_root_group() {
        let mut board = board(MemoryRepository::default());
        board.begin_add_group(None).unwrap();
        assert_eq!(layout(&board), vec!["+g@0"]);

        *board.draft_mut() = Draft::named("Phase 1");
        board.submit().unwrap();
        assert_eq!(layout(&board), vec!["g1@0"]);
    }

    #[test]
    fn submit_task_carries_group() {
        let mut board = scenario();
        board.begin_add_task(g(3)).unwrap();
        assert_eq!(
            layout(&board),
            vec!["g1@0", "g2@1", "t1@2", "g3@1", "t2@2", "+t@2", "t3@1"]
        );

        let draft = board.draft_mut();
        draft.name = "Review".to_string();
        draft.estimate_hours = Some(2.5);
        let Created::Task(created) = board.submit().unwrap() else {
            panic!("expected a task");
        };

        assert_eq!(created.group_id, Some(g(3)));
        assert_eq!(created.estimate_hours, Some(2.5));
        let new_row = format!("t{}@2", created.id);
        assert_eq!(
            layout(&board),
            vec!["g1@0", "g2@1", "t1@2", "g3@1", "t2@2", new_row.as_str(), "t3@1"]
        );
        assert_in_sync(&board);
    }

    #[test]
    fn begin_add_task_expands_collapsed_group() {
        let mut board = scenario();
        board.toggle(g(1));
        board.begin_add_task(g(1)).unwrap();

        assert!(board.expanded().is_expanded(g(1)));
        assert_eq!(layout(&board).last().unwrap(), "+t@1");
    }

    #[test]
    fn begin_add_for_unknown_group() {
        let mut board = scenario();
        assert!(matches!(
            board.begin_add_task(g(99)),
            Err(BoardError::GroupNotFound(_))
        ));
        assert!(board.begin_add_group(Some(g(99))).is_err());
        assert!(board.pending().is_none());
    }

    #[test]
    fn empty_name_submit_makes_no_call() {
        let mut board = scenario();
        board.begin_add_task(g(1)).unwrap();
        board.draft_mut().name = "   ".to_string();

        assert!(!board.can_save());
        assert!(matches!(board.submit(), Err(BoardError::Validation(_))));
        assert!(board.repo().calls.is_empty());
        assert!(board.pending().is_some());
        assert!(board.notices().last().unwrap().is_error());
    }

    #[test]
    fn submit_without_pending() {
        let mut board = scenario();
        assert!(matches!(board.submit(), Err(BoardError::NoPendingAdd)));
    }

    #[test]
    fn failed_create_clears_slot_and_keeps_state() {
        let mut board = scenario();
        board.repo_mut().fail_creates();
        board.begin_add_group(None).unwrap();
        board.draft_mut().name = "Phase 2".to_string();

        assert!(matches!(board.submit(), Err(BoardError::Store(_))));
        assert!(board.pending().is_none());
        assert_eq!(board.draft(), &Draft::default());
        assert_eq!(board.groups().len(), 3);
        assert_eq!(board.repo().calls, vec!["create_group Phase 2"]);

        let notice = board.notices().last().unwrap();
        assert!(notice.is_error());
        assert!(notice.message.starts_with("Failed to create group"));
    }

    #[test]
    fn cancel_add() {
        let mut board = scenario();
        board.begin_add_group(None).unwrap();
        board.draft_mut().name = "x".to_string();
        board.cancel_add();

        assert!(board.pending().is_none());
        assert!(!board.can_save());
        assert_eq!(layout(&board).len(), 6);
    }

    #[test]
    fn delete_group_removes_subtree_children_first() {
        let mut board = scenario();
        let report = board.delete_group(g(1)).unwrap();

        assert!(report.is_complete());
        assert_eq!(report.deleted_tasks, vec![t(1), t(2), t(3)]);
        assert_eq!(report.deleted_groups, vec![g(2), g(3), g(1)]);
        assert_eq!(
            board.repo().calls,
            vec![
                "delete_task 1",
                "delete_group 2",
                "delete_task 2",
                "delete_group 3",
                "delete_task 3",
                "delete_group 1",
            ]
        );
        assert!(board.rows().is_empty());
        assert!(board.expanded().is_empty());
        assert!(!board.notices().last().unwrap().is_error());
        assert_in_sync(&board);
    }

    #[test]
    fn delete_child_group_keeps_siblings() {
        let mut board = scenario();
        board.delete_group(g(2)).unwrap();

        assert_eq!(layout(&board), vec!["g1@0", "g3@1", "t2@2", "t3@1"]);
        assert_in_sync(&board);
    }

    #[test]
    fn partial_delete_keeps_local_state_consistent() {
        let mut board = scenario();
        board.repo_mut().fail_task(t(2));

        let report = board.delete_group(g(1)).unwrap();

        assert!(!report.is_complete());
        assert_eq!(layout(&board), vec!["g1@0", "g3@1", "t2@2"]);
        assert_in_sync(&board);

        let notice = board.notices().last().unwrap();
        assert!(notice.is_error());
        assert!(notice.message.contains("3 of 6"));
    }

    #[test]
    fn delete_unknown_group() {
        let mut board = scenario();
        assert!(matches!(
            board.delete_group(g(42)),
            Err(BoardError::Hierarchy(HierarchyError::GroupNotFound(_)))
        ));
        assert!(board.repo().calls.is_empty());
    }

    #[test]
    fn pending_add_under_deleted_group_is_cancelled() {
        let mut board = scenario();
        board.begin_add_task(g(2)).unwrap();
        board.delete_group(g(2)).unwrap();

        assert!(board.pending().is_none());
    }

    #[test]
    fn delete_task() {
        let mut board = scenario();
        board.delete_task(t(3)).unwrap();

        assert!(board.task(t(3)).is_none());
        assert_in_sync(&board);
    }

    #[test]
    fn failed_task_delete_keeps_task() {
        let mut board = scenario();
        board.repo_mut().fail_task(t(3));

        assert!(board.delete_task(t(3)).is_err());
        assert!(board.task(t(3)).is_some());
        assert!(board.notices().last().unwrap().is_error());
    }

    #[test]
    fn move_group_into_descendant_is_rejected() {
        let mut board = scenario();

        assert!(matches!(
            board.move_group(g(1), Some(g(2))),
            Err(BoardError::Hierarchy(HierarchyError::CycleDetected { .. }))
        ));
        assert!(board.repo().calls.is_empty());
    }

    #[test]
    fn move_group_to_root() {
        let mut board = scenario();
        board.move_group(g(3), None).unwrap();

        assert_eq!(
            layout(&board),
            vec!["g1@0", "g2@1", "t1@2", "t3@1", "g3@0", "t2@1"]
        );
        assert_in_sync(&board);
    }

    #[test]
    fn move_task_between_groups() {
        let mut board = scenario();
        board.move_task(t(3), g(2)).unwrap();

        assert_eq!(board.task(t(3)).unwrap().group_id, Some(g(2)));
        assert_eq!(
            layout(&board),
            vec!["g1@0", "g2@1", "t1@2", "t3@2", "g3@1", "t2@2"]
        );
        assert!(board.move_task(t(3), g(77)).is_err());
    }

    #[test]
    fn rename_and_update() {
        let mut board = scenario();
        board.rename_group(g(1), " Phase One ").unwrap();
        assert_eq!(board.group(g(1)).unwrap().name, "Phase One");
        assert!(board.rename_group(g(1), "").is_err());

        let patch = TaskPatch {
            name: Some("Polish".to_string()),
            ..TaskPatch::default()
        };
        board.update_task(t(1), &patch).unwrap();
        assert_eq!(board.task(t(1)).unwrap().name, "Polish");
    }

    #[test]
    fn select_all_covers_groups_and_grouped_tasks() {
        let repo = MemoryRepository::with(
            vec![group(1, None)],
            vec![task(10, Some(1)), task(11, None), task(12, Some(9))],
        );
        let mut board = board(repo);
        board.select_all();

        let selection = board.selection();
        assert_eq!(selection.len(), 2);
        assert!(selection.contains(RowKey::Group(g(1))));
        assert!(selection.contains(RowKey::Task(t(10))));
    }

    #[test]
    fn delete_selected_skips_items_removed_with_ancestor() {
        let mut board = scenario();
        board.toggle_selection(RowKey::Group(g(1)));
        board.toggle_selection(RowKey::Group(g(2)));
        board.toggle_selection(RowKey::Task(t(2)));

        let report = board.delete_selected().unwrap();

        assert!(report.is_complete());
        assert_eq!(report.deleted_count(), 6);
        assert!(board.groups().is_empty());
        assert!(board.selection().is_empty());
        // Each record deleted exactly once
        assert_eq!(board.repo().calls.len(), 6);
    }

    #[test]
    fn delete_selected_tries_nested_selection_once() {
        let mut board = scenario();
        board.toggle_selection(RowKey::Group(g(1)));
        board.toggle_selection(RowKey::Group(g(2)));
        board.toggle_selection(RowKey::Task(t(1)));
        board.repo_mut().fail_task(t(1));

        let report = board.delete_selected().unwrap();

        assert_eq!(
            board.repo().calls,
            vec!["delete_task 1", "delete_task 2", "delete_group 3", "delete_task 3"]
        );
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.blocked, vec![g(2), g(1)]);
        assert_eq!(
            board.notices().last().unwrap().message,
            format!(
                "Deleted 3 items; 1 failed, 2 blocked (task {}: {})",
                t(1),
                report.failures[0].error
            )
        );

        assert!(board.selection().contains(RowKey::Group(g(1))));
        assert!(board.selection().contains(RowKey::Group(g(2))));
        assert!(board.selection().contains(RowKey::Task(t(1))));
        assert_in_sync(&board);
    }

    #[test]
    fn delete_selected_tasks() {
        let mut board = scenario();
        board.toggle_selection(RowKey::Task(t(1)));
        board.toggle_selection(RowKey::Task(t(3)));
        board.repo_mut().fail_task(t(3));

        let report = board.delete_selected().unwrap();

        assert_eq!(report.deleted_tasks, vec![t(1)]);
        assert_eq!(report.failures.len(), 1);
        assert!(board.selection().contains(RowKey::Task(t(3))));
        assert_in_sync(&board);
    }

    #[test]
    fn reload_picks_up_new_groups_and_keeps_flags() {
        let mut board = scenario();
        board.toggle(g(2));
        board.repo_mut().groups.push(group(4, Some(1)));

        board.reload().unwrap();

        assert!(!board.expanded().is_expanded(g(2)));
        assert!(board.expanded().is_expanded(g(4)));
    }

    #[test]
    fn failed_reload_keeps_state() {
        let mut board = scenario();
        board.repo_mut().fail_lists();

        assert!(board.reload().is_err());
        assert_eq!(board.groups().len(), 3);
        assert!(board.notices().last().unwrap().is_error());
    }

    #[test]
    fn take_notices_drains() {
        let mut board = scenario();
        board.delete_task(t(1)).unwrap();

        assert_eq!(board.take_notices().len(), 1);
        assert!(board.notices().is_empty());
    }
}
