use crate::drag::{column_at, DragState, Offset};
use crate::storage::KeyValueStorage;
use crate::task::{Task, TaskDraft, TaskId, TaskStatus};
use crate::task_store::TaskStore;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    #[default]
    Title,
    Description,
    Duration,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Description,
            FormField::Description => FormField::Duration,
            FormField::Duration => FormField::Title,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            FormField::Title => FormField::Duration,
            FormField::Description => FormField::Title,
            FormField::Duration => FormField::Description,
        }
    }
}

/// The create/edit dialog's contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub focus: FormField,
    editing: Option<TaskId>,
}

impl TaskForm {
    fn for_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            duration: task.duration.clone(),
            focus: FormField::Title,
            editing: Some(task.id.clone()),
        }
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Title => &self.title,
            FormField::Description => &self.description,
            FormField::Duration => &self.duration,
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Description => &mut self.description,
            FormField::Duration => &mut self.duration,
        }
    }

    pub fn push(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_previous(&mut self) {
        self.focus = self.focus.previous();
    }

    fn draft(&self) -> TaskDraft {
        TaskDraft::new(&self.title, &self.description, &self.duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub column: TaskStatus,
    pub row: usize,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            column: TaskStatus::Backlog,
            row: 0,
        }
    }
}

/// Projects the store onto the five columns and turns user input (drags,
/// keys, the editor dialog) into store calls.
#[derive(Debug)]
pub struct BoardController<S> {
    store: TaskStore<S>,
    drags: HashMap<TaskId, DragState>,
    surface_width: f32,
    form: Option<TaskForm>,
    selection: Selection,
}

impl<S: KeyValueStorage> BoardController<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Self {
            store,
            drags: HashMap::new(),
            surface_width: 0.0,
            form: None,
            selection: Selection::default(),
        }
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn columns(&self) -> [Vec<&Task>; TaskStatus::COUNT] {
        self.store.columns()
    }

    pub fn set_surface_width(&mut self, width: f32) {
        self.surface_width = width;
    }

    // Drag handling

    pub fn drag_start(&mut self, id: &str) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.drags.entry(id.to_string()).or_default().start();
        true
    }

    pub fn drag_move(&mut self, id: &str, translation: Offset) {
        if let Some(drag) = self.drags.get_mut(id) {
            drag.update(translation);
        }
    }

    /// Releases a drag at `end_x` (relative to the board surface). Returns
    /// the new column when the card changed columns.
    pub fn drag_end(&mut self, id: &str, end_x: f32) -> Option<TaskStatus> {
        let drag = self.drags.get_mut(id)?;
        if !drag.is_active() {
            return None;
        }
        drag.end();

        let target = column_at(end_x, self.surface_width);
        let current = self.store.get(id)?.status;
        if target == current || !self.store.set_status(id, target) {
            return None;
        }
        self.select(id);
        Some(target)
    }

    /// Releases a drag without resolving a drop column; the card springs
    /// back to its slot.
    pub fn drag_cancel(&mut self, id: &str) {
        if let Some(drag) = self.drags.get_mut(id) {
            drag.end();
        }
    }

    fn cancel_drags(&mut self) {
        for drag in self.drags.values_mut() {
            drag.end();
        }
    }

    pub fn drag_offset(&self, id: &str) -> Option<Offset> {
        self.drags.get(id).map(DragState::offset)
    }

    pub fn active_drag(&self) -> Option<&str> {
        self.drags
            .iter()
            .find(|(_, drag)| drag.is_active())
            .map(|(id, _)| id.as_str())
    }

    /// Steps return animations; settled or orphaned drags are dropped.
    /// Returns `true` while anything is still moving.
    pub fn tick(&mut self, dt: f32) -> bool {
        let store = &self.store;
        self.drags.retain(|id, drag| {
            drag.tick(dt);
            store.get(id).is_some() && !drag.is_settled()
        });
        self.drags.values().any(|drag| !drag.is_active())
    }

    // Editor dialog

    pub fn form(&self) -> Option<&TaskForm> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        self.form.as_mut()
    }

    pub fn open_create(&mut self) {
        self.cancel_drags();
        self.form = Some(TaskForm::default());
    }

    pub fn open_edit(&mut self, id: &str) -> bool {
        match self.store.get(id) {
            Some(task) => {
                self.form = Some(TaskForm::for_task(task));
                self.cancel_drags();
                true
            }
            None => false,
        }
    }

    /// Saves the dialog. A blank title keeps it open and changes nothing;
    /// returns whether the dialog closed.
    pub fn submit(&mut self) -> bool {
        let Some(form) = self.form.as_ref() else {
            return false;
        };
        if form.title.trim().is_empty() {
            return false;
        }
        let draft = form.draft();
        match form.editing.clone() {
            Some(id) => {
                self.store.update(&id, draft.into());
            }
            None => {
                if let Some(id) = self.store.create(draft) {
                    self.select(&id);
                }
            }
        }
        self.form = None;
        true
    }

    pub fn cancel(&mut self) {
        self.form = None;
    }

    // Keyboard selection

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.store
            .tasks_by_status(self.selection.column)
            .get(self.selection.row)
            .copied()
    }

    pub fn select_left(&mut self) {
        if let Some(column) = self.selection.column.previous() {
            self.selection = Selection { column, row: 0 };
        }
    }

    pub fn select_right(&mut self) {
        if let Some(column) = self.selection.column.next() {
            self.selection = Selection { column, row: 0 };
        }
    }

    pub fn select_up(&mut self) {
        self.selection.row = self.selection.row.saturating_sub(1);
    }

    pub fn select_down(&mut self) {
        let len = self.store.count(self.selection.column);
        if self.selection.row + 1 < len {
            self.selection.row += 1;
        }
    }

    pub fn select(&mut self, id: &str) {
        let Some(task) = self.store.get(id) else {
            return;
        };
        let column = task.status;
        let row = self
            .store
            .tasks_by_status(column)
            .iter()
            .position(|t| t.id == id)
            .unwrap_or(0);
        self.selection = Selection { column, row };
    }

    fn clamp_selection(&mut self) {
        let len = self.store.count(self.selection.column);
        self.selection.row = self.selection.row.min(len.saturating_sub(1));
    }

    pub fn edit_selected(&mut self) -> bool {
        match self.selected_task().map(|t| t.id.clone()) {
            Some(id) => self.open_edit(&id),
            None => false,
        }
    }

    pub fn delete_selected(&mut self) -> bool {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return false;
        };
        self.drags.remove(&id);
        let deleted = self.store.delete(&id);
        self.clamp_selection();
        deleted
    }

    pub fn delete(&mut self, id: &str) -> bool {
        self.drags.remove(id);
        let deleted = self.store.delete(id);
        self.clamp_selection();
        deleted
    }

    /// Moves the selected card one column left (`forward == false`) or
    /// right. Nothing happens at the board edges.
    pub fn shift_selected(&mut self, forward: bool) -> Option<TaskStatus> {
        let task = self.selected_task()?;
        let id = task.id.clone();
        let target = if forward {
            task.status.next()?
        } else {
            task.status.previous()?
        };
        if !self.store.set_status(&id, target) {
            return None;
        }
        self.select(&id);
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use rstest::{fixture, rstest};

    const WIDTH: f32 = 500.0;

    #[fixture]
    fn board() -> BoardController<MemoryStorage> {
        let mut board = BoardController::new(TaskStore::new(MemoryStorage::new()));
        board.set_surface_width(WIDTH);
        board
    }

    fn add(board: &mut BoardController<MemoryStorage>, title: &str) -> TaskId {
        board.open_create();
        board.form_mut().unwrap().title = title.to_string();
        assert!(board.submit());
        board.store().tasks().last().unwrap().id.clone()
    }

    fn drag(board: &mut BoardController<MemoryStorage>, id: &str, dx: f32, end_x: f32) -> Option<TaskStatus> {
        assert!(board.drag_start(id));
        board.drag_move(id, Offset::new(dx, 0.0));
        board.drag_end(id, end_x)
    }

    #[rstest]
    #[case(50.0, TaskStatus::Backlog)]
    #[case(150.0, TaskStatus::Todo)]
    #[case(250.0, TaskStatus::InProgress)]
    #[case(350.0, TaskStatus::Test)]
    #[case(450.0, TaskStatus::Done)]
    #[case(-80.0, TaskStatus::Backlog)]
    #[case(900.0, TaskStatus::Done)]
    fn release_position_picks_column(
        mut board: BoardController<MemoryStorage>,
        #[case] end_x: f32,
        #[case] expected: TaskStatus,
    ) {
        let id = add(&mut board, "card");
        drag(&mut board, &id, end_x - 50.0, end_x);
        assert_eq!(board.store().get(&id).unwrap().status, expected);
    }

    #[rstest]
    fn dropping_in_same_column_writes_nothing(mut board: BoardController<MemoryStorage>) {
        let id = add(&mut board, "card");
        let writes = board.store().storage().writes();
        assert_eq!(drag(&mut board, &id, 10.0, 60.0), None);
        assert_eq!(board.store().storage().writes(), writes);
    }

    #[rstest]
    fn drag_changes_only_dragged_card(mut board: BoardController<MemoryStorage>) {
        let a = add(&mut board, "a");
        let b = add(&mut board, "b");
        assert_eq!(drag(&mut board, &a, 300.0, 320.0), Some(TaskStatus::Test));
        assert_eq!(board.store().get(&b).unwrap().status, TaskStatus::Backlog);
        assert_eq!(board.selection(), Selection { column: TaskStatus::Test, row: 0 });
    }

    #[rstest]
    fn card_returns_to_slot_after_release(mut board: BoardController<MemoryStorage>) {
        let id = add(&mut board, "card");
        board.drag_start(&id);
        board.drag_move(&id, Offset::new(120.0, 8.0));
        assert_eq!(board.drag_offset(&id), Some(Offset::new(120.0, 8.0)));
        assert_eq!(board.active_drag(), Some(id.as_str()));
        board.drag_end(&id, 220.0);
        assert_eq!(board.active_drag(), None);

        let mut frames = 0;
        while board.tick(1.0 / 60.0) {
            frames += 1;
            assert!(frames < 600);
        }
        assert_eq!(board.drag_offset(&id), None);
    }

    #[rstest]
    fn drags_on_unknown_or_idle_cards_are_ignored(mut board: BoardController<MemoryStorage>) {
        let id = add(&mut board, "card");
        assert!(!board.drag_start("missing"));
        assert_eq!(board.drag_end(&id, 450.0), None);
        assert_eq!(board.store().get(&id).unwrap().status, TaskStatus::Backlog);
    }

    #[rstest]
    fn cancelled_drag_springs_back_without_moving(mut board: BoardController<MemoryStorage>) {
        let id = add(&mut board, "card");
        board.drag_start(&id);
        board.drag_move(&id, Offset::new(400.0, 0.0));
        board.drag_cancel(&id);
        assert_eq!(board.active_drag(), None);
        assert_eq!(board.store().get(&id).unwrap().status, TaskStatus::Backlog);
        while board.tick(1.0 / 60.0) {}
        assert_eq!(board.drag_offset(&id), None);
    }

    #[rstest]
    fn opening_dialog_releases_active_drags(mut board: BoardController<MemoryStorage>) {
        let a = add(&mut board, "a");
        let b = add(&mut board, "b");
        board.drag_start(&a);
        board.drag_move(&a, Offset::new(90.0, 0.0));
        board.open_create();
        assert_eq!(board.active_drag(), None);
        board.cancel();

        board.drag_start(&b);
        assert!(board.open_edit(&a));
        assert_eq!(board.active_drag(), None);
        assert_eq!(board.store().get(&a).unwrap().status, TaskStatus::Backlog);
    }

    #[rstest]
    fn blank_submit_keeps_dialog_open(mut board: BoardController<MemoryStorage>) {
        board.open_create();
        board.form_mut().unwrap().title = "   ".to_string();
        assert!(!board.submit());
        assert!(board.form().is_some());
        assert!(board.store().tasks().is_empty());
    }

    #[rstest]
    fn edit_prefills_and_updates(mut board: BoardController<MemoryStorage>) {
        let id = add(&mut board, "draft");
        board.shift_selected(true);
        assert!(board.open_edit(&id));
        let form = board.form_mut().unwrap();
        assert_eq!(form.title, "draft");
        assert_eq!(form.editing(), Some(id.as_str()));
        form.focus_next();
        for c in "details".chars() {
            form.push(c);
        }
        form.focus_next();
        form.push('3');
        form.push('h');
        form.backspace();
        form.push('d');
        assert!(board.submit());

        let task = board.store().get(&id).unwrap();
        assert_eq!(task.description, "details");
        assert_eq!(task.duration, "3d");
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(board.store().tasks().len(), 1);
    }

    #[rstest]
    fn cancel_discards_dialog(mut board: BoardController<MemoryStorage>) {
        board.open_create();
        board.form_mut().unwrap().title = "never saved".to_string();
        board.cancel();
        assert!(board.form().is_none());
        board.open_create();
        assert_eq!(board.form().unwrap().title, "");
        assert!(board.store().tasks().is_empty());
    }

    #[rstest]
    fn keyboard_moves_stop_at_edges(mut board: BoardController<MemoryStorage>) {
        let id = add(&mut board, "card");
        assert_eq!(board.shift_selected(false), None);
        for expected in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Test, TaskStatus::Done] {
            assert_eq!(board.shift_selected(true), Some(expected));
        }
        assert_eq!(board.shift_selected(true), None);
        assert_eq!(board.store().get(&id).unwrap().status, TaskStatus::Done);
    }

    #[rstest]
    fn delete_selected_clamps_selection(mut board: BoardController<MemoryStorage>) {
        add(&mut board, "a");
        add(&mut board, "b");
        board.select_down();
        assert_eq!(board.selected_task().unwrap().title, "b");
        assert!(board.delete_selected());
        assert_eq!(board.selection().row, 0);
        assert_eq!(board.selected_task().unwrap().title, "a");
        assert!(board.delete_selected());
        assert!(board.selected_task().is_none());
        assert!(!board.delete_selected());
    }

    #[rstest]
    fn selection_moves_between_columns(mut board: BoardController<MemoryStorage>) {
        add(&mut board, "a");
        board.select_left();
        assert_eq!(board.selection().column, TaskStatus::Backlog);
        board.select_right();
        assert_eq!(board.selection().column, TaskStatus::Todo);
        assert!(board.selected_task().is_none());
        board.select_up();
        assert_eq!(board.selection().row, 0);
    }
}
