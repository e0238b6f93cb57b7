use serde_json::{Value, json};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use taskpad_core::TaskListController;
use taskpad_core::config::Palette;
use taskpad_core::model::{InputMode, Task};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "Done")]
    done: &'static str,
    #[tabled(rename = "Task")]
    text: String,
    #[tabled(rename = "Id")]
    id: String,
}

fn done_marker(task: &Task) -> &'static str {
    if task.complete { "[x]" } else { "[ ]" }
}

/// Plain-text table of the visible tasks, numbered by visible position.
pub fn tasks_table(controller: &TaskListController, palette: &Palette) -> String {
    let visible = controller.visible_tasks();
    if visible.is_empty() {
        return if controller.search_query().is_empty() {
            "No tasks".to_string()
        } else {
            format!("No tasks match \"{}\"", controller.search_query())
        };
    }

    let editing = controller.editing_task_id();
    let rows = visible.iter().enumerate().map(|(index, task)| {
        let mut text = if task.complete {
            palette.strike(&task.text)
        } else {
            task.text.clone()
        };
        if editing == Some(&task.id) {
            text.push_str(&palette.accentize(" (editing)"));
        }
        TaskRow {
            position: index + 1,
            done: done_marker(task),
            text,
            id: task.id.to_string(),
        }
    });

    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

pub fn tasks_json(controller: &TaskListController) -> Value {
    let tasks = controller
        .visible_tasks()
        .into_iter()
        .enumerate()
        .map(|(index, task)| {
            json!({
                "position": index + 1,
                "id": task.id,
                "text": task.text,
                "complete": task.complete,
            })
        })
        .collect();
    Value::Array(tasks)
}

pub fn status_lines(controller: &TaskListController, palette: &Palette) -> Vec<String> {
    let mode = match controller.input_mode() {
        InputMode::Creating { .. } => palette.accentize("creating"),
        InputMode::Editing { task_id, .. } => {
            palette.accentize(&format!("editing {task_id}"))
        }
    };
    let total = controller.tasks().len();
    let done = controller.tasks().iter().filter(|task| task.complete).count();

    vec![
        format!("Mode: {mode}"),
        format!("Input: \"{}\"", controller.input_buffer()),
        format!("Search: \"{}\"", controller.search_query()),
        format!(
            "Tasks: {} shown, {} total, {} done",
            controller.visible_tasks().len(),
            total,
            done
        ),
    ]
}

pub fn status_json(controller: &TaskListController) -> Value {
    json!({
        "mode": controller.input_mode().label(),
        "editing_task_id": controller.editing_task_id(),
        "input": controller.input_buffer(),
        "search": controller.search_query(),
        "visible": controller.visible_tasks().len(),
        "total": controller.tasks().len(),
        "done": controller.tasks().iter().filter(|task| task.complete).count(),
    })
}

pub fn task_json(action: &str, task: &Task) -> Value {
    json!({
        "action": action,
        "task": task,
    })
}

pub fn ignored_json(reason: &str) -> Value {
    json!({
        "action": "ignored",
        "reason": reason,
    })
}

#[cfg(test)]
mod tests {
    use super::{status_json, status_lines, tasks_json, tasks_table};
    use taskpad_core::config::palette_for_theme;
    use taskpad_core::TaskListController;
    use taskpad_core::ids::SequentialIdSource;

    fn controller_with(texts: &[&str]) -> TaskListController {
        let mut controller =
            TaskListController::with_id_source(Box::new(SequentialIdSource::default()));
        for text in texts {
            controller.set_input_buffer(*text);
            controller.add();
        }
        controller
    }

    #[test]
    fn tasks_table_lists_visible_tasks_with_positions() {
        let mut controller = controller_with(&["Buy milk", "Walk dog"]);
        controller.toggle_complete("task-2");

        let table = tasks_table(&controller, &palette_for_theme(None));

        assert!(table.contains("Buy milk"));
        assert!(table.contains("[x]"));
        assert!(table.contains("task-2"));
    }

    #[test]
    fn tasks_table_reports_empty_search() {
        let mut controller = controller_with(&["Buy milk"]);
        controller.set_search_query("eggs");

        let table = tasks_table(&controller, &palette_for_theme(None));
        assert_eq!(table, "No tasks match \"eggs\"");
    }

    #[test]
    fn tasks_table_marks_task_under_edit() {
        let mut controller = controller_with(&["Buy milk"]);
        controller.begin_edit("task-1");

        let table = tasks_table(&controller, &palette_for_theme(None));
        assert!(table.contains("Buy milk (editing)"));
    }

    fn visible_width(line: &str) -> usize {
        let mut width = 0;
        let mut in_escape = false;
        for ch in line.chars() {
            match ch {
                '\x1b' => in_escape = true,
                'm' if in_escape => in_escape = false,
                _ if in_escape => {}
                _ => width += 1,
            }
        }
        width
    }

    #[test]
    fn themed_table_rows_line_up() {
        let mut controller = controller_with(&["a", "bbbbbbbb"]);
        controller.toggle_complete("task-2");
        controller.begin_edit("task-1");

        let table = tasks_table(&controller, &palette_for_theme(Some("noir")));
        assert!(table.contains("\x1b[9;38;5;250mbbbbbbbb\x1b[0m"));

        let widths: Vec<usize> = table.lines().map(visible_width).collect();
        assert_eq!(widths.len(), 4);
        assert!(widths.iter().all(|width| *width == widths[0]), "{widths:?}");
    }

    #[test]
    fn tasks_json_numbers_filtered_tasks() {
        let mut controller = controller_with(&["Milk", "Bread", "oat milk"]);
        controller.set_search_query("MILK");

        let json = tasks_json(&controller);

        assert_eq!(json[0]["position"], 1);
        assert_eq!(json[1]["position"], 2);
        assert_eq!(json[1]["id"], "task-3");
        assert_eq!(json.as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn status_reports_edit_session() {
        let mut controller = controller_with(&["Buy milk"]);
        controller.begin_edit("task-1");

        let json = status_json(&controller);
        assert_eq!(json["mode"], "editing");
        assert_eq!(json["editing_task_id"], "task-1");
        assert_eq!(json["input"], "Buy milk");

        let lines = status_lines(&controller, &palette_for_theme(None));
        assert_eq!(lines[0], "Mode: editing task-1");
    }
}
