use crate::core::TaskInput;

use super::buffer::TextBuffer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FormField {
    Title,
    DueDate,
    Hours,
    Importance,
    Dependencies,
}

impl FormField {
    pub(crate) const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::DueDate,
        FormField::Hours,
        FormField::Importance,
        FormField::Dependencies,
    ];

    pub(crate) fn label(&self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::DueDate => "Due date",
            FormField::Hours => "Est. hours",
            FormField::Importance => "Importance",
            FormField::Dependencies => "Depends on",
        }
    }

    pub(crate) fn hint(&self) -> &'static str {
        match self {
            FormField::Title => "required",
            FormField::DueDate => "YYYY-MM-DD, today, tomorrow, +3d, +1w",
            FormField::Hours => "blank = 1",
            FormField::Importance => "1-10, blank = 5",
            FormField::Dependencies => "comma-separated task ids",
        }
    }

    fn index(&self) -> usize {
        FormField::ALL
            .iter()
            .position(|field| field == self)
            .unwrap_or(0)
    }
}

/// Add-task form state; one buffer per field.
#[derive(Debug, Clone)]
pub(crate) struct TaskForm {
    fields: [TextBuffer; 5],
    focus: FormField,
}

impl Default for TaskForm {
    fn default() -> Self {
        let defaults = TaskInput::default();
        Self {
            fields: [
                TextBuffer::from_text(defaults.title),
                TextBuffer::from_text(defaults.due_date),
                TextBuffer::from_text(defaults.estimated_hours),
                TextBuffer::from_text(defaults.importance),
                TextBuffer::from_text(defaults.dependencies),
            ],
            focus: FormField::Title,
        }
    }
}

impl TaskForm {
    pub(crate) fn focus(&self) -> FormField {
        self.focus
    }

    pub(crate) fn field(&self, field: FormField) -> &TextBuffer {
        &self.fields[field.index()]
    }

    pub(crate) fn focused_mut(&mut self) -> &mut TextBuffer {
        &mut self.fields[self.focus.index()]
    }

    pub(crate) fn focus_next(&mut self) {
        let next = (self.focus.index() + 1) % FormField::ALL.len();
        self.focus = FormField::ALL[next];
    }

    pub(crate) fn focus_prev(&mut self) {
        let len = FormField::ALL.len();
        let prev = (self.focus.index() + len - 1) % len;
        self.focus = FormField::ALL[prev];
    }

    pub(crate) fn to_input(&self) -> TaskInput {
        TaskInput {
            title: self.field(FormField::Title).as_str().to_string(),
            due_date: self.field(FormField::DueDate).as_str().to_string(),
            estimated_hours: self.field(FormField::Hours).as_str().to_string(),
            importance: self.field(FormField::Importance).as_str().to_string(),
            dependencies: self.field(FormField::Dependencies).as_str().to_string(),
        }
    }

    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}
