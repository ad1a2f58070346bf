//! Pure list edits for tag-style and slot-style inputs.
//!
//! Every edit takes the current committed list and returns the next one,
//! so a burst of edits applied in sequence never loses an earlier change.

/// A list with a transient text input, committed on `Add`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListEditor {
    pub items: Vec<String>,
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEdit {
    SetInput(String),
    /// Append the trimmed input and clear it. Blank input is ignored.
    Add,
    /// Remove every item equal to the value.
    Remove(String),
}

impl ListEditor {
    pub fn from_items(items: Vec<String>) -> Self {
        Self {
            items,
            input: String::new(),
        }
    }

    #[must_use]
    pub fn apply(mut self, edit: ListEdit) -> Self {
        match edit {
            ListEdit::SetInput(input) => self.input = input,
            ListEdit::Add => {
                let value = self.input.trim();
                if !value.is_empty() {
                    self.items.push(value.to_string());
                    self.input.clear();
                }
            }
            ListEdit::Remove(value) => self.items.retain(|item| *item != value),
        }
        self
    }
}

/// Independently editable text slots, addressed by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialSlots {
    pub slots: Vec<String>,
}

impl Default for MaterialSlots {
    /// One empty slot.
    fn default() -> Self {
        Self {
            slots: vec![String::new()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotEdit {
    AddSlot,
    RemoveSlot(usize),
    EditSlot(usize, String),
}

impl MaterialSlots {
    pub fn from_items(items: &[String]) -> Self {
        if items.is_empty() {
            return Self::default();
        }
        Self {
            slots: items.to_vec(),
        }
    }

    /// Out-of-range positions are ignored.
    #[must_use]
    pub fn apply(mut self, edit: SlotEdit) -> Self {
        match edit {
            SlotEdit::AddSlot => self.slots.push(String::new()),
            SlotEdit::RemoveSlot(idx) => {
                if idx < self.slots.len() {
                    self.slots.remove(idx);
                }
            }
            SlotEdit::EditSlot(idx, value) => {
                if let Some(slot) = self.slots.get_mut(idx) {
                    *slot = value;
                }
            }
        }
        self
    }

    /// Non-blank slots, trimmed, in order.
    pub fn filled(&self) -> Vec<String> {
        self.slots
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
