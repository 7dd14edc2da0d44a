use crate::protocol::StoryRequest;

/// The five inputs of the story form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    ExperienceLevel,
    Genre,
    Characters,
    Interests,
    UserBrainstorm,
}

impl FieldId {
    pub const ALL: [FieldId; 5] = [
        FieldId::ExperienceLevel,
        FieldId::Genre,
        FieldId::Characters,
        FieldId::Interests,
        FieldId::UserBrainstorm,
    ];

    /// Identifier of the input control, identical to its request key.
    pub fn element_id(self) -> &'static str {
        match self {
            FieldId::ExperienceLevel => "experience_level",
            FieldId::Genre => "genre",
            FieldId::Characters => "characters",
            FieldId::Interests => "interests",
            FieldId::UserBrainstorm => "user_brainstorm",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldId::ExperienceLevel => "Experience level",
            FieldId::Genre => "Genre",
            FieldId::Characters => "Characters",
            FieldId::Interests => "Interests",
            FieldId::UserBrainstorm => "Your brainstorm",
        }
    }

    fn index(self) -> usize {
        match self {
            FieldId::ExperienceLevel => 0,
            FieldId::Genre => 1,
            FieldId::Characters => 2,
            FieldId::Interests => 3,
            FieldId::UserBrainstorm => 4,
        }
    }
}

/// Snapshot of the form values taken once per submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub experience_level: String,
    pub genre: String,
    pub characters: String,
    pub interests: String,
    pub user_brainstorm: String,
}

impl FormInput {
    pub fn set(&mut self, field: FieldId, value: impl Into<String>) {
        let slot = match field {
            FieldId::ExperienceLevel => &mut self.experience_level,
            FieldId::Genre => &mut self.genre,
            FieldId::Characters => &mut self.characters,
            FieldId::Interests => &mut self.interests,
            FieldId::UserBrainstorm => &mut self.user_brainstorm,
        };
        *slot = value.into();
    }

    pub fn to_request(&self) -> StoryRequest {
        StoryRequest {
            experience_level: self.experience_level.clone(),
            genre: self.genre.clone(),
            characters: self.characters.clone(),
            interests: self.interests.clone(),
            user_brainstorm: self.user_brainstorm.clone(),
        }
    }
}

/// Single-line editable text with a cursor counted in chars.
#[derive(Debug, Clone, Default)]
pub struct FieldBuffer {
    text: String,
    cursor: usize,
}

impl FieldBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let at = self.byte_offset(self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }
}

/// Editable form state for the terminal front-end.
#[derive(Debug, Default)]
pub struct StoryForm {
    fields: [FieldBuffer; 5],
    focus: usize,
}

impl StoryForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focused(&self) -> FieldId {
        FieldId::ALL[self.focus]
    }

    pub fn focus_next(&mut self) {
        self.focus = (self.focus + 1) % FieldId::ALL.len();
    }

    pub fn focus_prev(&mut self) {
        self.focus = (self.focus + FieldId::ALL.len() - 1) % FieldId::ALL.len();
    }

    pub fn field(&self, field: FieldId) -> &FieldBuffer {
        &self.fields[field.index()]
    }

    pub fn focused_mut(&mut self) -> &mut FieldBuffer {
        &mut self.fields[self.focus]
    }

    /// Reads the current value of every input.
    pub fn read(&self) -> FormInput {
        let mut input = FormInput::default();
        for field in FieldId::ALL {
            input.set(field, self.field(field).text());
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_ids_match_request_keys() {
        let mut input = FormInput::default();
        for field in FieldId::ALL {
            input.set(field, format!("value of {}", field.element_id()));
        }

        let value = serde_json::to_value(input.to_request()).unwrap();
        for field in FieldId::ALL {
            assert_eq!(
                value[field.element_id()],
                format!("value of {}", field.element_id())
            );
        }
    }

    #[test]
    fn field_buffer_edits_multibyte_text() {
        let mut buffer = FieldBuffer::default();
        for ch in "café".chars() {
            buffer.insert_char(ch);
        }
        buffer.move_left();
        buffer.delete_char();
        buffer.insert_char('ф');

        assert_eq!(buffer.text(), "caфé");
        assert_eq!(buffer.cursor(), 3);

        buffer.end();
        buffer.move_right();
        assert_eq!(buffer.cursor(), 4);
        buffer.home();
        buffer.delete_char();
        assert_eq!(buffer.text(), "caфé");
    }

    #[test]
    fn form_focus_wraps_and_reads_every_field() {
        let mut form = StoryForm::new();
        form.focus_prev();
        assert_eq!(form.focused(), FieldId::UserBrainstorm);
        form.focused_mut().insert_char('x');
        form.focus_next();
        assert_eq!(form.focused(), FieldId::ExperienceLevel);
        form.focused_mut().insert_char('y');

        let input = form.read();
        assert_eq!(input.user_brainstorm, "x");
        assert_eq!(input.experience_level, "y");
        assert_eq!(input.genre, "");
    }
}
