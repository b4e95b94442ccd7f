use crate::prompt::{PromptAnswer, PromptRequest};
use crossterm::event::{KeyCode, KeyModifiers};

/// Longest accepted text, "100.0"
const MAX_INPUT_LEN: usize = 5;

/// Arrow keys move the value by this much, like a spin box
const STEP: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputStep {
    Pending,
    Done(PromptAnswer),
    /// Ctrl-C inside the modal: cancel and shut down
    Quit,
}

/// Edit state of the numeric modal
#[derive(Debug, Clone)]
pub struct PromptInput {
    request: PromptRequest,
    buffer: String,
    /// The pre-filled default is replaced by the first typed character
    pristine: bool,
    error: Option<String>,
}

impl PromptInput {
    pub fn new(request: PromptRequest) -> Self {
        PromptInput {
            buffer: format!("{:.1}", request.default),
            request,
            pristine: true,
            error: None,
        }
    }

    pub fn request(&self) -> &PromptRequest {
        &self.request
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> InputStep {
        if modifiers.contains(KeyModifiers::CONTROL) {
            return match code {
                KeyCode::Char('c') => InputStep::Quit,
                _ => InputStep::Pending,
            };
        }

        match code {
            KeyCode::Esc => return InputStep::Done(PromptAnswer::Cancelled),
            KeyCode::Enter => return self.submit(),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => self.type_char(c),
            KeyCode::Backspace => {
                self.pristine = false;
                self.buffer.pop();
            }
            KeyCode::Up => self.step(STEP),
            KeyCode::Down => self.step(-STEP),
            _ => {}
        }
        InputStep::Pending
    }

    fn type_char(&mut self, c: char) {
        if self.pristine {
            self.buffer.clear();
            self.pristine = false;
        }
        self.error = None;

        if self.buffer.len() >= MAX_INPUT_LEN {
            return;
        }
        match self.buffer.split_once('.') {
            // One decimal place at most, one point at most
            Some((_, decimals)) if c == '.' || !decimals.is_empty() => {}
            _ => self.buffer.push(c),
        }
    }

    fn step(&mut self, delta: f64) {
        let current = self.buffer.parse::<f64>().unwrap_or(self.request.default);
        let next = self.request.normalize(current + delta);
        self.buffer = format!("{:.1}", next);
        self.pristine = true;
        self.error = None;
    }

    fn submit(&mut self) -> InputStep {
        match self.buffer.parse::<f64>() {
            Ok(value) if self.request.contains(value) => {
                InputStep::Done(PromptAnswer::Accepted(self.request.normalize(value)))
            }
            _ => {
                self.error = Some(format!(
                    "Enter a number between {:.0} and {:.0}",
                    self.request.min, self.request.max
                ));
                InputStep::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimension::Dimension;

    fn input(default: f64) -> PromptInput {
        PromptInput::new(PromptRequest::new(Dimension::Sanity, default))
    }

    fn press(input: &mut PromptInput, code: KeyCode) -> InputStep {
        input.handle_key(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut PromptInput, text: &str) {
        for c in text.chars() {
            press(input, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_enter_accepts_default() {
        let mut input = input(42.0);
        assert_eq!(input.text(), "42.0");
        assert_eq!(
            press(&mut input, KeyCode::Enter),
            InputStep::Done(PromptAnswer::Accepted(42.0))
        );
    }

    #[test]
    fn test_typing_replaces_default() {
        let mut input = input(50.0);
        type_str(&mut input, "73.5");
        assert_eq!(input.text(), "73.5");
        assert_eq!(
            press(&mut input, KeyCode::Enter),
            InputStep::Done(PromptAnswer::Accepted(73.5))
        );
    }

    #[test]
    fn test_single_decimal_place() {
        let mut input = input(50.0);
        type_str(&mut input, "1.234");
        assert_eq!(input.text(), "1.2");
        type_str(&mut input, ".");
        assert_eq!(input.text(), "1.2");
    }

    #[test]
    fn test_out_of_range_is_rejected() {
        let mut input = input(50.0);
        type_str(&mut input, "150");
        assert_eq!(press(&mut input, KeyCode::Enter), InputStep::Pending);
        assert!(input.error().is_some());

        press(&mut input, KeyCode::Backspace);
        press(&mut input, KeyCode::Backspace);
        assert_eq!(input.text(), "1");
        assert_eq!(
            press(&mut input, KeyCode::Enter),
            InputStep::Done(PromptAnswer::Accepted(1.0))
        );
    }

    #[test]
    fn test_arrows_step_and_clamp() {
        let mut input = input(99.5);
        press(&mut input, KeyCode::Up);
        assert_eq!(input.text(), "100.0");
        press(&mut input, KeyCode::Down);
        assert_eq!(input.text(), "99.0");
    }

    #[test]
    fn test_escape_cancels_and_ctrl_c_quits() {
        let mut input = input(50.0);
        assert_eq!(
            press(&mut input, KeyCode::Esc),
            InputStep::Done(PromptAnswer::Cancelled)
        );
        assert_eq!(
            input.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL),
            InputStep::Quit
        );
    }
}
