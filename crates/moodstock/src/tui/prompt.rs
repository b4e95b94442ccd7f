use super::input::{InputStep, PromptInput};
use super::ui::{self, OverlayView};
use crate::prompt::{PromptAnswer, PromptRequest, Prompter};
use crossterm::event::{self, Event, KeyEventKind};
use log::error;
use ratatui::{Terminal, backend::Backend};

/// Modal numeric prompt drawn over the overlay.
///
/// Blocks on terminal input with no timeout; the cycle waits until the operator answers.
pub struct TerminalPrompter<'t, 'v, B: Backend> {
    terminal: &'t mut Terminal<B>,
    view: OverlayView<'v>,
    quit: bool,
}

impl<'t, 'v, B: Backend> TerminalPrompter<'t, 'v, B> {
    pub fn new(terminal: &'t mut Terminal<B>, view: OverlayView<'v>) -> Self {
        TerminalPrompter {
            terminal,
            view,
            quit: false,
        }
    }

    /// Ctrl-C was pressed inside the modal
    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

impl<B: Backend> Prompter for TerminalPrompter<'_, '_, B> {
    fn ask(&mut self, request: &PromptRequest) -> PromptAnswer {
        if self.quit {
            return PromptAnswer::Cancelled;
        }

        let mut input = PromptInput::new(request.clone());
        loop {
            let view = &self.view;
            if let Err(e) = self
                .terminal
                .draw(|frame| ui::render_prompt(frame, view, &input))
            {
                error!("Failed to draw prompt: {}", e);
                return PromptAnswer::Cancelled;
            }

            let key = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => key,
                Ok(_) => continue,
                Err(e) => {
                    error!("Failed to read terminal input: {}", e);
                    return PromptAnswer::Cancelled;
                }
            };

            match input.handle_key(key.code, key.modifiers) {
                InputStep::Pending => {}
                InputStep::Done(answer) => return answer,
                InputStep::Quit => {
                    self.quit = true;
                    return PromptAnswer::Cancelled;
                }
            }
        }
    }
}
