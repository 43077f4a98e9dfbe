use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Focus, Message};

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }

        if self.show_help {
            match key.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => self.show_help = false,
                _ => {}
            }
            return;
        }

        match self.focus {
            Focus::Entry => self.handle_entry_key(key),
            Focus::List => self.handle_list_key(key),
        }
    }

    fn handle_entry_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.update(Message::AddTask),
            KeyCode::Backspace => {
                self.entry.pop();
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Esc => self.focus_list(),
            KeyCode::Char(ch)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                self.entry.push(ch);
            }
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Tab | KeyCode::Char('i') => self.focus_entry(),
            KeyCode::Up | KeyCode::Char('k') => self.select_up(),
            KeyCode::Down | KeyCode::Char('j') => self.select_down(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(id) = self.selected_task_id() {
                    self.update(Message::ToggleTask(id));
                }
            }
            KeyCode::Delete | KeyCode::Char('d') => {
                if let Some(id) = self.selected_task_id() {
                    self.update(Message::SwipeDelete(id));
                }
            }
            KeyCode::Char('t') => self.update(Message::ToggleTheme),
            KeyCode::Char('?') => self.show_help = true,
            _ => {}
        }
    }
}
