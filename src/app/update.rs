use super::{App, Message};

impl App {
    /// Single entry point for every event the realm layer delivers. State
    /// mutations happen here synchronously; animations and persistence are
    /// fire-and-forget side effects.
    pub fn update(&mut self, message: Message) {
        match message {
            Message::Key(key) => self.handle_key(key),
            Message::Mouse(mouse) => self.handle_mouse(mouse),
            Message::Tick => self.tick(),
            Message::Resize(width, height) => {
                self.viewport = (width, height);
                self.interaction_map.clear();
                self.drag = None;
            }
            Message::AddTask => self.add_task(),
            Message::ToggleTask(id) => self.toggle_complete(id),
            Message::SwipeDelete(id) => self.begin_delete(id),
            Message::SelectRow(index) => {
                self.focus_list();
                if !self.tasks.is_empty() {
                    self.selected = index.min(self.tasks.len() - 1);
                }
            }
            Message::ToggleTheme => self.toggle_theme(),
            Message::FocusEntry => self.focus_entry(),
            Message::ToggleHelp => self.show_help = !self.show_help,
            Message::Quit => self.quit(),
        }
    }
}
