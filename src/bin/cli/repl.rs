use anyhow::Context;
use reedline::{
    ColumnarMenu, DefaultCompleter, Emacs, ExampleHighlighter, FileBackedHistory, KeyCode,
    KeyModifiers, Reedline, ReedlineEvent, ReedlineMenu, Signal,
};

use crate::prompt::LibrisPrompt;

const HISTORY_FILE: &str = "libris_history.txt";
const HISTORY_SIZE: usize = 1000;

pub struct Repl {
    reedline: Reedline,
    prompt:   LibrisPrompt,
}

impl Repl {
    /// Line editor completing and highlighting the given `commands`.
    pub fn new(commands: Vec<String>) -> anyhow::Result<Self> {
        let history = Box::new(
            FileBackedHistory::with_file(HISTORY_SIZE, HISTORY_FILE.into())
                .context("Error configuring history with file")?,
        );

        let completer = Box::new(DefaultCompleter::new_with_wordlen(commands.clone(), 1));

        let completion_menu = Box::new(ColumnarMenu::default().with_name("completion_menu"));

        let mut keybindings = reedline::default_emacs_keybindings();
        keybindings.add_binding(
            KeyModifiers::NONE,
            KeyCode::Tab,
            ReedlineEvent::UntilFound(vec![
                ReedlineEvent::Menu("completion_menu".to_string()),
                ReedlineEvent::MenuNext,
            ]),
        );

        let line_editor = Reedline::create()
            .with_history(history)
            .with_highlighter(Box::new(ExampleHighlighter::new(commands)))
            .with_completer(completer)
            .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
            .with_edit_mode(Box::new(Emacs::new(keybindings)));

        Ok(Repl {
            reedline: line_editor,
            prompt:   LibrisPrompt,
        })
    }

    pub fn read_line(&mut self) -> anyhow::Result<Signal> {
        Ok(self.reedline.read_line(&self.prompt)?)
    }
}
