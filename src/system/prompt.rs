// src/system/prompt.rs

//! The interactive-input collaborator. Resolution only talks to the
//! [`InputProvider`] trait, so tests can script answers and the console
//! implementation stays a thin dialoguer wrapper.

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

pub trait InputProvider {
    /// Free-text prompt with an editable initial value. An interrupted read
    /// counts as an empty answer, never as a failure.
    fn free_text(&mut self, prompt: &str, initial: &str) -> String;

    /// Pick one of `options`; `None` when nothing was selected.
    fn choice(&mut self, prompt: &str, options: &[String]) -> Option<usize>;
}

/// Console prompts on the controlling terminal.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl InputProvider for ConsolePrompt {
    fn free_text(&mut self, prompt: &str, initial: &str) -> String {
        let theme = ColorfulTheme::default();
        let mut input = Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .allow_empty(true);
        if !initial.is_empty() {
            input = input.with_initial_text(initial);
        }
        input.interact_text().unwrap_or_default()
    }

    fn choice(&mut self, prompt: &str, options: &[String]) -> Option<usize> {
        Select::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(options)
            .default(0)
            .interact_opt()
            .ok()
            .flatten()
    }
}
