/// Yes/no gate in front of destructive actions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Answers every prompt the same way, e.g. for `--yes` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedAnswer(pub bool);

impl Confirm for FixedAnswer {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

pub const RESET_PROMPT: &str = "Are you sure you want to reset all changes?";
pub const REMOVE_IMAGE_PROMPT: &str = "Delete this image from the series?";
