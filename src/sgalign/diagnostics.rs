/// Verbosity-gated, append-only text collected during one alignment request.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    verbosity: u8,
    text: String,
}

impl Diagnostics {
    pub fn new(verbosity: u8) -> Self {
        Diagnostics {
            verbosity,
            text: String::new(),
        }
    }

    pub fn note<F>(&mut self, min_verbosity: u8, message: F)
    where
        F: FnOnce() -> String,
    {
        if self.verbosity >= min_verbosity {
            self.text.push_str(&message());
            self.text.push('\n');
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_gated_by_verbosity() {
        let mut diagnostics = Diagnostics::new(3);
        diagnostics.note(2, || "shown".to_string());
        diagnostics.note(3, || "also shown".to_string());
        diagnostics.note(4, || panic!("must not be built"));
        assert_eq!(diagnostics.text(), "shown\nalso shown\n");
    }

    #[test]
    fn silent_by_default() {
        let mut diagnostics = Diagnostics::default();
        diagnostics.note(1, || "hidden".to_string());
        assert!(diagnostics.into_text().is_empty());
    }
}
