use super::*;
use std::{ops::Index, sync::Arc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub text: String,
    /// Spoken by every endpoint instead of a single one.
    pub simultaneous: bool,
}

impl ScriptLine {
    pub fn new<T: Into<String>>(text: T, simultaneous: bool) -> Self {
        Self {
            text: text.into(),
            simultaneous,
        }
    }
}

/// Immutable, cheaply clonable sequence of lines.
#[derive(Debug, Clone)]
pub struct Script {
    lines: Arc<[ScriptLine]>,
}

const TERMINATORS: [char; 3] = ['.', '!', '?'];

impl Script {
    pub fn new(lines: Vec<ScriptLine>) -> ChorusResult<Self> {
        if lines.is_empty() {
            return Err(ChorusError::EmptyScript);
        }
        Ok(Self {
            lines: lines.into(),
        })
    }

    /// Split `text` into sentences and flag the ones listed in `simultaneous`.
    ///
    /// A sentence is a run of non-terminator characters closed by one or more
    /// of `.`, `!`, `?`. Text after the last terminator is dropped, unless
    /// the text holds no complete sentence at all, in which case it becomes
    /// the only line.
    pub fn from_text<S: AsRef<str>>(text: &str, simultaneous: &[S]) -> ChorusResult<Self> {
        let mut sentences = split_sentences(text);
        if sentences.is_empty() && !text.trim().is_empty() {
            sentences.push(text.trim());
        }

        Self::new(
            sentences
                .into_iter()
                .map(|sentence| {
                    let flagged = simultaneous.iter().any(|s| s.as_ref() == sentence);
                    ScriptLine::new(sentence, flagged)
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&ScriptLine> {
        self.lines.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScriptLine> {
        self.lines.iter()
    }
}

impl Default for Script {
    fn default() -> Self {
        Self::from_text(constants::DEFAULT_SCRIPT, &constants::DEFAULT_SIMULTANEOUS)
            .expect("default script is not empty")
    }
}

impl Index<usize> for Script {
    type Output = ScriptLine;

    fn index(&self, index: usize) -> &Self::Output {
        &self.lines[index]
    }
}

fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = None;
    let mut in_terminators = false;

    for (pos, ch) in text.char_indices() {
        let is_terminator = TERMINATORS.contains(&ch);
        match (start, is_terminator) {
            // leading terminators never open a sentence
            (None, true) => {}
            (None, false) => {
                start = Some(pos);
                in_terminators = false;
            }
            (Some(_), true) => in_terminators = true,
            (Some(begin), false) if in_terminators => {
                sentences.push(&text[begin..pos]);
                start = Some(pos);
                in_terminators = false;
            }
            (Some(_), false) => {}
        }
    }
    if let (Some(begin), true) = (start, in_terminators) {
        sentences.push(&text[begin..]);
    }

    sentences
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_on_terminators() {
        assert_eq!(
            split_sentences("Hello there. How are you?! Fine... ok"),
            vec!["Hello there.", "How are you?!", "Fine..."]
        );
        assert_eq!(split_sentences("..Wait. Go!"), vec!["Wait.", "Go!"]);
        assert!(split_sentences("no terminator").is_empty());
    }

    #[test]
    fn unterminated_text_is_a_single_line() {
        let script = Script::from_text::<&str>("just words", &[]).unwrap();
        assert_eq!(script.len(), 1);
        assert_eq!(script[0], ScriptLine::new("just words", false));
    }

    #[test]
    fn empty_text_is_rejected() {
        assert_eq!(
            Script::from_text::<&str>("   ", &[]).unwrap_err(),
            ChorusError::EmptyScript
        );
        assert_eq!(Script::new(vec![]).unwrap_err(), ChorusError::EmptyScript);
    }

    #[test]
    fn simultaneous_lines_are_tagged_once() {
        let script = Script::from_text("A. B. C.", &["B."]).unwrap();
        let flags: Vec<_> = script.iter().map(|l| l.simultaneous).collect();
        assert_eq!(flags, vec![false, true, false]);
    }

    #[test]
    fn default_script() {
        let script = Script::default();
        assert_eq!(script.len(), 15);
        assert_eq!(script[0].text, "We are collective intelligence.");
        assert!(script[0].simultaneous);
        assert!(!script[1].simultaneous);
        assert_eq!(script[14].text, "After all, we know best.");
        assert_eq!(
            script.iter().filter(|l| l.simultaneous).count(),
            constants::DEFAULT_SIMULTANEOUS.len()
        );
    }
}
