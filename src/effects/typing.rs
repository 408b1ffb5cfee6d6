use super::*;

/// What a single tick of the typing effect produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypingStep<'a> {
    /// One character of plain text.
    Text(&'a str),
    /// A complete tag, emitted when its closing `>` is consumed.
    Tag(&'a str),
    /// A character swallowed into a tag that is still open.
    Pending,
}

/// Walks markup one character at a time, holding tags back until they close.
///
/// ```
/// use portfolio_effects::{TypingStep, TypingSteps};
///
/// let steps: Vec<_> = TypingSteps::new("<b>x").collect();
/// assert_eq!(
///     steps,
///     vec![
///         TypingStep::Pending,
///         TypingStep::Pending,
///         TypingStep::Tag("<b>"),
///         TypingStep::Text("x"),
///     ]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct TypingSteps<'a> {
    source: &'a str,
    position: usize,
    tag_start: Option<usize>,
}

impl<'a> TypingSteps<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::resume(source, 0, None)
    }

    /// Continues from a byte `position` with an optional open tag starting
    /// at `tag_start`. Positions off a character boundary are moved forward
    /// to the next one.
    pub fn resume(source: &'a str, position: usize, tag_start: Option<usize>) -> Self {
        let mut position = position.min(source.len());
        while !source.is_char_boundary(position) {
            position += 1;
        }
        Self {
            source,
            position,
            tag_start: tag_start.filter(|start| *start < position),
        }
    }

    /// Byte offset of the next character to consume.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Byte offset of the `<` of the tag being buffered, if any.
    pub fn pending_tag_start(&self) -> Option<usize> {
        self.tag_start
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.source.len()
    }
}

impl<'a> Iterator for TypingSteps<'a> {
    type Item = TypingStep<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.position;
        let ch = self.source[start..].chars().next()?;
        let end = start + ch.len_utf8();
        self.position = end;

        let step = match (ch, self.tag_start) {
            ('<', _) => {
                self.tag_start = Some(start);
                TypingStep::Pending
            }
            ('>', Some(tag_start)) => {
                self.tag_start = None;
                TypingStep::Tag(&self.source[tag_start..end])
            }
            (_, Some(_)) => TypingStep::Pending,
            (_, None) => TypingStep::Text(&self.source[start..end]),
        };
        Some(step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypedKind {
    Text,
    Tag,
    Pending,
}

/// Types the code window's markup back in, one tick at a time.
#[derive(Debug, Clone)]
pub(crate) struct TypingEffect {
    node: NodeId,
    source: String,
    position: usize,
    tag_start: Option<usize>,
    typed: String,
    start_delay_ms: i64,
    step_ms: i64,
}

impl TypingEffect {
    /// Takes over the code block: its markup becomes the source and the
    /// element is emptied and made visible.
    pub(crate) fn capture(dom: &mut dyn PageDom, config: &EffectsConfig) -> Result<Option<Self>> {
        let Some(node) = dom.query_selector(&config.markup.code_block)? else {
            return Ok(None);
        };
        let source = dom.inner_html(node)?;
        dom.set_inner_html(node, "")?;
        dom.style_set(node, "opacity", "1")?;
        Ok(Some(Self {
            node,
            source,
            position: 0,
            tag_start: None,
            typed: String::new(),
            start_delay_ms: config.typing_start_delay_ms,
            step_ms: config.typing_step_ms,
        }))
    }

    pub(crate) fn start(&self, timers: &mut dyn TimerHost) -> TimerId {
        timers.set_timeout(Task::TypingStep, self.start_delay_ms)
    }

    pub(crate) fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn typed(&self) -> &str {
        &self.typed
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.position >= self.source.len()
    }

    /// Consumes one character and writes the typed markup back. Once the
    /// source is exhausted nothing is scheduled and `None` is returned.
    pub(crate) fn step(
        &mut self,
        dom: &mut dyn PageDom,
        timers: &mut dyn TimerHost,
    ) -> Result<Option<TypedKind>> {
        let mut steps = TypingSteps::resume(&self.source, self.position, self.tag_start);
        let Some(step) = steps.next() else {
            return Ok(None);
        };
        self.position = steps.position();
        self.tag_start = steps.pending_tag_start();

        let kind = match step {
            TypingStep::Text(text) => {
                self.typed.push_str(text);
                TypedKind::Text
            }
            TypingStep::Tag(tag) => {
                self.typed.push_str(tag);
                TypedKind::Tag
            }
            TypingStep::Pending => TypedKind::Pending,
        };
        dom.set_inner_html(self.node, &self.typed)?;
        timers.request_animation_frame(Task::TypingFrame);
        Ok(Some(kind))
    }

    pub(crate) fn frame(&self, timers: &mut dyn TimerHost) -> TimerId {
        timers.set_timeout(Task::TypingStep, self.step_ms)
    }
}
