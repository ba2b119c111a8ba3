// Steps are the paragraphs that follow the preparation heading. Once the
// walker leaves `Collecting` it ignores the rest of its input.

use scraper::{ElementRef, Node, Selector};

use crate::parser::{element_text, image_source, RecipePage};
use crate::{InstructionStep, InstructionStops};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    Collecting,
    StoppedAtHeading,
    StoppedAtTip,
    /// Siblings ran out while still collecting
    Exhausted,
}

pub struct StepWalker<'p> {
    page: &'p RecipePage,
    stops: &'p InstructionStops,
    img: &'p Selector,
    state: WalkState,
    steps: Vec<InstructionStep>,
}

impl<'p> StepWalker<'p> {
    pub fn new(page: &'p RecipePage, stops: &'p InstructionStops, img: &'p Selector) -> Self {
        Self {
            page,
            stops,
            img,
            state: WalkState::Collecting,
            steps: Vec::new(),
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    /// Consume one sibling element.
    pub fn feed(&mut self, element: ElementRef<'_>) -> WalkState {
        if self.state != WalkState::Collecting {
            return self.state;
        }

        let name = element.value().name();

        if is_heading(name) {
            if self.stops.at_heading {
                self.state = WalkState::StoppedAtHeading;
            }
            return self.state;
        }

        if name != "p" {
            // Wrappers never become steps, but a heading or tip inside one
            // still ends the section.
            if let Some(stop) = self.nested_stop(element) {
                self.state = stop;
            }
            return self.state;
        }

        if self.is_tip(element) {
            self.state = WalkState::StoppedAtTip;
            return self.state;
        }

        let text = element_text(element);
        let image = element
            .select(self.img)
            .find_map(image_source)
            .and_then(|src| self.page.absolutize(src));

        if !text.is_empty() || image.is_some() {
            self.steps.push(InstructionStep { step: text, image });
        }

        self.state
    }

    fn is_tip(&self, paragraph: ElementRef<'_>) -> bool {
        self.stops.tip_label.as_deref().is_some_and(|label| {
            leading_emphasis(paragraph).is_some_and(|lead| lead == label)
        })
    }

    /// First stop condition met by a descendant of `container`, in document order.
    fn nested_stop(&self, container: ElementRef<'_>) -> Option<WalkState> {
        container
            .descendants()
            .filter_map(ElementRef::wrap)
            .find_map(|el| match el.value().name() {
                name if is_heading(name) && self.stops.at_heading => Some(WalkState::StoppedAtHeading),
                "p" if self.is_tip(el) => Some(WalkState::StoppedAtTip),
                _ => None,
            })
    }

    pub fn finish(self) -> (WalkState, Vec<InstructionStep>) {
        let state = match self.state {
            WalkState::Collecting => WalkState::Exhausted,
            other => other,
        };
        (state, self.steps)
    }
}

/// Walk the element siblings that follow `anchor`.
pub fn walk_after(
    page: &RecipePage,
    anchor: ElementRef<'_>,
    stops: &InstructionStops,
    img: &Selector,
) -> (WalkState, Vec<InstructionStep>) {
    let mut walker = StepWalker::new(page, stops, img);

    for sibling in anchor.next_siblings().filter_map(ElementRef::wrap) {
        if walker.feed(sibling) != WalkState::Collecting {
            break;
        }
    }

    walker.finish()
}

fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Text of the emphasis element that opens `element`, if it opens with one.
fn leading_emphasis(element: ElementRef<'_>) -> Option<String> {
    for child in element.children() {
        match child.value() {
            Node::Text(text) if text.trim().is_empty() => continue,
            Node::Element(el) if matches!(el.name(), "strong" | "b" | "em") => {
                let lead = ElementRef::wrap(child).map(element_text)?;
                return Some(lead.trim_end_matches(':').trim_end().to_string());
            }
            _ => return None,
        }
    }
    None
}
