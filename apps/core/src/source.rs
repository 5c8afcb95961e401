use crate::model::{ContainerId, ElementId, TextSegment};

/// Anything that can list searchable containers and the text nodes inside them.
pub trait TextSource {
    /// Containers carrying `container_class`, in document order.
    fn searchable_containers(&self, container_class: &str) -> Vec<ContainerId>;

    /// Text nodes of `container` in document order, tagged with their parent element.
    fn segments(&self, container: ContainerId) -> Vec<TextSegment<'_>>;
}

/// The mutable visual state the highlighter writes to.
pub trait HighlightSurface {
    fn contains(&self, element: ElementId) -> bool;
    fn has_class(&self, element: ElementId, class: &str) -> bool;
    fn add_class(&mut self, element: ElementId, class: &str);
    fn remove_class(&mut self, element: ElementId, class: &str);
    /// Document-level mode flags (the `<body>` classes of a page).
    fn set_flag(&mut self, flag: &str, on: bool);
    fn has_flag(&self, flag: &str) -> bool;
    fn scroll_into_view(&mut self, element: ElementId);
}

pub trait Page: TextSource + HighlightSurface {}

impl<T: TextSource + HighlightSurface> Page for T {}
