use tuirealm::ratatui::layout::Rect;

use super::Message;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InteractionLayer {
    Base,
    Overlay,
}

impl InteractionLayer {
    fn priority(self) -> u8 {
        match self {
            Self::Base => 0,
            Self::Overlay => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InteractionKind {
    LeftClick,
    Drag,
    Scroll,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct InteractionNode {
    pub rect: Rect,
    pub message: Message,
    pub layer: InteractionLayer,
    pub left_clickable: bool,
    pub draggable: bool,
    pub scrollable: bool,
}

impl InteractionNode {
    pub fn click(layer: InteractionLayer, rect: Rect, message: Message) -> Self {
        Self {
            rect,
            message,
            layer,
            left_clickable: true,
            draggable: false,
            scrollable: false,
        }
    }

    /// A task row: clickable to toggle, horizontally draggable to delete.
    pub fn row(layer: InteractionLayer, rect: Rect, message: Message) -> Self {
        Self {
            rect,
            message,
            layer,
            left_clickable: true,
            draggable: true,
            scrollable: true,
        }
    }

    fn contains(&self, col: u16, row: u16) -> bool {
        col >= self.rect.x
            && col < self.rect.x + self.rect.width
            && row >= self.rect.y
            && row < self.rect.y + self.rect.height
    }

    fn supports(&self, kind: InteractionKind) -> bool {
        match kind {
            InteractionKind::LeftClick => self.left_clickable,
            InteractionKind::Drag => self.draggable,
            InteractionKind::Scroll => self.scrollable,
        }
    }
}

/// Hit-test map rebuilt by the render layer each frame. Later registrations
/// and higher layers win, so overlays shadow the widgets beneath them.
#[derive(Debug, Default, Clone)]
pub struct InteractionMap {
    nodes: Vec<InteractionNode>,
}

impl InteractionMap {
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn register(&mut self, node: InteractionNode) {
        self.nodes.push(node);
    }

    pub fn register_click(&mut self, layer: InteractionLayer, rect: Rect, message: Message) {
        self.register(InteractionNode::click(layer, rect, message));
    }

    pub fn register_row(&mut self, layer: InteractionLayer, rect: Rect, message: Message) {
        self.register(InteractionNode::row(layer, rect, message));
    }

    pub fn resolve_message(&self, col: u16, row: u16, kind: InteractionKind) -> Option<Message> {
        self.resolve_node(col, row, kind)
            .map(|node| node.message.clone())
    }

    pub fn resolve_node(
        &self,
        col: u16,
        row: u16,
        kind: InteractionKind,
    ) -> Option<&InteractionNode> {
        let mut best: Option<(usize, &InteractionNode)> = None;
        for (idx, node) in self.nodes.iter().enumerate() {
            if !node.contains(col, row) || !node.supports(kind) {
                continue;
            }
            match best {
                None => best = Some((idx, node)),
                Some((best_idx, best_node)) => {
                    let higher_layer = node.layer.priority() > best_node.layer.priority();
                    let later_same_layer =
                        node.layer.priority() == best_node.layer.priority() && idx > best_idx;
                    if higher_layer || later_same_layer {
                        best = Some((idx, node));
                    }
                }
            }
        }
        best.map(|(_, node)| node)
    }
}
