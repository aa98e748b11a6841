/// A diagram found in a message. Derived from the message list, never stored
/// on its own; the id only depends on the message position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramBlock {
    pub id: String,
    pub code: String,
}

impl DiagramBlock {
    pub fn new(message_index: usize, code: &str) -> DiagramBlock {
        return DiagramBlock {
            id: DiagramBlock::id_for(message_index),
            code: code.to_string(),
        };
    }

    pub fn id_for(message_index: usize) -> String {
        return format!("diagram-{message_index}");
    }
}
