//! Host boundary consumed by the controller
//!
//! The DOM and the host framework's data binding are reached only through
//! these traits; `web/` implements them for the browser.

/// Qualifying user action, already matched against the Quick Connect markup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Click on the trigger button or something nested inside it
    Click,
    /// Submit of the Quick Connect form
    Submit,
    /// Focus left the URI input
    Blur,
}

/// The connection-string input and its data binding
pub trait QuickConnectHost {
    /// Current input value; `None` when the input is not on the page
    fn read_input(&self) -> Option<String>;

    /// Replace the input value
    fn write_input(&self, value: &str);

    /// Tell the host's data binding the value changed (synthetic `input` event)
    fn notify_input_changed(&self);
}

/// Minimal element view for target matching
pub trait ElementLike: Sized {
    fn matches(&self, selector: &str) -> bool;
    fn parent(&self) -> Option<Self>;
}

/// True if `el` or one of its first `depth` ancestors matches `selector`
pub fn is_quick_connect_target<E: ElementLike>(el: &E, selector: &str, depth: usize) -> bool {
    if el.matches(selector) {
        return true;
    }
    let mut current = el.parent();
    for _ in 0..depth {
        match current {
            Some(node) if node.matches(selector) => return true,
            Some(node) => current = node.parent(),
            None => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Element in a flat arena: (class, parent index)
    #[derive(Clone)]
    struct Node<'a> {
        arena: &'a [(&'a str, Option<usize>)],
        index: usize,
    }

    impl ElementLike for Node<'_> {
        fn matches(&self, selector: &str) -> bool {
            self.arena[self.index].0 == selector
        }

        fn parent(&self) -> Option<Self> {
            self.arena[self.index].1.map(|index| Node {
                arena: self.arena,
                index,
            })
        }
    }

    // button > span > span > span > i
    const TREE: &[(&str, Option<usize>)] = &[
        ("button", None),
        ("span", Some(0)),
        ("span", Some(1)),
        ("span", Some(2)),
        ("i", Some(3)),
    ];

    fn node(index: usize) -> Node<'static> {
        Node { arena: TREE, index }
    }

    #[test]
    fn test_direct_match() {
        assert!(is_quick_connect_target(&node(0), "button", 3));
    }

    #[test]
    fn test_nested_within_depth() {
        assert!(is_quick_connect_target(&node(3), "button", 3));
        assert!(is_quick_connect_target(&node(2), "button", 2));
    }

    #[test]
    fn test_nested_beyond_depth() {
        assert!(!is_quick_connect_target(&node(4), "button", 3));
        assert!(!is_quick_connect_target(&node(3), "button", 0));
    }

    #[test]
    fn test_default_depth_covers_three_elements() {
        let depth = crate::config::Selectors::default().ancestor_depth;
        // span > span > button: the grandchild is the deepest match
        assert!(is_quick_connect_target(&node(2), "button", depth));
        assert!(!is_quick_connect_target(&node(3), "button", depth));
    }

    #[test]
    fn test_root_without_match() {
        assert!(!is_quick_connect_target(&node(0), "form", 3));
    }
}
