//! Shared token vector walked by every command of one parse.
//!
//! Tokens are never removed. A consumed slot is marked in a mask indexed by
//! original position, so indexes stay stable while arguments take turns, and
//! an empty-string token the user typed stays distinguishable from a slot
//! that was already claimed.

#[derive(Debug)]
struct Token {
    text: String,
    consumed: bool,
}

#[derive(Debug)]
pub(crate) struct Tokens {
    items: Vec<Token>,
}

impl Tokens {
    pub(crate) fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: tokens
                .into_iter()
                .map(|text| Token {
                    text: text.into(),
                    consumed: false,
                })
                .collect(),
        }
    }

    /// Number of slots, consumed ones included.
    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Text at `index`, unless the slot was consumed.
    pub(crate) fn get(&self, index: usize) -> Option<&str> {
        self.items
            .get(index)
            .filter(|token| !token.consumed)
            .map(|token| token.text.as_str())
    }

    fn front_index(&self) -> Option<usize> {
        self.items.iter().position(|token| !token.consumed)
    }

    /// First token no command or argument has claimed yet.
    pub(crate) fn front(&self) -> Option<&str> {
        self.front_index().map(|index| self.items[index].text.as_str())
    }

    pub(crate) fn consume_front(&mut self) {
        if let Some(index) = self.front_index() {
            self.items[index].consumed = true;
        }
    }

    pub(crate) fn is_exhausted(&self) -> bool {
        self.front_index().is_none()
    }

    pub(crate) fn consume(&mut self, index: usize) {
        if let Some(token) = self.items.get_mut(index) {
            token.consumed = true;
        }
    }

    /// Replace what is left of a partially claimed bundle such as `-vc`.
    pub(crate) fn rewrite(&mut self, index: usize, text: String) {
        if let Some(token) = self.items.get_mut(index) {
            token.text = text;
        }
    }

    /// Unclaimed tokens in their original order.
    pub(crate) fn leftovers(&self) -> Vec<String> {
        self.items
            .iter()
            .filter(|token| !token.consumed)
            .map(|token| token.text.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumed_slots_keep_their_index() {
        let mut tokens = Tokens::new(["prog", "--port", "1080"]);
        tokens.consume(1);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens.get(1), None);
        assert_eq!(tokens.get(2), Some("1080"));
    }

    #[test]
    fn front_skips_consumed_slots() {
        let mut tokens = Tokens::new(["prog", "serve"]);
        assert_eq!(tokens.front(), Some("prog"));
        tokens.consume_front();
        assert_eq!(tokens.front(), Some("serve"));
        tokens.consume_front();
        assert!(tokens.is_exhausted());
        assert_eq!(tokens.front(), None);
    }

    #[test]
    fn empty_token_is_not_a_consumed_slot() {
        let tokens = Tokens::new(["prog", ""]);
        assert_eq!(tokens.get(1), Some(""));
        assert_eq!(tokens.leftovers(), vec!["prog".to_string(), String::new()]);
    }

    #[test]
    fn rewrite_changes_leftover_text() {
        let mut tokens = Tokens::new(["-vx"]);
        tokens.rewrite(0, "-x".to_string());
        assert_eq!(tokens.leftovers(), vec!["-x".to_string()]);
    }
}
