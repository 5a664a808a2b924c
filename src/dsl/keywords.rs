//! Keyword dispatch.
//!
//! Each DSL-variant instance owns its own keyword table, built once at
//! construction. Disabling a keyword removes its entry, so the set of
//! accepted keywords is always exactly the table's key set.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use crate::error::Result;

/// A keyword handler. Handlers read further tokens themselves, including
/// issuing their own code-block extractions or nested file analyses.
pub type KeywordHandler<D> = fn(&mut D) -> Result<()>;

pub struct KeywordDispatcher<D> {
    handlers: FxHashMap<SmolStr, KeywordHandler<D>>,
}

impl<D> KeywordDispatcher<D> {
    pub fn new() -> Self {
        Self {
            handlers: FxHashMap::default(),
        }
    }

    /// Register `handler` for `keyword`, replacing any previous entry.
    pub fn register(&mut self, keyword: &str, handler: KeywordHandler<D>) {
        self.handlers.insert(SmolStr::new(keyword), handler);
    }

    /// Remove the handler for `keyword`. Returns whether one was present.
    pub fn disable(&mut self, keyword: &str) -> bool {
        self.handlers.remove(keyword).is_some()
    }

    pub fn get(&self, keyword: &str) -> Option<KeywordHandler<D>> {
        self.handlers.get(keyword).copied()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.handlers.contains_key(keyword)
    }

    /// All registered keywords, sorted for stable presentation.
    pub fn keywords(&self) -> Vec<String> {
        let mut keywords: Vec<String> = self.handlers.keys().map(|k| k.to_string()).collect();
        keywords.sort();
        keywords
    }
}

impl<D> Default for KeywordDispatcher<D> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        hits: u32,
    }

    fn bump(d: &mut Dummy) -> Result<()> {
        d.hits += 1;
        Ok(())
    }

    #[test]
    fn test_register_dispatch_disable() {
        let mut dispatcher: KeywordDispatcher<Dummy> = KeywordDispatcher::new();
        dispatcher.register("@Law", bump);
        let mut dummy = Dummy { hits: 0 };
        dispatcher.get("@Law").unwrap()(&mut dummy).unwrap();
        assert_eq!(dummy.hits, 1);
        assert!(dispatcher.disable("@Law"));
        assert!(dispatcher.get("@Law").is_none());
        assert!(!dispatcher.disable("@Law"));
    }

    #[test]
    fn test_keywords_sorted() {
        let mut dispatcher: KeywordDispatcher<Dummy> = KeywordDispatcher::new();
        dispatcher.register("@Output", bump);
        dispatcher.register("@Input", bump);
        assert_eq!(dispatcher.keywords(), vec!["@Input", "@Output"]);
    }
}
