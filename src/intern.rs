//! String interning for identifiers.
//!
//! Identifier names flow from tokens into the AST and from there into
//! environment keys, so they are deduplicated once at parse time and shared
//! as [`Symbol`] values afterwards.

use std::borrow::Borrow;
use std::cell::RefCell;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

/// An immutable, cheaply clonable identifier name.
///
/// Symbols produced by the same [`Interner`] compare by pointer; symbols from
/// different interners (e.g. two REPL lines parsed separately) fall back to
/// content comparison, so a name always equals itself wherever it was made.
#[derive(Debug, Clone)]
pub struct Symbol(Rc<str>);

impl Symbol {
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stores all symbols seen so far.
#[derive(Debug, Default)]
pub struct Interner(HashSet<Symbol>);

impl Interner {
    pub fn new() -> Interner {
        Interner(HashSet::new())
    }

    /// Maps a string to its symbol, allocating on first sight.
    pub fn symbol(&mut self, name: &str) -> Symbol {
        if let Some(sym) = self.0.get(name) {
            sym.clone()
        } else {
            let sym = Symbol(Rc::from(name));
            self.0.insert(sym.clone());
            sym
        }
    }
}

/// Shared state that can persist across interpreter sessions.
///
/// Anchors the string interner so that successive parses (e.g. REPL lines)
/// reuse identifier allocations.
#[derive(Debug)]
pub struct Context {
    interner: RefCell<Interner>,
}

impl Context {
    /// Creates a new context, shared via `Rc` between parser and interpreter.
    pub fn new() -> Rc<Self> {
        Rc::new(Context {
            interner: RefCell::new(Interner::new()),
        })
    }

    /// Intern the given string if needed and return its symbol.
    pub fn symbol(&self, name: &str) -> Symbol {
        self.interner.borrow_mut().symbol(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_from_string() {
        let mut interner = Interner::new();
        let sym = interner.symbol("alpha");
        assert_eq!(sym.name(), "alpha");
    }

    #[test]
    fn symbols_with_same_name_are_equal() {
        let mut interner = Interner::new();
        let sym1 = interner.symbol("alpha");
        let sym2 = interner.symbol("alpha");
        assert_eq!(sym1, sym2);
    }

    #[test]
    fn symbols_with_different_names_are_different() {
        let mut interner = Interner::new();
        let sym1 = interner.symbol("alpha");
        let sym2 = interner.symbol("beta");
        assert_ne!(sym1, sym2);
    }

    #[test]
    fn symbols_from_different_interners_compare_by_content() {
        let sym1 = Interner::new().symbol("gamma");
        let sym2 = Interner::new().symbol("gamma");
        assert_eq!(sym1, sym2);
    }

    #[test]
    fn context_reuses_symbols() {
        let ctx = Context::new();
        let sym1 = ctx.symbol("answer");
        let sym2 = ctx.symbol("answer");
        assert_eq!(sym1, sym2);
    }
}
