//! Chart and item model
//!
//! The chart is an append-only sequence of columns, one per input position.
//! Each column holds a deduplicated, insertion-ordered set of [`Item`]s.
//! Column 0 is created with the seed item; every later column is created by
//! the first successful scan into it, together with the token that was
//! scanned.
//!
//! Items are immutable once inserted. Every item records its
//! [`Provenance`], so the derivation history can be walked backwards without
//! searching.

use ahash::RandomState;
use hashbrown::HashMap;

use super::error::ParseError;
use super::grammar::{Grammar, ProductionId, SymbolId};
use super::token::Token;
use super::value::Value;

/// Deduplication key of an item: `(production, dot, origin)`.
/// The payload is deliberately not part of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey {
    /// Production being matched
    pub production: ProductionId,
    /// Number of rhs symbols matched so far
    pub dot: u32,
    /// Column where the match began
    pub origin: u32,
}

/// Address of an item in the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemRef {
    /// Column index
    pub column: usize,
    /// Insertion index within the column
    pub index: usize,
}

impl ItemRef {
    /// Create a new reference
    #[inline]
    pub fn new(column: usize, index: usize) -> Self {
        Self { column, index }
    }
}

/// How an item came to be in the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    /// The start item of column 0
    Seed,
    /// Predicted because `by` expected this item's lhs next
    Predicted {
        /// The item whose next symbol is this item's lhs
        by: ItemRef,
    },
    /// `from` advanced over the token of this item's column
    Scanned {
        /// The item before the scan
        from: ItemRef,
    },
    /// `parent` advanced over the completed `child`
    Completed {
        /// The item before the completion
        parent: ItemRef,
        /// The complete item that supplied the value
        child: ItemRef,
    },
}

/// Values collected by an item
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// One value per matched rhs symbol (incomplete items)
    Partial(Vec<Value>),
    /// The production's reduced value (complete items)
    Reduced(Value),
}

/// An Earley item: a partially matched production
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Production being matched
    pub production: ProductionId,
    /// Number of rhs symbols matched so far
    pub dot: usize,
    /// Column where the match began
    pub origin: usize,
    /// Collected values
    pub payload: Payload,
    /// Creation history
    pub provenance: Provenance,
}

impl Item {
    /// Deduplication key
    #[inline]
    pub fn key(&self) -> ItemKey {
        ItemKey {
            production: self.production,
            dot: self.dot as u32,
            origin: self.origin as u32,
        }
    }

    /// Whether every rhs symbol has been matched
    #[inline]
    pub fn is_complete(&self) -> bool {
        matches!(self.payload, Payload::Reduced(_))
    }

    /// The symbol after the dot, if any
    #[inline]
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<SymbolId> {
        grammar.production(self.production).rhs.get(self.dot).copied()
    }

    /// Reduced value of a complete item
    #[inline]
    pub fn value(&self) -> Option<&Value> {
        match &self.payload {
            Payload::Reduced(v) => Some(v),
            Payload::Partial(_) => None,
        }
    }

    /// Values matched so far by an incomplete item
    #[inline]
    pub fn children(&self) -> &[Value] {
        match &self.payload {
            Payload::Partial(values) => values,
            Payload::Reduced(_) => &[],
        }
    }
}

/// Outcome of [`Chart::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The item is new
    Added(ItemRef),
    /// An item with the same key was already present and was kept
    Duplicate(ItemRef),
}

/// The items of one input position
#[derive(Debug, Clone)]
pub struct Column {
    index: usize,
    token: Option<Token>,
    items: Vec<Item>,
    keys: HashMap<ItemKey, usize, RandomState>,
}

impl Column {
    fn new(index: usize, token: Option<Token>) -> Self {
        Self {
            index,
            token,
            items: Vec::new(),
            keys: HashMap::default(),
        }
    }

    /// Position of this column in the chart
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The token whose scan created this column (`None` for column 0)
    #[inline]
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// Items in insertion order
    #[inline]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Number of items
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the column holds no items
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Look up an item by key
    #[inline]
    pub fn find(&self, key: &ItemKey) -> Option<usize> {
        self.keys.get(key).copied()
    }
}

/// Append-only table of columns
#[derive(Debug, Clone, Default)]
pub struct Chart {
    columns: Vec<Column>,
}

impl Chart {
    /// Create a chart holding only the seed item in column 0
    pub fn seeded(seed: Item) -> Self {
        let mut column = Column::new(0, None);
        column.keys.insert(seed.key(), 0);
        column.items.push(seed);
        Self {
            columns: vec![column],
        }
    }

    /// Get a column, or `None` if no transition has reached it
    #[inline]
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// All columns
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Number of columns
    #[inline]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the chart has no columns
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Total number of items across all columns
    pub fn item_count(&self) -> usize {
        self.columns.iter().map(Column::len).sum()
    }

    /// Get an item
    #[inline]
    pub fn item(&self, at: ItemRef) -> Option<&Item> {
        self.columns.get(at.column).and_then(|c| c.items.get(at.index))
    }

    /// Whether `column` already holds an item with `key`
    #[inline]
    pub fn contains(&self, column: usize, key: &ItemKey) -> Option<ItemRef> {
        self.columns
            .get(column)
            .and_then(|c| c.find(key))
            .map(|index| ItemRef::new(column, index))
    }

    /// Insert an item unless its key is already present in the column.
    ///
    /// Inserting into the column just past the last one creates it, recording
    /// `via` as the token that led there.
    pub fn insert(
        &mut self,
        column: usize,
        item: Item,
        via: Option<&Token>,
    ) -> Result<Insertion, ParseError> {
        if item.origin > column {
            return Err(ParseError::Internal {
                message: format!(
                    "item with origin {} inserted into earlier column {}",
                    item.origin, column
                ),
            });
        }
        if column == self.columns.len() {
            self.columns.push(Column::new(column, via.cloned()));
        }
        let Some(col) = self.columns.get_mut(column) else {
            return Err(ParseError::Internal {
                message: format!(
                    "column {} skipped (chart has {} columns)",
                    column,
                    self.columns.len()
                ),
            });
        };

        let key = item.key();
        if let Some(&index) = col.keys.get(&key) {
            return Ok(Insertion::Duplicate(ItemRef::new(column, index)));
        }
        let index = col.items.len();
        col.keys.insert(key, index);
        col.items.push(item);
        Ok(Insertion::Added(ItemRef::new(column, index)))
    }

    /// Follow scan/completion links back to the `dot == 0` form of an item
    pub fn start_form(&self, at: ItemRef) -> Option<ItemRef> {
        let mut cur = at;
        loop {
            let item = self.item(cur)?;
            match item.provenance {
                Provenance::Scanned { from } => cur = from,
                Provenance::Completed { parent, .. } => cur = parent,
                Provenance::Seed | Provenance::Predicted { .. } => return Some(cur),
            }
        }
    }
}
